pub(crate) mod audit;
pub(crate) mod questions;
pub(crate) mod responses;
pub(crate) mod session_questions;
pub(crate) mod sessions;
pub(crate) mod students;
pub(crate) mod violations;
