pub(crate) mod lifecycle;
pub(crate) mod ordering;
pub(crate) mod scoring;
