use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::models::Question;

/// A question in its final display position. `sequence` is the number shown
/// to the candidate; group headers carry no number.
#[derive(Debug, Clone)]
pub(crate) struct OrderedQuestion {
    pub(crate) question: Question,
    pub(crate) sequence: Option<i32>,
}

enum Unit {
    Standalone(Question),
    Group(Vec<Question>),
}

/// Produces a per-candidate ordering of the active question set.
///
/// Groups travel as atomic blocks: members are sorted by `group_order`
/// (id as fallback) with the header first, the blocks and the standalone
/// questions are each permuted, and the combined block/standalone list is
/// permuted once more before flattening. Display numbers are a contiguous
/// run over non-header questions only.
///
/// The caller supplies the RNG; production uses an OS-seeded generator so
/// no two requests can reproduce each other's order.
pub(crate) fn randomize_assignment(
    questions: Vec<Question>,
    rng: &mut impl Rng,
) -> Vec<OrderedQuestion> {
    let mut standalone: Vec<Question> = Vec::new();
    let mut grouped: BTreeMap<i32, Vec<Question>> = BTreeMap::new();

    for question in questions {
        match question.question_group_id {
            Some(group_id) => grouped.entry(group_id).or_default().push(question),
            None => standalone.push(question),
        }
    }

    let mut groups: Vec<Vec<Question>> = grouped
        .into_values()
        .map(|mut members| {
            members.sort_by_key(|q| {
                (!q.is_group_header, q.group_order.unwrap_or(i32::MAX), q.id)
            });
            members
        })
        .collect();

    standalone.shuffle(rng);
    groups.shuffle(rng);

    let mut combined: Vec<Unit> = standalone.into_iter().map(Unit::Standalone).collect();
    combined.extend(groups.into_iter().map(Unit::Group));
    combined.shuffle(rng);

    let mut ordered = Vec::new();
    let mut sequence = 0;
    for unit in combined {
        match unit {
            Unit::Standalone(question) => push_numbered(&mut ordered, question, &mut sequence),
            Unit::Group(members) => {
                for member in members {
                    push_numbered(&mut ordered, member, &mut sequence);
                }
            }
        }
    }

    ordered
}

fn push_numbered(ordered: &mut Vec<OrderedQuestion>, question: Question, sequence: &mut i32) {
    let number = if question.is_group_header {
        None
    } else {
        *sequence += 1;
        Some(*sequence)
    };
    ordered.push(OrderedQuestion { question, sequence: number });
}
