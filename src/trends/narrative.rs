//! Orders reader questions so an outline reads beginner → creative → technical →
//! comparative.

use crate::constants::limits;

const BUCKETS: [&[&str]; 4] = [
    &["how to", "tutorial", "guide"],
    &["use", "create", "make"],
    &["how", "work", "does"],
    &["best", "vs", "difference"],
];

/// Returns up to four questions in narrative order. Questions that fit no bucket still
/// fill any remaining slots, in their original order.
#[must_use]
pub fn organize_questions(questions: &[String]) -> Vec<String> {
    let lowered: Vec<String> = questions.iter().map(|q| q.to_lowercase()).collect();
    let mut used = vec![false; questions.len()];
    let mut ordered = Vec::with_capacity(limits::NARRATIVE_SLOTS);

    for keywords in BUCKETS {
        let hit = lowered
            .iter()
            .enumerate()
            .find(|(i, q)| !used[*i] && keywords.iter().any(|k| q.contains(k)));

        if let Some((i, _)) = hit {
            used[i] = true;
            ordered.push(questions[i].clone());
        }
    }

    for (i, question) in questions.iter().enumerate() {
        if ordered.len() >= limits::NARRATIVE_SLOTS {
            break;
        }
        if !used[i] {
            used[i] = true;
            ordered.push(question.clone());
        }
    }

    ordered
}
