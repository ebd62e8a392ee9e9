use std::collections::{BTreeMap, BTreeSet};

use crate::model::ids::{OptionId, QuestionId};

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// The student's response payload for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// A selected option of a choice-based question.
    Choice(OptionId),
    /// Free text for open-ended and fill-in-blank questions.
    Text(String),
}

/// One recorded answer. At most one exists per question; every edit
/// replaces the previous value (last write wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    question_id: QuestionId,
    value: AnswerValue,
    time_spent_secs: u32,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, value: AnswerValue, time_spent_secs: u32) -> Self {
        Self {
            question_id,
            value,
            time_spent_secs,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn value(&self) -> &AnswerValue {
        &self.value
    }

    /// Advisory only; never used for enforcement.
    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }
}

//
// ─── ANSWER STORE ──────────────────────────────────────────────────────────────
//

/// Holds the in-progress answer per question.
///
/// Keyed map with overwrite semantics; individual answers are never
/// deleted, the whole collection is cleared only on session reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: BTreeMap<QuestionId, Answer>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, replacing any prior answer for the question.
    pub fn insert(&mut self, answer: Answer) {
        self.answers.insert(answer.question_id(), answer);
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.contains_key(&question_id)
    }

    /// Number of distinct questions answered so far.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn answered_ids(&self) -> BTreeSet<QuestionId> {
        self.answers.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

//
// ─── FLAG TRACKER ──────────────────────────────────────────────────────────────
//

/// Set of questions the student marked "review later".
///
/// Pure presence/absence, independent of answer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTracker {
    flags: BTreeSet<QuestionId>,
}

impl FlagTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership and returns the new state.
    pub fn toggle(&mut self, question_id: QuestionId) -> bool {
        if self.flags.remove(&question_id) {
            false
        } else {
            self.flags.insert(question_id);
            true
        }
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.flags.contains(&question_id)
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.flags.iter().copied()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn text_answer(question: u64, text: &str) -> Answer {
        Answer::new(
            QuestionId::new(question),
            AnswerValue::Text(text.to_string()),
            0,
        )
    }

    #[test]
    fn overwrite_keeps_last_value() {
        let mut store = AnswerStore::new();
        store.insert(text_answer(1, "first"));
        store.insert(text_answer(1, "second"));

        let stored = store.get(QuestionId::new(1)).unwrap();
        assert_eq!(stored.value(), &AnswerValue::Text("second".to_string()));
        assert_eq!(store.answered_count(), 1);
    }

    #[test]
    fn answered_count_counts_questions_not_edits() {
        let mut store = AnswerStore::new();
        store.insert(text_answer(1, "a"));
        store.insert(text_answer(2, "b"));
        store.insert(text_answer(1, "c"));
        assert_eq!(store.answered_count(), 2);
        assert_eq!(
            store.answered_ids(),
            BTreeSet::from([QuestionId::new(1), QuestionId::new(2)])
        );
    }

    #[test]
    fn unanswered_question_is_absent() {
        let store = AnswerStore::new();
        assert!(store.get(QuestionId::new(5)).is_none());
        assert!(!store.is_answered(QuestionId::new(5)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = AnswerStore::new();
        store.insert(text_answer(1, "a"));
        store.clear();
        assert_eq!(store.answered_count(), 0);
    }

    #[test]
    fn toggle_twice_is_involution() {
        let mut flags = FlagTracker::new();
        let q = QuestionId::new(3);

        assert!(!flags.is_flagged(q));
        assert!(flags.toggle(q));
        assert!(flags.is_flagged(q));
        assert!(!flags.toggle(q));
        assert!(!flags.is_flagged(q));
    }

    #[test]
    fn flags_are_independent_of_answers() {
        let mut flags = FlagTracker::new();
        flags.toggle(QuestionId::new(1));
        flags.toggle(QuestionId::new(2));
        assert_eq!(flags.flagged_count(), 2);
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![QuestionId::new(1), QuestionId::new(2)]
        );
    }
}
