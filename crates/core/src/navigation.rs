use crate::model::{QuestionId, Quiz};

/// DOM anchor id for a question. The render layer gives each question
/// container this id so "jump to question" can scroll to it.
#[must_use]
pub fn anchor_id(question_id: QuestionId) -> String {
    format!("question-{question_id}")
}

/// Maps question ids to view positions over one quiz's display order.
///
/// Convenience only: asking about a question that is not in the quiz
/// returns `None` and is silently ignored by callers, never an error.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    quiz: &'a Quiz,
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(quiz: &'a Quiz) -> Self {
        Self { quiz }
    }

    /// One-based display number, as shown in the question index.
    #[must_use]
    pub fn display_number(&self, question_id: QuestionId) -> Option<usize> {
        self.quiz.position(question_id).map(|p| p + 1)
    }

    #[must_use]
    pub fn next(&self, question_id: QuestionId) -> Option<QuestionId> {
        let position = self.quiz.position(question_id)?;
        self.quiz.questions().get(position + 1).map(|q| q.id())
    }

    #[must_use]
    pub fn previous(&self, question_id: QuestionId) -> Option<QuestionId> {
        let position = self.quiz.position(question_id)?;
        position
            .checked_sub(1)
            .and_then(|p| self.quiz.questions().get(p))
            .map(|q| q.id())
    }

    #[must_use]
    pub fn first(&self) -> Option<QuestionId> {
        self.quiz.questions().first().map(|q| q.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionKind, QuizId};

    fn quiz() -> Quiz {
        let questions = (1..=3)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    1,
                    QuestionKind::OpenEnded,
                )
                .unwrap()
            })
            .collect();
        Quiz::new(QuizId::new(1), "Nav quiz", None, 10, questions).unwrap()
    }

    #[test]
    fn anchor_embeds_question_id() {
        assert_eq!(anchor_id(QuestionId::new(12)), "question-12");
    }

    #[test]
    fn numbering_is_one_based() {
        let quiz = quiz();
        let nav = Navigator::new(&quiz);
        assert_eq!(nav.display_number(QuestionId::new(1)), Some(1));
        assert_eq!(nav.display_number(QuestionId::new(3)), Some(3));
    }

    #[test]
    fn next_and_previous_walk_display_order() {
        let quiz = quiz();
        let nav = Navigator::new(&quiz);
        assert_eq!(nav.next(QuestionId::new(1)), Some(QuestionId::new(2)));
        assert_eq!(nav.previous(QuestionId::new(2)), Some(QuestionId::new(1)));
        assert_eq!(nav.next(QuestionId::new(3)), None);
        assert_eq!(nav.previous(QuestionId::new(1)), None);
        assert_eq!(nav.first(), Some(QuestionId::new(1)));
    }

    #[test]
    fn unknown_question_is_silently_none() {
        let quiz = quiz();
        let nav = Navigator::new(&quiz);
        assert_eq!(nav.display_number(QuestionId::new(42)), None);
        assert_eq!(nav.next(QuestionId::new(42)), None);
    }
}
