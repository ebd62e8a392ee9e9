use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("time limit must be between 1 minute and 24 hours")]
    InvalidTimeLimit,

    #[error("duplicate question id {id}")]
    DuplicateQuestionId { id: QuestionId },

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("choice question {id} needs at least two options")]
    TooFewOptions { id: QuestionId },

    #[error("true/false question {id} must have exactly two options")]
    NotBinary { id: QuestionId },

    #[error("duplicate option id {option} on question {id}")]
    DuplicateOptionId { id: QuestionId, option: OptionId },

    #[error("option text cannot be empty")]
    EmptyOptionText,
}

//
// ─── OPTIONS & QUESTION KINDS ──────────────────────────────────────────────────
//

/// One selectable answer of a choice-based question.
///
/// Whether an option is the correct one is a backend concern; the
/// client never carries correctness flags (scoring happens server-side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    id: OptionId,
    text: String,
}

impl ChoiceOption {
    /// # Errors
    ///
    /// Returns `QuizError::EmptyOptionText` for blank display text.
    pub fn new(id: OptionId, text: impl Into<String>) -> Result<Self, QuizError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::EmptyOptionText);
        }
        Ok(Self { id, text })
    }

    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The shape of a question, carrying only the fields valid for that shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Single-select multiple choice; two or more options.
    SingleChoice { options: Vec<ChoiceOption> },
    /// True/false; exactly two options.
    TrueFalse { options: Vec<ChoiceOption> },
    /// Free-form long answer typed into a text area.
    OpenEnded,
    /// Short single-line answer completing a blank.
    FillInBlank,
}

impl QuestionKind {
    /// Options for choice-based kinds, `None` for free-text kinds.
    #[must_use]
    pub fn options(&self) -> Option<&[ChoiceOption]> {
        match self {
            Self::SingleChoice { options } | Self::TrueFalse { options } => Some(options),
            Self::OpenEnded | Self::FillInBlank => None,
        }
    }

    #[must_use]
    pub fn is_choice_based(&self) -> bool {
        self.options().is_some()
    }

    /// Short human label used by list views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SingleChoice { .. } => "Multiple choice",
            Self::TrueFalse { .. } => "True / False",
            Self::OpenEnded => "Open answer",
            Self::FillInBlank => "Fill in the blank",
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    points: u32,
    kind: QuestionKind,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuizError` when the prompt is blank, a choice kind has
    /// too few options, or option ids collide.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        points: u32,
        kind: QuestionKind,
    ) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt);
        }

        match &kind {
            QuestionKind::SingleChoice { options } => {
                if options.len() < 2 {
                    return Err(QuizError::TooFewOptions { id });
                }
                check_unique_options(id, options)?;
            }
            QuestionKind::TrueFalse { options } => {
                if options.len() != 2 {
                    return Err(QuizError::NotBinary { id });
                }
                check_unique_options(id, options)?;
            }
            QuestionKind::OpenEnded | QuestionKind::FillInBlank => {}
        }

        Ok(Self {
            id,
            prompt,
            points,
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    /// True when `option` is one of this question's options.
    #[must_use]
    pub fn has_option(&self, option: OptionId) -> bool {
        self.kind
            .options()
            .is_some_and(|options| options.iter().any(|o| o.id() == option))
    }
}

fn check_unique_options(id: QuestionId, options: &[ChoiceOption]) -> Result<(), QuizError> {
    for (index, option) in options.iter().enumerate() {
        if options[..index].iter().any(|o| o.id() == option.id()) {
            return Err(QuizError::DuplicateOptionId {
                id,
                option: option.id(),
            });
        }
    }
    Ok(())
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Static quiz definition. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: Option<String>,
    time_limit_minutes: u32,
    questions: Vec<Question>,
}

impl Quiz {
    /// Longest accepted time limit. Keeps `time_limit_secs` well away
    /// from `u32` overflow even on a corrupt payload.
    pub const MAX_TIME_LIMIT_MINUTES: u32 = 24 * 60;

    /// # Errors
    ///
    /// Returns `QuizError` for a blank title, a time limit outside
    /// 1..=24h, an empty question list, or duplicate question ids.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: Option<String>,
        time_limit_minutes: u32,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if time_limit_minutes == 0 || time_limit_minutes > Self::MAX_TIME_LIMIT_MINUTES {
            return Err(QuizError::InvalidTimeLimit);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            if questions[..index].iter().any(|q| q.id() == question.id()) {
                return Err(QuizError::DuplicateQuestionId { id: question.id() });
            }
        }

        Ok(Self {
            id,
            title,
            description,
            time_limit_minutes,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes * 60
    }

    /// Questions in display order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Sum of per-question point values.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(Question::points).sum()
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Zero-based display position of a question.
    #[must_use]
    pub fn position(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.position(id).is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
