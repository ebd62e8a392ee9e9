mod answer;
mod ids;
mod quiz;

pub use answer::{Answer, AnswerStore, AnswerValue, FlagTracker};
pub use ids::{AttemptId, OptionId, ParseIdError, QuestionId, QuizId};
pub use quiz::{ChoiceOption, Question, QuestionKind, Quiz, QuizError};
