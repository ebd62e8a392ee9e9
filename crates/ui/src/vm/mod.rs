mod exam_vm;
mod time_fmt;

pub use exam_vm::{ExamIntent, ExamVm, QuestionRowVm, start_exam};
pub use time_fmt::format_datetime;
