pub mod audit;
pub mod catalog;
pub mod library;
pub mod question;

pub use catalog::{ExamCatalog, ExamEntry};
pub use library::{BankLibrary, BankLoadError};
pub use question::{HandwritingQuestion, Question, QuestionId};
