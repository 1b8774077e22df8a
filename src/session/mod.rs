pub mod context;
pub mod handwriting;
pub mod navigator;
pub mod practice;

pub use navigator::{NavigationError, Navigator, Screen};
pub use practice::{AnswerOutcome, FavoriteOutcome, PracticeError, SaveStatus};
