pub mod classify;
pub mod filter;
pub mod grading;
pub mod normalize;
