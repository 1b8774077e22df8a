pub mod filter_panel;
pub mod handwriting_card;
pub mod menu;
pub mod question_card;
