pub mod api_key;
pub mod category;
pub mod tag;
pub mod tutorial;
pub mod tutorial_tag;

pub use tutorial::{Difficulty, TutorialStatus};
