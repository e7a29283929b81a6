pub mod admin;
pub mod catalog;
pub mod category;
pub mod problem;
pub mod tag;
