pub mod api_key;
pub mod counts;
pub mod filter;
pub mod tags;
pub mod tutorial;
