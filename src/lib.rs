pub mod cards;
pub mod cli;
pub mod data;
pub mod deck;
pub mod error;
pub mod optimizer;
pub mod parallel;
pub mod sim;
pub mod skills;

pub use error::DeckError;
