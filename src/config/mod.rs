//! JSON configs for the command-line tools.
pub mod card;
pub mod series;
