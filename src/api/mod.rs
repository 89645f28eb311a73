//! API endpoint handlers module

pub mod health;
pub mod languages;
pub mod run;
