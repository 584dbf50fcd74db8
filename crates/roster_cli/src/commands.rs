pub mod config;
pub mod roster;
