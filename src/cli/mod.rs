//! Terminal presentation for the `valtrack` commands

pub mod portfolio;
pub mod quote;
pub mod search;
pub mod setup;
pub mod ui;
