//! Terminal presentation for the library operations.

pub mod explore;
pub mod export;
pub mod overview;
pub mod series;
pub mod setup;
pub mod simulate;
pub mod ui;
