//! hdp: Houston Development Data Pipeline
//!
//! Imports Houston real-estate CSV exports (developers, projects,
//! properties, permits, market data, neighborhood data) into a SQLite
//! store and audits the quality of what landed there.

pub mod audit;
pub mod cli;
pub mod core;
pub mod entities;
pub mod import;
