//! Command implementations

pub mod audit;
pub mod completions;
pub mod import;
pub mod init;
pub mod status;
