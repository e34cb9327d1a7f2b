//! Core module - workspace, configuration, CSV reading and storage

pub mod config;
pub mod normalize;
pub mod reader;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use store::DataStore;
pub use workspace::{Workspace, WorkspaceError};
