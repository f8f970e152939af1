pub mod artifact;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod process;
pub mod upload;
pub mod version;

pub use error::{BakeError, Result};
