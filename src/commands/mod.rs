//! Command handlers for the sesterce CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod export;
mod import;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use crate::export::ExportOutcome;
pub use export::export;
pub use import::{import, ImportSummary};

/// What a command reports back to `main`: a line for the user and a summary that is logged as
/// JSON at debug level.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    summary: T,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub(crate) fn new(message: impl Into<String>, summary: T) -> Self {
        Self {
            message: message.into(),
            summary,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn summary(&self) -> &T {
        &self.summary
    }

    /// Logs the message at info level and the summary at debug level.
    pub fn print(&self) {
        info!("{}", self.message);
        match serde_json::to_string_pretty(&self.summary) {
            Ok(json) => debug!("Command output:\n\n{json}\n\n"),
            Err(e) => debug!("Unable to serialize the command output: {e}"),
        }
    }
}
