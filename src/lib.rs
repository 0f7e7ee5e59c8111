mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
mod export;
mod model;

pub use api::Mode;
pub use config::{ExportConfig, ImportConfig};
pub use error::Error;
pub use error::Result;
pub use model::{Amount, AmountError, DateFormatError};
