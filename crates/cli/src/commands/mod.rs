//! Command implementations.

pub mod payments;
pub mod products;
pub mod requests;
pub mod reviews;
pub mod upcoming;
pub mod users;

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use shopease_client::ApiError;
use shopease_client::config::ConfigError;
use shopease_core::{PageError, PageRequest};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Invalid page: {0}")]
    Page(#[from] PageError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paging flags shared by list commands.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page
    #[arg(long, default_value_t = PageRequest::DEFAULT_LIMIT)]
    pub limit: u32,
}

impl PageArgs {
    pub fn request(self) -> Result<PageRequest, CliError> {
        Ok(PageRequest::new(self.page, self.limit)?)
    }
}

/// Write `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
