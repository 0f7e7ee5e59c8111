//! These structs provide the CLI interface for the sesterce CLI.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_WEBDRIVER_URL};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// sesterce: Move your Sesterce group expenses into a Google sheet.
///
/// The purpose of this program is to automate two chores. `sesterce export` logs into your
/// Sesterce group's share page with a browser and clicks its export button so that the group's
/// expenses are downloaded as CSV. `sesterce import` reads that CSV and replaces the contents of
/// the Expenses and Incomes tabs of your Google sheet with it.
///
/// Every option can also be supplied through an environment variable, and a `.env` file in the
/// current directory is loaded before the arguments are parsed.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log into the Sesterce group page and trigger its CSV export.
    ///
    /// This needs a WebDriver server, such as chromedriver, to be running and reachable at
    /// --webdriver-url. Chrome is started headless unless you pass --headed. Failures while
    /// driving the page are logged and do not change the exit status.
    Export(ExportArgs),
    /// Import a Sesterce CSV export into the Expenses and Incomes tabs of a Google sheet.
    ///
    /// Both tabs are cleared from row 2 downward and then the rows from the CSV are appended, so
    /// each run fully replaces the previous import. If the CSV file does not exist, nothing in
    /// the sheet is touched.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// Where the Sesterce group lives and how the browser is driven.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The id of your Sesterce group, as found in its share link.
    #[arg(long, env = "SESTERCE_GROUP_ID")]
    group_id: String,

    /// The password protecting the group's share page.
    #[arg(long, env = "SESTERCE_GROUP_PASSWORD", hide_env_values = true)]
    group_password: String,

    /// The Sesterce web app address.
    #[arg(long, env = "SESTERCE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// The address of the WebDriver server that controls the browser.
    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    headed: bool,

    /// Where the browser should save the downloaded CSV. Defaults to the browser's own setting.
    #[arg(long, env = "SESTERCE_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Find the export button by its text, e.g. "Exportar datos". When omitted, the second
    /// button on the page is used.
    #[arg(long, env = "SESTERCE_EXPORT_LABEL")]
    export_label: Option<String>,
}

impl ExportArgs {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn group_password(&self) -> &str {
        &self.group_password
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    pub fn headed(&self) -> bool {
        self.headed
    }

    pub fn download_dir(&self) -> Option<&Path> {
        self.download_dir.as_deref()
    }

    pub fn export_label(&self) -> Option<&str> {
        self.export_label.as_deref()
    }
}

/// Which sheet to write, how to authenticate, and which CSV to read.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The id of the Google sheet, the long token in its URL:
    /// https://docs.google.com/spreadsheets/d/<SPREADSHEET_ID>/edit
    #[arg(long, env = "SPREADSHEET_ID")]
    spreadsheet_id: String,

    /// The path to the Google service account key file. The service account needs edit access to
    /// the sheet.
    #[arg(long, env = "SERVICE_ACCOUNT_FILE")]
    service_account_file: PathBuf,

    /// The path to the CSV file produced by `sesterce export`.
    #[arg(long, env = "CSV_FILE_PATH")]
    csv_file: PathBuf,

    /// Read and classify the CSV without touching the sheet.
    #[arg(long)]
    dry_run: bool,
}

impl ImportArgs {
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn service_account_file(&self) -> &Path {
        &self.service_account_file
    }

    pub fn csv_file(&self) -> &Path {
        &self.csv_file
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import() {
        let args = Args::try_parse_from([
            "sesterce",
            "--log-level",
            "debug",
            "import",
            "--spreadsheet-id",
            "abc",
            "--service-account-file",
            "sa.json",
            "--csv-file",
            "export.csv",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Import(import) => {
                assert_eq!(import.spreadsheet_id(), "abc");
                assert_eq!(import.csv_file(), Path::new("export.csv"));
                assert!(import.dry_run());
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_defaults() {
        let args = Args::try_parse_from([
            "sesterce",
            "export",
            "--group-id",
            "g1",
            "--group-password",
            "pw",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        match args.command() {
            Command::Export(export) => {
                assert_eq!(export.group_id(), "g1");
                assert_eq!(export.base_url(), DEFAULT_BASE_URL);
                assert_eq!(export.webdriver_url(), DEFAULT_WEBDRIVER_URL);
                assert!(!export.headed());
            }
            other => panic!("expected export, got {other:?}"),
        }
    }
}
