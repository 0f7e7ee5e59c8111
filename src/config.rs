//! Configuration for the two pipelines.
//!
//! Each pipeline receives its own configuration object. They are built from the command line
//! arguments (which fall back to environment variables, see `args`) and validated once at
//! construction so the pipelines never read the environment themselves.

use crate::args::{ExportArgs, ImportArgs};
use crate::Result;
use anyhow::{anyhow, ensure, Context};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub(crate) const DEFAULT_BASE_URL: &str = "https://app.sesterce.io";
pub(crate) const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// How long to wait for the password field and for the export controls to appear.
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to keep the browser open after clicking export so the download can start.
const DOWNLOAD_PAUSE: Duration = Duration::from_secs(1);

/// Configuration for `sesterce export`.
#[derive(Clone)]
pub struct ExportConfig {
    group_id: String,
    group_url: Url,
    password: String,
    webdriver_url: String,
    headless: bool,
    download_dir: Option<PathBuf>,
    export_label: Option<String>,
    element_timeout: Duration,
    download_pause: Duration,
}

impl ExportConfig {
    /// Creates the configuration for the group `group_id`, whose share page lives at
    /// `{base_url}/groups/{group_id}/share`.
    ///
    /// # Errors
    /// - Returns an error if `group_id` or `password` is empty.
    /// - Returns an error if `base_url` cannot be parsed or cannot hold a path.
    pub fn new(base_url: &str, group_id: &str, password: impl Into<String>) -> Result<Self> {
        let password = password.into();
        ensure!(!group_id.trim().is_empty(), "The group id must not be empty");
        ensure!(!password.is_empty(), "The group password must not be empty");
        let group_url = group_url(base_url, group_id)?;
        Ok(Self {
            group_id: group_id.to_string(),
            group_url,
            password,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            download_dir: None,
            export_label: None,
            element_timeout: ELEMENT_TIMEOUT,
            download_pause: DOWNLOAD_PAUSE,
        })
    }

    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.webdriver_url = webdriver_url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_download_dir(mut self, download_dir: Option<PathBuf>) -> Self {
        self.download_dir = download_dir;
        self
    }

    /// When set, the export control is looked up by its visible text instead of its position.
    pub fn with_export_label(mut self, export_label: Option<String>) -> Self {
        self.export_label = export_label.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_download_pause(mut self, download_pause: Duration) -> Self {
        self.download_pause = download_pause;
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn group_url(&self) -> &Url {
        &self.group_url
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn download_dir(&self) -> Option<&Path> {
        self.download_dir.as_deref()
    }

    pub fn export_label(&self) -> Option<&str> {
        self.export_label.as_deref()
    }

    pub fn element_timeout(&self) -> Duration {
        self.element_timeout
    }

    pub fn download_pause(&self) -> Duration {
        self.download_pause
    }
}

impl Debug for ExportConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("group_id", &self.group_id)
            .field("group_url", &self.group_url.as_str())
            .field("password", &"<redacted>")
            .field("webdriver_url", &self.webdriver_url)
            .field("headless", &self.headless)
            .field("download_dir", &self.download_dir)
            .field("export_label", &self.export_label)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&ExportArgs> for ExportConfig {
    type Error = crate::Error;

    fn try_from(args: &ExportArgs) -> Result<Self> {
        Ok(
            ExportConfig::new(args.base_url(), args.group_id(), args.group_password())?
                .with_webdriver_url(args.webdriver_url())
                .with_headless(!args.headed())
                .with_download_dir(args.download_dir().map(Path::to_path_buf))
                .with_export_label(args.export_label().map(str::to_string)),
        )
    }
}

/// Configuration for `sesterce import`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ImportConfig {
    spreadsheet_id: String,
    service_account_path: PathBuf,
    csv_path: PathBuf,
}

impl ImportConfig {
    /// # Errors
    /// Returns an error if `spreadsheet_id` is empty.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        service_account_path: impl Into<PathBuf>,
        csv_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        ensure!(
            !spreadsheet_id.trim().is_empty(),
            "The spreadsheet id must not be empty"
        );
        Ok(Self {
            spreadsheet_id,
            service_account_path: service_account_path.into(),
            csv_path: csv_path.into(),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// The Google service account key file used to authenticate with the Sheets API.
    pub fn service_account_path(&self) -> &Path {
        &self.service_account_path
    }

    /// The Sesterce CSV export to import.
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl TryFrom<&ImportArgs> for ImportConfig {
    type Error = crate::Error;

    fn try_from(args: &ImportArgs) -> Result<Self> {
        ImportConfig::new(
            args.spreadsheet_id(),
            args.service_account_file(),
            args.csv_file(),
        )
    }
}

/// Builds `{base_url}/groups/{group_id}/share`, percent-encoding the group id as a single path
/// segment.
fn group_url(base_url: &str, group_id: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid Sesterce base URL '{base_url}'"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("The Sesterce base URL '{base_url}' cannot hold a path"))?
        .pop_if_empty()
        .extend(["groups", group_id.trim(), "share"]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_group_url_default_base() {
        let config = ExportConfig::new(DEFAULT_BASE_URL, "abc123", "secret").unwrap();
        assert_eq!(
            config.group_url().as_str(),
            "https://app.sesterce.io/groups/abc123/share"
        );
    }

    #[test]
    fn test_group_url_base_with_trailing_slash_and_path() {
        let url = group_url("https://staging.example.com/app/", "g1").unwrap();
        assert_eq!(url.as_str(), "https://staging.example.com/app/groups/g1/share");
    }

    #[test]
    fn test_group_url_encodes_group_id() {
        let url = group_url(DEFAULT_BASE_URL, "a/b c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://app.sesterce.io/groups/a%2Fb%20c/share"
        );
    }

    #[test]
    fn test_group_url_invalid_base() {
        assert!(group_url("not a url", "g1").is_err());
        assert!(group_url("mailto:someone@example.com", "g1").is_err());
    }

    #[test]
    fn test_export_config_rejects_empty_values() {
        assert!(ExportConfig::new(DEFAULT_BASE_URL, " ", "secret").is_err());
        assert!(ExportConfig::new(DEFAULT_BASE_URL, "g1", "").is_err());
    }

    #[test]
    fn test_export_config_defaults() {
        let config = ExportConfig::new(DEFAULT_BASE_URL, "g1", "secret").unwrap();
        assert_eq!(config.webdriver_url(), DEFAULT_WEBDRIVER_URL);
        assert!(config.headless());
        assert!(config.download_dir().is_none());
        assert!(config.export_label().is_none());
        assert_eq!(config.element_timeout(), Duration::from_secs(5));
        assert_eq!(config.download_pause(), Duration::from_secs(1));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ExportConfig::new(DEFAULT_BASE_URL, "g1", "hunter2").unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("g1"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_blank_export_label_is_ignored() {
        let config = ExportConfig::new(DEFAULT_BASE_URL, "g1", "secret")
            .unwrap()
            .with_export_label(Some("  ".to_string()));
        assert!(config.export_label().is_none());
    }

    #[test]
    fn test_export_config_from_args() {
        let args = ExportArgs::try_parse_from([
            "export",
            "--group-id",
            "g42",
            "--group-password",
            "pw",
            "--webdriver-url",
            "http://localhost:4444",
            "--headed",
            "--download-dir",
            "/tmp/downloads",
            "--export-label",
            "Exportar datos",
        ])
        .unwrap();
        let config = ExportConfig::try_from(&args).unwrap();
        assert_eq!(
            config.group_url().as_str(),
            "https://app.sesterce.io/groups/g42/share"
        );
        assert_eq!(config.password(), "pw");
        assert_eq!(config.webdriver_url(), "http://localhost:4444");
        assert!(!config.headless());
        assert_eq!(config.download_dir(), Some(Path::new("/tmp/downloads")));
        assert_eq!(config.export_label(), Some("Exportar datos"));
    }

    #[test]
    fn test_import_config() {
        let config = ImportConfig::new("sheet-1", "sa.json", "export.csv").unwrap();
        assert_eq!(config.spreadsheet_id(), "sheet-1");
        assert_eq!(config.service_account_path(), Path::new("sa.json"));
        assert_eq!(config.csv_path(), Path::new("export.csv"));
        assert!(ImportConfig::new("", "sa.json", "export.csv").is_err());
    }

    #[test]
    fn test_import_config_from_args() {
        let args = ImportArgs::try_parse_from([
            "import",
            "--spreadsheet-id",
            "sheet-9",
            "--service-account-file",
            "/secrets/sa.json",
            "--csv-file",
            "/data/export.csv",
        ])
        .unwrap();
        let config = ImportConfig::try_from(&args).unwrap();
        assert_eq!(config.spreadsheet_id(), "sheet-9");
        assert_eq!(config.csv_path(), Path::new("/data/export.csv"));
        assert!(!args.dry_run());
    }
}
