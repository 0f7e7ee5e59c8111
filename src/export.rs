//! Drives the Sesterce group share page to trigger its CSV export.
//!
//! The browser is behind the `GroupPage` trait. `WebDriverPage` implements it with fantoccini
//! against a WebDriver server such as chromedriver.

use crate::{ExportConfig, Result};
use anyhow::{bail, Context};
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// The `id` of the password input on the share page.
const PASSWORD_FIELD_ID: &str = "password";

/// Matches the full-width arrow buttons on the share page. The page shows two of them: "Enviar un
/// resumen" followed by "Exportar datos".
const CONTROLS_SELECTOR: &str = "button.ses-button--full-width.ses-button-arrow";

/// The position of the export button among the matched controls when no label is configured.
const EXPORT_CONTROL_INDEX: usize = 1;

/// The browser operations needed to trigger the export.
#[async_trait::async_trait]
pub(crate) trait GroupPage: Send {
    /// Navigates to `url`.
    async fn open(&mut self, url: &Url) -> Result<()>;

    /// Waits up to `timeout` for the input with id `field_id`, types `password` and presses Enter.
    async fn submit_password(
        &mut self,
        field_id: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Waits up to `timeout` for at least one element matching `selector` and returns the text of
    /// every match, in document order.
    async fn controls(&mut self, selector: &str, timeout: Duration) -> Result<Vec<String>>;

    /// Clicks the control at `index` in the list last returned by `controls`.
    async fn click_control(&mut self, index: usize) -> Result<()>;

    /// Ends the browser session.
    async fn close(&mut self) -> Result<()>;
}

/// What happened on the share page.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ExportOutcome {
    /// The export control was clicked.
    Triggered { label: String },
    /// The export control could not be identified among the matched controls.
    ControlNotFound { found: usize },
    /// Driving the page failed, e.g. an element did not appear in time.
    Failed { reason: String },
}

/// Runs the export sequence on `page` and always closes it afterwards.
///
/// Failures while driving the page are logged and reported as `ExportOutcome::Failed` instead of
/// being returned as errors.
pub(crate) async fn export_group(
    config: &ExportConfig,
    page: &mut (dyn GroupPage + Send),
) -> ExportOutcome {
    let outcome = match drive(config, page).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Export control not found or failed to click: {e:#}");
            ExportOutcome::Failed {
                reason: format!("{e:#}"),
            }
        }
    };
    if let Err(e) = page.close().await {
        warn!("Unable to close the browser session: {e:#}");
    }
    outcome
}

async fn drive(config: &ExportConfig, page: &mut (dyn GroupPage + Send)) -> Result<ExportOutcome> {
    info!("Opening {}", config.group_url());
    page.open(config.group_url()).await?;

    page.submit_password(
        PASSWORD_FIELD_ID,
        config.password(),
        config.element_timeout(),
    )
    .await
    .context("Unable to submit the group password")?;

    let labels = page
        .controls(CONTROLS_SELECTOR, config.element_timeout())
        .await
        .context("Unable to find the export controls")?;
    debug!("Found controls {labels:?}");

    let index = match select_export_control(&labels, config.export_label()) {
        Some(index) => index,
        None => {
            error!(
                "Export button not found among {} controls {labels:?}",
                labels.len()
            );
            return Ok(ExportOutcome::ControlNotFound {
                found: labels.len(),
            });
        }
    };

    page.click_control(index).await?;
    tokio::time::sleep(config.download_pause()).await;
    info!("The CSV export has been triggered");
    Ok(ExportOutcome::Triggered {
        label: labels[index].trim().to_string(),
    })
}

/// Picks the export control: the first whose text is `label` when one is given, otherwise the
/// second control.
fn select_export_control(labels: &[String], label: Option<&str>) -> Option<usize> {
    match label {
        Some(label) => labels.iter().position(|l| l.trim() == label.trim()),
        None => (labels.len() > EXPORT_CONTROL_INDEX).then_some(EXPORT_CONTROL_INDEX),
    }
}

/// A `GroupPage` backed by a WebDriver session.
pub(crate) struct WebDriverPage {
    client: Client,
    controls: Vec<Element>,
}

impl WebDriverPage {
    /// Starts a Chrome session through the WebDriver server configured in `config`.
    pub(crate) async fn connect(config: &ExportConfig) -> Result<Self> {
        debug!("Connecting to WebDriver at {}", config.webdriver_url());
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(config))
            .connect(config.webdriver_url())
            .await
            .with_context(|| {
                format!(
                    "Unable to start a browser session through {}. Is chromedriver running?",
                    config.webdriver_url()
                )
            })?;
        Ok(Self {
            client,
            controls: Vec::new(),
        })
    }
}

#[async_trait::async_trait]
impl GroupPage for WebDriverPage {
    async fn open(&mut self, url: &Url) -> Result<()> {
        self.client
            .goto(url.as_str())
            .await
            .with_context(|| format!("Unable to open {url}"))
    }

    async fn submit_password(
        &mut self,
        field_id: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<()> {
        let field = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Id(field_id))
            .await
            .with_context(|| format!("The '{field_id}' field did not appear"))?;
        field.send_keys(password).await?;
        let enter: char = Key::Enter.into();
        field.send_keys(&enter.to_string()).await?;
        Ok(())
    }

    async fn controls(&mut self, selector: &str, timeout: Duration) -> Result<Vec<String>> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .with_context(|| format!("No element matching '{selector}' appeared"))?;
        self.controls = self.client.find_all(Locator::Css(selector)).await?;

        let mut labels = Vec::with_capacity(self.controls.len());
        for control in &self.controls {
            labels.push(control.text().await?);
        }
        Ok(labels)
    }

    async fn click_control(&mut self, index: usize) -> Result<()> {
        let Some(control) = self.controls.get(index) else {
            bail!(
                "There is no control at position {index}, only {} were found",
                self.controls.len()
            );
        };
        control.click().await.context("Unable to click the export button")?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.controls.clear();
        self.client.clone().close().await?;
        Ok(())
    }
}

/// Chrome options: headless unless asked otherwise, and the download directory if one is set.
fn chrome_capabilities(config: &ExportConfig) -> Map<String, Value> {
    let mut options = Map::new();
    if config.headless() {
        options.insert("args".to_string(), json!(["--headless"]));
    }
    if let Some(dir) = config.download_dir() {
        options.insert(
            "prefs".to_string(),
            json!({
                "download.default_directory": dir.display().to_string(),
                "download.prompt_for_download": false,
            }),
        );
    }
    let mut capabilities = Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), Value::Object(options));
    capabilities
}
