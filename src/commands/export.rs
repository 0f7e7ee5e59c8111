use crate::commands::Out;
use crate::export::{export_group, ExportOutcome, WebDriverPage};
use crate::{ExportConfig, Result};

/// Handles the `sesterce export` command.
///
/// Opens a browser session, logs into the group's share page and clicks its export button. Only
/// a failure to start the browser session is returned as an error; anything that goes wrong on
/// the page itself is logged and reported in the returned `ExportOutcome`.
pub async fn export(config: ExportConfig) -> Result<Out<ExportOutcome>> {
    let mut page = WebDriverPage::connect(&config).await?;
    let outcome = export_group(&config, &mut page).await;
    Ok(Out::new(message(&config, &outcome), outcome))
}

fn message(config: &ExportConfig, outcome: &ExportOutcome) -> String {
    match outcome {
        ExportOutcome::Triggered { .. } => format!(
            "The CSV export for group {} has been triggered",
            config.group_id()
        ),
        ExportOutcome::ControlNotFound { found } => format!(
            "The CSV export for group {} was not triggered, the export button was not among the \
            {found} buttons found",
            config.group_id()
        ),
        ExportOutcome::Failed { .. } => format!(
            "The CSV export for group {} was not triggered",
            config.group_id()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    #[test]
    fn test_message() {
        let config = ExportConfig::new(DEFAULT_BASE_URL, "g7", "pw").unwrap();
        let triggered = ExportOutcome::Triggered {
            label: "Exportar datos".to_string(),
        };
        assert_eq!(
            message(&config, &triggered),
            "The CSV export for group g7 has been triggered"
        );
        let missing = ExportOutcome::ControlNotFound { found: 1 };
        assert!(message(&config, &missing).contains("1 buttons found"));
    }

    #[tokio::test]
    async fn test_export_without_webdriver() {
        // Nothing listens on port 9 (discard), so the session cannot be created.
        let config = ExportConfig::new(DEFAULT_BASE_URL, "g7", "pw")
            .unwrap()
            .with_webdriver_url("http://127.0.0.1:9");
        let err = export(config).await.unwrap_err();
        assert!(err.to_string().contains("Unable to start a browser session"));
    }
}
