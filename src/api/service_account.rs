//! Google service account authentication.
//!
//! The import runs unattended, so instead of an interactive OAuth consent flow it exchanges a
//! service account key for an access token. yup-oauth2 signs the JWT assertion and talks to the
//! token endpoint.

use crate::api::SHEETS_SCOPES;
use crate::Result;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Reads the service account key at `key_path` and returns an access token for the Sheets API.
///
/// # Errors
/// Returns an error if the key file is missing or malformed, or if Google rejects the assertion.
pub(super) async fn access_token(key_path: &Path) -> Result<String> {
    debug!("Loading service account key from {}", key_path.display());
    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read the service account key from {}",
                key_path.display()
            )
        })?;
    let client_email = key.client_email.clone();

    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .context("Failed to create the service account authenticator")?;

    let token = auth
        .token(SHEETS_SCOPES)
        .await
        .with_context(|| format!("Failed to obtain an access token for {client_email}"))?;

    debug!("Authenticated as {client_email}");
    token
        .token()
        .map(str::to_string)
        .context("The token response did not contain an access token")
}
