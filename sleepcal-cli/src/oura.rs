//! Client for the Oura v2 sleep endpoint.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use sleepcal_core::date_range::DateRange;
use tracing::debug;
use url::Url;

const SLEEP_PATH: &str = "v2/usercollection/sleep";

/// One page of the sleep collection
#[derive(Debug, Deserialize)]
struct SleepPage {
    #[serde(default)]
    data: Vec<Value>,
    next_token: Option<String>,
}

pub struct OuraClient {
    http: reqwest::Client,
    sleep_url: Url,
    token: String,
}

impl OuraClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("Invalid Oura API URL: {}", base_url))?;
        let sleep_url = base
            .join(SLEEP_PATH)
            .with_context(|| format!("Invalid Oura API URL: {}", base_url))?;

        Ok(OuraClient {
            http: reqwest::Client::new(),
            sleep_url,
            token: token.to_string(),
        })
    }

    /// Fetch every sleep session in `range`, following pagination.
    ///
    /// Sessions are returned as raw JSON so a single odd record can be skipped
    /// later instead of failing the whole fetch.
    pub async fn fetch_sleep(&self, range: &DateRange) -> Result<Vec<Value>> {
        let mut sessions = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();

        loop {
            let mut request = self
                .http
                .get(self.sleep_url.clone())
                .bearer_auth(&self.token)
                .query(&[
                    ("start_date", range.start_param()),
                    ("end_date", range.end_param()),
                ]);
            if let Some(ref token) = next_token {
                request = request.query(&[("next_token", token)]);
            }

            let response = request
                .send()
                .await
                .context("Failed to reach the Oura API")?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                bail!(
                    "Oura API rejected the access token ({}). Check oura_token in your config or OURA_TOKEN.",
                    status
                );
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                bail!("Oura API returned {}: {}", status, body);
            }

            let page: SleepPage = response
                .json()
                .await
                .context("Failed to parse Oura API response")?;
            debug!(
                records = page.data.len(),
                has_more = page.next_token.as_deref().is_some_and(|t| !t.is_empty()),
                "Fetched sleep page"
            );
            sessions.extend(page.data);

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        bail!("Oura API returned next_token '{}' twice, stopping", token);
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(sessions)
    }
}
