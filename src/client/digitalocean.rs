//! DigitalOcean REST API client.

use super::{InventoryClient, select_instances};
use crate::core::{CleanerError, PrefixMatcher, RemoteInstance, Result};
use crate::version::AppVersion;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// Largest page size the droplets endpoint accepts.
const PER_PAGE: u32 = 200;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const STOP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct DropletsPage {
    #[serde(default)]
    droplets: Vec<DropletRecord>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

/// Droplet as returned by the API. `created_at` stays raw so a single bad
/// timestamp cannot fail the whole page.
#[derive(Debug, Deserialize)]
struct DropletRecord {
    id: u64,
    name: String,
    #[serde(default)]
    created_at: String,
}

impl DropletRecord {
    /// Converts a droplet whose name matches `matcher`.
    ///
    /// A droplet with an unreadable creation time has no known age: it is
    /// never old enough for an aged listing, but still counts as existing in
    /// the full listing so its machine folder is not taken for a zombie.
    fn into_instance(
        self,
        matcher: &PrefixMatcher,
        min_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<RemoteInstance> {
        if !matcher.is_match(&self.name) {
            return None;
        }

        match DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(created_at) => Some(RemoteInstance::new(
                self.id,
                self.name,
                created_at.with_timezone(&Utc),
            )),
            Err(err) => {
                warn!(
                    droplet = %self.name,
                    created_at = %self.created_at,
                    "Unable to parse droplet creation time: {}", err
                );
                min_age
                    .is_zero()
                    .then(|| RemoteInstance::new(self.id, self.name, now))
            }
        }
    }
}

impl DropletsPage {
    fn has_next(&self) -> bool {
        self.links
            .pages
            .as_ref()
            .and_then(|pages| pages.next.as_ref())
            .is_some()
    }
}

pub struct DigitalOceanClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl DigitalOceanClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Creates a client against a custom API endpoint.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CleanerError::Config(
                "Missing DigitalOcean API Token".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(AppVersion::current().user_agent())
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_page(&self, page: u32) -> Result<DropletsPage> {
        let url = format!("{}/v2/droplets", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("page", page), ("per_page", PER_PAGE)])
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json::<DropletsPage>().await?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CleanerError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl InventoryClient for DigitalOceanClient {
    #[instrument(skip(self, matcher))]
    async fn list(&self, matcher: &PrefixMatcher, min_age: Duration) -> Result<Vec<RemoteInstance>> {
        let mut selected = Vec::new();
        let mut page = 1;

        loop {
            let droplets_page = self.list_page(page).await?;
            let has_next = droplets_page.has_next();
            debug!(page, count = droplets_page.droplets.len(), "fetched droplets page");

            let now = Utc::now();
            let droplets: Vec<RemoteInstance> = droplets_page
                .droplets
                .into_iter()
                .filter_map(|record| record.into_instance(matcher, min_age, now))
                .collect();
            selected.extend(select_instances(droplets, matcher, min_age, now));

            if !has_next {
                break;
            }
            page += 1;
        }

        Ok(selected)
    }

    async fn stop(&self, instance: &RemoteInstance) -> Result<()> {
        let url = format!("{}/v2/droplets/{}/actions", self.base_url, instance.id);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .timeout(STOP_TIMEOUT)
            .json(&json!({ "type": "power_off" }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, instance: &RemoteInstance) -> Result<()> {
        let url = format!("{}/v2/droplets/{}", self.base_url, instance.id);
        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
