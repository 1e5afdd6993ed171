// src/catalog/source.rs
// One-shot loading of the site configuration document

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Catalog, GlobalSettings, WidgetDefinition};
use crate::error::{Result, WidgetError};
use crate::http::config_url;

/// Wire shape of `GET /api/website/{publicKey}/config`.
/// The server answers either `{settings, widgets}` or `{error}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub settings: Option<GlobalSettings>,
    #[serde(default)]
    pub widgets: Option<Vec<WidgetDefinition>>,
}

impl ConfigDocument {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Turn the document into a catalog; a non-empty `error` is fatal
    pub fn into_catalog(self) -> Result<Catalog> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(WidgetError::config_load(error));
        }
        Ok(Catalog::new(
            self.widgets.unwrap_or_default(),
            self.settings.unwrap_or_default(),
        ))
    }
}

/// Where the site configuration comes from
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the configuration document for a site public key
    async fn fetch(&self, public_key: &str) -> Result<ConfigDocument>;
}

/// Loads the configuration over HTTP from the widget API
#[derive(Clone)]
pub struct HttpConfigSource {
    client: reqwest::Client,
    api_base: String,
}

impl HttpConfigSource {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self, public_key: &str) -> Result<ConfigDocument> {
        let url = config_url(&self.api_base, public_key)?;
        debug!("Fetching widget config from {}", url);

        // The body carries `{error}` on 404 too, so status is not checked
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        ConfigDocument::parse(&body).map_err(|e| {
            WidgetError::config_load(format!("unreadable config (HTTP {}): {}", status, e))
        })
    }
}

/// Fetch and validate the catalog for a site
pub async fn load_catalog(source: &dyn ConfigSource, public_key: &str) -> Result<Catalog> {
    let document = source.fetch(public_key).await?;
    document.into_catalog()
}
