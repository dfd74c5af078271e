//! Remote catalog API client.
//!
//! The storefront only ever *reads* two collections from the remote
//! source: product types and the currently active flavors. Everything
//! else (orders, payment, auth) belongs to other components, so the seam
//! here is deliberately narrow: the [`CatalogSource`] trait, implemented
//! for production by [`RemoteCatalogClient`].

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use gelateria_core::{Flavor, Product};

use crate::config::StorefrontConfig;

use thiserror::Error;

/// Errors that can occur when talking to the remote catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A read-only source of catalog data.
///
/// The catalog cache is generic over this trait so it can be driven by
/// the HTTP client in production and by fixtures in tests.
pub trait CatalogSource {
    /// Fetch all product types.
    fn product_types(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch the currently active flavors.
    fn active_flavors(&self) -> impl Future<Output = Result<Vec<Flavor>, ApiError>> + Send;
}

impl<S: CatalogSource + Send + Sync> CatalogSource for Arc<S> {
    fn product_types(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        (**self).product_types()
    }

    fn active_flavors(&self) -> impl Future<Output = Result<Vec<Flavor>, ApiError>> + Send {
        (**self).active_flavors()
    }
}

/// Client for the remote catalog API.
#[derive(Clone)]
pub struct RemoteCatalogClient {
    inner: Arc<RemoteCatalogClientInner>,
}

struct RemoteCatalogClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteCatalogClient {
    /// Create a new remote catalog client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(RemoteCatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Execute a GET request and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;

        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "catalog API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to parse catalog API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }
}

impl CatalogSource for RemoteCatalogClient {
    #[instrument(skip(self))]
    async fn product_types(&self) -> Result<Vec<Product>, ApiError> {
        let products: Vec<Product> = self.get_json("tipos-producto").await?;
        debug!(count = products.len(), "fetched product types");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn active_flavors(&self) -> Result<Vec<Flavor>, ApiError> {
        let flavors: Vec<Flavor> = self.get_json("gustos/activos").await?;
        debug!(count = flavors.len(), "fetched active flavors");
        Ok(flavors)
    }
}
