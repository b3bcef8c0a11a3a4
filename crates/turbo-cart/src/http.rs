//! [`StockService`] over the storefront's HTTP API.

use async_trait::async_trait;
use serde::Deserialize;
use turbo_data::{FetchClient, Response};

use crate::catalog::{Product, StockRecord};
use crate::config::ApiConfig;
use crate::error::ServiceError;
use crate::ids::ProductId;
use crate::services::StockService;

/// Body of `GET /stock/{id}`. Any `id` the API echoes back is ignored.
#[derive(Debug, Deserialize)]
struct StockPayload {
    amount: i64,
}

/// Catalog and stock lookups against `GET /products/{id}` and `GET /stock/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    /// Use a preconfigured client; paths are resolved against its base URL.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Build a `reqwest`-backed client from configuration.
    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(configure(FetchClient::new(), api))
    }

    async fn fetch(&self, path: String, product_id: ProductId) -> Result<Response, ServiceError> {
        let response = self
            .client
            .get(path)
            .header("Accept", "application/json")
            .send()
            .await?;
        response.error_for_status().map_err(|error| {
            if error.is_not_found() {
                ServiceError::NotFound(product_id)
            } else {
                ServiceError::Fetch(error)
            }
        })
    }
}

/// Apply base URL, credentials and timeout from `api` to `client`.
pub fn configure(client: FetchClient, api: &ApiConfig) -> FetchClient {
    let client = client
        .with_base_url(api.base_url.clone())
        .with_timeout(api.timeout());
    match &api.bearer_token {
        Some(token) => client.with_default_header("Authorization", format!("Bearer {token}")),
        None => client,
    }
}

#[async_trait]
impl StockService for HttpCatalog {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockRecord, ServiceError> {
        let payload: StockPayload = self
            .fetch(format!("/stock/{product_id}"), product_id)
            .await?
            .json()?;
        Ok(StockRecord::new(product_id, payload.amount))
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        let product: Product = self
            .fetch(format!("/products/{product_id}"), product_id)
            .await?
            .json()?;
        if product.id != product_id {
            return Err(ServiceError::Mismatch {
                requested: product_id,
                received: product.id,
            });
        }
        Ok(product)
    }
}
