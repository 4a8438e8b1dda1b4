//! Authenticated access to the Supabase REST (PostgREST) endpoint.
//!
//! Every request carries the service key as both the `apikey` header and a
//! bearer token. Callers pick the collection, the PostgREST filters, and the
//! method; interpreting the status code is left to them.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::SeedConfig;

/// Path prefix of the PostgREST API under the project URL.
pub const REST_PREFIX: &str = "/rest/v1";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected response from {collection}: status {status}: {body}")]
    UnexpectedStatus {
        collection: String,
        status: StatusCode,
        body: String,
    },
    #[error("Malformed response from {collection}: {source}: {body}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// PostgREST query parameters, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter (`column=eq.value`).
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Restricts the returned columns.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub collection: String,
    pub status: StatusCode,
    pub body: String,
}

impl RestResponse {
    /// True for 200 and 201, the statuses PostgREST uses for reads and inserts.
    pub fn is_ok_or_created(&self) -> bool {
        self.status == StatusCode::OK || self.status == StatusCode::CREATED
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|source| ApiError::Decode {
            collection: self.collection.clone(),
            source,
            body: self.body.clone(),
        })
    }

    pub fn into_error(self) -> ApiError {
        ApiError::UnexpectedStatus {
            collection: self.collection,
            status: self.status,
            body: self.body,
        }
    }
}

/// Thin client over one project's REST endpoint.
pub struct RestClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestClient {
    /// Creates a client for the project described by `config`.
    pub fn new(config: &SeedConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            service_key: config.service_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}{REST_PREFIX}/{collection}", self.base_url)
    }

    /// Issues a GET against `collection`.
    pub async fn get(&self, collection: &str, query: &Query) -> Result<RestResponse, ApiError> {
        self.send::<()>(Method::GET, collection, query, None).await
    }

    /// POSTs `body` as JSON to `collection`.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<RestResponse, ApiError> {
        self.send(Method::POST, collection, &Query::new(), Some(body))
            .await
    }

    /// GETs `collection` and decodes the rows, treating anything but 200 as an error.
    pub async fn select<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<T>, ApiError> {
        let resp = self.get(collection, query).await?;
        if resp.status != StatusCode::OK {
            return Err(resp.into_error());
        }
        resp.json()
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        collection: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<RestResponse, ApiError> {
        let url = self.collection_url(collection);
        debug!("{} {} {:?}", method, url, query.pairs());

        let mut request = self
            .client
            .request(method, &url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key);
        if !query.is_empty() {
            request = request.query(query.pairs());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!("{collection} responded with status {status}");

        Ok(RestResponse {
            collection: collection.to_string(),
            status,
            body,
        })
    }
}
