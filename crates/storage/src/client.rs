use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{Result, StorageError};

/// Query-string predicates in PostgREST syntax (`field=eq.value`, `order=field.asc`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pairs: Vec<(String, String)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl ToString) -> Self {
        self.pairs
            .push((field.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn in_list<V: ToString>(mut self, field: &str, values: &[V]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.pairs.push((field.to_string(), format!("in.({})", joined)));
        self
    }

    pub fn order(mut self, field: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.pairs
            .push(("order".to_string(), format!("{}.{}", field, direction)));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.pairs.push(("limit".to_string(), limit.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    fn has_predicate(&self) -> bool {
        self.pairs
            .iter()
            .any(|(field, _)| field != "order" && field != "limit")
    }
}

/// Thin wrapper over the backend's REST resources.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
}

impl PostgrestClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.auth_token.trim()))
            .map_err(|_| {
                StorageError::Config(
                    "auth_token contains characters not allowed in a header".into(),
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: &Filters,
    ) -> Result<Vec<T>> {
        let request = self.client.get(self.url(resource)).query(filters.as_pairs());
        self.fetch_rows(Method::GET, resource, request).await
    }

    /// First matching row, if any.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: &Filters,
    ) -> Result<Option<T>> {
        let rows = self.select(resource, filters).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<B, T>(&self, resource: &str, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(self.url(resource))
            .header("Prefer", "return=representation")
            .json(body);
        self.fetch_rows(Method::POST, resource, request).await
    }

    /// PATCH every row matching `filters`; returns the rows as updated.
    /// An empty result means no row matched.
    pub async fn update<B, T>(&self, resource: &str, filters: &Filters, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require_predicate(Method::PATCH, resource, filters)?;

        let request = self
            .client
            .patch(self.url(resource))
            .query(filters.as_pairs())
            .header("Prefer", "return=representation")
            .json(body);
        self.fetch_rows(Method::PATCH, resource, request).await
    }

    pub async fn delete(&self, resource: &str, filters: &Filters) -> Result<()> {
        self.require_predicate(Method::DELETE, resource, filters)?;

        let request = self.client.delete(self.url(resource)).query(filters.as_pairs());
        self.send(Method::DELETE, resource, request).await?;
        Ok(())
    }

    fn require_predicate(&self, method: Method, resource: &str, filters: &Filters) -> Result<()> {
        if filters.has_predicate() {
            Ok(())
        } else {
            Err(StorageError::Validation(format!(
                "Refusing unfiltered {} on {}",
                method, resource
            )))
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        method: Method,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        let body = self.send(method, resource, request).await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(
        &self,
        method: Method,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<String> {
        debug!("Sending {} request to {}/{}", method, self.base_url, resource);

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("{} request to {} failed ({}): {}", method, resource, status, body);
            return Err(StorageError::Http {
                status,
                method,
                resource: resource.to_string(),
                body,
            });
        }

        debug!(
            "Response from {} request to {}: {} ({} bytes)",
            method,
            resource,
            status,
            body.len()
        );
        Ok(body)
    }
}
