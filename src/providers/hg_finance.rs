use crate::core::config::HgFinanceConfig;
use crate::core::error::FetchError;
use crate::core::feed::{Feed, QuoteFetcher, QuotesResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Client for the HG Brasil style `/finance` endpoint.
pub struct HgFinanceProvider {
    finance_url: Url,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HgFinanceProvider {
    pub fn new(config: &HgFinanceConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        let finance_url = Url::parse(&format!("{base_url}/finance"))
            .with_context(|| format!("Invalid finance base URL: {}", config.base_url))?;
        if finance_url.cannot_be_a_base() {
            anyhow::bail!("Invalid finance base URL: {}", config.base_url);
        }
        let client = reqwest::Client::builder()
            .user_agent("ratesnow/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(HgFinanceProvider {
            finance_url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn endpoint(&self, fields: &str) -> Url {
        let mut url = self.finance_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("fields", fields);
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        fields: &str,
        group: &str,
    ) -> Result<QuotesResponse<T>, FetchError> {
        let url = self.endpoint(fields);
        debug!("Requesting finance data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|source| FetchError::Status {
                status: status.as_u16(),
                source,
            })?;

        let text = response.text().await.map_err(FetchError::Request)?;
        let data = QuotesResponse::<T>::from_json(&text, group).map_err(|e| {
            error!(
                error = ?e,
                response = %text,
                "Failed to parse finance response"
            );
            FetchError::Decode(e)
        })?;

        debug!(count = data.results.len(), "Received finance response");
        Ok(data)
    }
}

#[async_trait]
impl<F: Feed> QuoteFetcher<F> for HgFinanceProvider {
    #[instrument(name = "FinanceFetch", skip(self), fields(feed = F::TABLE))]
    async fn fetch(&self, fields: &str) -> Result<QuotesResponse<F::Quote>, FetchError> {
        self.get::<F::Quote>(fields, F::GROUP).await.inspect_err(|e| {
            error!(cause = %e.cause(), "Finance request failed");
        })
    }
}
