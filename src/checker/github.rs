use crate::config::Config;
use crate::error::TransportError;
use crate::logger::{AuditLogger, LogLevel};
use crate::model::{AdvisoryQueryResult, AdvisoryRecord};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Status codes that mean the advisory source is temporarily unreachable.
const CONNECTIVITY_STATUSES: [u16; 3] = [
    408, // Request Timeout
    503, // Service Unavailable
    504, // Gateway Timeout
];

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP seam under [`GitHubAdvisoryClient`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a client with the configured user agent, timeout and token.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Self::client_builder(config)?.build()?))
    }

    fn client_builder(config: &Config) -> Result<reqwest::ClientBuilder> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        if let Some(token) = config.resolved_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        Ok(builder)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        let body = if status.is_success() {
            response.text().await?
        } else {
            String::new()
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Queries the GitHub global security advisories API, one package at a time.
pub struct GitHubAdvisoryClient<T = ReqwestTransport> {
    transport: T,
    api_url: String,
    logger: Arc<dyn AuditLogger>,
}

impl GitHubAdvisoryClient<ReqwestTransport> {
    pub fn from_config(config: &Config, logger: Arc<dyn AuditLogger>) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::with_transport(transport, &config.api_url, logger))
    }
}

impl<T: HttpTransport> GitHubAdvisoryClient<T> {
    pub fn with_transport(
        transport: T,
        api_url: impl Into<String>,
        logger: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
            logger,
        }
    }

    fn query_url(&self, name: &str, version: &str) -> Result<String> {
        let affects = if version.is_empty() {
            name.to_string()
        } else {
            format!("{}@{}", name, version)
        };
        let url = reqwest::Url::parse_with_params(&self.api_url, &[("affects", affects)])?;
        Ok(url.into())
    }

    async fn fetch(&self, name: &str, version: &str) -> Result<HttpResponse, TransportError> {
        let url = self
            .query_url(name, version)
            .map_err(|e| TransportError::Other(format!("invalid advisory URL: {}", e)))?;
        self.transport.get(&url).await
    }
}

#[async_trait]
impl<T: HttpTransport> super::AdvisorySource for GitHubAdvisoryClient<T> {
    fn name(&self) -> &'static str {
        "GitHub Advisory Database"
    }

    async fn query(&self, name: &str, version: &str) -> AdvisoryQueryResult {
        let response = match self.fetch(name, version).await {
            Ok(response) => response,
            Err(e) => return AdvisoryQueryResult::unavailable(transport_warning(&e, name, version)),
        };

        if !response.is_success() {
            if CONNECTIVITY_STATUSES.contains(&response.status) {
                return AdvisoryQueryResult::unavailable(format!(
                    "Warning: Unable to access the GitHub Advisory API due to connectivity issues (HTTP {}). \
                     Security vulnerabilities cannot be checked for {} {}.",
                    response.status, name, version
                ));
            }

            // Any other status is reported as "no known advisories" without a
            // warning, so callers cannot tell it apart from a clean result.
            self.logger.log_message(
                &format!(
                    "Advisory API returned HTTP {} for {} {}; treating as no advisories",
                    response.status, name, version
                ),
                LogLevel::Low,
            );
            return AdvisoryQueryResult::inconclusive();
        }

        match parse_advisories(&response.body) {
            Some(advisories) => AdvisoryQueryResult::found(advisories),
            None => {
                self.logger.log_message(
                    &format!(
                        "Could not read advisory response for {} {}; treating as no advisories",
                        name, version
                    ),
                    LogLevel::Low,
                );
                AdvisoryQueryResult::inconclusive()
            }
        }
    }
}

fn transport_warning(err: &TransportError, name: &str, version: &str) -> String {
    match err {
        TransportError::Timeout => format!(
            "Warning: Request to the GitHub Advisory API timed out. \
             Security vulnerabilities cannot be checked for {} {}.",
            name, version
        ),
        TransportError::Request(msg) => format!(
            "Warning: Unable to access the GitHub Advisory API. \
             Security vulnerabilities cannot be checked for {} {}. Error: {}",
            name, version, msg
        ),
        TransportError::Other(msg) => format!(
            "Warning: An error occurred while checking for security vulnerabilities for {} {}. Error: {}",
            name, version, msg
        ),
    }
}

/// Reads a JSON array of advisory objects. Field names match case-insensitively.
///
/// Returns `None` when the body is not a JSON array.
fn parse_advisories(body: &str) -> Option<Vec<AdvisoryRecord>> {
    let value: Value = serde_json::from_str(body).ok()?;
    let items = value.as_array()?;

    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| AdvisoryRecord::new(field(obj, "severity"), field(obj, "description")))
            .collect(),
    )
}

fn field(obj: &Map<String, Value>, key: &str) -> String {
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
        .unwrap_or_default()
        .to_string()
}
