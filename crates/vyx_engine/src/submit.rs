use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use thiserror::Error;
use vyx_core::{
    parse_body_text, JobRequest, ResultPayload, TransportError, TransportFailure,
    TransportOutcome,
};
use vyx_logging::{vyx_debug, vyx_info, vyx_warn};

use crate::JobCancel;

/// Names of the JSON body fields the endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFields {
    pub url_field: String,
    /// `None` for endpoints that take only the URL.
    pub options_field: Option<String>,
}

impl WireFields {
    pub fn content() -> Self {
        Self {
            url_field: "videoUrl".to_string(),
            options_field: Some("contentTypes".to_string()),
        }
    }

    pub fn clips() -> Self {
        Self {
            url_field: "youtube_url".to_string(),
            options_field: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub endpoint: String,
    pub fields: WireFields,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SubmitSettings {
    pub fn new(endpoint: impl Into<String>, fields: WireFields, request_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            fields,
            connect_timeout: Duration::from_secs(10),
            request_timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Builds the JSON body: the URL field, plus the options array when the
/// endpoint takes one.
pub fn build_body(request: &JobRequest, fields: &WireFields) -> Value {
    let mut body = Map::new();
    body.insert(
        fields.url_field.clone(),
        Value::String(request.source_url().to_string()),
    );
    if let Some(options_field) = &fields.options_field {
        body.insert(
            options_field.clone(),
            request
                .selected_options()
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        );
    }
    Value::Object(body)
}

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    /// Sends one request and waits for the first of: a response, `cancel`
    /// firing, or the request timeout. Never retries.
    async fn submit(&self, request: &JobRequest, cancel: &JobCancel) -> TransportOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: SubmitSettings,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestSubmitter {
    pub fn new(settings: SubmitSettings) -> Result<Self, SubmitError> {
        let endpoint =
            reqwest::Url::parse(&settings.endpoint).map_err(|err| SubmitError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                message: err.to_string(),
            })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| SubmitError::Client(err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    async fn exchange(&self, body: Value) -> TransportOutcome {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return TransportOutcome::Failed(map_reqwest_error(err)),
        };

        let status = response.status();
        // Read text first; the body is not guaranteed to be JSON.
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return TransportOutcome::Failed(map_reqwest_error(err)),
        };
        vyx_debug!("response status={} body_len={}", status, text.len());
        let parsed = parse_body_text(&text);

        if !status.is_success() {
            vyx_warn!("endpoint returned {}", status);
            return TransportOutcome::Failed(TransportError {
                kind: TransportFailure::HttpStatus(status.as_u16()),
                message: status.to_string(),
                body: Some(parsed),
            });
        }

        TransportOutcome::Response(ResultPayload::from_json(parsed))
    }
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(&self, request: &JobRequest, cancel: &JobCancel) -> TransportOutcome {
        let body = build_body(request, &self.settings.fields);
        vyx_info!(
            "POST {} url={} options={}",
            self.endpoint,
            request.source_url(),
            request.selected_options().len()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                vyx_info!("request aborted ({:?})", cancel.reason());
                TransportOutcome::Aborted(cancel.reason())
            }
            result = tokio::time::timeout(self.settings.request_timeout, self.exchange(body)) => {
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        vyx_warn!(
                            "request timed out after {:?}",
                            self.settings.request_timeout
                        );
                        TransportOutcome::TimedOut
                    }
                }
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    TransportError {
        kind: TransportFailure::Network,
        message: err.to_string(),
        body: None,
    }
}
