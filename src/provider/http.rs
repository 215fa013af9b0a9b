//! Reqwest-backed provider client speaking a Twilio-style REST surface:
//! form POST to create a message, GET to fetch its current status.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::{BoxFuture, FetchError, MessageSender, SendError, SendReceipt, StatusFetcher};
use crate::domain::{DeliveryStatus, MessageBody, MessageId, PhoneNumber, ValidationError};
use crate::transport;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01/";
const DEFAULT_SENDER_ID: &str = "OIM";

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

/// Basic-auth pair for the inner HTTP calls.
type BasicAuth<'a> = (&'a str, &'a str);

trait HttpApi: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        auth: BasicAuth<'a>,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn get<'a>(
        &'a self,
        url: &'a str,
        auth: BasicAuth<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestApi {
    client: reqwest::Client,
}

impl HttpApi for ReqwestApi {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        auth: BasicAuth<'a>,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .basic_auth(auth.0, Some(auth.1))
                .form(&params)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        auth: BasicAuth<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .basic_auth(auth.0, Some(auth.1))
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Provider account credentials.
///
/// Invariant: both parts non-empty after trimming.
pub struct Credentials {
    account_sid: String,
    auth_token: String,
}

impl Credentials {
    /// Create validated credentials.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let account_sid = account_sid.into();
        let account_sid = account_sid.trim();
        if account_sid.is_empty() {
            return Err(ValidationError::Empty {
                field: "account_sid",
            });
        }
        let auth_token = auth_token.into();
        let auth_token = auth_token.trim();
        if auth_token.is_empty() {
            return Err(ValidationError::Empty { field: "auth_token" });
        }
        Ok(Self {
            account_sid: account_sid.to_owned(),
            auth_token: auth_token.to_owned(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors building an [`HttpProvider`].
pub enum HttpProviderError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

#[derive(Debug, Clone)]
/// Builder for [`HttpProvider`].
///
/// Use this when you need to customize the base URL, sender id, timeout, or
/// user-agent.
pub struct HttpProviderBuilder {
    credentials: Credentials,
    base_url: String,
    sender_id: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpProviderBuilder {
    /// Create a builder with the default endpoint and sender id.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            sender_id: DEFAULT_SENDER_ID.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the API base URL (useful for test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the alphanumeric sender id placed in the `From` field.
    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = sender_id.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build an [`HttpProvider`].
    pub fn build(self) -> Result<HttpProvider, HttpProviderError> {
        // Url::join treats a base without a trailing slash as a file path.
        let base = if self.base_url.ends_with('/') {
            self.base_url
        } else {
            format!("{}/", self.base_url)
        };
        let base_url = Url::parse(&base)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| HttpProviderError::Transport(Box::new(err)))?;

        Ok(HttpProvider {
            credentials: self.credentials,
            base_url,
            sender_id: self.sender_id,
            http: Arc::new(ReqwestApi { client }),
        })
    }
}

#[derive(Clone)]
/// HTTP implementation of both collaborator contracts.
///
/// Sends are form POSTs to `Accounts/{sid}/Messages.json`; status checks are
/// GETs on `Accounts/{sid}/Messages/{message_id}.json`. Both authenticate
/// with HTTP basic auth.
pub struct HttpProvider {
    credentials: Credentials,
    base_url: Url,
    sender_id: String,
    http: Arc<dyn HttpApi>,
}

impl HttpProvider {
    /// Create a provider with default settings.
    pub fn new(credentials: Credentials) -> Result<Self, HttpProviderError> {
        Self::builder(credentials).build()
    }

    /// Start building a provider with custom settings.
    pub fn builder(credentials: Credentials) -> HttpProviderBuilder {
        HttpProviderBuilder::new(credentials)
    }

    fn auth(&self) -> BasicAuth<'_> {
        (&self.credentials.account_sid, &self.credentials.auth_token)
    }

    fn messages_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&format!(
            "Accounts/{}/Messages.json",
            self.credentials.account_sid
        ))
    }

    fn status_url(&self, id: &MessageId) -> Result<Url, url::ParseError> {
        self.base_url.join(&format!(
            "Accounts/{}/Messages/{}.json",
            self.credentials.account_sid,
            id.as_str()
        ))
    }
}

impl MessageSender for HttpProvider {
    fn send<'a>(
        &'a self,
        number: &'a PhoneNumber,
        body: &'a MessageBody,
    ) -> BoxFuture<'a, Result<SendReceipt, SendError>> {
        Box::pin(async move {
            let url = self
                .messages_url()
                .map_err(|err| SendError::Transport(Box::new(err)))?;
            let params = transport::encode_send_form(number, body, &self.sender_id);

            let response = self
                .http
                .post_form(url.as_str(), self.auth(), params)
                .await
                .map_err(SendError::Transport)?;

            if !(200..=299).contains(&response.status) {
                let message = transport::decode_provider_error(&response.body)
                    .unwrap_or_else(|| format!("HTTP {}", response.status));
                return Err(SendError::Provider { message });
            }

            transport::decode_send_json_response(&response.body).map_err(|err| {
                SendError::Provider {
                    message: format!("unusable provider response: {err}"),
                }
            })
        })
    }
}

impl StatusFetcher for HttpProvider {
    fn fetch<'a>(&'a self, id: &'a MessageId) -> BoxFuture<'a, Result<DeliveryStatus, FetchError>> {
        Box::pin(async move {
            let url = self
                .status_url(id)
                .map_err(|err| FetchError::Transport(Box::new(err)))?;

            let response = self
                .http
                .get(url.as_str(), self.auth())
                .await
                .map_err(FetchError::Transport)?;

            if response.status == 404 {
                return Err(FetchError::NotFound { id: id.clone() });
            }
            if !(200..=299).contains(&response.status) {
                return Err(FetchError::Transport(
                    format!("HTTP {}", response.status).into(),
                ));
            }

            transport::decode_status_json_response(&response.body)
                .map_err(|err| FetchError::Transport(Box::new(err)))
        })
    }
}
