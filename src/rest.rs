use crate::client::Config;
use crate::error::{FeedlyError, Result};
use crate::request::{Headers, Params, RequestDescriptor};
use crate::response::parse_body;
use crate::transport::{ReqwestTransport, Transport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Client for the Feedly REST API.
///
/// Owns the transport for its whole lifetime and the access token attached
/// to authorized calls. Calls share nothing but those two, so one client can
/// serve concurrent requests through `&self`. Changing the token takes
/// `&mut self`; callers that share a client across tasks decide how to
/// serialize that.
pub struct FeedlyClient {
    transport: Arc<dyn Transport>,
    config: Config,
    access_token: Option<String>,
}

impl FeedlyClient {
    /// Create a client for the production API
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an existing transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        FeedlyClient {
            transport,
            config,
            access_token: None,
        }
    }

    /// Set the access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Replace the access token used by subsequent authorized calls
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    /// Remove the access token; authorized calls fail until a new one is set
    pub fn clear_access_token(&mut self) {
        self.access_token = None;
    }

    /// Get the current access token
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Get the client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send a request without credentials.
    ///
    /// `params` becomes a form-encoded body and `body` a JSON body; if both
    /// are given the JSON body is sent. `headers` are appended verbatim.
    pub async fn unauthorized_request<T, B>(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        body: Option<&B>,
        cancel: &CancellationToken,
        headers: Option<Headers>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let mut descriptor = RequestDescriptor::new(method, path);
        if let Some(params) = params {
            descriptor = descriptor.form(params);
        }
        if let Some(headers) = headers {
            descriptor = descriptor.headers(headers);
        }
        if let Some(body) = body {
            descriptor = descriptor.json(body)?;
        }
        self.request(descriptor, cancel).await
    }

    /// Send a form-parameter request carrying the access token
    pub async fn authorized_request<T>(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Default,
    {
        let auth = self.authorization_header()?;
        self.unauthorized_request::<T, ()>(method, path, params, None, cancel, Some(vec![auth]))
            .await
    }

    /// Send a JSON-body request carrying the access token
    pub async fn authorized_request_with_body<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let auth = self.authorization_header()?;
        self.unauthorized_request(method, path, None, body, cancel, Some(vec![auth]))
            .await
    }

    /// Send a prepared request and interpret the response.
    ///
    /// Returns `Ok(None)` for an empty or `{}` body and `Ok(Some(T::default()))`
    /// for `[]`. A non-2xx status is an error whatever the body says. If
    /// `cancel` fires before the response is fully read the call ends with
    /// [`FeedlyError::Cancelled`].
    pub async fn request<T>(
        &self,
        descriptor: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Default,
    {
        let method = descriptor.method().clone();
        let request = descriptor.build(&self.config)?;
        let url = request.url.clone();

        if self.config.debug {
            if let Some(ref body) = request.body {
                trace!(%method, %url, body = %body, "request body");
            }
        }

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%method, %url, "request cancelled");
                return Err(FeedlyError::Cancelled);
            }
            result = self.transport.send(request) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %url, error = %err, "request failed");
                return Err(err);
            }
        };

        debug!(
            %method,
            %url,
            status = response.status,
            elapsed = ?start.elapsed(),
            "request completed"
        );

        if !response.is_success() {
            warn!(%method, %url, status = response.status, reason = %response.reason, "non-success status");
            return Err(FeedlyError::status(response.status, response.reason));
        }

        if self.config.debug {
            trace!(%method, %url, body = %response.body, "response body");
        }

        parse_body(&response.body)
    }

    fn authorization_header(&self) -> Result<(String, String)> {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => {
                Ok(("Authorization".to_string(), format!("OAuth {}", token)))
            }
            _ => Err(FeedlyError::AccessTokenRequired),
        }
    }
}

impl fmt::Debug for FeedlyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedlyClient")
            .field("config", &self.config)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
