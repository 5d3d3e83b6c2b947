use crate::client::Config;
use crate::error::{FeedlyError, Result};
use crate::transport::HttpRequest;
use indexmap::IndexMap;
use reqwest::Method;
use serde::Serialize;
use url::form_urlencoded;

/// Form parameters, encoded in insertion order
pub type Params = IndexMap<String, String>;

/// Extra request headers; repeated names are appended, not replaced
pub type Headers = Vec<(String, String)>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Form(String),
    Json(String),
}

/// Describes one API call before it is resolved against the base address.
///
/// Form parameters and a JSON body are mutually exclusive on the wire. When
/// both are given the JSON body wins; passing both is a caller mistake and is
/// not reported.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: Headers,
    content: Option<Content>,
}

impl RequestDescriptor {
    /// Start a request for the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RequestDescriptor {
            method,
            path: path.into(),
            headers: Vec::new(),
            content: None,
        }
    }

    /// Encode parameters as an `application/x-www-form-urlencoded` body.
    ///
    /// Ignored if a JSON body is already set.
    pub fn form(mut self, params: &Params) -> Self {
        if matches!(self.content, Some(Content::Json(_))) {
            return self;
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        self.content = Some(Content::Form(encoded));
        self
    }

    /// Serialize a value as the JSON body, replacing any form body
    pub fn json<B>(mut self, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(body).map_err(FeedlyError::Serialize)?;
        self.content = Some(Content::Json(encoded));
        Ok(self)
    }

    /// Append a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Append several headers in order
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Relative (or absolute) request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve against the configured base address and produce the wire request
    pub fn build(self, config: &Config) -> Result<HttpRequest> {
        let url = config.resolve(&self.path)?;
        let mut headers = self.headers;

        let body = match self.content {
            Some(Content::Form(encoded)) => {
                headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                Some(encoded)
            }
            Some(Content::Json(encoded)) => {
                headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(encoded)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}
