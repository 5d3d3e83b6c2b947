//! # feedly - typed client core for the Feedly cloud API
//!
//! Every API call goes through one pipeline: build the request (form
//! parameters or a JSON body, optional extra headers, optional OAuth
//! authorization), send it, reject non-success statuses, and deserialize the
//! body into a caller-chosen type.
//!
//! ## Features
//!
//! - Async requests with cooperative cancellation via `CancellationToken`
//! - `Authorization: OAuth <token>` for authorized calls
//! - Empty-body sentinels: `[]` is an empty `T`, `""` and `{}` are no result
//! - Field converters for the API's loose JSON: 0/1 booleans, epoch
//!   milliseconds, duration strings, nullable integers, malformed URLs
//! - One error type carrying the failing stage and, for parse errors, the
//!   field path
//!
//! ## Basic Usage
//!
//! ```no_run
//! use feedly::{CancellationToken, FeedlyClient, Method, Timestamp};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Profile {
//!     id: String,
//!     #[serde(default)]
//!     created: Option<Timestamp>,
//! }
//!
//! # async fn run() -> feedly::Result<()> {
//! let client = FeedlyClient::new()?.with_access_token("A1b2C3");
//! let cancel = CancellationToken::new();
//!
//! let profile: Option<Profile> = client
//!     .authorized_request(Method::GET, "v3/profile", None, &cancel)
//!     .await?;
//!
//! if let Some(profile) = profile {
//!     println!("Profile: {} ({:?})", profile.id, profile.created);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coerce;
pub mod error;
pub mod request;
pub mod response;
pub mod rest;
pub mod time;
pub mod transport;
pub mod uri;

// Re-export main types for convenience
pub use client::Config;
pub use error::{FeedlyError, Result};
pub use request::{Headers, Params, RequestDescriptor};
pub use response::parse_body;
pub use rest::FeedlyClient;
pub use time::Timestamp;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use uri::LenientUrl;

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;
