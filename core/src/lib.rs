//! Blocking client for the Pushover notification API.
//!
//! # Overview
//! `Client` sends notifications, validates user keys and polls emergency
//! receipts. Every reply, including HTTP 4xx/5xx replies carrying a JSON
//! body, comes back as a `Response`; check `Response::ok()` to branch on
//! success. Only a missing body (`TransportError`) or a body that is not a
//! JSON object (`ParseError`) is an `Err`.
//!
//! # Design
//! - Requests are built as plain `HttpRequest` data and executed by a
//!   `Transport`, so the I/O boundary is explicit and swappable.
//! - `UreqTransport` (feature `ureq`, on by default) is the stock transport.
//! - `UserHandle` pins a user key to a borrowed `Client`.
//!
//! ```no_run
//! use pushover_core::Client;
//! use serde_json::{json, Map};
//!
//! let client = Client::new("app-token");
//! let user = client.user("user-key");
//! let mut options = Map::new();
//! options.insert("title".to_string(), json!("Backups"));
//! let response = user.notify("nightly backup finished", &options)?;
//! if !response.ok() {
//!     eprintln!("rejected: {response}");
//! }
//! # Ok::<(), pushover_core::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod user;

#[cfg(test)]
mod testing;

pub use client::{Client, BASE_URL};
pub use error::{ApiError, ParseError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use response::Response;
#[cfg(feature = "ureq")]
pub use transport::{TransportConfig, UreqTransport};
pub use user::UserHandle;
