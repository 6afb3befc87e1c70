//! HTTP execution layer for toolbridge.
//!
//! Every outbound call made on behalf of a tool or an LLM-authored request
//! goes through [`HttpClientService`]. Requests and responses are described by
//! the serializable envelopes [`HttpRequestSpec`] and [`HttpResponseSpec`],
//! which are also the format the LLM is asked to produce.
//!
//! # Architecture
//!
//! - [`HttpRequestSpec`] / [`HttpResponseSpec`]: request and response envelopes
//! - [`RetryPolicy`]: bounded exponential backoff
//! - [`HttpClientService`]: executes envelopes, retrying timeouts, connection
//!   failures and 5xx responses
//! - [`HttpError`]: failures surfaced once retries are exhausted

pub mod client;
pub mod error;
pub mod retry;
pub mod spec;

pub use client::HttpClientService;
pub use error::HttpError;
pub use retry::RetryPolicy;
pub use spec::{HttpMethod, HttpRequestSpec, HttpResponseSpec, RequestBody};
