//! Resilient client for the 123pan open platform: rate-limited, retried, and typed HTTP
//! calls behind one explicitly constructed client instance.
//!
//! The crate is organized around the request-execution pipeline: the [`api`] facade builds a
//! [`request::RequestDescriptor`] per logical call, and [`client::Client`] drives it through
//! the shared [`limit::RateLimiter`], attaches the bearer credential managed by
//! [`auth::TokenManager`], performs the transport exchange via a pluggable
//! [`http::HttpTransport`], and consults the [`retry::RetryPolicy`] until the call terminates
//! with a decoded result or a structured [`error::Error`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod limit;
pub mod obs;
pub mod request;
pub mod retry;

mod _prelude {
	pub use std::{
		cmp,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
