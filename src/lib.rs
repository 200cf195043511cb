//! Async client for the Vanta compliance API: OAuth client-credentials token lifecycle,
//! sliding-window rate limiting, cursor pagination, and a uniform CRUD facade over
//! organizations, users, controls, evidence, and audits.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod pagination;
pub mod rate_limit;
pub mod resource;

mod _prelude {
	pub use std::{
		collections::VecDeque,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

pub use reqwest;
pub use serde_json;
pub use url;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
#[cfg(test)] use {color_eyre as _, httpmock as _};
