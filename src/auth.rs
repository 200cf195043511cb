//! Credentials, access tokens, and the token provider that mints them.

pub mod credentials;
pub mod provider;
pub mod token;

pub use credentials::*;
pub use provider::*;
pub use token::{secret::*, *};
