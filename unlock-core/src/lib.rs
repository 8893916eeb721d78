//! Core library for the `unlock` CLI.
//!
//! This crate defines:
//! - The query parameter model and per-instance defaults
//! - The fixed gazetteer service endpoints and error taxonomy
//! - An HTTP transport abstraction and the reqwest-backed client
//!
//! It is used by `unlock-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod params;
pub mod transport;

pub use client::UnlockClient;
pub use config::Config;
pub use endpoint::{BASE_URL, Endpoint};
pub use error::Error;
pub use model::{ApiResponse, FeatureCollection, FeatureTypes, FootprintCollection};
pub use params::{Defaults, ParamValue, Params};
pub use transport::{HttpTransport, RawResponse, Transport};
