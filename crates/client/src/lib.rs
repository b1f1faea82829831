//! Client code for overcast.
//!
//! This crate provides the intercepted-request model and the network fetch
//! pipeline shared by the proxy and its tests.

pub mod fetch;
pub mod request;

pub use fetch::{FetchConfig, FetchResponse, Fetcher, HttpFetcher};
pub use request::ResourceRequest;
