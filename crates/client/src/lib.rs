//! Request model and network access for lifeboat.
//!
//! This crate provides:
//! - Intercepted-request model with content-destination classification
//! - URL canonicalization and request-key derivation
//! - The `Network` abstraction and its reqwest-backed implementation

pub mod network;
pub mod request;

pub use network::{FetchMode, HttpNetwork, Network, NetworkResponse, ResponseOrigin};
pub use request::{InterceptedRequest, RequestClass, canonicalize, classify, request_key};
