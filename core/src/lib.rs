//! Synchronous client core for the MetaLib X-Server.
//!
//! # Overview
//! `ResourceService` retrieves categories, quick sets and resources through a
//! `Transport` and maps the returned XML into typed entities. `HttpTransport`
//! is the network implementation; tests substitute a transport that returns
//! canned documents.
//!
//! # Design
//! - `XServerClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values, so envelope handling is testable without I/O.
//! - Default parameters are merged in one place (`merge_defaults`).
//! - Mapping is defensive: missing fields take defaults, unknown elements are
//!   ignored, and only `TransportError` reaches the caller.
//! - Caching is a collaborator (`Cache`); `NullCache` is the default.

pub mod cache;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod mapping;
pub mod params;
pub mod service;
pub mod transport;
pub mod types;

pub use cache::{Cache, MemoryCache, NullCache};
pub use client::XServerClient;
pub use config::ServiceConfig;
pub use document::XmlNode;
pub use error::{ConfigError, MappingAnomaly, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use mapping::{map_all, FromNode};
pub use params::Params;
pub use service::{merge_defaults, Defaults, ResourceService};
pub use transport::{HttpTransport, Transport};
pub use types::{Category, QuickSet, Resource, Subcategory};
