//! Error types for the MetaLib client.
//!
//! # Design
//! Only `TransportError` crosses the `ResourceService` boundary, and it does
//! so unchanged. Irregularities inside an otherwise usable response are
//! `MappingAnomaly` values: they are logged and resolved with a default, never
//! returned to the caller.

use thiserror::Error;

/// The request could not be completed or the response envelope is unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP round trip itself failed (connection refused, timeout, ...).
    #[error("network failure: {0}")]
    Network(String),

    /// The X-Server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The body is not well-formed XML.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The document parsed but is not an X-Server envelope.
    #[error("unexpected response envelope: {0}")]
    Envelope(String),

    /// The X-Server reported an error element inside the envelope.
    #[error("remote error {code}: {message}")]
    Remote { code: String, message: String },
}

/// A non-fatal irregularity found while mapping a node into an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingAnomaly {
    #[error("<{element}> has no <{field}>, using default")]
    MissingField {
        element: &'static str,
        field: &'static str,
    },

    #[error("<{element}>/<{field}> has unrecognized flag {value:?}, using false")]
    UnrecognizedFlag {
        element: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Invalid or incomplete client configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
