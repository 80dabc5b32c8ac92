//! # Veridian
//!
//! A decentralized-identity credential issuance and verification engine:
//! managed signing keys behind a KMS boundary, DID lifecycle and resolution,
//! W3C Verifiable Credentials secured with Data-Integrity or VC-JWT proofs,
//! and the OpenID for Verifiable Credential Issuance pre-authorized code
//! flow.
//!
//! Storage and metadata are consumed through the narrow traits in
//! [`provider`]. HTTP hosting is left to the caller, which maps
//! [`Response`] and [`Error`] onto its transport.

pub mod api;
pub mod did;
mod error;
pub mod generate;
pub mod key;
pub mod kms;
pub mod oid4vci;
pub mod provider;
pub mod state;
pub mod w3c_vc;

pub use self::api::{AuthorizationHeader, Body, Handler, Headers, NoHeaders, Request, Response};
pub use self::error::Error;
pub use self::oid4vci::{Agent, AgentConfig, TokenPolicy, handle};

/// Result type for the crate.
pub type Result<T, E = Error> = anyhow::Result<T, E>;
