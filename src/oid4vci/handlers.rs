//! # Handlers
//!
//! Endpoint handlers for the pre-authorized issuance flow. Each request type
//! routes through [`crate::api::Handler`] to its handler function.

mod create_offer;
mod credential;
mod metadata;
mod token;
mod verify;
