//! # W3C Verifiable Credentials
//!
//! The credential data model and the two proof suites: embedded
//! Data-Integrity proofs (`eddsa-jcs-2022`) and enveloping VC-JWT proofs.

pub mod integrity;
pub mod issue;
pub mod jose;
pub mod vc;
pub mod verify;

pub use self::issue::{CredentialIssuer, ProofFormat};
pub use self::vc::{CredentialSubject, Kind, VerifiableCredential};
pub use self::verify::{CredentialVerifier, VerifyResult};
