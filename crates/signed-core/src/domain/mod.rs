//! Domain models for git-signed.
//!
//! Canonical definitions for the core entities:
//! - `SignatureCode`: Trust level git reports for one commit signature
//! - `CommitRecord`: One classified line of the audited log
//! - `AuditError`: Fatal outcomes of an audit run

pub mod error;
pub mod record;
pub mod signature;

pub use error::{AuditError, Result};
pub use record::CommitRecord;
pub use signature::SignatureCode;
