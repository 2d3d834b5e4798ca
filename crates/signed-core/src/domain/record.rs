//! A single classified commit.

use serde::{Deserialize, Serialize};

use super::signature::SignatureCode;

/// One commit as reported by the audited log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub signature: SignatureCode,
    /// Abbreviated commit hash.
    pub hash: String,
    pub author: String,
    pub subject: String,
}

impl CommitRecord {
    pub fn new(
        signature: SignatureCode,
        hash: impl Into<String>,
        author: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            signature,
            hash: hash.into(),
            author: author.into(),
            subject: subject.into(),
        }
    }

    /// Plain report line: `hash author<TAB>subject`.
    pub fn report_line(&self) -> String {
        format!("{} {}\t{}", self.hash, self.author, self.subject)
    }
}
