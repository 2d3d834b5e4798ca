//! Signature trust levels as reported by git's `%G?` placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature status of a single commit.
///
/// Only [`SignatureCode::Good`] is fully trusted. Every other value denotes
/// some deficiency, with [`SignatureCode::NoSignature`] marking commits that
/// carry no signature at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCode {
    /// `G`: good (valid) signature.
    Good,
    /// `B`: bad signature.
    BadSignature,
    /// `U`: good signature with unknown validity.
    GoodUnknownValidity,
    /// `X`: good signature that has expired.
    GoodExpiredSignature,
    /// `Y`: good signature made by an expired key.
    GoodExpiredKey,
    /// `R`: good signature made by a revoked key.
    GoodRevokedKey,
    /// `E`: signature cannot be checked (e.g. missing key).
    CannotCheck,
    /// `N`: no signature.
    NoSignature,
}

impl SignatureCode {
    /// Every code git can emit, in declaration order.
    pub const ALL: [SignatureCode; 8] = [
        SignatureCode::Good,
        SignatureCode::BadSignature,
        SignatureCode::GoodUnknownValidity,
        SignatureCode::GoodExpiredSignature,
        SignatureCode::GoodExpiredKey,
        SignatureCode::GoodRevokedKey,
        SignatureCode::CannotCheck,
        SignatureCode::NoSignature,
    ];

    /// Look up the code for a `%G?` character.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'G' => Some(SignatureCode::Good),
            'B' => Some(SignatureCode::BadSignature),
            'U' => Some(SignatureCode::GoodUnknownValidity),
            'X' => Some(SignatureCode::GoodExpiredSignature),
            'Y' => Some(SignatureCode::GoodExpiredKey),
            'R' => Some(SignatureCode::GoodRevokedKey),
            'E' => Some(SignatureCode::CannotCheck),
            'N' => Some(SignatureCode::NoSignature),
            _ => None,
        }
    }

    /// The `%G?` character for this code.
    pub fn code(self) -> char {
        match self {
            SignatureCode::Good => 'G',
            SignatureCode::BadSignature => 'B',
            SignatureCode::GoodUnknownValidity => 'U',
            SignatureCode::GoodExpiredSignature => 'X',
            SignatureCode::GoodExpiredKey => 'Y',
            SignatureCode::GoodRevokedKey => 'R',
            SignatureCode::CannotCheck => 'E',
            SignatureCode::NoSignature => 'N',
        }
    }

    /// Whether the signature is fully trusted.
    pub fn is_trusted(self) -> bool {
        self == SignatureCode::Good
    }

    /// Whether the commit carries no signature at all.
    pub fn is_unsigned(self) -> bool {
        self == SignatureCode::NoSignature
    }

    /// Human-readable meaning, used as the legend of the JSON report.
    pub fn describe(self) -> &'static str {
        match self {
            SignatureCode::Good => "good signature",
            SignatureCode::BadSignature => "bad signature",
            SignatureCode::GoodUnknownValidity => "good signature, unknown validity",
            SignatureCode::GoodExpiredSignature => "good signature, expired",
            SignatureCode::GoodExpiredKey => "good signature, expired key",
            SignatureCode::GoodRevokedKey => "good signature, revoked key",
            SignatureCode::CannotCheck => "signature cannot be checked",
            SignatureCode::NoSignature => "no signature",
        }
    }
}

impl fmt::Display for SignatureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
