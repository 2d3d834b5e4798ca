//! Verdict policy: from final buckets to report sections and exit code.
//!
//! # Decision table
//!
//! Evaluated top to bottom once the log has been fully drained:
//!
//! 1. If any commit is invalidated, emit an [`SectionKind::Invalidated`]
//!    warning listing all of them.
//!    1a. In trust-commits mode, append guidance and fail with `1`. Nothing
//!        further is evaluated.
//! 2. If any commit is unsigned, emit an [`SectionKind::Unsigned`] error
//!    section, append guidance and fail with `1`.
//! 3. Otherwise emit the success section and pass with `0`.
//!
//! Step 1 and step 3 are independent: with trust-commits off, a history that
//! only has deficient (but present) signatures gets both the warning and the
//! success section, and exits `0`.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::aggregator::{AuditSummary, Buckets};
use crate::config::RunConfig;
use crate::domain::{CommitRecord, Result};

/// Styling class of a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warn,
    Info,
    Success,
}

/// What a report section is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Commits whose signature is anything but good.
    Invalidated,
    /// Commits with no signature at all.
    Unsigned,
    /// Remediation pointers for the operator.
    Guidance,
    /// Overall pass.
    Success,
}

/// One severity-tagged block of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub severity: Severity,
    /// Commits listed by this section, in stream order. Empty for guidance
    /// and success sections.
    pub commits: Vec<CommitRecord>,
}

impl ReportSection {
    fn listing(kind: SectionKind, severity: Severity, commits: &[CommitRecord]) -> Self {
        Self {
            kind,
            severity,
            commits: commits.to_vec(),
        }
    }

    fn guidance() -> Self {
        Self {
            kind: SectionKind::Guidance,
            severity: Severity::Info,
            commits: Vec::new(),
        }
    }

    fn success() -> Self {
        Self {
            kind: SectionKind::Success,
            severity: Severity::Success,
            commits: Vec::new(),
        }
    }

    /// Plain `hash author<TAB>subject` lines for the listed commits.
    pub fn lines(&self) -> Vec<String> {
        self.commits.iter().map(CommitRecord::report_line).collect()
    }

    /// Whether this section belongs on stdout rather than stderr.
    pub fn is_stdout(&self) -> bool {
        self.kind == SectionKind::Success
    }
}

/// Outcome of an audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub exit_code: u8,
    pub trust_commits: bool,
    pub sections: Vec<ReportSection>,
    pub summary: AuditSummary,
    /// SHA-256 over the bucket contents and mode; stable across runs over
    /// the same closed range.
    pub digest: String,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind == kind)
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}

/// Apply the decision table to the final buckets.
pub fn evaluate(buckets: &Buckets, config: &RunConfig) -> Result<Verdict> {
    let mut sections = Vec::new();
    let exit_code = decide(buckets, config, &mut sections);

    Ok(Verdict {
        exit_code,
        trust_commits: config.trust_commits,
        sections,
        summary: buckets.summary.clone(),
        digest: digest(buckets, config.trust_commits)?,
    })
}

fn decide(buckets: &Buckets, config: &RunConfig, sections: &mut Vec<ReportSection>) -> u8 {
    if !buckets.invalidated.is_empty() {
        sections.push(ReportSection::listing(
            SectionKind::Invalidated,
            Severity::Warn,
            &buckets.invalidated,
        ));
        if config.trust_commits {
            sections.push(ReportSection::guidance());
            return 1;
        }
    }

    if !buckets.unsigned.is_empty() {
        sections.push(ReportSection::listing(
            SectionKind::Unsigned,
            Severity::Error,
            &buckets.unsigned,
        ));
        sections.push(ReportSection::guidance());
        return 1;
    }

    sections.push(ReportSection::success());
    0
}

#[derive(Serialize)]
struct DigestInput<'a> {
    trust_commits: bool,
    invalidated: &'a [CommitRecord],
    unsigned: &'a [CommitRecord],
    summary: &'a AuditSummary,
}

fn digest(buckets: &Buckets, trust_commits: bool) -> Result<String> {
    let input = DigestInput {
        trust_commits,
        invalidated: &buckets.invalidated,
        unsigned: &buckets.unsigned,
        summary: &buckets.summary,
    };
    let bytes = serde_json::to_vec(&input)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
