//! git-signed core library
//!
//! Streams `git log` signature status, classifies every commit into a trust
//! bucket and derives a deterministic pass/fail verdict.
//!
//! ## Pipeline
//!
//! - [`log_source`]: `git log` as a lazy line stream
//! - [`classifier`]: one line into one [`CommitRecord`]
//! - [`aggregator`]: records into ordered `unsigned` / `invalidated` buckets
//! - [`verdict`]: buckets plus mode into report sections and an exit code
//! - [`report`]: sections into styled text or JSON

pub mod aggregator;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod log_source;
pub mod obs;
pub mod report;
pub mod telemetry;
pub mod verdict;

pub use aggregator::{Aggregator, AuditSummary, Buckets};
pub use audit::{audit_repository, collect, run_audit};
pub use classifier::classify_line;
pub use config::{LogSourceConfig, RunConfig};
pub use domain::{AuditError, CommitRecord, Result, SignatureCode};
pub use log_source::{log_args, GitLogSource, LogLines, MemoryLogSource, LOG_FORMAT};
pub use report::{render_json, render_text, set_color_enabled, RenderedReport};
pub use telemetry::init_tracing;
pub use verdict::{evaluate, ReportSection, SectionKind, Severity, Verdict};

/// git-signed version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
