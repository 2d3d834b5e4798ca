//! Report rendering for audit verdicts.
//!
//! Provides two output shapes:
//! - styled terminal text, split between stdout (success) and stderr
//!   (listings and guidance)
//! - a single machine-readable JSON document for pipeline consumers
//!
//! Rendering never changes the exit code; that is decided by
//! [`crate::verdict::evaluate`].

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::aggregator::AuditSummary;
use crate::domain::{Result, SignatureCode};
use crate::verdict::{ReportSection, SectionKind, Severity, Verdict};

/// Text destined for each output channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedReport {
    pub stdout: String,
    pub stderr: String,
}

impl RenderedReport {
    /// Write both channels, stderr first so listings precede the summary.
    pub fn write_to(&self, out: &mut impl Write, err: &mut impl Write) -> std::io::Result<()> {
        err.write_all(self.stderr.as_bytes())?;
        err.flush()?;
        out.write_all(self.stdout.as_bytes())?;
        out.flush()
    }
}

/// Enable or disable ANSI styling for the whole process.
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}

fn styled(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => text.red().bold(),
        Severity::Warn => text.bright_black(),
        Severity::Info => text.yellow().bold(),
        Severity::Success => text.green().bold(),
    }
}

/// Render a verdict as styled terminal text.
pub fn render_text(verdict: &Verdict) -> RenderedReport {
    let mut report = RenderedReport::default();
    for section in &verdict.sections {
        let target = if section.is_stdout() {
            &mut report.stdout
        } else {
            &mut report.stderr
        };
        render_section(section, target);
    }
    report
}

fn render_section(section: &ReportSection, buf: &mut String) {
    match section.kind {
        SectionKind::Invalidated => render_listing(
            section,
            "The following commits are not validated",
            buf,
            |hash, author| (hash.white(), author.white()),
        ),
        SectionKind::Unsigned => render_listing(
            section,
            "The following commits are not signed",
            buf,
            |hash, author| (hash.red().bold(), author.yellow().bold()),
        ),
        SectionKind::Guidance => render_guidance(buf),
        SectionKind::Success => {
            buf.push('\n');
            push_line(
                buf,
                styled("!! All commits are signed! Good job! !!", section.severity),
            );
            buf.push('\n');
        }
    }
}

fn render_listing(
    section: &ReportSection,
    title: &str,
    buf: &mut String,
    style_ids: impl Fn(&str, &str) -> (ColoredString, ColoredString),
) {
    let rule = "-".repeat(title.len());

    buf.push('\n');
    push_line(buf, styled(title, section.severity));
    push_line(buf, styled(&rule, section.severity));
    buf.push('\n');
    for commit in &section.commits {
        let (hash, author) = style_ids(&commit.hash, &commit.author);
        push_line(
            buf,
            format!("{hash} {author}\t{}", commit.subject.bright_black()),
        );
    }
    buf.push('\n');
    push_line(buf, styled(&rule, section.severity));
}

fn render_guidance(buf: &mut String) {
    buf.push('\n');
    say(buf, "If your username is in the list, make sure");
    say(buf, "that you have joined the project correctly:");
    suggest(buf, "git-signed join");
    say(buf, "Also, make sure to sync the pubkeys from");
    say(buf, "all the contributors on the project:");
    suggest(buf, "git-signed sync");
    push_line(
        buf,
        format!(
            "{} {}",
            styled("For more information, run", Severity::Info),
            "git-signed --help".cyan().bold()
        ),
    );
    buf.push('\n');
}

fn say(buf: &mut String, text: &str) {
    push_line(buf, styled(text, Severity::Info));
}

fn suggest(buf: &mut String, command: &str) {
    buf.push('\n');
    push_line(buf, format!("  {}", command.cyan().bold()));
    buf.push('\n');
}

fn push_line(buf: &mut String, line: impl std::fmt::Display) {
    buf.push_str(&line.to_string());
    buf.push('\n');
}

// ── JSON report ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    passed: bool,
    exit_code: u8,
    trust_commits: bool,
    summary: &'a AuditSummary,
    /// Meaning of every signature code counted in `summary`.
    legend: BTreeMap<SignatureCode, &'static str>,
    digest: &'a str,
    sections: &'a [ReportSection],
}

/// Render a verdict as one pretty-printed JSON document.
pub fn render_json(verdict: &Verdict) -> Result<String> {
    render_json_at(verdict, Utc::now())
}

fn render_json_at(verdict: &Verdict, generated_at: DateTime<Utc>) -> Result<String> {
    let report = JsonReport {
        generated_at,
        passed: verdict.passed(),
        exit_code: verdict.exit_code,
        trust_commits: verdict.trust_commits,
        summary: &verdict.summary,
        legend: verdict
            .summary
            .by_code
            .keys()
            .map(|code| (*code, code.describe()))
            .collect(),
        digest: &verdict.digest,
        sections: &verdict.sections,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::config::RunConfig;
    use crate::domain::{CommitRecord, SignatureCode};
    use crate::verdict::evaluate;

    fn verdict(records: &[(SignatureCode, &str, &str, &str)], trust_commits: bool) -> Verdict {
        let mut agg = Aggregator::new();
        for (code, hash, author, subject) in records {
            agg.push(CommitRecord::new(*code, *hash, *author, *subject));
        }
        evaluate(&agg.finish(), &RunConfig::new(None, trust_commits)).unwrap()
    }

    fn plain(verdict: &Verdict) -> RenderedReport {
        set_color_enabled(false);
        render_text(verdict)
    }

    #[test]
    fn test_success_goes_to_stdout_only() {
        let report = plain(&verdict(&[(SignatureCode::Good, "a1b2c3", "Alice", "Fix bug")], false));
        assert!(report.stderr.is_empty());
        assert_eq!(report.stdout, "\n!! All commits are signed! Good job! !!\n\n");
    }

    #[test]
    fn test_unsigned_listing_and_guidance_on_stderr() {
        let report = plain(&verdict(&[(SignatureCode::NoSignature, "a1b2c3", "Bob", "WIP")], false));
        assert!(report.stdout.is_empty());

        let not_validated = report
            .stderr
            .find("The following commits are not validated")
            .unwrap();
        let not_signed = report
            .stderr
            .find("The following commits are not signed")
            .unwrap();
        let guidance = report.stderr.find("git-signed join").unwrap();
        assert!(not_validated < not_signed && not_signed < guidance);
        assert_eq!(report.stderr.matches("a1b2c3 Bob\tWIP").count(), 2);
        assert!(report.stderr.contains("git-signed sync"));
    }

    #[test]
    fn test_rule_matches_title_width() {
        let report = plain(&verdict(&[(SignatureCode::NoSignature, "ab", "Bob", "WIP")], false));
        assert!(report
            .stderr
            .contains("The following commits are not signed\n------------------------------------\n"));
    }

    #[test]
    fn test_deficient_signature_renders_warning_and_success() {
        let report = plain(&verdict(
            &[(SignatureCode::GoodExpiredSignature, "a1b2c3", "Carol", "Old sig")],
            false,
        ));
        assert!(report.stderr.contains("a1b2c3 Carol\tOld sig"));
        assert!(!report.stderr.contains("git-signed join"));
        assert!(report.stdout.contains("All commits are signed"));
    }

    #[test]
    fn test_write_to_splits_channels() {
        let report = RenderedReport {
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        report.write_to(&mut out, &mut err).unwrap();
        assert_eq!(out, b"out\n");
        assert_eq!(err, b"err\n");
    }

    #[test]
    fn test_json_report_fields() {
        let v = verdict(&[(SignatureCode::NoSignature, "a1b2c3", "Bob", "WIP")], false);
        let json = render_json(&v).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["passed"], false);
        assert_eq!(value["exit_code"], 1);
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["by_code"]["no_signature"], 1);
        assert_eq!(value["sections"][0]["kind"], "invalidated");
        assert_eq!(value["sections"][1]["kind"], "unsigned");
        assert_eq!(value["sections"][1]["commits"][0]["hash"], "a1b2c3");
        assert_eq!(value["digest"], v.digest.as_str());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_json_legend_describes_counted_codes_only() {
        let v = verdict(
            &[
                (SignatureCode::Good, "a1", "Alice", "x"),
                (SignatureCode::GoodRevokedKey, "b2", "Bob", "y"),
            ],
            false,
        );
        let value: serde_json::Value = serde_json::from_str(&render_json(&v).unwrap()).unwrap();
        let legend = value["legend"].as_object().unwrap();

        assert_eq!(legend.len(), 2);
        assert_eq!(legend["good"], "good signature");
        assert_eq!(legend["good_revoked_key"], "good signature, revoked key");
        assert!(!legend.contains_key("no_signature"));
    }

    #[test]
    fn test_json_report_is_deterministic_for_fixed_time() {
        let v = verdict(&[(SignatureCode::Good, "a1", "Alice", "x")], false);
        let at = Utc::now();
        assert_eq!(render_json_at(&v, at).unwrap(), render_json_at(&v, at).unwrap());
    }
}
