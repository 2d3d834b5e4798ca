//! Parsing of `git log --pretty=format:%G? %h %aN\t%s` lines.

use crate::domain::{AuditError, CommitRecord, Result, SignatureCode};

/// Parse one log line into a [`CommitRecord`].
///
/// Expected shape: `<code> <hash> <author>\t<subject>`. The hash is the first
/// space-delimited token after the code; the author is everything between the
/// hash and the first tab (it may contain spaces); the subject is everything
/// after the first tab. Any deviation is a [`AuditError::MalformedLogLine`].
pub fn classify_line(line: &str) -> Result<CommitRecord> {
    let code_char = line
        .chars()
        .next()
        .ok_or_else(|| AuditError::malformed(line, "empty line"))?;
    let signature = SignatureCode::from_code(code_char)
        .ok_or_else(|| AuditError::malformed(line, "unknown signature code"))?;

    let rest = line[code_char.len_utf8()..]
        .strip_prefix(' ')
        .ok_or_else(|| AuditError::malformed(line, "missing space after signature code"))?;

    let (details, subject) = rest
        .split_once('\t')
        .ok_or_else(|| AuditError::malformed(line, "missing tab before subject"))?;

    let (hash, author) = details
        .split_once(' ')
        .ok_or_else(|| AuditError::malformed(line, "missing author"))?;

    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AuditError::malformed(line, "hash is not hexadecimal"));
    }

    Ok(CommitRecord::new(signature, hash, author, subject))
}
