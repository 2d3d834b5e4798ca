//! Parsers for `gpg --list-secret-keys` output.
//!
//! GnuPG prints secret keys in two textual dialects:
//!
//! - **Modern** (GnuPG 2.1 and later): the algorithm and creation date sit on
//!   the `sec` line and the full fingerprint follows on its own line.
//!
//!   ```text
//!   sec   rsa4096 2020-01-01 [SC] [expires: 2025-01-01]
//!         ABCDEF0123456789ABCDEF0123456789ABCDEF01
//!   uid           [ultimate] Alice <alice@example.com>
//!   ```
//!
//! - **Classic** (GnuPG 1.x, still shipped by some Git distributions): size,
//!   algorithm letter and short key id share one token.
//!
//!   ```text
//!   sec   4096R/ABCDEF01 2020-01-01 [expires: 2025-01-01]
//!   uid                  Alice <alice@example.com>
//!   ```
//!
//! The dialect is detected once from `gpg --version` and the matching
//! [`KeyListingParser`] is selected through [`parser_for`].

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One secret key as listed by gpg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretKey {
    /// Fingerprint (modern) or key id (classic); usable with `--send-key`.
    pub id: String,
    pub algorithm: String,
    pub created: String,
    /// `None` when the key never expires.
    pub expires: Option<String>,
    pub user_ids: Vec<String>,
}

impl SecretKey {
    /// Whether any user id carries `email`.
    pub fn matches_email(&self, email: &str) -> bool {
        let needle = format!("<{}>", email.to_ascii_lowercase());
        self.user_ids
            .iter()
            .any(|uid| uid.to_ascii_lowercase().contains(&needle))
    }
}

/// Textual shape of the key listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyListingDialect {
    Classic,
    Modern,
}

impl KeyListingDialect {
    /// Detect the dialect from the first line of `gpg --version`.
    pub fn from_version_output(output: &str) -> Option<Self> {
        static VERSION: OnceLock<Regex> = OnceLock::new();
        let re = VERSION.get_or_init(|| {
            Regex::new(r"\(GnuPG[^)]*\)\s+(\d+)\.(\d+)").expect("valid version regex")
        });

        let caps = re.captures(output)?;
        let major: u32 = caps[1].parse().ok()?;
        let minor: u32 = caps[2].parse().ok()?;
        if (major, minor) >= (2, 1) {
            Some(KeyListingDialect::Modern)
        } else {
            Some(KeyListingDialect::Classic)
        }
    }
}

/// Parser for one key-listing dialect.
pub trait KeyListingParser: Send + Sync {
    fn dialect(&self) -> KeyListingDialect;

    /// Parse the lines of one blank-line separated block. Blocks that do not
    /// describe a secret key (headers, stray output) yield `None`.
    fn parse_block(&self, lines: &[&str]) -> Option<SecretKey>;

    /// Parse a full listing into keys, in listing order.
    fn parse(&self, output: &str) -> Vec<SecretKey> {
        let mut keys = Vec::new();
        let mut block: Vec<&str> = Vec::new();
        for line in output.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if let Some(key) = self.parse_block(&block) {
                    keys.push(key);
                }
                block.clear();
            } else {
                block.push(line);
            }
        }
        keys
    }
}

/// Select the parser for `dialect`.
pub fn parser_for(dialect: KeyListingDialect) -> Box<dyn KeyListingParser> {
    match dialect {
        KeyListingDialect::Classic => Box::new(ClassicListing),
        KeyListingDialect::Modern => Box::new(ModernListing),
    }
}

fn user_ids(lines: &[&str]) -> Vec<String> {
    static UID: OnceLock<Regex> = OnceLock::new();
    let re = UID.get_or_init(|| {
        Regex::new(r"^uid\s+(?:\[[^\]]*\]\s+)?(.+?)\s*$").expect("valid uid regex")
    });
    lines
        .iter()
        .filter_map(|line| re.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn sec_line<'a>(lines: &[&'a str]) -> Option<(usize, &'a str)> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.starts_with("sec"))
        .map(|(i, line)| (i, *line))
}

/// GnuPG 2.1+ listing.
pub struct ModernListing;

impl KeyListingParser for ModernListing {
    fn dialect(&self) -> KeyListingDialect {
        KeyListingDialect::Modern
    }

    fn parse_block(&self, lines: &[&str]) -> Option<SecretKey> {
        static SEC: OnceLock<Regex> = OnceLock::new();
        let re = SEC.get_or_init(|| {
            Regex::new(
                r"^sec[#>]?\s+(\S+)\s+(\d{4}-\d{2}-\d{2})\s+\[[A-Z]+\](?:\s+\[expires:\s*([^\]]+)\])?",
            )
            .expect("valid sec regex")
        });

        let (index, sec) = sec_line(lines)?;
        let caps = re.captures(sec)?;
        let (algorithm, short_id) = match caps[1].split_once('/') {
            Some((algo, id)) => (algo.to_string(), Some(id.to_string())),
            None => (caps[1].to_string(), None),
        };

        // The fingerprint line is indented and has no record-type prefix.
        let fingerprint = lines
            .get(index + 1)
            .map(|line| line.trim())
            .filter(|line| line.chars().all(|c| c.is_ascii_hexdigit()) && !line.is_empty())
            .map(str::to_string);

        Some(SecretKey {
            id: fingerprint.or(short_id)?,
            algorithm,
            created: caps[2].to_string(),
            expires: caps.get(3).map(|m| m.as_str().trim().to_string()),
            user_ids: user_ids(lines),
        })
    }
}

/// GnuPG 1.x listing.
pub struct ClassicListing;

impl KeyListingParser for ClassicListing {
    fn dialect(&self) -> KeyListingDialect {
        KeyListingDialect::Classic
    }

    fn parse_block(&self, lines: &[&str]) -> Option<SecretKey> {
        static SEC: OnceLock<Regex> = OnceLock::new();
        let re = SEC.get_or_init(|| {
            Regex::new(
                r"^sec[#>]?\s+(\S+)/([0-9A-Fa-f]+)\s+(\d{4}-\d{2}-\d{2})(?:\s+\[expires:\s*([^\]]+)\])?",
            )
            .expect("valid sec regex")
        });

        let (_, sec) = sec_line(lines)?;
        let caps = re.captures(sec)?;
        Some(SecretKey {
            id: caps[2].to_string(),
            algorithm: caps[1].to_string(),
            created: caps[3].to_string(),
            expires: caps.get(4).map(|m| m.as_str().trim().to_string()),
            user_ids: user_ids(lines),
        })
    }
}
