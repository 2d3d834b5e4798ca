//! Contributor manifest
//!
//! The manifest is the `contributors` array of the project's `package.json`.
//! It is loaded once into a [`ContributorManifest`] value, handed to the
//! workflow that needs it and written back explicitly with
//! [`ContributorManifest::save`]. Every other field of the document is kept
//! as-is, in its original order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::error::KeysError;
use crate::Result;

/// Default manifest file, relative to the repository root.
pub const DEFAULT_MANIFEST: &str = "package.json";

/// Key server used when none is given.
pub const DEFAULT_KEY_SERVER: &str = "hkp://keys.gnupg.net";

/// One contributor record: `{ name, email, key }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// `<key-server-url>#<key-id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Fields this tool does not manage (`url`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contributor {
    pub fn new(name: impl Into<String>, email: impl Into<String>, key: Option<KeyReference>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            key: key.map(|k| k.to_string()),
            extra: Map::new(),
        }
    }

    /// Parsed key reference, if the contributor has a key field.
    pub fn key_reference(&self) -> Option<Result<KeyReference>> {
        self.key.as_deref().map(|value| {
            value
                .parse::<KeyReference>()
                .map_err(|_| KeysError::InvalidKeyReference {
                    name: self.name.clone(),
                    value: value.to_string(),
                })
        })
    }

    fn same_identity(&self, other: &Contributor) -> bool {
        self.name == other.name && self.email == other.email
    }
}

/// Where a contributor's public key can be fetched: `<server>#<key-id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReference {
    pub server: String,
    pub key_id: String,
}

impl KeyReference {
    pub fn new(server: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            key_id: key_id.into(),
        }
    }
}

impl FromStr for KeyReference {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('#') {
            Some((server, key_id)) if !server.is_empty() && !key_id.is_empty() => {
                Ok(KeyReference::new(server, key_id))
            }
            _ => Err(()),
        }
    }
}

impl fmt::Display for KeyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.server, self.key_id)
    }
}

/// A manifest entry. npm also allows `"Name <email>"` strings; those are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContributorEntry {
    Record(Contributor),
    Other(Value),
}

/// Whether an upsert added a new contributor or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// The loaded manifest document.
#[derive(Debug, Clone)]
pub struct ContributorManifest {
    path: PathBuf,
    document: Map<String, Value>,
    entries: Vec<ContributorEntry>,
}

impl ContributorManifest {
    /// Load the manifest at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeysError::ManifestNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(path, &content)
    }

    /// Parse manifest content that will later be saved to `path`.
    pub fn from_json(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let document = match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => map,
            _ => {
                return Err(KeysError::InvalidManifest(
                    "top level is not a JSON object".to_string(),
                ))
            }
        };

        let entries = match document.get("contributors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<ContributorEntry>, _>>()?,
            Some(_) => {
                return Err(KeysError::InvalidManifest(
                    "`contributors` is not an array".to_string(),
                ))
            }
        };

        let path = path.into();
        debug!(path = %path.display(), contributors = entries.len(), "loaded manifest");
        Ok(Self {
            path,
            document,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ContributorEntry] {
        &self.entries
    }

    /// Structured contributor records, in manifest order.
    pub fn contributors(&self) -> impl Iterator<Item = &Contributor> {
        self.entries.iter().filter_map(|entry| match entry {
            ContributorEntry::Record(c) => Some(c),
            ContributorEntry::Other(_) => None,
        })
    }

    /// Replace the record with the same name and email, or append.
    ///
    /// An existing record keeps its unmanaged fields; `key` is overwritten
    /// only when the incoming record has one.
    pub fn upsert(&mut self, contributor: Contributor) -> UpsertOutcome {
        for entry in &mut self.entries {
            if let ContributorEntry::Record(existing) = entry {
                if existing.same_identity(&contributor) {
                    if contributor.key.is_some() {
                        existing.key = contributor.key;
                    }
                    existing.extra.extend(contributor.extra);
                    return UpsertOutcome::Updated;
                }
            }
        }
        self.entries.push(ContributorEntry::Record(contributor));
        UpsertOutcome::Added
    }

    /// Full document with the current contributor list.
    pub fn to_json(&self) -> Result<String> {
        let mut document = self.document.clone();
        let contributors = serde_json::to_value(&self.entries)?;
        document.insert("contributors".to_string(), contributors);
        let mut json = serde_json::to_string_pretty(&Value::Object(document))?;
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest back to where it was loaded from.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.to_json()?)?;
        debug!(path = %self.path.display(), "saved manifest");
        Ok(())
    }
}
