//! Hosting-provider deep links for uploading a public key.

use regex::Regex;
use std::sync::OnceLock;

/// Providers with a known GPG key settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingProvider {
    GitHub,
    GitLab,
}

impl HostingProvider {
    /// Recognise the provider from a host name (self-hosted included).
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        if host.contains("github") {
            Some(HostingProvider::GitHub)
        } else if host.contains("gitlab") {
            Some(HostingProvider::GitLab)
        } else {
            None
        }
    }

    pub fn key_settings_url(self, host: &str) -> String {
        match self {
            HostingProvider::GitHub => format!("https://{host}/settings/keys"),
            HostingProvider::GitLab => format!("https://{host}/profile/gpg_keys"),
        }
    }
}

/// Host part of a git remote URL (`https://`, `ssh://` or scp-like).
pub fn remote_host(url: &str) -> Option<String> {
    static URL: OnceLock<Regex> = OnceLock::new();
    static SCP: OnceLock<Regex> = OnceLock::new();
    let url_re = URL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://(?:[^@/]+@)?([^:/]+)").expect("valid url regex")
    });
    let scp_re = SCP.get_or_init(|| {
        Regex::new(r"^(?:[^@/]+@)?([^:/]+):[^/]").expect("valid scp regex")
    });

    let url = url.trim();
    url_re
        .captures(url)
        .or_else(|| scp_re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Key settings page for the given remote URL, if its provider is known.
pub fn key_settings_link(remote_url: &str) -> Option<String> {
    let host = remote_host(remote_url)?;
    HostingProvider::from_host(&host).map(|provider| provider.key_settings_url(&host))
}
