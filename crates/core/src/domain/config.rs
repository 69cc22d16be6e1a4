// Account Configuration (credentials, endpoint, nicknames)
//
// Values are validated lazily: a command only fails on the keys it needs.

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default REST endpoint
pub const DEFAULT_API_URL: &str = "https://rest.logentries.com";

/// Every key and resource id issued by the service is a 36 character UUID
pub const KEY_LENGTH: usize = 36;

const AUTH_SECTION: &str = "auth";
const URL_SECTION: &str = "url";
const LOG_NICKNAMES_SECTION: &str = "log_nicknames";
const LOG_GROUPS_SECTION: &str = "log_groups";
const QUERY_NICKNAMES_SECTION: &str = "query_nicknames";

/// `[auth]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_api_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rw_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_api_key: Option<String>,
}

/// `[url]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for UrlSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub url: UrlSection,

    #[serde(default)]
    pub log_nicknames: BTreeMap<String, String>,

    #[serde(default)]
    pub log_groups: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub query_nicknames: BTreeMap<String, String>,

    /// Where the configuration was read from (used in error messages)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AccountConfig {
    /// Configuration written when no file exists yet
    pub fn template() -> Self {
        let empty = || Some(String::new());
        Self {
            auth: AuthSection {
                account_resource_id: empty(),
                owner_api_key_id: empty(),
                owner_api_key: empty(),
                rw_api_key: empty(),
                ro_api_key: empty(),
            },
            ..Default::default()
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    fn source_display(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    fn missing(&self, section: &str, key: String) -> DomainError {
        DomainError::MissingConfigKey {
            section: section.to_string(),
            key,
            path: self.source_display(),
        }
    }

    fn invalid(&self, section: &str, key: String, value: &str) -> DomainError {
        DomainError::InvalidConfigValue {
            section: section.to_string(),
            key,
            value: value.to_string(),
            path: self.source_display(),
        }
    }

    fn auth_key<'a>(&self, value: &'a Option<String>, label: &str, name: &str) -> Result<&'a str> {
        let key = format!("{}({})", label, name);
        match value.as_deref() {
            None => Err(self.missing(AUTH_SECTION, key)),
            Some(v) if v.len() != KEY_LENGTH => Err(self.invalid(AUTH_SECTION, key, v)),
            Some(v) => Ok(v),
        }
    }

    pub fn ro_api_key(&self) -> Result<&str> {
        self.auth_key(&self.auth.ro_api_key, "Read-only API key", "ro_api_key")
    }

    pub fn rw_api_key(&self) -> Result<&str> {
        self.auth_key(&self.auth.rw_api_key, "Read/Write API key", "rw_api_key")
    }

    pub fn owner_api_key(&self) -> Result<&str> {
        self.auth_key(&self.auth.owner_api_key, "Owner API key", "owner_api_key")
    }

    pub fn owner_api_key_id(&self) -> Result<&str> {
        self.auth_key(
            &self.auth.owner_api_key_id,
            "Owner API key ID",
            "owner_api_key_id",
        )
    }

    pub fn account_resource_id(&self) -> Result<&str> {
        self.auth_key(
            &self.auth.account_resource_id,
            "Account Resource ID",
            "account_resource_id",
        )
    }

    /// Base REST url without a trailing slash
    pub fn api_url(&self) -> Result<&str> {
        let url = self.url.api_url.trim_end_matches('/');
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(url),
            _ => Err(DomainError::InvalidApiUrl {
                value: self.url.api_url.clone(),
                section: URL_SECTION.to_string(),
                path: self.source_display(),
            }),
        }
    }

    /// Look up a log key by nickname (case-insensitive)
    pub fn named_log_key(&self, name: &str) -> Result<Vec<String>> {
        let name = name.to_lowercase();
        let key = format!("Named Logkey({})", name);
        match lookup(&self.log_nicknames, &name) {
            None => Err(self.missing(LOG_NICKNAMES_SECTION, key)),
            Some(v) if v.len() != KEY_LENGTH => Err(self.invalid(LOG_NICKNAMES_SECTION, key, v)),
            Some(v) => Ok(vec![v.clone()]),
        }
    }

    /// Look up a group of log keys by name (case-insensitive)
    pub fn named_log_group(&self, name: &str) -> Result<Vec<String>> {
        let name = name.to_lowercase();
        let key = format!("Named Logkey Group({})", name);
        let group = lookup(&self.log_groups, &name)
            .ok_or_else(|| self.missing(LOG_GROUPS_SECTION, key.clone()))?;

        if let Some(bad) = group.iter().find(|k| k.len() != KEY_LENGTH) {
            return Err(self.invalid(LOG_GROUPS_SECTION, key, bad));
        }
        Ok(group.clone())
    }

    /// Look up a LEQL statement by nickname (case-insensitive)
    pub fn named_query(&self, name: &str) -> Result<String> {
        let name = name.to_lowercase();
        lookup(&self.query_nicknames, &name)
            .cloned()
            .ok_or_else(|| self.missing(QUERY_NICKNAMES_SECTION, format!("Named Query({})", name)))
    }
}

/// Case-insensitive lookup; `name` must already be lowercased
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| key.to_lowercase() == name)
            .map(|(_, value)| value)
    })
}
