use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Development databases are named `dev-<suffix>-<production-name>`.
///
/// The pattern is unanchored and the capture is greedy, so a database such as
/// `dev-a-b-c` yields `b-c`. Suffixes containing hyphens are therefore
/// ambiguous; callers must not try to repair that here.
static DEV_DATABASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dev-[^-]+-(.+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    Production,
    Development,
    /// Anything the backend reports that is neither of the above, including
    /// a missing or null `type`.
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Unknown => "unknown",
        }
    }
}

/// One managed Odoo deployment as reported by `GET /api/instances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: InstanceKind,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
}

fn deserialize_kind<'de, D>(deserializer: D) -> Result<InstanceKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<InstanceKind>::deserialize(deserializer)?.unwrap_or_default())
}

impl Instance {
    pub fn is_production(&self) -> bool {
        self.kind == InstanceKind::Production
    }

    pub fn is_development(&self) -> bool {
        self.kind == InstanceKind::Development
    }

    /// See [`derived_production_name`].
    pub fn derived_production_name(&self) -> Option<&str> {
        derived_production_name(self)
    }
}

/// Name of the production instance a development instance was cloned from,
/// recovered from its database name. `None` when there is no database or it
/// does not follow the `dev-<suffix>-<production>` convention.
pub fn derived_production_name(instance: &Instance) -> Option<&str> {
    let database = instance.database.as_deref()?;
    DEV_DATABASE_REGEX
        .captures(database)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Normalize a user-typed instance name: lowercase, then drop every character
/// outside `[a-z0-9-]`. Non-conforming characters are stripped, never rejected.
pub fn sanitize_instance_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OdooVersion {
    #[default]
    #[serde(rename = "19")]
    V19,
    #[serde(rename = "18")]
    V18,
}

impl OdooVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V19 => "19",
            Self::V18 => "18",
        }
    }
}

impl FromStr for OdooVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "19" => Ok(Self::V19),
            "18" => Ok(Self::V18),
            _ => Err(format!("Unsupported Odoo version: {} (expected 19 or 18)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OdooEdition {
    #[default]
    Enterprise,
    Community,
}

impl OdooEdition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Community => "community",
        }
    }
}

impl FromStr for OdooEdition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enterprise" => Ok(Self::Enterprise),
            "community" => Ok(Self::Community),
            _ => Err(format!("Invalid edition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMethod {
    #[default]
    Letsencrypt,
    Cloudflare,
    Http,
}

impl SslMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Letsencrypt => "letsencrypt",
            Self::Cloudflare => "cloudflare",
            Self::Http => "http",
        }
    }
}

impl FromStr for SslMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "letsencrypt" => Ok(Self::Letsencrypt),
            "cloudflare" => Ok(Self::Cloudflare),
            "http" => Ok(Self::Http),
            _ => Err(format!("Invalid SSL method: {}", s)),
        }
    }
}

impl fmt::Display for SslMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for `POST /api/instances/production`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductionInstance {
    pub name: String,
    pub version: OdooVersion,
    pub edition: OdooEdition,
    pub ssl_method: SslMethod,
}

impl NewProductionInstance {
    /// Build a request from raw user input. The name is sanitized on entry.
    pub fn new(raw_name: &str) -> Self {
        Self {
            name: sanitize_instance_name(raw_name),
            version: OdooVersion::default(),
            edition: OdooEdition::default(),
            ssl_method: SslMethod::default(),
        }
    }

    pub fn with_version(mut self, version: OdooVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_edition(mut self, edition: OdooEdition) -> Self {
        self.edition = edition;
        self
    }

    pub fn with_ssl_method(mut self, ssl_method: SslMethod) -> Self {
        self.ssl_method = ssl_method;
        self
    }

    /// Public hostname the instance will be served on.
    pub fn domain_preview(&self, domain_suffix: &str) -> String {
        format!("{}.{}", self.name, domain_suffix)
    }

    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
