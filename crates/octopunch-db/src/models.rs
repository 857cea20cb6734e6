//! Rust models matching the database schema.
//!
//! [`VcenterInfo`] is the stored record. [`NewVcenter`], [`VcenterUpdate`] and
//! [`VcenterFilters`] are the inputs a caller hands to the facade for create,
//! partial update and filtered listing.

use chrono::{DateTime, Utc};
use octopunch_common::VcenterId;
use serde::{Deserialize, Deserializer, Serialize};

/// Default HTTPS port of a vCenter endpoint.
pub const DEFAULT_VCENTER_PORT: i64 = 443;

/// Status assigned to newly registered vCenters.
pub const DEFAULT_VCENTER_STATUS: &str = "available";

/// A registered vCenter connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VcenterInfo {
    pub id: VcenterId,
    pub name: String,
    pub host: String,
    pub port: i64,
    pub username: String,
    pub password: String,
    pub datacenter: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Field values for registering a vCenter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVcenter {
    /// Caller-chosen identifier; one is generated when absent.
    #[serde(default)]
    pub id: Option<VcenterId>,
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: i64,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_port() -> i64 {
    DEFAULT_VCENTER_PORT
}

impl NewVcenter {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            host: host.into(),
            port: DEFAULT_VCENTER_PORT,
            username: username.into(),
            password: password.into(),
            datacenter: None,
            description: None,
            status: None,
        }
    }

    pub fn with_id(mut self, id: VcenterId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_port(mut self, port: i64) -> Self {
        self.port = port;
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A partial update. Only fields set to `Some` are written.
///
/// `datacenter` and `description` are nullable columns, so `Some(None)`
/// clears them. In serialized form an explicit `null` clears and an absent
/// key leaves the column alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VcenterUpdate {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
}

/// Wrap any value that is present, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl VcenterUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Equality criteria for listing vCenters. Unset fields match anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VcenterFilters {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub username: Option<String>,
    pub datacenter: Option<String>,
    pub status: Option<String>,
}

impl VcenterFilters {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether `vcenter` satisfies every set criterion.
    pub fn matches(&self, vcenter: &VcenterInfo) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().map_or(true, |w| w == have)
        }

        eq(&self.name, &vcenter.name)
            && eq(&self.host, &vcenter.host)
            && eq(&self.port, &vcenter.port)
            && eq(&self.username, &vcenter.username)
            && self
                .datacenter
                .as_ref()
                .map_or(true, |dc| vcenter.datacenter.as_ref() == Some(dc))
            && eq(&self.status, &vcenter.status)
    }
}
