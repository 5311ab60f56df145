//! Shared types for vCloud Director management.

use serde::{Deserialize, Serialize};

use crate::xml::XmlElement;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level configuration for connecting to a vCloud Director cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcloudConfig {
    /// vCD cell hostname / IP (e.g. "vcd.lab.local")
    pub host: String,
    /// Port (default 443)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username (e.g. "admin")
    pub username: String,
    /// Organization to authenticate against ("System" for the provider org)
    pub org: String,
    /// Password
    pub password: String,
    /// Skip TLS certificate verification (self-signed labs)
    #[serde(default)]
    pub insecure: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 { 443 }
fn default_timeout() -> u64 { 30 }

impl Default for VcloudConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 443,
            username: String::new(),
            org: String::new(),
            password: String::new(),
            insecure: false,
            timeout_secs: 30,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tracks an active vCD API session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcloudSession {
    pub host: String,
    pub username: String,
    /// Organization the session was authenticated against.
    pub org: String,
    pub connected_at: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Power state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Entity status codes as reported by the `status` attribute on vCD
/// entity representations (vApps and VMs).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    FailedCreation,
    Unresolved,
    Resolved,
    Deployed,
    Suspended,
    PoweredOn,
    WaitingForInput,
    Unknown,
    Unrecognized,
    PoweredOff,
    InconsistentState,
    MixedChildren,
}

impl PowerState {
    /// Map a raw `status` attribute code to a power state.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::FailedCreation,
            0 => Self::Unresolved,
            1 => Self::Resolved,
            2 => Self::Deployed,
            3 => Self::Suspended,
            4 => Self::PoweredOn,
            5 => Self::WaitingForInput,
            6 => Self::Unknown,
            8 => Self::PoweredOff,
            9 => Self::InconsistentState,
            10 => Self::MixedChildren,
            _ => Self::Unrecognized,
        }
    }

    /// The numeric `status` code for this state.
    pub fn code(&self) -> i32 {
        match self {
            Self::FailedCreation => -1,
            Self::Unresolved => 0,
            Self::Resolved => 1,
            Self::Deployed => 2,
            Self::Suspended => 3,
            Self::PoweredOn => 4,
            Self::WaitingForInput => 5,
            Self::Unknown => 6,
            Self::Unrecognized => 7,
            Self::PoweredOff => 8,
            Self::InconsistentState => 9,
            Self::MixedChildren => 10,
        }
    }
}

impl Default for PowerState {
    fn default() -> Self { Self::Unknown }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Media types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// vCD media-type markers carried in `type` attributes and query formats.
pub mod media_type {
    pub const VAPP: &str = "application/vnd.vmware.vcloud.vApp+xml";
    pub const VDC: &str = "application/vnd.vmware.vcloud.vdc+xml";
    pub const METADATA: &str = "application/vnd.vmware.vcloud.metadata+xml";
    pub const QUERY_RECORDS: &str = "application/vnd.vmware.vcloud.query.records+xml";
    pub const QUERY_REFERENCES: &str = "application/vnd.vmware.vcloud.query.references+xml";
    pub const QUERY_ID_RECORDS: &str = "application/vnd.vmware.vcloud.query.idrecords+xml";
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Name + href pair identifying a remote entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub name: String,
    pub href: String,
}

impl EntityRef {
    /// Build a reference from a query result record's attributes.
    pub(crate) fn from_record(record: &XmlElement) -> Self {
        Self {
            name: record.attr("name").unwrap_or_default().to_string(),
            href: record.attr("href").unwrap_or_default().to_string(),
        }
    }
}

/// Deployable entity listed inside a VDC's `ResourceEntities`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub href: String,
}

/// CPU topology of a VM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmCpus {
    pub num_cpus: u32,
    pub num_cores_per_socket: u32,
}

/// One network interface on a VM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmNic {
    /// Connection index within the VM's network connection section.
    pub index: i32,
    pub connected: bool,
    /// Whether this nic's index equals the section's primary index.
    pub primary: bool,
    pub adapter_type: String,
    /// Connected network name, when the connection carries one.
    #[serde(default)]
    pub network: Option<String>,
    pub ip_address_mode: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_codes_round_trip() {
        for code in -1..=10 {
            assert_eq!(PowerState::from_code(code).code(), code);
        }
    }

    #[test]
    fn power_state_only_code_four_is_on() {
        assert_eq!(PowerState::from_code(4), PowerState::PoweredOn);
        for code in [-1, 0, 1, 2, 3, 5, 6, 7, 8, 9, 10, 99] {
            assert_ne!(PowerState::from_code(code), PowerState::PoweredOn);
        }
    }

    #[test]
    fn unknown_codes_map_to_unrecognized() {
        assert_eq!(PowerState::from_code(42), PowerState::Unrecognized);
        assert_eq!(PowerState::from_code(-7), PowerState::Unrecognized);
    }

    #[test]
    fn config_defaults() {
        let config = VcloudConfig::default();
        assert_eq!(config.port, 443);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.insecure);
    }
}
