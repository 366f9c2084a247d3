// ── Policy domain types ──
//
// `Policy` is a closed set of variants. Each variant's field order is the
// order the command protocol writes them in (see `command::wire`).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Type tag of a policy variant, as written on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PolicyKind {
    Address,
    Flow,
    Block,
    Route,
    Zone,
    Disable,
}

/// A network policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Policy {
    /// Configure `address` on the device's `interface`-th port.
    Address {
        device: String,
        interface: u32,
        address: Ipv4Net,
    },
    /// Name a traffic class for other policies to reference.
    Flow {
        name: String,
        src_ip: AddressMatch,
        dst_ip: AddressMatch,
        protocol: String,
        src_port: PortMatch,
        dst_port: PortMatch,
    },
    /// Drop a flow on a device, or on every device of a zone.
    Block { target: String, flow: String },
    /// Forward a flow out of the device's `interface`-th port.
    Route {
        device: String,
        flow: String,
        interface: u32,
    },
    /// Put a device into a named zone.
    Zone { device: String, zone: String },
    /// Administratively disable the device's `interface`-th port.
    Disable { device: String, interface: u32 },
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Address { .. } => PolicyKind::Address,
            Self::Flow { .. } => PolicyKind::Flow,
            Self::Block { .. } => PolicyKind::Block,
            Self::Route { .. } => PolicyKind::Route,
            Self::Zone { .. } => PolicyKind::Zone,
            Self::Disable { .. } => PolicyKind::Disable,
        }
    }

    /// The device this policy is attached to, if it names one directly.
    /// Block targets may be a zone and are reported too.
    pub fn device(&self) -> Option<&str> {
        match self {
            Self::Address { device, .. }
            | Self::Route { device, .. }
            | Self::Zone { device, .. }
            | Self::Disable { device, .. } => Some(device),
            Self::Block { target, .. } => Some(target),
            Self::Flow { .. } => None,
        }
    }

    pub(crate) fn device_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Address { device, .. }
            | Self::Route { device, .. }
            | Self::Zone { device, .. }
            | Self::Disable { device, .. } => Some(device),
            Self::Block { target, .. } => Some(target),
            Self::Flow { .. } => None,
        }
    }
}

// ── Flow match fields ───────────────────────────────────────────────

/// Source/destination address of a flow: any, or an IPv4 prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AddressMatch {
    #[default]
    Any,
    Net(Ipv4Net),
}

impl fmt::Display for AddressMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Net(net) => write!(f, "{net}"),
        }
    }
}

impl FromStr for AddressMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(Self::Any);
        }
        parse_cidr(s)
            .map(Self::Net)
            .ok_or_else(|| format!("expected '*' or A.B.C.D/prefix, got {s:?}"))
    }
}

impl TryFrom<String> for AddressMatch {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AddressMatch> for String {
    fn from(m: AddressMatch) -> Self {
        m.to_string()
    }
}

/// Source/destination port of a flow: any, or a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PortMatch {
    #[default]
    Any,
    Port(u16),
}

impl fmt::Display for PortMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Port(port) => write!(f, "{port}"),
        }
    }
}

impl FromStr for PortMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(Self::Any);
        }
        parse_port(s)
            .map(Self::Port)
            .ok_or_else(|| format!("expected '*' or a port in 0-65535, got {s:?}"))
    }
}

impl TryFrom<String> for PortMatch {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PortMatch> for String {
    fn from(m: PortMatch) -> Self {
        m.to_string()
    }
}

pub const WILDCARD: &str = "*";

/// Parse `A.B.C.D/prefix` notation (octets 0-255, prefix 0-32).
///
/// Octets are plain decimal and may carry leading zeros (`010.0.0.1/8`).
pub fn parse_cidr(s: &str) -> Option<Ipv4Net> {
    let (addr, prefix) = s.split_once('/')?;
    let prefix = u8::try_from(parse_decimal(prefix)?).ok()?;
    let mut octets = [0u8; 4];
    let mut parts = addr.split('.');
    for octet in &mut octets {
        *octet = u8::try_from(parse_decimal(parts.next()?)?).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Ipv4Net::new(Ipv4Addr::from(octets), prefix).ok()
}

// Unsigned decimal of at most three digits.
fn parse_decimal(s: &str) -> Option<u16> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a decimal port number without sign or whitespace.
pub fn parse_port(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ── PolicyId ────────────────────────────────────────────────────────

/// Synthetic identity assigned to a policy when it enters a store.
///
/// Two policies with identical payloads are still distinct entries; edits
/// and deletes address the entry, never the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(Uuid);

impl PolicyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PolicyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PolicyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
