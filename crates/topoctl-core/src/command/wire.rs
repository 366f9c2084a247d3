// ── Policy line encoding ──
//
// `<tag> <field> <field> ...`, fields in variant declaration order:
//
//   address <device> <interface> <cidr>
//   flow    <name> <src_ip> <dst_ip> <protocol> <src_port> <dst_port>
//   block   <target> <flow>
//   route   <device> <flow> <interface>
//   zone    <device> <zone>
//   disable <device> <interface>
//
// The execution queue parses these positionally. Changing a tag or the
// field order is a protocol change.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::model::policy::parse_cidr;
use crate::model::{Policy, PolicyKind};

/// Encode a policy as one command-protocol line (no trailing newline).
pub fn serialize(policy: &Policy) -> String {
    policy.to_string()
}

/// Number of fields following the tag for each variant.
pub fn arity(kind: PolicyKind) -> usize {
    match kind {
        PolicyKind::Address | PolicyKind::Route => 3,
        PolicyKind::Flow => 6,
        PolicyKind::Block | PolicyKind::Zone | PolicyKind::Disable => 2,
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.kind();
        match self {
            Self::Address {
                device,
                interface,
                address,
            } => write!(f, "{tag} {device} {interface} {address}"),
            Self::Flow {
                name,
                src_ip,
                dst_ip,
                protocol,
                src_port,
                dst_port,
            } => write!(
                f,
                "{tag} {name} {src_ip} {dst_ip} {protocol} {src_port} {dst_port}"
            ),
            Self::Block { target, flow } => write!(f, "{tag} {target} {flow}"),
            Self::Route {
                device,
                flow,
                interface,
            } => write!(f, "{tag} {device} {flow} {interface}"),
            Self::Zone { device, zone } => write!(f, "{tag} {device} {zone}"),
            Self::Disable { device, interface } => write!(f, "{tag} {device} {interface}"),
        }
    }
}

impl FromStr for Policy {
    type Err = CoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        parse_tokens(line, &tokens)
    }
}

/// Parse a tag followed by exactly the variant's fields.
pub(crate) fn parse_tokens(line: &str, tokens: &[&str]) -> Result<Policy, CoreError> {
    let (tag, fields) = tokens
        .split_first()
        .ok_or_else(|| CoreError::malformed(line, "empty policy"))?;
    let kind = parse_kind(tag)?;
    if fields.len() != arity(kind) {
        return Err(CoreError::malformed(
            line,
            format!(
                "{kind} takes {} fields, got {}",
                arity(kind),
                fields.len()
            ),
        ));
    }

    let policy = match (kind, fields) {
        (PolicyKind::Address, [device, interface, address]) => Policy::Address {
            device: (*device).to_owned(),
            interface: parse_interface(line, interface)?,
            address: parse_cidr(address)
                .ok_or_else(|| CoreError::malformed(line, format!("bad address {address:?}")))?,
        },
        (PolicyKind::Flow, [name, src_ip, dst_ip, protocol, src_port, dst_port]) => {
            Policy::Flow {
                name: (*name).to_owned(),
                src_ip: src_ip.parse().map_err(|e| CoreError::malformed(line, e))?,
                dst_ip: dst_ip.parse().map_err(|e| CoreError::malformed(line, e))?,
                protocol: (*protocol).to_owned(),
                src_port: src_port.parse().map_err(|e| CoreError::malformed(line, e))?,
                dst_port: dst_port.parse().map_err(|e| CoreError::malformed(line, e))?,
            }
        }
        (PolicyKind::Block, [target, flow]) => Policy::Block {
            target: (*target).to_owned(),
            flow: (*flow).to_owned(),
        },
        (PolicyKind::Route, [device, flow, interface]) => Policy::Route {
            device: (*device).to_owned(),
            flow: (*flow).to_owned(),
            interface: parse_interface(line, interface)?,
        },
        (PolicyKind::Zone, [device, zone]) => Policy::Zone {
            device: (*device).to_owned(),
            zone: (*zone).to_owned(),
        },
        (PolicyKind::Disable, [device, interface]) => Policy::Disable {
            device: (*device).to_owned(),
            interface: parse_interface(line, interface)?,
        },
        _ => return Err(CoreError::malformed(line, "field count mismatch")),
    };
    Ok(policy)
}

pub(crate) fn parse_kind(tag: &str) -> Result<PolicyKind, CoreError> {
    tag.parse().map_err(|_| CoreError::UnknownPolicyVariant {
        tag: tag.to_owned(),
    })
}

fn parse_interface(line: &str, raw: &str) -> Result<u32, CoreError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::malformed(
            line,
            format!("interface must be a non-negative integer, got {raw:?}"),
        ));
    }
    raw.parse()
        .map_err(|_| CoreError::malformed(line, format!("interface {raw} out of range")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{AddressMatch, PortMatch};

    fn samples() -> Vec<Policy> {
        vec![
            Policy::Address {
                device: "R1".into(),
                interface: 0,
                address: "192.168.1.1/24".parse().unwrap(),
            },
            Policy::Flow {
                name: "web".into(),
                src_ip: "10.0.0.0/8".parse().unwrap(),
                dst_ip: AddressMatch::Any,
                protocol: "6".into(),
                src_port: PortMatch::Any,
                dst_port: PortMatch::Port(80),
            },
            Policy::Block {
                target: "dmz".into(),
                flow: "web".into(),
            },
            Policy::Route {
                device: "R2".into(),
                flow: "web".into(),
                interface: 3,
            },
            Policy::Zone {
                device: "R1".into(),
                zone: "dmz".into(),
            },
            Policy::Disable {
                device: "S1".into(),
                interface: 1,
            },
        ]
    }

    #[test]
    fn encodes_fixed_field_order() {
        let lines = samples().iter().map(serialize).collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                "address R1 0 192.168.1.1/24",
                "flow web 10.0.0.0/8 * 6 * 80",
                "block dmz web",
                "route R2 web 3",
                "zone R1 dmz",
                "disable S1 1",
            ]
        );
    }

    #[test]
    fn every_variant_survives_a_round_trip() {
        for policy in samples() {
            let line = serialize(&policy);
            let parsed: Policy = line.parse().unwrap();
            assert_eq!(parsed, policy, "{line}");
        }
    }

    #[test]
    fn zone_line() {
        let zone = Policy::Zone {
            device: "R1".into(),
            zone: "dmz".into(),
        };
        insta::assert_snapshot!(serialize(&zone), @"zone R1 dmz");
    }

    #[test]
    fn unknown_tag_is_unknown_variant() {
        let err = "nat R1 eth0".parse::<Policy>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownPolicyVariant { ref tag } if tag == "nat"));
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let err = "zone R1".parse::<Policy>().unwrap_err();
        assert!(matches!(err, CoreError::MalformedCommand { .. }));
        assert!("zone R1 dmz extra".parse::<Policy>().is_err());
    }

    #[test]
    fn bad_fields_are_malformed() {
        for line in [
            "address R1 -1 10.0.0.1/24",
            "address R1 0 10.0.0.1",
            "route R1 web x",
            "flow web any * 6 * 80",
            "flow web * * 6 * 70000",
            "",
        ] {
            assert!(
                matches!(line.parse::<Policy>(), Err(CoreError::MalformedCommand { .. })),
                "{line:?} should be malformed"
            );
        }
    }
}
