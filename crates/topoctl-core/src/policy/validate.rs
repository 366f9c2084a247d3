// ── Draft validation ──
//
// Validation never fails with an error. It produces a report with one entry
// per invalid field so a form can highlight exactly what to fix while the
// rest of the draft stays intact. Only the fields relevant to the selected
// kind are checked.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use indexmap::IndexSet;
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::model::policy::parse_cidr;
use crate::model::{
    AddressMatch, DeviceDraft, DeviceKind, DraftMode, PolicyDraft, PolicyKind, PortMatch, Topology,
};

/// Per-field outcome of validating a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport<F: Ord> {
    invalid: BTreeMap<F, String>,
}

impl<F: Ord> Default for ValidationReport<F> {
    fn default() -> Self {
        Self {
            invalid: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> ValidationReport<F> {
    /// True when no field was rejected.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn is_invalid(&self, field: F) -> bool {
        self.invalid.contains_key(&field)
    }

    pub fn reason(&self, field: F) -> Option<&str> {
        self.invalid.get(&field).map(String::as_str)
    }

    /// Rejected fields in declaration order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = (F, &str)> {
        self.invalid.iter().map(|(f, r)| (*f, r.as_str()))
    }

    fn reject(&mut self, field: F, reason: impl Into<String>) {
        // Keep the first reason reported for a field.
        self.invalid.entry(field).or_insert_with(|| reason.into());
    }
}

impl<F: Ord + Copy + fmt::Display> fmt::Display for ValidationReport<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("valid");
        }
        for (i, (field, reason)) in self.invalid_fields().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {reason}")?;
        }
        Ok(())
    }
}

/// Form fields of a [`PolicyDraft`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PolicyField {
    Kind,
    Device,
    Interface,
    Address,
    Name,
    SrcIp,
    DstIp,
    Protocol,
    SrcPort,
    DstPort,
    Target,
    Flow,
    Zone,
}

/// Form fields of a [`DeviceDraft`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceField {
    Kind,
    Name,
    IpAddress,
}

pub type PolicyReport = ValidationReport<PolicyField>;
pub type DeviceReport = ValidationReport<DeviceField>;

/// Validate a policy draft against the flows currently defined.
pub fn validate_policy(draft: &PolicyDraft, known_flows: &IndexSet<String>) -> PolicyReport {
    let mut report = PolicyReport::default();
    let Some(kind) = draft.kind else {
        report.reject(PolicyField::Kind, "select a policy type");
        return report;
    };

    match kind {
        PolicyKind::Address => {
            check_token(&mut report, PolicyField::Device, &draft.device);
            check_interface(&mut report, draft.interface);
            if parse_cidr(&draft.address).is_none() {
                report.reject(PolicyField::Address, "expected A.B.C.D/prefix");
            }
        }
        PolicyKind::Flow => {
            check_token(&mut report, PolicyField::Name, &draft.name);
            if draft.mode == DraftMode::Create && known_flows.contains(&draft.name) {
                report.reject(PolicyField::Name, "a flow with this name already exists");
            }
            check_address_match(&mut report, PolicyField::SrcIp, &draft.src_ip);
            check_address_match(&mut report, PolicyField::DstIp, &draft.dst_ip);
            check_token(&mut report, PolicyField::Protocol, &draft.protocol);
            check_port_match(&mut report, PolicyField::SrcPort, &draft.src_port);
            check_port_match(&mut report, PolicyField::DstPort, &draft.dst_port);
        }
        PolicyKind::Block => {
            check_token(&mut report, PolicyField::Target, &draft.target);
            check_flow_reference(&mut report, &draft.flow, known_flows);
        }
        PolicyKind::Route => {
            check_token(&mut report, PolicyField::Device, &draft.device);
            check_flow_reference(&mut report, &draft.flow, known_flows);
            check_interface(&mut report, draft.interface);
        }
        PolicyKind::Zone => {
            check_token(&mut report, PolicyField::Device, &draft.device);
            check_token(&mut report, PolicyField::Zone, &draft.zone);
        }
        PolicyKind::Disable => {
            check_token(&mut report, PolicyField::Device, &draft.device);
            check_interface(&mut report, draft.interface);
        }
    }
    report
}

/// Validate a device draft against the devices already in `topology`.
pub fn validate_device(draft: &DeviceDraft, topology: &Topology) -> DeviceReport {
    let mut report = DeviceReport::default();
    if draft.kind.is_none() {
        report.reject(DeviceField::Kind, "select a device type");
    }

    check_token(&mut report, DeviceField::Name, &draft.name);
    let renaming_to_self = draft.edit_original.as_deref() == Some(draft.name.as_str());
    if topology.contains(&draft.name) && !renaming_to_self {
        report.reject(DeviceField::Name, "a device with this name already exists");
    }

    let needs_address = draft.mode == DraftMode::Create && draft.kind == Some(DeviceKind::Classic);
    if needs_address && draft.ip_address.parse::<Ipv4Addr>().is_err() {
        report.reject(DeviceField::IpAddress, "expected A.B.C.D");
    }
    report
}

// Tokens travel on a space-separated line, so they may not contain spaces.
fn check_token<F: Ord + Copy>(report: &mut ValidationReport<F>, field: F, value: &str) {
    if value.is_empty() {
        report.reject(field, "required");
    } else if value.chars().any(char::is_whitespace) {
        report.reject(field, "must not contain whitespace");
    }
}

fn check_interface(report: &mut PolicyReport, interface: i64) {
    if interface < 0 {
        report.reject(PolicyField::Interface, "select an interface");
    } else if u32::try_from(interface).is_err() {
        report.reject(PolicyField::Interface, "interface index out of range");
    }
}

fn check_address_match(report: &mut PolicyReport, field: PolicyField, value: &str) {
    if value.parse::<AddressMatch>().is_err() {
        report.reject(field, "expected * or A.B.C.D/prefix");
    }
}

fn check_port_match(report: &mut PolicyReport, field: PolicyField, value: &str) {
    if value.parse::<PortMatch>().is_err() {
        report.reject(field, "expected * or a port in 0-65535");
    }
}

fn check_flow_reference(report: &mut PolicyReport, flow: &str, known_flows: &IndexSet<String>) {
    if flow.is_empty() {
        report.reject(PolicyField::Flow, "required");
    } else if !known_flows.contains(flow) {
        report.reject(PolicyField::Flow, format!("unknown flow {flow:?}"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Device, INTERFACE_UNSET, PolicyId};

    fn flows(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn web_flow_draft() -> PolicyDraft {
        PolicyDraft {
            name: "web".into(),
            src_ip: "10.0.0.0/8".into(),
            dst_ip: "*".into(),
            protocol: "6".into(),
            src_port: "*".into(),
            dst_port: "80".into(),
            ..PolicyDraft::create(PolicyKind::Flow)
        }
    }

    #[test]
    fn well_formed_flow_is_valid() {
        let report = validate_policy(&web_flow_draft(), &flows(&[]));
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn block_on_unknown_flow_is_invalid() {
        let draft = PolicyDraft {
            target: "R1".into(),
            flow: "nonexistent".into(),
            ..PolicyDraft::create(PolicyKind::Block)
        };
        let report = validate_policy(&draft, &flows(&["web"]));
        assert!(report.is_invalid(PolicyField::Flow));
        assert!(!report.is_valid());
        assert!(!report.is_invalid(PolicyField::Target));
    }

    #[test]
    fn unset_interface_is_always_invalid() {
        let draft = PolicyDraft {
            device: "R1".into(),
            interface: INTERFACE_UNSET,
            address: "192.168.1.1/24".into(),
            ..PolicyDraft::create(PolicyKind::Address)
        };
        let report = validate_policy(&draft, &flows(&[]));
        assert!(!report.is_valid());
        assert_eq!(
            report.invalid_fields().map(|(f, _)| f).collect::<Vec<_>>(),
            [PolicyField::Interface]
        );
    }

    #[test]
    fn address_octets_may_have_leading_zeros() {
        let draft = PolicyDraft {
            device: "R1".into(),
            interface: 0,
            address: "010.0.0.1/8".into(),
            ..PolicyDraft::create(PolicyKind::Address)
        };
        let report = validate_policy(&draft, &flows(&[]));
        assert!(report.is_valid(), "{report}");
        assert_eq!(draft.build().unwrap().to_string(), "address R1 0 10.0.0.1/8");
    }

    #[test]
    fn draft_without_kind_is_invalid() {
        let report = validate_policy(&PolicyDraft::default(), &flows(&[]));
        assert!(report.is_invalid(PolicyField::Kind));
    }

    #[test]
    fn duplicate_flow_name_only_matters_when_creating() {
        let known = flows(&["web"]);
        let created = validate_policy(&web_flow_draft(), &known);
        assert!(created.is_invalid(PolicyField::Name));

        let policy = web_flow_draft().build().unwrap();
        let edited = validate_policy(&PolicyDraft::edit(PolicyId::new(), &policy), &known);
        assert!(edited.is_valid(), "{edited}");
    }

    #[test]
    fn flow_field_syntax() {
        let draft = PolicyDraft {
            src_ip: "10.0.0.0".into(),
            dst_ip: "300.1.1.1/8".into(),
            protocol: String::new(),
            src_port: "-1".into(),
            dst_port: "65536".into(),
            ..web_flow_draft()
        };
        let report = validate_policy(&draft, &flows(&[]));
        for field in [
            PolicyField::SrcIp,
            PolicyField::DstIp,
            PolicyField::Protocol,
            PolicyField::SrcPort,
            PolicyField::DstPort,
        ] {
            assert!(report.is_invalid(field), "{field} should be invalid");
        }
        assert!(!report.is_invalid(PolicyField::Name));
    }

    #[test]
    fn port_bounds_are_inclusive() {
        let draft = PolicyDraft {
            src_port: "0".into(),
            dst_port: "65535".into(),
            ..web_flow_draft()
        };
        assert!(validate_policy(&draft, &flows(&[])).is_valid());
    }

    #[test]
    fn irrelevant_fields_are_ignored() {
        let draft = PolicyDraft {
            device: "R1".into(),
            zone: "dmz".into(),
            address: "garbage".into(),
            src_port: "garbage".into(),
            ..PolicyDraft::create(PolicyKind::Zone)
        };
        assert!(validate_policy(&draft, &flows(&[])).is_valid());
    }

    #[test]
    fn route_needs_known_flow_and_interface() {
        let draft = PolicyDraft {
            device: "R1".into(),
            flow: "web".into(),
            interface: 2,
            ..PolicyDraft::create(PolicyKind::Route)
        };
        assert!(validate_policy(&draft, &flows(&["web"])).is_valid());
        let report = validate_policy(&draft, &flows(&[]));
        assert!(report.is_invalid(PolicyField::Flow));
    }

    #[test]
    fn whitespace_in_tokens_is_rejected() {
        let draft = PolicyDraft {
            device: "R 1".into(),
            zone: "dmz".into(),
            ..PolicyDraft::create(PolicyKind::Zone)
        };
        let report = validate_policy(&draft, &flows(&[]));
        assert_eq!(report.reason(PolicyField::Device), Some("must not contain whitespace"));
    }

    #[test]
    fn report_renders_field_reasons() {
        let draft = PolicyDraft::create(PolicyKind::Disable);
        let report = validate_policy(&draft, &flows(&[]));
        insta::assert_snapshot!(report.to_string(), @"device: required; interface: select an interface");
    }

    // ── Devices ─────────────────────────────────────────────────────

    fn network() -> Topology {
        Topology::new(
            vec![
                Device::new("R1", DeviceKind::Classic),
                Device::new("S1", DeviceKind::Sdn),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn classic_create_needs_management_address() {
        let mut draft = DeviceDraft::create(DeviceKind::Classic);
        draft.name = "R2".into();
        let report = validate_device(&draft, &network());
        assert!(report.is_invalid(DeviceField::IpAddress));

        draft.ip_address = "10.0.0.2".into();
        assert!(validate_device(&draft, &network()).is_valid());

        draft.ip_address = "10.0.0.2/24".into();
        assert!(validate_device(&draft, &network()).is_invalid(DeviceField::IpAddress));
    }

    #[test]
    fn sdn_create_has_no_address() {
        let mut draft = DeviceDraft::create(DeviceKind::Sdn);
        draft.name = "S2".into();
        assert!(validate_device(&draft, &network()).is_valid());
    }

    #[test]
    fn device_name_must_be_unique() {
        let mut draft = DeviceDraft::create(DeviceKind::Sdn);
        draft.name = "R1".into();
        assert!(validate_device(&draft, &network()).is_invalid(DeviceField::Name));

        let topology = network();
        let mut edit = DeviceDraft::edit(topology.device("R1").unwrap());
        assert!(validate_device(&edit, &topology).is_valid());
        edit.name = "S1".into();
        assert!(validate_device(&edit, &topology).is_invalid(DeviceField::Name));
        edit.name = String::new();
        assert!(validate_device(&edit, &topology).is_invalid(DeviceField::Name));
    }

    #[test]
    fn device_without_kind_is_invalid() {
        let draft = DeviceDraft {
            name: "X".into(),
            ..DeviceDraft::default()
        };
        assert!(validate_device(&draft, &network()).is_invalid(DeviceField::Kind));
    }
}
