// ── Edit buffers ──
//
// Drafts hold raw operator input as typed into a form. Nothing here is
// validated; `policy::validate` decides whether a draft may be committed
// and `PolicyDraft::build` turns an accepted draft into a `Policy`.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::policy::{AddressMatch, Policy, PolicyId, PolicyKind, PortMatch, parse_cidr};
use super::topology::{Device, DeviceKind};
use crate::error::CoreError;

/// Sentinel for "no interface selected".
pub const INTERFACE_UNSET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DraftMode {
    #[default]
    Create,
    Edit,
}

/// Form state for creating or editing a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub mode: DraftMode,
    /// `None` until the operator picks a type.
    pub kind: Option<PolicyKind>,

    pub device: String,
    pub interface: i64,
    pub address: String,

    // Flow definition
    pub name: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub protocol: String,
    pub src_port: String,
    pub dst_port: String,

    pub target: String,
    /// Flow referenced by Block and Route policies.
    pub flow: String,
    pub zone: String,

    /// Store entry being edited; set only in edit mode.
    pub edit_original: Option<PolicyId>,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            mode: DraftMode::Create,
            kind: None,
            device: String::new(),
            interface: INTERFACE_UNSET,
            address: String::new(),
            name: String::new(),
            src_ip: String::new(),
            dst_ip: String::new(),
            protocol: String::new(),
            src_port: String::new(),
            dst_port: String::new(),
            target: String::new(),
            flow: String::new(),
            zone: String::new(),
            edit_original: None,
        }
    }
}

impl PolicyDraft {
    pub fn create(kind: PolicyKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Edit buffer pre-filled from an existing store entry.
    pub fn edit(id: PolicyId, policy: &Policy) -> Self {
        let mut draft = Self {
            mode: DraftMode::Edit,
            edit_original: Some(id),
            ..Self::default()
        };
        draft.fill_from(policy);
        draft
    }

    /// Overwrite the kind and form fields with `policy`, keeping the mode
    /// and the edit target.
    pub fn fill_from(&mut self, policy: &Policy) {
        *self = Self {
            mode: self.mode,
            kind: Some(policy.kind()),
            edit_original: self.edit_original,
            ..Self::default()
        };
        match policy {
            Policy::Address {
                device,
                interface,
                address,
            } => {
                self.device.clone_from(device);
                self.interface = i64::from(*interface);
                self.address = address.to_string();
            }
            Policy::Flow {
                name,
                src_ip,
                dst_ip,
                protocol,
                src_port,
                dst_port,
            } => {
                self.name.clone_from(name);
                self.src_ip = src_ip.to_string();
                self.dst_ip = dst_ip.to_string();
                self.protocol.clone_from(protocol);
                self.src_port = src_port.to_string();
                self.dst_port = dst_port.to_string();
            }
            Policy::Block { target, flow } => {
                self.target.clone_from(target);
                self.flow.clone_from(flow);
            }
            Policy::Route {
                device,
                flow,
                interface,
            } => {
                self.device.clone_from(device);
                self.flow.clone_from(flow);
                self.interface = i64::from(*interface);
            }
            Policy::Zone { device, zone } => {
                self.device.clone_from(device);
                self.zone.clone_from(zone);
            }
            Policy::Disable { device, interface } => {
                self.device.clone_from(device);
                self.interface = i64::from(*interface);
            }
        }
    }

    /// Convert the draft into a policy of its selected kind.
    ///
    /// Callers validate first; a field that fails to parse here means the
    /// draft was committed without validation.
    pub fn build(&self) -> Result<Policy, CoreError> {
        let kind = self.kind.ok_or_else(|| CoreError::UnknownPolicyVariant {
            tag: String::new(),
        })?;
        let policy = match kind {
            PolicyKind::Address => Policy::Address {
                device: self.device.clone(),
                interface: self.interface_index()?,
                address: parse_cidr(&self.address)
                    .ok_or_else(|| unvalidated("address", &self.address))?,
            },
            PolicyKind::Flow => Policy::Flow {
                name: self.name.clone(),
                src_ip: parse_field::<AddressMatch>("src_ip", &self.src_ip)?,
                dst_ip: parse_field::<AddressMatch>("dst_ip", &self.dst_ip)?,
                protocol: self.protocol.clone(),
                src_port: parse_field::<PortMatch>("src_port", &self.src_port)?,
                dst_port: parse_field::<PortMatch>("dst_port", &self.dst_port)?,
            },
            PolicyKind::Block => Policy::Block {
                target: self.target.clone(),
                flow: self.flow.clone(),
            },
            PolicyKind::Route => Policy::Route {
                device: self.device.clone(),
                flow: self.flow.clone(),
                interface: self.interface_index()?,
            },
            PolicyKind::Zone => Policy::Zone {
                device: self.device.clone(),
                zone: self.zone.clone(),
            },
            PolicyKind::Disable => Policy::Disable {
                device: self.device.clone(),
                interface: self.interface_index()?,
            },
        };
        Ok(policy)
    }

    fn interface_index(&self) -> Result<u32, CoreError> {
        u32::try_from(self.interface).map_err(|_| unvalidated("interface", &self.interface))
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse().map_err(|_| unvalidated(field, raw))
}

fn unvalidated(field: &str, raw: impl std::fmt::Debug) -> CoreError {
    CoreError::Internal(format!("unvalidated draft field {field}: {raw:?}"))
}

/// Form state for creating or editing a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceDraft {
    pub mode: DraftMode,
    pub kind: Option<DeviceKind>,
    pub name: String,
    /// Management address, plain `A.B.C.D`. Only used when creating.
    pub ip_address: String,
    /// Name of the device being edited; set only in edit mode.
    pub edit_original: Option<String>,
}

impl DeviceDraft {
    pub fn create(kind: DeviceKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn edit(device: &Device) -> Self {
        Self {
            mode: DraftMode::Edit,
            kind: Some(device.kind),
            name: device.name.clone(),
            ip_address: String::new(),
            edit_original: Some(device.name.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_draft_has_unset_interface() {
        let draft = PolicyDraft::default();
        assert_eq!(draft.interface, INTERFACE_UNSET);
        assert_eq!(draft.kind, None);
        assert_eq!(draft.mode, DraftMode::Create);
    }

    #[test]
    fn edit_then_build_reproduces_policy() {
        let policy = Policy::Flow {
            name: "web".into(),
            src_ip: "10.0.0.0/8".parse().unwrap(),
            dst_ip: AddressMatch::Any,
            protocol: "6".into(),
            src_port: PortMatch::Any,
            dst_port: PortMatch::Port(80),
        };
        let id = PolicyId::new();
        let draft = PolicyDraft::edit(id, &policy);
        assert_eq!(draft.mode, DraftMode::Edit);
        assert_eq!(draft.edit_original, Some(id));
        assert_eq!(draft.build().unwrap(), policy);
    }

    #[test]
    fn fill_from_replaces_fields_of_another_kind() {
        let mut draft = PolicyDraft::create(PolicyKind::Zone);
        draft.zone = "dmz".into();
        draft.fill_from(&Policy::Disable {
            device: "S1".into(),
            interface: 4,
        });
        assert_eq!(draft.kind, Some(PolicyKind::Disable));
        assert_eq!(draft.mode, DraftMode::Create);
        assert_eq!(draft.zone, "");
        assert_eq!(draft.interface, 4);
    }

    #[test]
    fn build_without_kind_is_unknown_variant() {
        let err = PolicyDraft::default().build().unwrap_err();
        assert!(matches!(err, CoreError::UnknownPolicyVariant { .. }));
    }

    #[test]
    fn build_with_unset_interface_fails() {
        let mut draft = PolicyDraft::create(PolicyKind::Disable);
        draft.device = "R1".into();
        assert!(matches!(draft.build(), Err(CoreError::Internal(_))));
    }

    #[test]
    fn device_edit_draft_remembers_original_name() {
        let draft = DeviceDraft::edit(&Device::new("R1", DeviceKind::Classic));
        assert_eq!(draft.edit_original.as_deref(), Some("R1"));
        assert_eq!(draft.kind, Some(DeviceKind::Classic));
    }
}
