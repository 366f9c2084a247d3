// ── Command protocol ──
//
// Mutations leave the core as single text lines for the execution queue:
//
//   policy new <policy>
//   policy edit <new policy> old <original policy>
//   policy delete <policy>
//   device <kind> new <name> [<ip>]
//   device <kind> edit <old-name> <new-name>
//   device <kind> delete <name>

pub mod wire;

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{DeviceKind, Policy};

pub use wire::{arity, serialize};

const POLICY: &str = "policy";
const DEVICE: &str = "device";
const NEW: &str = "new";
const EDIT: &str = "edit";
const DELETE: &str = "delete";
const OLD: &str = "old";

// ── Policy mutations ────────────────────────────────────────────────

/// A change to the policy set, as sent to the execution queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PolicyMutation {
    #[serde(rename = "new")]
    Create { policy: Policy },
    Edit { new: Policy, old: Policy },
    Delete { policy: Policy },
}

impl fmt::Display for PolicyMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { policy } => write!(f, "{POLICY} {NEW} {policy}"),
            Self::Edit { new, old } => write!(f, "{POLICY} {EDIT} {new} {OLD} {old}"),
            Self::Delete { policy } => write!(f, "{POLICY} {DELETE} {policy}"),
        }
    }
}

impl FromStr for PolicyMutation {
    type Err = CoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let [head, action, rest @ ..] = tokens.as_slice() else {
            return Err(CoreError::malformed(line, "expected `policy <action> ...`"));
        };
        if *head != POLICY {
            return Err(CoreError::malformed(line, format!("not a policy command: {head}")));
        }

        match *action {
            NEW => Ok(Self::Create {
                policy: wire::parse_tokens(line, rest)?,
            }),
            DELETE => Ok(Self::Delete {
                policy: wire::parse_tokens(line, rest)?,
            }),
            EDIT => {
                // The `old` separator sits right after the new policy's
                // fields, so a field value that happens to be "old" is safe.
                let tag = rest
                    .first()
                    .ok_or_else(|| CoreError::malformed(line, "edit without a policy"))?;
                let split = 1 + arity(wire::parse_kind(tag)?);
                match rest.get(split) {
                    Some(&OLD) => Ok(Self::Edit {
                        new: wire::parse_tokens(line, &rest[..split])?,
                        old: wire::parse_tokens(line, &rest[split + 1..])?,
                    }),
                    _ => Err(CoreError::malformed(line, "edit without `old` policy")),
                }
            }
            other => Err(CoreError::malformed(line, format!("unknown action {other:?}"))),
        }
    }
}

// ── Device mutations ────────────────────────────────────────────────

/// A change to the device inventory, as sent to the execution queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DeviceMutation {
    #[serde(rename = "new")]
    Create {
        kind: DeviceKind,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ip_address: Option<Ipv4Addr>,
    },
    #[serde(rename = "edit")]
    Rename {
        kind: DeviceKind,
        from: String,
        to: String,
    },
    Delete { kind: DeviceKind, name: String },
}

impl DeviceMutation {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Create { kind, .. } | Self::Rename { kind, .. } | Self::Delete { kind, .. } => {
                *kind
            }
        }
    }
}

impl fmt::Display for DeviceMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Self::Create {
                name,
                ip_address: Some(ip),
                ..
            } => write!(f, "{DEVICE} {kind} {NEW} {name} {ip}"),
            Self::Create { name, .. } => write!(f, "{DEVICE} {kind} {NEW} {name}"),
            Self::Rename { from, to, .. } => write!(f, "{DEVICE} {kind} {EDIT} {from} {to}"),
            Self::Delete { name, .. } => write!(f, "{DEVICE} {kind} {DELETE} {name}"),
        }
    }
}

impl FromStr for DeviceMutation {
    type Err = CoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let [head, kind, action, args @ ..] = tokens.as_slice() else {
            return Err(CoreError::malformed(line, "expected `device <kind> <action> ...`"));
        };
        if *head != DEVICE {
            return Err(CoreError::malformed(line, format!("not a device command: {head}")));
        }
        let kind: DeviceKind = kind
            .parse()
            .map_err(|_| CoreError::malformed(line, format!("unknown device kind {kind:?}")))?;

        match (*action, args) {
            (NEW, [name]) => Ok(Self::Create {
                kind,
                name: (*name).to_owned(),
                ip_address: None,
            }),
            (NEW, [name, ip]) => Ok(Self::Create {
                kind,
                name: (*name).to_owned(),
                ip_address: Some(
                    ip.parse()
                        .map_err(|_| CoreError::malformed(line, format!("bad address {ip:?}")))?,
                ),
            }),
            (EDIT, [from, to]) => Ok(Self::Rename {
                kind,
                from: (*from).to_owned(),
                to: (*to).to_owned(),
            }),
            (DELETE, [name]) => Ok(Self::Delete {
                kind,
                name: (*name).to_owned(),
            }),
            (NEW | EDIT | DELETE, _) => Err(CoreError::malformed(line, "wrong number of arguments")),
            (other, _) => Err(CoreError::malformed(line, format!("unknown action {other:?}"))),
        }
    }
}
