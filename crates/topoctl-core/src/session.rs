// ── Edit session ──
//
// An operator session holds at most one open policy draft and one open
// device draft. Sessions own their drafts outright, so any number of them
// can run side by side against the same store.

use tracing::debug;

use crate::command::{DeviceMutation, PolicyMutation};
use crate::error::CoreError;
use crate::model::{
    Device, DeviceDraft, DeviceKind, DraftMode, PolicyDraft, PolicyId, PolicyKind, Topology,
};
use crate::policy::{
    DeviceField, PolicyField, ValidationReport, validate_device, validate_policy,
};
use crate::store::PolicyStore;

/// Result of trying to commit a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<M, F: Ord> {
    /// The draft was accepted; enqueue this mutation. The draft is closed.
    Committed(M),
    /// The draft failed validation and is still open for correction.
    Rejected(ValidationReport<F>),
}

impl<M, F: Ord> SaveOutcome<M, F> {
    pub fn committed(self) -> Option<M> {
        match self {
            Self::Committed(m) => Some(m),
            Self::Rejected(_) => None,
        }
    }
}

pub type PolicySave = SaveOutcome<PolicyMutation, PolicyField>;
pub type DeviceSave = SaveOutcome<DeviceMutation, DeviceField>;

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    policy: Option<PolicyDraft>,
    device: Option<DeviceDraft>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Policy drafts ────────────────────────────────────────────────

    /// Open a blank policy draft, replacing any draft already open.
    pub fn begin_policy_create(&mut self, kind: Option<PolicyKind>) -> &mut PolicyDraft {
        let draft = kind.map(PolicyDraft::create).unwrap_or_default();
        self.policy.insert(draft)
    }

    /// Open a draft pre-filled from store entry `id`.
    pub fn begin_policy_edit(
        &mut self,
        id: PolicyId,
        store: &PolicyStore,
    ) -> Result<&mut PolicyDraft, CoreError> {
        let policy = store.get(id).ok_or_else(|| CoreError::PolicyNotFound {
            identifier: id.to_string(),
        })?;
        Ok(self.policy.insert(PolicyDraft::edit(id, policy)))
    }

    pub fn policy_draft(&self) -> Option<&PolicyDraft> {
        self.policy.as_ref()
    }

    pub fn policy_draft_mut(&mut self) -> Option<&mut PolicyDraft> {
        self.policy.as_mut()
    }

    pub fn discard_policy(&mut self) -> Option<PolicyDraft> {
        self.policy.take()
    }

    /// Validate the open draft against `store` and commit it when valid.
    pub fn save_policy(&mut self, store: &mut PolicyStore) -> Result<PolicySave, CoreError> {
        let draft = self.policy.as_ref().ok_or(CoreError::NoActiveDraft)?;
        let report = validate_policy(draft, &store.derived().flows);
        if !report.is_valid() {
            debug!(%report, "policy draft rejected");
            return Ok(SaveOutcome::Rejected(report));
        }

        let policy = draft.build()?;
        let mutation = match (draft.mode, draft.edit_original) {
            (DraftMode::Edit, Some(id)) => store.update(id, policy)?,
            (DraftMode::Edit, None) => {
                return Err(CoreError::Internal(
                    "edit draft without an original entry".into(),
                ));
            }
            (DraftMode::Create, _) => store.insert(policy).1,
        };
        self.policy = None;
        Ok(SaveOutcome::Committed(mutation))
    }

    // ── Device drafts ────────────────────────────────────────────────

    pub fn begin_device_create(&mut self, kind: DeviceKind) -> &mut DeviceDraft {
        self.device.insert(DeviceDraft::create(kind))
    }

    pub fn begin_device_edit(&mut self, device: &Device) -> &mut DeviceDraft {
        self.device.insert(DeviceDraft::edit(device))
    }

    pub fn device_draft(&self) -> Option<&DeviceDraft> {
        self.device.as_ref()
    }

    pub fn device_draft_mut(&mut self) -> Option<&mut DeviceDraft> {
        self.device.as_mut()
    }

    pub fn discard_device(&mut self) -> Option<DeviceDraft> {
        self.device.take()
    }

    /// Validate the open device draft against `topology`.
    ///
    /// The topology itself is not modified; the returned mutation is applied
    /// by the execution queue and shows up in the next snapshot.
    pub fn save_device(&mut self, topology: &Topology) -> Result<DeviceSave, CoreError> {
        let draft = self.device.as_ref().ok_or(CoreError::NoActiveDraft)?;
        let report = validate_device(draft, topology);
        if !report.is_valid() {
            debug!(%report, "device draft rejected");
            return Ok(SaveOutcome::Rejected(report));
        }

        let kind = draft
            .kind
            .ok_or_else(|| CoreError::Internal("validated device draft has no kind".into()))?;
        let mutation = match draft.mode {
            DraftMode::Create => DeviceMutation::Create {
                kind,
                name: draft.name.clone(),
                ip_address: match kind {
                    DeviceKind::Classic => draft.ip_address.parse().ok(),
                    DeviceKind::Sdn => None,
                },
            },
            DraftMode::Edit => DeviceMutation::Rename {
                kind,
                from: draft.edit_original.clone().ok_or_else(|| {
                    CoreError::Internal("edit draft without an original device".into())
                })?,
                to: draft.name.clone(),
            },
        };
        self.device = None;
        Ok(SaveOutcome::Committed(mutation))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> PolicyStore {
        ["flow web * * 6 * 80", "zone R1 dmz"]
            .into_iter()
            .map(|line| line.parse().unwrap())
            .collect()
    }

    #[test]
    fn committed_create_resets_draft() {
        let mut store = store();
        let mut session = EditSession::new();
        let draft = session.begin_policy_create(Some(PolicyKind::Block));
        draft.target = "dmz".into();
        draft.flow = "web".into();

        let outcome = session.save_policy(&mut store).unwrap();
        assert_eq!(
            outcome.committed().unwrap().to_string(),
            "policy new block dmz web"
        );
        assert!(session.policy_draft().is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn rejected_save_keeps_draft_intact() {
        let mut store = store();
        let mut session = EditSession::new();
        let draft = session.begin_policy_create(Some(PolicyKind::Block));
        draft.target = "dmz".into();
        draft.flow = "nonexistent".into();

        let SaveOutcome::Rejected(report) = session.save_policy(&mut store).unwrap() else {
            panic!("expected rejection");
        };
        assert!(report.is_invalid(PolicyField::Flow));
        assert_eq!(session.policy_draft().unwrap().target, "dmz");
        assert_eq!(store.len(), 2);

        session.policy_draft_mut().unwrap().flow = "web".into();
        assert!(matches!(
            session.save_policy(&mut store).unwrap(),
            SaveOutcome::Committed(_)
        ));
    }

    #[test]
    fn edit_emits_old_and_new() {
        let mut store = store();
        let id = store.find(&"zone R1 dmz".parse().unwrap()).unwrap();
        let mut session = EditSession::new();
        session.begin_policy_edit(id, &store).unwrap().zone = "lan".into();

        let mutation = session.save_policy(&mut store).unwrap().committed().unwrap();
        assert_eq!(mutation.to_string(), "policy edit zone R1 lan old zone R1 dmz");
        assert_eq!(store.get(id).unwrap().to_string(), "zone R1 lan");
        assert_eq!(store.derived().zones.iter().collect::<Vec<_>>(), ["lan"]);
    }

    #[test]
    fn editing_a_flow_may_keep_its_name() {
        let mut store = store();
        let id = store.find(&"flow web * * 6 * 80".parse().unwrap()).unwrap();
        let mut session = EditSession::new();
        session.begin_policy_edit(id, &store).unwrap().dst_port = "443".into();
        let mutation = session.save_policy(&mut store).unwrap().committed().unwrap();
        assert_eq!(
            mutation.to_string(),
            "policy edit flow web * * 6 * 443 old flow web * * 6 * 80"
        );
    }

    #[test]
    fn unset_kind_is_rejected() {
        let mut store = store();
        let mut session = EditSession::new();
        session.begin_policy_create(None);
        let outcome = session.save_policy(&mut store).unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(r) if r.is_invalid(PolicyField::Kind)));
    }

    #[test]
    fn saving_without_draft_is_an_error() {
        let mut session = EditSession::new();
        assert!(matches!(
            session.save_policy(&mut store()),
            Err(CoreError::NoActiveDraft)
        ));
        assert!(matches!(
            session.save_device(&Topology::default()),
            Err(CoreError::NoActiveDraft)
        ));
    }

    #[test]
    fn discard_closes_draft() {
        let mut session = EditSession::new();
        session.begin_policy_create(Some(PolicyKind::Zone));
        session.begin_device_create(DeviceKind::Sdn);
        assert!(session.discard_policy().is_some());
        assert!(session.discard_device().is_some());
        assert!(session.policy_draft().is_none());
        assert!(session.device_draft().is_none());
    }

    #[test]
    fn unknown_policy_id_cannot_be_edited() {
        let mut session = EditSession::new();
        assert!(matches!(
            session.begin_policy_edit(PolicyId::new(), &store()),
            Err(CoreError::PolicyNotFound { .. })
        ));
    }

    fn topology() -> Topology {
        Topology::new(vec![Device::new("R1", DeviceKind::Classic)], vec![]).unwrap()
    }

    #[test]
    fn device_create_and_rename() {
        let topology = topology();
        let mut session = EditSession::new();

        let draft = session.begin_device_create(DeviceKind::Classic);
        draft.name = "R2".into();
        draft.ip_address = "10.0.0.2".into();
        let created = session.save_device(&topology).unwrap().committed().unwrap();
        assert_eq!(created.to_string(), "device Classic new R2 10.0.0.2");

        session
            .begin_device_edit(topology.device("R1").unwrap())
            .name = "core1".into();
        let renamed = session.save_device(&topology).unwrap().committed().unwrap();
        assert_eq!(renamed.to_string(), "device Classic edit R1 core1");
        assert!(session.device_draft().is_none());
    }

    #[test]
    fn sdn_create_ignores_address() {
        let topology = topology();
        let mut session = EditSession::new();
        for ip in ["10.0.0.9", "not-an-ip"] {
            let draft = session.begin_device_create(DeviceKind::Sdn);
            draft.name = "S2".into();
            draft.ip_address = ip.into();
            let created = session.save_device(&topology).unwrap().committed().unwrap();
            assert_eq!(created.to_string(), "device SDN new S2", "ip {ip}");
        }
    }

    #[test]
    fn device_name_collision_is_rejected() {
        let topology = topology();
        let mut session = EditSession::new();
        session.begin_device_create(DeviceKind::Sdn).name = "R1".into();
        let outcome = session.save_device(&topology).unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(r) if r.is_invalid(DeviceField::Name)));
        assert!(session.device_draft().is_some());
    }
}
