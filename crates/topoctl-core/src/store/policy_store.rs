// ── Policy store ──
//
// Ordered policy set keyed by synthetic ids. Every mutation hands back the
// `PolicyMutation` line to enqueue and re-projects the derived read-models
// from scratch.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::command::PolicyMutation;
use crate::error::CoreError;
use crate::model::{Policy, PolicyId};
use crate::policy::{DerivedState, project};

/// Line of a policy file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    entries: IndexMap<PolicyId, Policy>,
    derived: DerivedState,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a policy file: one serialized policy per line. Blank lines and
    /// `#` comments are ignored; unparsable lines are skipped and reported.
    pub fn parse(text: &str) -> (Self, Vec<SkippedLine>) {
        let mut entries = IndexMap::new();
        let mut skipped = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.parse::<Policy>() {
                Ok(policy) => {
                    entries.insert(PolicyId::new(), policy);
                }
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "skipping policy line");
                    skipped.push(SkippedLine {
                        line: idx + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }
        let derived = project(entries.values());
        debug!(loaded = entries.len(), skipped = skipped.len(), "parsed policy file");
        (Self { entries, derived }, skipped)
    }

    /// Render in the format accepted by [`parse`](Self::parse).
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for policy in self.entries.values() {
            out.push_str(&policy.to_string());
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: PolicyId) -> Option<&Policy> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolicyId, &Policy)> {
        self.entries.iter().map(|(id, p)| (*id, p))
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    /// First entry whose payload equals `policy`.
    ///
    /// Only for replaying wire lines, which carry payloads and no ids.
    pub fn find(&self, policy: &Policy) -> Option<PolicyId> {
        self.entries
            .iter()
            .find_map(|(id, p)| (p == policy).then_some(*id))
    }

    pub fn insert(&mut self, policy: Policy) -> (PolicyId, PolicyMutation) {
        let id = PolicyId::new();
        debug!(%id, kind = %policy.kind(), "inserting policy");
        self.entries.insert(id, policy.clone());
        self.refresh();
        (id, PolicyMutation::Create { policy })
    }

    /// Replace the entry `id` in place, keeping its position.
    pub fn update(&mut self, id: PolicyId, policy: Policy) -> Result<PolicyMutation, CoreError> {
        let slot = self.entries.get_mut(&id).ok_or_else(|| not_found(id))?;
        let old = std::mem::replace(slot, policy.clone());
        debug!(%id, "updated policy");
        self.refresh();
        Ok(PolicyMutation::Edit { new: policy, old })
    }

    pub fn remove(&mut self, id: PolicyId) -> Result<PolicyMutation, CoreError> {
        let policy = self.entries.shift_remove(&id).ok_or_else(|| not_found(id))?;
        debug!(%id, "removed policy");
        self.refresh();
        Ok(PolicyMutation::Delete { policy })
    }

    /// Replay a wire mutation. Returns the id of the entry it touched.
    pub fn apply(&mut self, mutation: &PolicyMutation) -> Result<PolicyId, CoreError> {
        match mutation {
            PolicyMutation::Create { policy } => Ok(self.insert(policy.clone()).0),
            PolicyMutation::Edit { new, old } => {
                let id = self.find(old).ok_or_else(|| payload_not_found(old))?;
                self.update(id, new.clone())?;
                Ok(id)
            }
            PolicyMutation::Delete { policy } => {
                let id = self.find(policy).ok_or_else(|| payload_not_found(policy))?;
                self.remove(id)?;
                Ok(id)
            }
        }
    }

    /// Point every reference to device `from` at `to`. Returns how many
    /// policies changed.
    pub fn rename_device(&mut self, from: &str, to: &str) -> usize {
        let mut changed = 0;
        for policy in self.entries.values_mut() {
            if let Some(device) = policy.device_mut().filter(|d| d.as_str() == from) {
                to.clone_into(device);
                changed += 1;
            }
        }
        if changed > 0 {
            debug!(from, to, changed, "renamed device in policies");
            self.refresh();
        }
        changed
    }

    fn refresh(&mut self) {
        self.derived = project(self.entries.values());
    }
}

impl<'a> IntoIterator for &'a PolicyStore {
    type Item = (&'a PolicyId, &'a Policy);
    type IntoIter = indexmap::map::Iter<'a, PolicyId, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Policy> for PolicyStore {
    fn from_iter<I: IntoIterator<Item = Policy>>(iter: I) -> Self {
        let entries: IndexMap<_, _> = iter.into_iter().map(|p| (PolicyId::new(), p)).collect();
        let derived = project(entries.values());
        Self { entries, derived }
    }
}

fn not_found(id: PolicyId) -> CoreError {
    CoreError::PolicyNotFound {
        identifier: id.to_string(),
    }
}

fn payload_not_found(policy: &Policy) -> CoreError {
    CoreError::PolicyNotFound {
        identifier: policy.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn policy(line: &str) -> Policy {
        line.parse().unwrap()
    }

    fn lines(store: &PolicyStore) -> Vec<String> {
        store.iter().map(|(_, p)| p.to_string()).collect()
    }

    #[test]
    fn mutations_return_wire_lines() {
        let mut store = PolicyStore::new();
        let (id, created) = store.insert(policy("zone R1 dmz"));
        assert_eq!(created.to_string(), "policy new zone R1 dmz");

        let edited = store.update(id, policy("zone R1 lan")).unwrap();
        assert_eq!(edited.to_string(), "policy edit zone R1 lan old zone R1 dmz");

        let deleted = store.remove(id).unwrap();
        assert_eq!(deleted.to_string(), "policy delete zone R1 lan");
        assert!(store.is_empty());
    }

    #[test]
    fn identical_payloads_are_distinct_entries() {
        let mut store = PolicyStore::new();
        let (first, _) = store.insert(policy("disable S1 0"));
        let (second, _) = store.insert(policy("disable S1 0"));
        assert_ne!(first, second);

        store.remove(second).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(first).is_some());
    }

    #[test]
    fn derived_state_follows_every_mutation() {
        let mut store = PolicyStore::new();
        let (web, _) = store.insert(policy("flow web * * 6 * 80"));
        let (zone, _) = store.insert(policy("zone R1 dmz"));
        store.insert(policy("address R1 0 10.1.2.3/24"));
        assert_eq!(store.derived().flows.iter().collect::<Vec<_>>(), ["web"]);
        assert_eq!(store.derived().zones.iter().collect::<Vec<_>>(), ["dmz"]);
        assert_eq!(store.derived().subnets.len(), 1);

        store.update(web, policy("flow dns * * 17 * 53")).unwrap();
        store.remove(zone).unwrap();
        assert_eq!(store.derived().flows.iter().collect::<Vec<_>>(), ["dns"]);
        assert!(store.derived().zones.is_empty());
        assert_eq!(store.derived(), &project(store.iter().map(|(_, p)| p)));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = PolicyStore::new();
        let missing = PolicyId::new();
        assert!(matches!(
            store.update(missing, policy("zone R1 dmz")),
            Err(CoreError::PolicyNotFound { .. })
        ));
        assert!(matches!(
            store.remove(missing),
            Err(CoreError::PolicyNotFound { .. })
        ));
    }

    #[test]
    fn apply_replays_wire_mutations() {
        let mut store = PolicyStore::new();
        for line in [
            "policy new zone R1 dmz",
            "policy new zone R2 dmz",
            "policy edit zone R2 lan old zone R2 dmz",
            "policy delete zone R1 dmz",
        ] {
            store.apply(&line.parse().unwrap()).unwrap();
        }
        assert_eq!(lines(&store), ["zone R2 lan"]);

        let stale: PolicyMutation = "policy delete zone R1 dmz".parse().unwrap();
        assert!(matches!(
            store.apply(&stale),
            Err(CoreError::PolicyNotFound { .. })
        ));
    }

    #[test]
    fn update_keeps_position() {
        let mut store: PolicyStore = ["zone R1 a", "zone R2 b", "zone R3 c"]
            .into_iter()
            .map(policy)
            .collect();
        let id = store.find(&policy("zone R2 b")).unwrap();
        store.update(id, policy("zone R2 z")).unwrap();
        assert_eq!(lines(&store), ["zone R1 a", "zone R2 z", "zone R3 c"]);
    }

    #[test]
    fn rename_device_rewrites_references() {
        let mut store: PolicyStore = [
            "address R1 0 10.0.0.1/24",
            "block R1 web",
            "route R1 web 2",
            "zone R2 dmz",
            "flow R1 * * 6 * 80",
        ]
        .into_iter()
        .map(policy)
        .collect();
        assert_eq!(store.rename_device("R1", "core1"), 3);
        assert_eq!(
            lines(&store),
            [
                "address core1 0 10.0.0.1/24",
                "block core1 web",
                "route core1 web 2",
                "zone R2 dmz",
                "flow R1 * * 6 * 80",
            ]
        );
        assert_eq!(store.rename_device("nope", "x"), 0);
    }

    #[test]
    fn policy_file_skips_comments_and_bad_lines() {
        let text = "\
# core policies
flow web * * 6 * 80

zone R1 dmz
route R1 web eth0
nat R1 0
";
        let (store, skipped) = PolicyStore::parse(text);
        assert_eq!(lines(&store), ["flow web * * 6 * 80", "zone R1 dmz"]);
        assert_eq!(
            skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
            [5, 6]
        );
        insta::assert_snapshot!(store.to_file_string().trim_end(), @r"
        flow web * * 6 * 80
        zone R1 dmz
        ");
    }

    #[test]
    fn file_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policies.txt");
        let store: PolicyStore = ["flow web * * 6 * 80", "block dmz web"]
            .into_iter()
            .map(policy)
            .collect();
        std::fs::write(&path, store.to_file_string()).unwrap();

        let (reloaded, skipped) = PolicyStore::parse(&std::fs::read_to_string(&path).unwrap());
        assert!(skipped.is_empty());
        assert_eq!(lines(&reloaded), lines(&store));
    }
}
