//! Plan registry: deduplicates plans by fingerprint and records which plan
//! was chosen at each grid point.
//!
//! Identifiers are dense and start at 1 in order of first appearance. The
//! registry is owned by the caller and handed to a sweep by `&mut`; a sweep
//! resets it before its first combination.

use crate::grid::CombinationKey;
use crate::plan::{Fingerprint, PlanDocument};
use plansweep_error::{ErrorCode, Result, SweepError};
use serde::Serialize;
use std::collections::HashMap;

pub type PlanId = u32;

/// A distinct plan as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredPlan {
    pub id: PlanId,
    pub fingerprint: Fingerprint,
    /// Pretty-printed document of the first occurrence.
    pub json: String,
}

#[derive(Debug, Clone)]
pub struct PlanRegistry {
    by_fingerprint: HashMap<Fingerprint, PlanId>,
    plans: Vec<RegisteredPlan>,
    assignments: Vec<(CombinationKey, PlanId)>,
    assignment_index: HashMap<CombinationKey, usize>,
    next_id: PlanId,
}

impl Default for PlanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self {
            by_fingerprint: HashMap::new(),
            plans: Vec::new(),
            assignments: Vec::new(),
            assignment_index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Id for `fingerprint`, registering `document` under a fresh id when
    /// the fingerprint is new. Later documents with a known fingerprint are
    /// not stored.
    pub fn get_or_create(&mut self, fingerprint: &Fingerprint, document: &PlanDocument) -> PlanId {
        if let Some(&id) = self.by_fingerprint.get(fingerprint) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.by_fingerprint.insert(fingerprint.clone(), id);
        self.plans.push(RegisteredPlan {
            id,
            fingerprint: fingerprint.clone(),
            json: document.to_pretty_json(),
        });
        tracing::debug!(plan_id = id, fingerprint = %fingerprint, "Registered new plan");
        id
    }

    /// Record that `key` resolved to plan `id`. A later assignment for the
    /// same key replaces the earlier one in place.
    pub fn assign(&mut self, key: CombinationKey, id: PlanId) -> Result<()> {
        if self.plan(id).is_none() {
            return Err(SweepError::new(
                ErrorCode::Internal,
                format!("Cannot assign '{key}' to unknown plan id {id}"),
            ));
        }
        match self.assignment_index.get(&key) {
            Some(&slot) => self.assignments[slot].1 = id,
            None => {
                self.assignment_index.insert(key.clone(), self.assignments.len());
                self.assignments.push((key, id));
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of distinct plans.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn id_of(&self, fingerprint: &Fingerprint) -> Option<PlanId> {
        self.by_fingerprint.get(fingerprint).copied()
    }

    pub fn plan(&self, id: PlanId) -> Option<&RegisteredPlan> {
        let slot = usize::try_from(id).ok()?.checked_sub(1)?;
        self.plans.get(slot)
    }

    pub fn plan_json(&self, id: PlanId) -> Option<&str> {
        self.plan(id).map(|p| p.json.as_str())
    }

    pub fn fingerprint(&self, id: PlanId) -> Option<&Fingerprint> {
        self.plan(id).map(|p| &p.fingerprint)
    }

    pub fn assignment(&self, key: &str) -> Option<PlanId> {
        let slot = *self.assignment_index.get(key)?;
        Some(self.assignments[slot].1)
    }

    /// Combination assignments in the order they were first made.
    pub fn assignments(&self) -> impl Iterator<Item = (&CombinationKey, PlanId)> {
        self.assignments.iter().map(|(key, id)| (key, *id))
    }

    /// Distinct plans in id order.
    pub fn plans(&self) -> &[RegisteredPlan] {
        &self.plans
    }
}
