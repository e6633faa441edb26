//! In-memory bag of optimistic, not-yet-confirmed assignment changes.
//!
//! A pending operation lives from the moment a drop is processed until the
//! matching network call settles. Nothing here is persisted and nothing
//! expires on its own: the only way out is [`PendingOperations::resolve`].
//!
//! Keys come from a counter owned by the store, so key order is creation
//! order. The reconciliation replays operations in that order, which is what
//! makes the most recent drop of a volunteer decide where it is shown.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::{HallId, PositionId, Slot, VolunteerId};

/// Unique, monotonically increasing handle for one pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperationKey(u64);

impl OperationKey {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
}

/// An optimistic placement (`Add`) or vacating (`Remove`) of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingOperation {
    pub volunteer: VolunteerId,
    pub slot: Slot,
    pub kind: OperationKind,
}

#[derive(Debug, Clone, Default)]
pub struct PendingOperations {
    next_key: u64,
    ops: BTreeMap<OperationKey, PendingOperation>,
}

impl PendingOperations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an optimistic add of `volunteer` to the given position/hall.
    pub fn begin_add(
        &mut self,
        volunteer: VolunteerId,
        position: PositionId,
        hall: Option<HallId>,
    ) -> OperationKey {
        self.begin(volunteer, position, hall, OperationKind::Add)
    }

    /// Record an optimistic removal of `volunteer` from the given slot.
    ///
    /// The slot must be the one the volunteer currently occupies in the
    /// effective view; a remove naming any other slot has no effect.
    pub fn begin_remove(
        &mut self,
        volunteer: VolunteerId,
        position: PositionId,
        hall: Option<HallId>,
    ) -> OperationKey {
        self.begin(volunteer, position, hall, OperationKind::Remove)
    }

    fn begin(
        &mut self,
        volunteer: VolunteerId,
        position: PositionId,
        hall: Option<HallId>,
        kind: OperationKind,
    ) -> OperationKey {
        let key = OperationKey(self.next_key);
        self.next_key += 1;
        let op = PendingOperation {
            volunteer,
            slot: Slot { position, hall },
            kind,
        };
        debug!(%key, %volunteer, slot = %op.slot, ?kind, "begin optimistic operation");
        self.ops.insert(key, op);
        key
    }

    /// Drop the operation for `key`. Unknown keys are ignored.
    pub fn resolve(&mut self, key: OperationKey) -> Option<PendingOperation> {
        let removed = self.ops.remove(&key);
        if removed.is_some() {
            debug!(%key, "resolved optimistic operation");
        }
        removed
    }

    /// All pending operations, in creation order.
    #[must_use]
    pub const fn current(&self) -> &BTreeMap<OperationKey, PendingOperation> {
        &self.ops
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&OperationKey, &PendingOperation)> {
        self.ops.iter()
    }

    #[must_use]
    pub fn get(&self, key: OperationKey) -> Option<&PendingOperation> {
        self.ops.get(&key)
    }

    #[must_use]
    pub fn has_pending_for(&self, volunteer: VolunteerId) -> bool {
        self.ops.values().any(|op| op.volunteer == volunteer)
    }

    #[must_use]
    pub fn is_optimistically_added(&self, volunteer: VolunteerId, slot: Slot) -> bool {
        self.ops
            .values()
            .any(|op| op.volunteer == volunteer && op.slot == slot && op.kind == OperationKind::Add)
    }

    #[must_use]
    pub fn is_optimistically_removed(&self, volunteer: VolunteerId) -> bool {
        self.ops
            .values()
            .any(|op| op.volunteer == volunteer && op.kind == OperationKind::Remove)
    }

    /// Forget every pending operation, e.g. when switching days.
    ///
    /// Keys keep increasing afterwards.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
