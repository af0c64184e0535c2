//! Fixed-capacity registry of call contexts
//!
//! The table is an indexed arena: a fixed slot array holding at most one
//! context per slot, plus an id index for O(1) lookup of non-provisional
//! calls. Allocation fails closed when every slot is occupied.

use std::collections::HashMap;

use tracing::warn;

use crate::error::CallError;
use crate::token::RequestToken;
use crate::types::{CallId, CallInfo, CallSnapshot, CallState, CallType, PhoneNumber};

/// One in-progress call
#[derive(Debug)]
pub struct CallContext {
    /// Modem-assigned id, or the provisional sentinel while dialing
    pub call_id: CallId,
    pub number: PhoneNumber,
    pub call_type: CallType,
    pub state: CallState,
    /// True when the call arrived from the network (mobile-terminated)
    pub remote_originated: bool,
    /// At most one outstanding request token
    pub pending: Option<RequestToken>,
}

impl CallContext {
    /// Context for a locally dialed call, awaiting its id from the modem
    pub fn outgoing(number: PhoneNumber) -> Self {
        Self {
            call_id: CallId::PROVISIONAL,
            number,
            call_type: CallType::Voice,
            state: CallState::Dialing,
            remote_originated: false,
            pending: None,
        }
    }

    /// Context for a mobile-terminated call
    pub fn incoming(info: CallInfo, state: CallState) -> Self {
        Self {
            call_id: info.call_id,
            number: info.number,
            call_type: info.call_type,
            state,
            remote_originated: true,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Fixed-capacity arena of call contexts with O(1) id lookup
#[derive(Debug)]
pub struct CallTable {
    slots: Vec<Option<CallContext>>,
    by_id: HashMap<u32, usize>,
}

impl CallTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            by_id: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Place a context in the first free slot
    pub fn allocate(&mut self, ctx: CallContext) -> Result<usize, CallError> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(CallError::CapacityExceeded)?;

        if !ctx.call_id.is_provisional() {
            if self.by_id.insert(ctx.call_id.0, slot).is_some() {
                warn!(call_id = %ctx.call_id, "duplicate call id, index now names the newest context");
            }
        }
        self.slots[slot] = Some(ctx);
        Ok(slot)
    }

    pub fn get(&self, slot: usize) -> Option<&CallContext> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut CallContext> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut())
    }

    /// Slot holding the given id; the provisional sentinel finds the
    /// one dialing context whose id is not yet assigned
    pub fn slot_of(&self, id: CallId) -> Option<usize> {
        if id.is_provisional() {
            self.find_provisional()
        } else {
            self.by_id.get(&id.0).copied()
        }
    }

    /// The one context still waiting for its modem-assigned id
    pub fn find_provisional(&self) -> Option<usize> {
        self.iter()
            .find(|(_, ctx)| ctx.call_id.is_provisional())
            .map(|(slot, _)| slot)
    }

    /// First non-provisional context in the given state
    pub fn find_by_state(&self, state: CallState) -> Option<usize> {
        self.iter()
            .find(|(_, ctx)| !ctx.call_id.is_provisional() && ctx.state == state)
            .map(|(slot, _)| slot)
    }

    /// Give a provisional context its modem-assigned id
    pub fn assign_id(&mut self, slot: usize, id: CallId) {
        match self.get_mut(slot) {
            Some(ctx) => ctx.call_id = id,
            None => return,
        }
        if !id.is_provisional() {
            if self.by_id.insert(id.0, slot).is_some() {
                warn!(call_id = %id, "duplicate call id, index now names the newest context");
            }
        }
    }

    /// Remove and return the context in the given slot
    pub fn release(&mut self, slot: usize) -> Option<CallContext> {
        let ctx = self.slots.get_mut(slot)?.take()?;
        if !ctx.call_id.is_provisional() {
            if self.by_id.get(&ctx.call_id.0) == Some(&slot) {
                self.by_id.remove(&ctx.call_id.0);
            }
        }
        Some(ctx)
    }

    /// Occupied slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CallContext)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| s.as_ref().map(|ctx| (slot, ctx)))
    }

    /// Service-facing view of every non-provisional call
    pub fn snapshots(&self) -> Vec<CallSnapshot> {
        self.iter()
            .filter(|(_, ctx)| !ctx.call_id.is_provisional())
            .map(|(slot, ctx)| CallSnapshot {
                index: slot + 1,
                call_id: ctx.call_id,
                state: ctx.state,
                number: ctx.number.as_str().to_string(),
                toa: if ctx.number.is_international() { 145 } else { 129 },
                is_mpty: false,
                is_mt: ctx.remote_originated,
                is_voice: true,
                number_presentation: if ctx.number.as_str().is_empty() { 2 } else { 0 },
                name_presentation: 2,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(s: &str) -> PhoneNumber {
        PhoneNumber::new(s).unwrap()
    }

    fn incoming(id: u32, s: &str) -> CallContext {
        CallContext::incoming(
            CallInfo {
                call_id: CallId(id),
                call_type: CallType::Voice,
                number: number(s),
            },
            CallState::Incoming,
        )
    }

    #[test]
    fn allocation_fails_closed_when_full() {
        let mut table = CallTable::new(2);
        table.allocate(incoming(1, "100")).unwrap();
        table.allocate(incoming(2, "200")).unwrap();

        let err = table.allocate(incoming(3, "300")).unwrap_err();
        assert!(matches!(err, CallError::CapacityExceeded));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn id_lookup_follows_assignment() {
        let mut table = CallTable::new(4);
        let slot = table.allocate(CallContext::outgoing(number("555"))).unwrap();

        assert_eq!(table.find_provisional(), Some(slot));
        assert_eq!(table.slot_of(CallId(9)), None);

        table.assign_id(slot, CallId(9));
        assert_eq!(table.slot_of(CallId(9)), Some(slot));
        assert_eq!(table.find_provisional(), None);
    }

    #[test]
    fn release_clears_the_id_index() {
        let mut table = CallTable::new(4);
        let slot = table.allocate(incoming(5, "100")).unwrap();

        let ctx = table.release(slot).unwrap();
        assert_eq!(ctx.call_id, CallId(5));
        assert_eq!(table.slot_of(CallId(5)), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn state_scan_skips_provisional_contexts() {
        let mut table = CallTable::new(4);
        table.allocate(CallContext::outgoing(number("555"))).unwrap();
        assert_eq!(table.find_by_state(CallState::Dialing), None);

        let slot = table.allocate(incoming(2, "200")).unwrap();
        assert_eq!(table.find_by_state(CallState::Incoming), Some(slot));
    }

    #[test]
    fn snapshots_skip_provisional_and_encode_toa() {
        let mut table = CallTable::new(4);
        table.allocate(CallContext::outgoing(number("555"))).unwrap();
        table.allocate(incoming(2, "+4940123")).unwrap();

        let snapshots = table.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].index, 2);
        assert_eq!(snapshots[0].toa, 145);
        assert!(snapshots[0].is_mt);
    }
}
