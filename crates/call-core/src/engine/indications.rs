//! Modem-event handlers
//!
//! Each handler mutates the call table under the engine lock and resolves
//! the matching pending token, if one is waiting. Indications naming a call
//! the table does not know are logged and dropped; they are not errors.

use tracing::{debug, warn};

use super::reject;
use crate::error::CallError;
use crate::events::{CallIndication, Unsolicited};
use crate::table::CallContext;
use crate::types::{CallId, CallInfo, CallState};

impl super::CallEngine {
    /// Feed one decoded modem message through the state machine
    pub async fn handle_indication(&self, indication: CallIndication) {
        match indication {
            CallIndication::IncomingCall(info) => self.on_incoming(info).await,
            CallIndication::SetupAssigned { call_id } => self.on_setup_assigned(call_id).await,
            CallIndication::Alert { call_id, audio_on } => self.on_alert(call_id, audio_on).await,
            CallIndication::Connected { call_id } => self.on_connected(call_id).await,
            CallIndication::Ended { call_id, cause } => self.on_ended(call_id, cause).await,
            CallIndication::Error { call_id, cause } => self.on_error(call_id, cause).await,
            CallIndication::HoldCnf { call_id, cause } => self.on_hold_cnf(call_id, cause).await,
            CallIndication::ActivateCnf { call_id, cause } => {
                self.on_activate_cnf(call_id, cause).await
            }
            CallIndication::SwapCnf {
                activated_id,
                held_id,
                cause,
            } => self.on_swap_cnf(activated_id, held_id, cause).await,
            CallIndication::DtmfStartCnf { reason } => self.on_dtmf_start_cnf(reason).await,
            CallIndication::DtmfStopCnf { reason } => self.on_dtmf_stop_cnf(reason).await,
        }
    }

    /// A new mobile-terminated call; rings behind an established call as
    /// call waiting.
    async fn on_incoming(&self, info: CallInfo) {
        let mut state = self.state.lock().await;
        let call_up = state.calls.iter().any(|(_, ctx)| {
            !ctx.call_id.is_provisional()
                && matches!(ctx.state, CallState::Active | CallState::Holding)
        });
        let call_state = if call_up {
            CallState::Waiting
        } else {
            CallState::Incoming
        };
        debug!(call_id = %info.call_id, number = %info.number, ?call_state, "incoming call");

        if let Err(e) = state.calls.allocate(CallContext::incoming(info, call_state)) {
            warn!(error = %e, "dropping incoming call");
            return;
        }

        self.notify(Unsolicited::Ring);
        self.notify(Unsolicited::CallStateChanged);
    }

    /// Call setup acknowledged: the dialing context gets its real id
    async fn on_setup_assigned(&self, call_id: CallId) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.find_provisional() else {
            warn!(%call_id, "setup indication without a dialing call");
            return;
        };
        debug!(%call_id, "call id assigned");
        state.calls.assign_id(slot, call_id);

        if let Some(token) = state.detach(slot) {
            token.succeed();
        }
    }

    async fn on_alert(&self, call_id: CallId, audio_on: bool) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, "alert for unknown call");
            return;
        };
        debug!(%call_id, audio_on, "alerting");
        if let Some(ctx) = state.calls.get_mut(slot) {
            ctx.state = CallState::Alerting;
        }
        self.notify(Unsolicited::CallStateChanged);
    }

    async fn on_connected(&self, call_id: CallId) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, "connect for unknown call");
            return;
        };
        debug!(%call_id, "connected");
        if let Some(ctx) = state.calls.get_mut(slot) {
            ctx.state = CallState::Active;
        }

        match state.detach(slot) {
            Some(token) => token.succeed(),
            None => self.notify(Unsolicited::CallStateChanged),
        }
    }

    /// Normal call termination; the context is removed from the table
    async fn on_ended(&self, call_id: CallId, cause: u32) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, "end for unknown call");
            return;
        };
        debug!(%call_id, cause, "call ended");
        state.shared.last_fail_cause = cause;

        let token = state.detach(slot);
        state.calls.release(slot);
        match token {
            Some(token) => token.succeed(),
            None => self.notify(Unsolicited::CallStateChanged),
        }
    }

    /// Error termination; like a normal end but the waiter learns it failed
    async fn on_error(&self, call_id: CallId, cause: u32) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, cause, "error for unknown call");
            return;
        };
        debug!(%call_id, cause, "call failed");
        state.shared.last_fail_cause = cause;

        let token = state.detach(slot);
        state.calls.release(slot);
        if let Some(token) = token {
            reject(token, CallError::ModemRejected { cause });
        }
        self.notify(Unsolicited::CallStateChanged);
    }

    async fn on_hold_cnf(&self, call_id: CallId, cause: u32) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, "hold confirmation for unknown call");
            return;
        };
        debug!(%call_id, cause, "hold confirmed");

        if cause == 0 {
            if let Some(ctx) = state.calls.get_mut(slot) {
                ctx.state = CallState::Holding;
            }
        }
        if let Some(token) = state.detach(slot) {
            if cause == 0 {
                token.succeed();
            } else {
                reject(token, CallError::ModemRejected { cause });
            }
        }
    }

    async fn on_activate_cnf(&self, call_id: CallId, cause: u32) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(call_id) else {
            warn!(%call_id, "activate confirmation for unknown call");
            return;
        };
        debug!(%call_id, cause, "activate confirmed");

        if cause == 0 {
            if let Some(ctx) = state.calls.get_mut(slot) {
                ctx.state = CallState::Active;
            }
        }
        if let Some(token) = state.detach(slot) {
            if cause == 0 {
                token.succeed();
            } else {
                reject(token, CallError::ModemRejected { cause });
            }
        }
    }

    /// Swap confirmed: the two calls exchange foreground and background.
    ///
    /// The token was parked on the call being activated (held until now),
    /// so it is resolved from the confirmation's activated id.
    async fn on_swap_cnf(&self, activated_id: CallId, held_id: CallId, cause: u32) {
        let mut state = self.state.lock().await;
        let (Some(activated_slot), Some(held_slot)) =
            (state.calls.slot_of(activated_id), state.calls.slot_of(held_id))
        else {
            warn!(%activated_id, %held_id, "swap confirmation names an unknown call");
            return;
        };
        debug!(%activated_id, %held_id, cause, "swap confirmed");

        if cause == 0 {
            if let Some(ctx) = state.calls.get_mut(activated_slot) {
                ctx.state = CallState::Active;
            }
            if let Some(ctx) = state.calls.get_mut(held_slot) {
                ctx.state = CallState::Holding;
            }
        }
        if let Some(token) = state.detach(activated_slot) {
            if cause == 0 {
                token.succeed();
            } else {
                reject(token, CallError::ModemRejected { cause });
            }
        }
    }

    async fn on_dtmf_start_cnf(&self, reason: u32) {
        let mut state = self.state.lock().await;
        let Some(token) = state.shared.dtmf_start.take() else {
            debug!(reason, "dtmf start confirmation with no waiter");
            return;
        };
        if reason == 0 {
            token.succeed();
        } else {
            reject(token, CallError::ModemRejected { cause: reason });
        }
    }

    async fn on_dtmf_stop_cnf(&self, reason: u32) {
        let mut state = self.state.lock().await;
        let Some(token) = state.shared.dtmf_stop.take() else {
            debug!(reason, "dtmf stop confirmation with no waiter");
            return;
        };
        if reason == 0 {
            token.succeed();
        } else {
            reject(token, CallError::ModemRejected { cause: reason });
        }
    }
}
