//! Request-driven operations
//!
//! Every operation here owns one [`RequestToken`] and guarantees exactly one
//! completion on every exit path: validation failures complete it as a
//! generic failure immediately, accepted requests park it on the targeted
//! context (or DTMF slot) for the matching confirmation to resolve, and the
//! no-op cases complete it as success on the spot.
//!
//! A request against a context that already carries a token fails with
//! `Busy` — requests are admission-controlled, never queued.

use tokio::time::sleep;
use tracing::debug;

use super::reject;
use crate::error::CallError;
use crate::table::CallContext;
use crate::token::{RequestToken, ResponsePayload};
use crate::transport::CallCommand;
use crate::types::{CallState, CallType, LastCallFailCause, PhoneNumber};

fn is_dtmf_tone(tone: char) -> bool {
    matches!(tone, '0'..='9' | '*' | '#' | 'A'..='D')
}

impl super::CallEngine {
    /// Place an outgoing voice call.
    ///
    /// Rejected while another dial is still waiting for its id from the
    /// modem, and when the number is malformed or the table is full.
    pub async fn dial(&self, token: RequestToken, number: &str) {
        let number = match PhoneNumber::new(number) {
            Ok(number) => number,
            Err(e) => return reject(token, e),
        };

        let mut state = self.state.lock().await;
        if state.calls.find_provisional().is_some() {
            return reject(token, CallError::Busy);
        }
        let slot = match state.calls.allocate(CallContext::outgoing(number.clone())) {
            Ok(slot) => slot,
            Err(e) => return reject(token, e),
        };
        debug!(number = %number, slot, "dialing");

        state.attach(slot, token);
        let command = CallCommand::Setup {
            number,
            call_type: CallType::Voice,
        };
        if !self.send_tracked(&mut state, slot, command).await {
            state.calls.release(slot);
        }
    }

    /// Release the call at a 1-based slot index
    pub async fn hangup(&self, token: RequestToken, index: usize) {
        if index == 0 {
            let details = "call index 0 is not addressable".to_string();
            return reject(token, CallError::MalformedInput { details });
        }

        let mut state = self.state.lock().await;
        let slot = index - 1;
        let Some((call_type, call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "call at index" });
        };
        if state.pending_on(slot) {
            return reject(token, CallError::Busy);
        }
        debug!(%call_id, "hanging up by index");

        state.attach(slot, token);
        let command = CallCommand::Release {
            call_type,
            call_id,
            cause: 0,
        };
        self.send_tracked(&mut state, slot, command).await;
    }

    /// Hang up the waiting or background call.
    ///
    /// When several calls qualify, a waiting call is dropped in preference
    /// to disturbing an established pair; with no call at all the request
    /// succeeds as a no-op, since the remote side may have dropped the call
    /// before this side learned of it.
    pub async fn hangup_waiting_or_background(&self, token: RequestToken) {
        let mut state = self.state.lock().await;
        let active = state.calls.find_by_state(CallState::Active);
        let holding = state.calls.find_by_state(CallState::Holding);
        let waiting = state.calls.find_by_state(CallState::Waiting);
        let incoming = state.calls.find_by_state(CallState::Incoming);

        for slot in [active, holding, waiting, incoming].into_iter().flatten() {
            if state.pending_on(slot) {
                return reject(token, CallError::Busy);
            }
        }

        let target = if waiting.is_some() && (holding.is_some() || active.is_some()) {
            waiting
        } else {
            active.or(holding).or(waiting).or(incoming)
        };
        let Some(slot) = target else {
            debug!("no call left to hang up");
            return token.succeed();
        };
        let Some((call_type, call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "call to hang up" });
        };
        debug!(%call_id, "hanging up waiting/background call");

        state.attach(slot, token);
        let command = CallCommand::Release {
            call_type,
            call_id,
            cause: 0,
        };
        self.send_tracked(&mut state, slot, command).await;
    }

    /// Hang up the foreground call and resume the held one.
    ///
    /// With both an active and a held call this is a two-step chain:
    /// release the active call, wait out the settle delay, then activate
    /// the held call. The token rides on the held context, so it resolves
    /// with the activate confirmation.
    pub async fn hangup_foreground_resume_background(&self, token: RequestToken) {
        let holding_id = {
            let mut state = self.state.lock().await;
            let active = state.calls.find_by_state(CallState::Active);
            let holding = state.calls.find_by_state(CallState::Holding);

            for slot in [active, holding].into_iter().flatten() {
                if state.pending_on(slot) {
                    return reject(token, CallError::Busy);
                }
            }

            match (active, holding) {
                (None, None) => {
                    debug!("no foreground or background call left");
                    return token.succeed();
                }
                (Some(slot), None) | (None, Some(slot)) => {
                    let Some((call_type, call_id)) = state.call_ref(slot) else {
                        return reject(token, CallError::NotFound { what: "call to hang up" });
                    };
                    debug!(%call_id, "hanging up the only call");
                    state.attach(slot, token);
                    let command = CallCommand::Release {
                        call_type,
                        call_id,
                        cause: 0,
                    };
                    self.send_tracked(&mut state, slot, command).await;
                    return;
                }
                (Some(active_slot), Some(holding_slot)) => {
                    let Some((call_type, active_id)) = state.call_ref(active_slot) else {
                        return reject(token, CallError::NotFound { what: "active call" });
                    };
                    let Some((_, holding_id)) = state.call_ref(holding_slot) else {
                        return reject(token, CallError::NotFound { what: "held call" });
                    };
                    debug!(%active_id, %holding_id, "releasing foreground, will resume background");
                    state.attach(holding_slot, token);
                    let command = CallCommand::Release {
                        call_type,
                        call_id: active_id,
                        cause: 0,
                    };
                    if !self.send_tracked(&mut state, holding_slot, command).await {
                        return;
                    }
                    holding_id
                }
            }
        };

        sleep(self.config.release_settle).await;

        let mut state = self.state.lock().await;
        // The held call may have ended during the delay, resolving the
        // token through the end indication. Only activate what is left.
        if let Some(slot) = state.calls.slot_of(holding_id) {
            let command = CallCommand::Activate { call_id: holding_id };
            self.send_tracked(&mut state, slot, command).await;
        }
    }

    /// Accept the incoming call
    pub async fn answer(&self, token: RequestToken) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.find_by_state(CallState::Incoming) else {
            return reject(token, CallError::NotFound { what: "incoming call" });
        };
        if state.pending_on(slot) {
            return reject(token, CallError::Busy);
        }
        let Some((call_type, call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "incoming call" });
        };
        debug!(%call_id, "answering");

        state.attach(slot, token);
        let command = CallCommand::Answer { call_type, call_id };
        self.send_tracked(&mut state, slot, command).await;
    }

    /// Rearrange the foreground: swap an active/held pair, hold a lone
    /// active call, resume a lone held call, or bring a waiting call up.
    ///
    /// The active+waiting combination is a two-step chain: hold the active
    /// call, wait out the settle delay, then answer the waiting call with
    /// the token riding on it.
    pub async fn switch_waiting_or_holding_and_active(&self, token: RequestToken) {
        let waiting_id = {
            let mut state = self.state.lock().await;
            let active = state.calls.find_by_state(CallState::Active);
            let holding = state.calls.find_by_state(CallState::Holding);
            let waiting = state.calls.find_by_state(CallState::Waiting);

            for slot in [active, holding, waiting].into_iter().flatten() {
                if state.pending_on(slot) {
                    return reject(token, CallError::Busy);
                }
            }

            match (active, holding, waiting) {
                (Some(active_slot), Some(holding_slot), _) => {
                    let Some((_, active_id)) = state.call_ref(active_slot) else {
                        return reject(token, CallError::NotFound { what: "active call" });
                    };
                    let Some((_, held_id)) = state.call_ref(holding_slot) else {
                        return reject(token, CallError::NotFound { what: "held call" });
                    };
                    debug!(%active_id, %held_id, "swapping foreground and background");
                    // The token rides on the held call, which the swap
                    // confirmation will report as activated.
                    state.attach(holding_slot, token);
                    let command = CallCommand::Swap { active_id, held_id };
                    self.send_tracked(&mut state, holding_slot, command).await;
                    return;
                }
                (Some(active_slot), None, Some(waiting_slot)) => {
                    let Some((_, active_id)) = state.call_ref(active_slot) else {
                        return reject(token, CallError::NotFound { what: "active call" });
                    };
                    let Some((_, waiting_id)) = state.call_ref(waiting_slot) else {
                        return reject(token, CallError::NotFound { what: "waiting call" });
                    };
                    debug!(%active_id, %waiting_id, "holding foreground, will answer waiting call");
                    if let Err(e) = self
                        .outbox
                        .send_command(CallCommand::Hold { call_id: active_id })
                        .await
                    {
                        return reject(token, e.into());
                    }
                    waiting_id
                }
                (None, _, Some(waiting_slot)) => {
                    let Some((call_type, call_id)) = state.call_ref(waiting_slot) else {
                        return reject(token, CallError::NotFound { what: "waiting call" });
                    };
                    debug!(%call_id, "answering waiting call");
                    state.attach(waiting_slot, token);
                    let command = CallCommand::Answer { call_type, call_id };
                    self.send_tracked(&mut state, waiting_slot, command).await;
                    return;
                }
                (Some(active_slot), None, None) => {
                    let Some((_, call_id)) = state.call_ref(active_slot) else {
                        return reject(token, CallError::NotFound { what: "active call" });
                    };
                    debug!(%call_id, "holding the only call");
                    state.attach(active_slot, token);
                    let command = CallCommand::Hold { call_id };
                    self.send_tracked(&mut state, active_slot, command).await;
                    return;
                }
                (None, Some(holding_slot), None) => {
                    let Some((_, call_id)) = state.call_ref(holding_slot) else {
                        return reject(token, CallError::NotFound { what: "held call" });
                    };
                    debug!(%call_id, "resuming the held call");
                    state.attach(holding_slot, token);
                    let command = CallCommand::Activate { call_id };
                    self.send_tracked(&mut state, holding_slot, command).await;
                    return;
                }
                (None, None, None) => {
                    debug!("nothing to switch");
                    return token.succeed();
                }
            }
        };

        sleep(self.config.hold_settle).await;

        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.slot_of(waiting_id) else {
            // Dropped remotely while the hold settled; nothing to answer.
            debug!(%waiting_id, "waiting call gone after hold settle");
            return token.succeed();
        };
        if state.pending_on(slot) {
            return reject(token, CallError::Busy);
        }
        let Some((call_type, call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "waiting call" });
        };
        state.attach(slot, token);
        let command = CallCommand::Answer { call_type, call_id };
        self.send_tracked(&mut state, slot, command).await;
    }

    /// Start playing a DTMF tone on the active call.
    ///
    /// An unfinished previous tone is stopped first, fire-and-forget, with
    /// a short settle in between.
    pub async fn start_dtmf(&self, token: RequestToken, tone: char) {
        if !is_dtmf_tone(tone) {
            let details = format!("'{tone}' is not a DTMF tone");
            return reject(token, CallError::MalformedInput { details });
        }

        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.find_by_state(CallState::Active) else {
            return reject(token, CallError::NotFound { what: "active call" });
        };
        let Some((_, mut call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "active call" });
        };

        if state.shared.active_dtmf_tone.is_some() {
            debug!(%call_id, "stopping unfinished tone first");
            if let Err(e) = self
                .outbox
                .send_command(CallCommand::StopDtmf { call_id })
                .await
            {
                return reject(token, e.into());
            }
            drop(state);
            sleep(self.config.dtmf_settle).await;

            state = self.state.lock().await;
            let Some(slot) = state.calls.find_by_state(CallState::Active) else {
                return reject(token, CallError::NotFound { what: "active call" });
            };
            let Some((_, id)) = state.call_ref(slot) else {
                return reject(token, CallError::NotFound { what: "active call" });
            };
            call_id = id;
        }

        state.shared.active_dtmf_tone = Some(tone);
        if let Err(e) = self
            .outbox
            .send_command(CallCommand::StartDtmf { call_id, tone })
            .await
        {
            return reject(token, e.into());
        }
        if let Some(superseded) = state.shared.dtmf_start.replace(token) {
            debug!("dtmf start token superseded before its confirmation");
            superseded.fail();
        }
    }

    /// Stop the currently playing DTMF tone
    pub async fn stop_dtmf(&self, token: RequestToken) {
        let mut state = self.state.lock().await;
        let Some(slot) = state.calls.find_by_state(CallState::Active) else {
            return reject(token, CallError::NotFound { what: "active call" });
        };
        let Some((_, call_id)) = state.call_ref(slot) else {
            return reject(token, CallError::NotFound { what: "active call" });
        };

        state.shared.active_dtmf_tone = None;
        if let Err(e) = self
            .outbox
            .send_command(CallCommand::StopDtmf { call_id })
            .await
        {
            return reject(token, e.into());
        }
        if let Some(superseded) = state.shared.dtmf_stop.replace(token) {
            debug!("dtmf stop token superseded before its confirmation");
            superseded.fail();
        }
    }

    /// Send a single DTMF tone burst.
    ///
    /// The modem link carries no burst command; the request is acknowledged
    /// locally.
    pub async fn send_dtmf(&self, token: RequestToken, tone: char) {
        if !is_dtmf_tone(tone) {
            let details = format!("'{tone}' is not a DTMF tone");
            return reject(token, CallError::MalformedInput { details });
        }
        debug!(%tone, "dtmf burst acknowledged locally");
        token.succeed();
    }

    /// Report why the last call ended.
    ///
    /// Maps the stored cause code into the closed category set without
    /// clearing it.
    pub async fn last_call_fail_cause(&self, token: RequestToken) {
        let state = self.state.lock().await;
        let cause = LastCallFailCause::from_cause(state.shared.last_fail_cause);
        token.succeed_with(ResponsePayload::FailCause(cause));
    }

    /// List every established call for the service boundary
    pub async fn current_calls(&self, token: RequestToken) {
        let state = self.state.lock().await;
        token.succeed_with(ResponsePayload::CallList(state.calls.snapshots()));
    }
}
