//! The call engine: correlation between service requests and modem events
//!
//! [`CallEngine`] owns all mutable call state behind a single lock. The
//! request path (service boundary) and the modem-event path are the only two
//! writers, and both funnel through that lock, so every mutation of the call
//! table and of the shared scalars is serialized. The lock is never held
//! across a settle delay; chained operations re-validate their target by id
//! after sleeping.
//!
//! Operation implementations are split by direction:
//!
//! - [`requests`] — the request-driven operations (dial, hangups, answer,
//!   switch, DTMF, queries)
//! - [`indications`] — handlers for decoded modem indications and
//!   confirmations
//! - [`frames`] — the inbound protocol-class frame path

mod frames;
mod indications;
mod requests;

use std::sync::Arc;

use modemlink_proto_core::ProtoPacket;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{CallError, CallResult};
use crate::events::Unsolicited;
use crate::table::CallTable;
use crate::token::RequestToken;
use crate::transport::{CallCommand, CommandOutbox, ModemTransport};
use crate::types::{CallId, CallType};

/// Process-wide scalars not tied to one call
#[derive(Debug, Default)]
pub(crate) struct SharedCallState {
    /// Cause code of the most recent termination or error
    pub last_fail_cause: u32,
    /// Tone currently playing, if any
    pub active_dtmf_tone: Option<char>,
    /// Single-slot token for the outstanding DTMF start request
    pub dtmf_start: Option<RequestToken>,
    /// Single-slot token for the outstanding DTMF stop request
    pub dtmf_stop: Option<RequestToken>,
}

/// Everything the engine mutates, guarded by one lock
pub(crate) struct EngineState {
    pub calls: CallTable,
    pub shared: SharedCallState,
}

impl EngineState {
    /// Whether the context in `slot` has an outstanding request
    pub fn pending_on(&self, slot: usize) -> bool {
        self.calls.get(slot).is_some_and(|ctx| ctx.has_pending())
    }

    /// Attach a request token to the context in `slot`
    pub fn attach(&mut self, slot: usize, token: RequestToken) {
        if let Some(ctx) = self.calls.get_mut(slot) {
            ctx.pending = Some(token);
        }
    }

    /// Take the pending token off the context in `slot`, if any
    pub fn detach(&mut self, slot: usize) -> Option<RequestToken> {
        self.calls.get_mut(slot).and_then(|ctx| ctx.pending.take())
    }

    /// Type and id needed to address the call in `slot`
    pub fn call_ref(&self, slot: usize) -> Option<(CallType, CallId)> {
        self.calls.get(slot).map(|ctx| (ctx.call_type, ctx.call_id))
    }
}

/// Correlation engine between the telephony service boundary and the
/// baseband modem link.
///
/// Construct with [`CallEngine::new`], feed requests through the operation
/// methods and modem traffic through [`CallEngine::handle_indication`] /
/// [`CallEngine::handle_frame`]. Unsolicited notifications arrive on the
/// receiver returned from the constructor.
pub struct CallEngine {
    config: EngineConfig,
    state: Mutex<EngineState>,
    outbox: Arc<dyn CommandOutbox>,
    transport: Arc<dyn ModemTransport>,
    unsolicited: mpsc::UnboundedSender<Unsolicited>,
}

impl CallEngine {
    /// Create an engine wired to the given modem seams.
    ///
    /// Returns the engine and the stream of unsolicited notifications.
    pub fn new(
        config: EngineConfig,
        outbox: Arc<dyn CommandOutbox>,
        transport: Arc<dyn ModemTransport>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Unsolicited>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Self {
            state: Mutex::new(EngineState {
                calls: CallTable::new(config.max_calls),
                shared: SharedCallState::default(),
            }),
            config,
            outbox,
            transport,
            unsolicited: tx,
        });
        (engine, rx)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Announce the engine to the modem with the protocol startup message
    pub async fn startup(&self) -> CallResult<()> {
        self.transport
            .send_frame(ProtoPacket::startup().encode())
            .await?;
        Ok(())
    }

    pub(crate) fn notify(&self, event: Unsolicited) {
        let _ = self.unsolicited.send(event);
    }

    /// Send a command on behalf of the request whose token sits on `slot`.
    ///
    /// On a transport failure the token is taken back off the context and
    /// failed. Returns whether the command went out.
    pub(crate) async fn send_tracked(
        &self,
        state: &mut EngineState,
        slot: usize,
        command: CallCommand,
    ) -> bool {
        if let Err(e) = self.outbox.send_command(command).await {
            if let Some(token) = state.detach(slot) {
                reject(token, CallError::from(e));
            }
            return false;
        }
        true
    }
}

/// Complete a request as failed, logging why
pub(crate) fn reject(token: RequestToken, error: CallError) {
    warn!(%error, "request rejected");
    token.fail();
}
