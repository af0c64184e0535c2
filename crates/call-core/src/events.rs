//! Event types crossing the engine's two boundaries
//!
//! [`Unsolicited`] flows out to the service boundary; [`CallIndication`]
//! flows in from the modem-event path.

use crate::types::{CallId, CallInfo};

/// Unprompted notification pushed to the service boundary.
///
/// Notifications carry no payload; clients re-query the call list on
/// receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsolicited {
    /// An incoming call is ringing
    Ring,
    /// Some call changed state without a request waiting on it
    CallStateChanged,
}

/// Decoded call-control message arriving from the modem.
///
/// Indications report spontaneous state changes; confirmations (`*Cnf`)
/// answer a previously sent command and carry the modem's cause code, where
/// zero means accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallIndication {
    /// A new mobile-terminated call has appeared
    IncomingCall(CallInfo),
    /// Call setup was acknowledged; the dialing context gets its real id
    SetupAssigned { call_id: CallId },
    /// The remote end is being alerted
    Alert { call_id: CallId, audio_on: bool },
    /// The call is connected
    Connected { call_id: CallId },
    /// The call ended normally with the given cause
    Ended { call_id: CallId, cause: u32 },
    /// The call was torn down by an error
    Error { call_id: CallId, cause: u32 },
    /// Reply to a hold command
    HoldCnf { call_id: CallId, cause: u32 },
    /// Reply to an activate command
    ActivateCnf { call_id: CallId, cause: u32 },
    /// Reply to a swap command, naming both repositioned calls
    SwapCnf {
        activated_id: CallId,
        held_id: CallId,
        cause: u32,
    },
    /// Reply to a DTMF start command
    DtmfStartCnf { reason: u32 },
    /// Reply to a DTMF stop command
    DtmfStopCnf { reason: u32 },
}
