//! Type definitions for the call engine
//!
//! Plain data types shared between the service boundary, the call table and
//! the modem-facing command set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CallError;

// ===== CALL IDENTITY =====

/// Identifier the modem assigns to a call once setup is acknowledged.
///
/// A locally dialed call starts out with the provisional sentinel and gains
/// its real id from the setup indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub u32);

impl CallId {
    /// Sentinel for a context the modem has not named yet.
    pub const PROVISIONAL: CallId = CallId(0xFF);

    /// Whether this id is still the provisional sentinel
    pub fn is_provisional(&self) -> bool {
        *self == Self::PROVISIONAL
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_provisional() {
            write!(f, "provisional")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Bearer classification used when constructing release/answer commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    Voice,
    Data,
    Video,
    /// Raw classification passed through from the modem
    Other(u32),
}

/// Lifecycle state of a call context.
///
/// There is no ended state: termination removes the context from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallState {
    /// Locally dialed, setup not yet acknowledged
    Dialing,
    /// Remote call ringing with no other call up
    Incoming,
    /// Remote call ringing behind an active or held call
    Waiting,
    /// Remote end is being alerted
    Alerting,
    /// Connected and in the foreground
    Active,
    /// Connected and held in the background
    Holding,
}

// ===== NUMBERS =====

/// Bounded-length dialable number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Longest accepted number, matching the modem's fixed-size fields.
    pub const MAX_LEN: usize = 82;

    /// Validate and wrap a dial string
    pub fn new(number: &str) -> Result<Self, CallError> {
        if number.is_empty() {
            return Err(CallError::MalformedInput {
                details: "empty number".to_string(),
            });
        }
        if number.len() > Self::MAX_LEN {
            return Err(CallError::MalformedInput {
                details: format!("number longer than {} bytes", Self::MAX_LEN),
            });
        }
        Ok(Self(number.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the number carries an international prefix
    pub fn is_international(&self) -> bool {
        self.0.starts_with('+')
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== INDICATION PAYLOADS =====

/// Call identity delivered with an incoming-call indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub call_id: CallId,
    pub call_type: CallType,
    pub number: PhoneNumber,
}

// ===== SERVICE-FACING VIEWS =====

/// Read-only view of one call, as returned by the call-list query.
///
/// Field encodings follow the telephony service contract: `toa` 145 for
/// international numbers and 129 otherwise, presentation 0 when a number is
/// known and 2 when it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSnapshot {
    /// 1-based slot index, usable with the hang-up-by-index request
    pub index: usize,
    pub call_id: CallId,
    pub state: CallState,
    pub number: String,
    pub toa: u8,
    pub is_mpty: bool,
    pub is_mt: bool,
    pub is_voice: bool,
    pub number_presentation: u8,
    pub name_presentation: u8,
}

/// Closed set of fail-cause categories reported to the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastCallFailCause {
    Normal,
    Busy,
    Congestion,
    UnobtainableNumber,
    ErrorUnspecified,
}

impl LastCallFailCause {
    /// Map a raw modem cause code into the closed category set.
    ///
    /// Total over all inputs; anything outside the known codes reports as
    /// unspecified.
    pub fn from_cause(cause: u32) -> Self {
        match cause {
            66 | 24 => LastCallFailCause::Normal,
            7 => LastCallFailCause::Busy,
            44 => LastCallFailCause::Congestion,
            43 => LastCallFailCause::UnobtainableNumber,
            _ => LastCallFailCause::ErrorUnspecified,
        }
    }
}
