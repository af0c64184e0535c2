//! Call-control correlation engine for modemlink
//!
//! This crate bridges a synchronous request/response telephony service
//! interface to an asynchronous, event-driven baseband modem link. Callers
//! issue call-control requests (dial, hang up, answer, hold, swap, DTMF)
//! that each complete exactly once; independently, the modem emits
//! unsolicited indications (incoming call, connected, ended, hold/swap
//! confirmations) that are correlated with outstanding requests or surfaced
//! as unprompted notifications.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  requests + tokens   ┌──────────────────────┐
//! │   Service Boundary   │ ───────────────────► │      CallEngine      │
//! │ (dial/hangup/answer) │ ◄─────────────────── │  table + correlator  │
//! └──────────────────────┘  outcomes, Ring /    │   + state machine    │
//!                           CallStateChanged    └──────────┬───────────┘
//!                                                          │ CallCommand /
//!                                                          │ proto frames
//!                                               ┌──────────▼───────────┐
//!                                               │    modem transport   │
//!                                               └──────────────────────┘
//! ```
//!
//! Both the request path and the modem-event path funnel through one lock
//! inside [`CallEngine`], so call state only ever has a single writer.
//!
//! # Example
//!
//! ```rust
//! use modemlink_call_core::{
//!     CallEngine, CallId, CallIndication, EngineConfig, RequestToken,
//! };
//! use modemlink_call_core::testing::MockModem;
//!
//! # async fn example() {
//! let modem = MockModem::new();
//! let (engine, _unsolicited) =
//!     CallEngine::new(EngineConfig::default(), modem.clone(), modem.clone());
//!
//! let (token, response) = RequestToken::new();
//! engine.dial(token, "5551234").await;
//!
//! // The modem acknowledges setup and connects the call.
//! engine
//!     .handle_indication(CallIndication::SetupAssigned { call_id: CallId(3) })
//!     .await;
//! engine
//!     .handle_indication(CallIndication::Connected { call_id: CallId(3) })
//!     .await;
//!
//! assert!(response.outcome().await.is_success());
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod table;
pub mod testing;
pub mod token;
pub mod transport;
pub mod types;

pub use config::EngineConfig;
pub use engine::CallEngine;
pub use error::{CallError, CallResult, TransportError, TransportResult};
pub use events::{CallIndication, Unsolicited};
pub use token::{PendingResponse, RequestOutcome, RequestToken, ResponsePayload};
pub use transport::{CallCommand, CommandOutbox, ModemTransport};
pub use types::{
    CallId, CallInfo, CallSnapshot, CallState, CallType, LastCallFailCause, PhoneNumber,
};
