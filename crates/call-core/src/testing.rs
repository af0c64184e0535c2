//! In-memory modem doubles for tests
//!
//! [`MockModem`] records every command and frame the engine emits so tests
//! can assert on exactly what would have reached the hardware.

use std::sync::Arc;

use async_trait::async_trait;
use modemlink_proto_core::Envelope;
use parking_lot::Mutex;

use crate::error::{TransportError, TransportResult};
use crate::transport::{CallCommand, CommandOutbox, ModemTransport};

/// Recording stand-in for both outbound modem seams
#[derive(Debug, Default)]
pub struct MockModem {
    commands: Mutex<Vec<CallCommand>>,
    frames: Mutex<Vec<Envelope>>,
    offline: Mutex<bool>,
}

impl MockModem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Commands sent so far, oldest first
    pub fn commands(&self) -> Vec<CallCommand> {
        self.commands.lock().clone()
    }

    /// Frames sent so far, oldest first
    pub fn frames(&self) -> Vec<Envelope> {
        self.frames.lock().clone()
    }

    /// Drain and return the recorded commands
    pub fn take_commands(&self) -> Vec<CallCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// Make every subsequent send fail, as a dead link would
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    fn check_link(&self) -> TransportResult<()> {
        if *self.offline.lock() {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CommandOutbox for MockModem {
    async fn send_command(&self, command: CallCommand) -> TransportResult<()> {
        self.check_link()?;
        self.commands.lock().push(command);
        Ok(())
    }
}

#[async_trait]
impl ModemTransport for MockModem {
    async fn send_frame(&self, frame: Envelope) -> TransportResult<()> {
        self.check_link()?;
        self.frames.lock().push(frame);
        Ok(())
    }
}
