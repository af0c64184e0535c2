//! Inbound protocol-class frame path
//!
//! Every recognized message kind is logged and no-oped; this is a
//! placeholder boundary the protocol reserves for network lifecycle
//! handling. Unknown kinds and undecodable frames are logged and dropped,
//! never surfaced as failures.

use modemlink_proto_core::{Envelope, ProtoMessageKind, ProtoPacket};
use tracing::{debug, warn};

impl super::CallEngine {
    /// Handle one inbound protocol-class frame
    pub fn handle_frame(&self, frame: &Envelope) {
        let packet = match ProtoPacket::decode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "dropping undecodable protocol frame");
                return;
            }
        };

        let kind = packet.header.kind;
        match kind {
            ProtoMessageKind::Startup => debug!("startup packet received"),
            ProtoMessageKind::Cleanup => debug!("cleanup packet received"),
            ProtoMessageKind::StartNetwork => debug!("start-network packet received"),
            ProtoMessageKind::StopNetwork => debug!("stop-network packet received"),
            ProtoMessageKind::StartingNetworkInd => {
                debug!("starting-network indication received")
            }
            ProtoMessageKind::StartNetworkCnf => debug!("start-network confirmation received"),
            ProtoMessageKind::StartNetworkInd => debug!("start-network indication received"),
            ProtoMessageKind::StopNetworkCnf => debug!("stop-network confirmation received"),
            ProtoMessageKind::StopNetworkInd => debug!("stop-network indication received"),
            ProtoMessageKind::SuspendNetworkInd => {
                debug!("suspend-network indication received")
            }
            ProtoMessageKind::ResumeNetworkInd => debug!("resume-network indication received"),
        }
    }
}
