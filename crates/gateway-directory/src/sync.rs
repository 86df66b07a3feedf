//! Status-sync handshake between gateways.
//!
//! ```text
//!   gateway A                          gateway B
//!   ─────────                          ─────────
//!   broadcast_status_seq ──SyncSeq──▶  status_changed(A, seq)?
//!                        ◀─Request──   (only when changed)
//!   generate_node_status ──Response─▶  decode + update_peer_status
//! ```
//!
//! The periodic trigger for [`GatewayNodeManager::broadcast_status_seq`] and
//! the delivery of inbound packets belong to the transport layer.

use tracing::{debug, warn};

use crate::error::{GatewayError, Result};
use crate::manager::GatewayNodeManager;
use crate::packet::{StatusPacket, StatusTransport};
use crate::status::NodeStatus;
use crate::types::P2pId;

impl<H> GatewayNodeManager<H> {
    /// Announces the local status sequence to every connected peer.
    pub fn broadcast_status_seq(&self, transport: &dyn StatusTransport) -> Result<()> {
        let seq = self.status_seq();
        debug!(seq, "Broadcasting status seq");
        transport.broadcast(StatusPacket::SyncSeq { seq }.encode())
    }

    /// Returns true if `peer` announced a sequence that has not been applied
    /// yet, meaning its full status should be requested.
    #[must_use]
    pub fn on_receive_status_seq(&self, peer: &P2pId, seq: u32) -> bool {
        let changed = self.status_changed(peer, seq);
        if changed {
            debug!(peer = %peer, seq, recorded = ?self.peer_seq(peer), "Peer status seq changed");
        }
        changed
    }

    /// Decodes a full status sent by `peer` and applies it if its sequence
    /// differs from the recorded one.
    ///
    /// Returns whether the peer record changed. Oversized or malformed input
    /// is rejected before any state is touched.
    pub fn on_receive_node_status(&self, peer: &P2pId, data: &[u8]) -> Result<bool> {
        let limit = self.config().max_status_size;
        if !self.config().is_status_size_valid(data.len()) {
            warn!(peer = %peer, size = data.len(), limit, "Rejected oversized peer status");
            return Err(GatewayError::StatusTooLarge {
                size: data.len(),
                limit,
            });
        }

        let status = NodeStatus::decode(data).inspect_err(|e| {
            warn!(peer = %peer, error = %e, "Rejected malformed peer status");
        })?;

        if !self.status_changed(peer, status.seq()) {
            debug!(peer = %peer, seq = status.seq(), "Peer status unchanged");
            return Ok(false);
        }
        self.update_peer_status(peer, status);
        Ok(true)
    }

    /// Handles a status-sync packet received from `peer`, replying through
    /// `transport` when the handshake calls for it.
    pub fn handle_packet(
        &self,
        peer: &P2pId,
        data: &[u8],
        transport: &dyn StatusTransport,
    ) -> Result<()> {
        let packet = StatusPacket::decode(data).inspect_err(|e| {
            warn!(peer = %peer, error = %e, "Dropped malformed status packet");
        })?;
        debug!(peer = %peer, kind = packet.kind(), "Received status packet");

        match packet {
            StatusPacket::SyncSeq { seq } => {
                if self.on_receive_status_seq(peer, seq) {
                    transport.send_to(peer, StatusPacket::RequestStatus.encode())?;
                }
                Ok(())
            }
            StatusPacket::RequestStatus => {
                let payload = self.generate_node_status();
                transport.send_to(peer, StatusPacket::ResponseStatus { payload }.encode())
            }
            StatusPacket::ResponseStatus { payload } => {
                self.on_receive_node_status(peer, &payload).map(|_| ())
            }
        }
    }

    /// Forgets a peer whose session closed.
    pub fn on_peer_disconnected(&self, peer: &P2pId) {
        self.on_remove_node_ids(peer);
    }
}
