//! Status-sync packets exchanged between gateways.
//!
//! Gateways periodically broadcast their status sequence. A peer that sees a
//! sequence it has not recorded asks for the full status, and the owner
//! answers with an encoded [`NodeStatus`](crate::NodeStatus).

use crate::error::{GatewayError, Result};
use crate::types::P2pId;

const TAG_SYNC_SEQ: u8 = 1;
const TAG_REQUEST_STATUS: u8 = 2;
const TAG_RESPONSE_STATUS: u8 = 3;

/// Messages of the status-sync handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPacket {
    /// Announces the sender's current status sequence.
    SyncSeq {
        /// The sender's sequence.
        seq: u32,
    },

    /// Asks the receiver for its full status.
    RequestStatus,

    /// Carries the sender's full status.
    ResponseStatus {
        /// An encoded `NodeStatus`.
        payload: Vec<u8>,
    },
}

impl StatusPacket {
    /// Encodes the packet as a one-byte tag followed by its body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::SyncSeq { seq } => {
                let mut buf = Vec::with_capacity(5);
                buf.push(TAG_SYNC_SEQ);
                buf.extend_from_slice(&seq.to_be_bytes());
                buf
            }
            Self::RequestStatus => vec![TAG_REQUEST_STATUS],
            Self::ResponseStatus { payload } => {
                let mut buf = Vec::with_capacity(1 + payload.len());
                buf.push(TAG_RESPONSE_STATUS);
                buf.extend_from_slice(payload);
                buf
            }
        }
    }

    /// Decodes a packet.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPacket`] for an empty buffer, an
    /// unknown tag, or a body of the wrong size.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (&tag, body) = data
            .split_first()
            .ok_or_else(|| GatewayError::MalformedPacket("empty packet".to_string()))?;

        match tag {
            TAG_SYNC_SEQ => {
                let word: [u8; 4] = body.try_into().map_err(|_| {
                    GatewayError::MalformedPacket(format!(
                        "sync seq body is {} bytes, expected 4",
                        body.len()
                    ))
                })?;
                Ok(Self::SyncSeq {
                    seq: u32::from_be_bytes(word),
                })
            }
            TAG_REQUEST_STATUS if body.is_empty() => Ok(Self::RequestStatus),
            TAG_REQUEST_STATUS => Err(GatewayError::MalformedPacket(
                "status request carries a body".to_string(),
            )),
            TAG_RESPONSE_STATUS => Ok(Self::ResponseStatus {
                payload: body.to_vec(),
            }),
            other => Err(GatewayError::MalformedPacket(format!(
                "unknown packet tag {other}"
            ))),
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SyncSeq { .. } => "sync_seq",
            Self::RequestStatus => "request_status",
            Self::ResponseStatus { .. } => "response_status",
        }
    }
}

/// Outbound side of the P2P transport used for status sync.
///
/// Implementations only queue or hand off bytes; they must not call back into
/// the directory.
pub trait StatusTransport: Send + Sync {
    /// Sends a packet to one peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet cannot be handed to the transport.
    fn send_to(&self, peer: &P2pId, packet: Vec<u8>) -> Result<()>;

    /// Sends a packet to every connected peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet cannot be handed to the transport.
    fn broadcast(&self, packet: Vec<u8>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn sync_seq_layout() {
        let packet = StatusPacket::SyncSeq { seq: 0x0102_0304 };
        assert_eq!(packet.encode(), vec![1, 1, 2, 3, 4]);
        assert_eq!(StatusPacket::decode(&packet.encode()).ok(), Some(packet));
    }

    #[test]
    fn response_carries_payload_verbatim() {
        let packet = StatusPacket::ResponseStatus {
            payload: vec![9, 8, 7],
        };
        let decoded = StatusPacket::decode(&packet.encode()).ok();
        assert_eq!(decoded, Some(packet));
    }

    #[test]
    fn request_status_is_a_single_byte() {
        assert_eq!(StatusPacket::RequestStatus.encode(), vec![2]);
        assert_eq!(
            StatusPacket::decode(&[2]).ok(),
            Some(StatusPacket::RequestStatus)
        );
    }

    #[test_case(&[] ; "empty")]
    #[test_case(&[1, 0, 0] ; "short sync seq")]
    #[test_case(&[1, 0, 0, 0, 0, 0] ; "long sync seq")]
    #[test_case(&[2, 0] ; "request with body")]
    #[test_case(&[42] ; "unknown tag")]
    fn malformed_packets_are_rejected(data: &[u8]) {
        assert!(matches!(
            StatusPacket::decode(data),
            Err(GatewayError::MalformedPacket(_))
        ));
    }
}
