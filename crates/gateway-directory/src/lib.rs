//! # gateway-directory
//!
//! Membership and routing directory for P2P gateways.
//!
//! Every gateway hosts front services identified by a `(group, node)` pair.
//! Gateways gossip versioned snapshots of what they host, so each one can
//! answer "which peer gateways reach node X in group G" without a central
//! registry.
//!
//! ## Core Types
//!
//! - [`RouterTable`]: `group -> node -> handle` index used for local registrations
//! - [`PeerRouterTable`]: aggregate `(group, node) -> peers` index
//! - [`NodeStatus`]: versioned membership snapshot with a binary wire format
//! - [`GatewayNodeManager`]: owns local and peer state and gates gossip by sequence
//! - [`StatusPacket`]: messages of the seq-announce / request / response handshake
//!
//! ## Quick Start
//!
//! ```rust
//! use gateway_directory::{GatewayConfig, GatewayNodeManager, NodeId, NodeStatus, P2pId};
//!
//! let manager: GatewayNodeManager<()> =
//!     GatewayNodeManager::new(GatewayConfig::new().with_initial_seq(0));
//!
//! // Local registration bumps the status sequence
//! assert!(manager.register_node("group1", &NodeId::from("node-a"), None));
//! assert_eq!(manager.status_seq(), 1);
//!
//! // A peer's status arrives as bytes
//! let peer = P2pId::new("peer-1");
//! let data = manager.generate_node_status();
//! if manager.status_changed(&peer, 1) {
//!     let status = NodeStatus::decode(&data).expect("valid status");
//!     manager.update_peer_status(&peer, status);
//! }
//!
//! let peers = manager.peers_router_table().query_p2p_ids("group1", &NodeId::from("node-a"));
//! assert!(peers.contains(&peer));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod manager;
pub mod packet;
pub mod router;
pub mod status;
mod sync;
pub mod types;

pub use config::{DEFAULT_MAX_STATUS_SIZE, GatewayConfig};
pub use error::{GatewayError, Result};
pub use manager::{GatewayNodeManager, NodeDirectory, NodeRoute};
pub use packet::{StatusPacket, StatusTransport};
pub use router::{PeerRouterTable, RouterTable};
pub use status::{GroupNodeInfo, NodeStatus};
pub use types::{GroupId, NodeId, P2pId};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
