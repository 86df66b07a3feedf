//! Shared helpers for gateway-directory integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use gateway_directory::{
    GatewayConfig, GatewayNodeManager, GroupNodeInfo, NodeId, NodeStatus, P2pId, Result,
    StatusTransport,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn new_manager(uuid: &str) -> GatewayNodeManager<()> {
    GatewayNodeManager::new(GatewayConfig::new().with_uuid(uuid).with_initial_seq(0))
}

pub fn group(id: &str, nodes: &[&str]) -> GroupNodeInfo {
    GroupNodeInfo::new(id, nodes.iter().map(|n| NodeId::from(*n)).collect())
}

/// Status listing group1..group3, each with three nodes.
pub fn three_group_status(seq: u32) -> NodeStatus {
    NodeStatus::new(
        seq,
        "testUUID",
        vec![
            group("group1", &["a0", "b0", "c0"]),
            group("group2", &["a1", "b1", "c1"]),
            group("group3", &["a2", "b2", "c2"]),
        ],
    )
}

/// A packet in flight between two gateways.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: P2pId,
    pub to: P2pId,
    pub data: Vec<u8>,
}

/// In-memory network connecting a fixed set of gateways.
pub struct Mesh {
    queue: Arc<Mutex<VecDeque<Envelope>>>,
    nodes: Vec<(P2pId, Arc<GatewayNodeManager<()>>, MeshTransport)>,
}

impl Mesh {
    pub fn new(ids: &[&str]) -> Self {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let all: Vec<P2pId> = ids.iter().map(|id| P2pId::new(*id)).collect();
        let nodes = all
            .iter()
            .map(|me| {
                let transport = MeshTransport {
                    me: me.clone(),
                    peers: all.iter().filter(|p| *p != me).cloned().collect(),
                    queue: Arc::clone(&queue),
                };
                let manager = Arc::new(new_manager(&format!("uuid-{me}")));
                (me.clone(), manager, transport)
            })
            .collect();
        Self { queue, nodes }
    }

    pub fn manager(&self, id: &str) -> Arc<GatewayNodeManager<()>> {
        self.nodes
            .iter()
            .find(|(p, _, _)| p.as_str() == id)
            .map(|(_, m, _)| Arc::clone(m))
            .expect("gateway in mesh")
    }

    pub fn transport(&self, id: &str) -> &MeshTransport {
        self.nodes
            .iter()
            .find(|(p, _, _)| p.as_str() == id)
            .map(|(_, _, t)| t)
            .expect("gateway in mesh")
    }

    /// One ticker round: every gateway announces its sequence.
    pub fn tick(&self) {
        for (_, manager, transport) in &self.nodes {
            manager.broadcast_status_seq(transport).expect("broadcast");
        }
    }

    /// Delivers packets until the network is quiet. Returns how many were delivered.
    pub fn run_until_idle(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.queue.lock().pop_front();
            let Some(envelope) = next else {
                return delivered;
            };
            delivered += 1;
            let (_, manager, transport) = self
                .nodes
                .iter()
                .find(|(p, _, _)| *p == envelope.to)
                .expect("destination in mesh");
            manager
                .handle_packet(&envelope.from, &envelope.data, transport)
                .expect("handle packet");
        }
    }

    /// Simulates a session drop between two gateways, seen from both sides.
    pub fn disconnect(&self, a: &str, b: &str) {
        self.manager(a).on_peer_disconnected(&P2pId::new(b));
        self.manager(b).on_peer_disconnected(&P2pId::new(a));
    }
}

/// Transport endpoint of one gateway in a [`Mesh`].
pub struct MeshTransport {
    me: P2pId,
    peers: Vec<P2pId>,
    queue: Arc<Mutex<VecDeque<Envelope>>>,
}

impl StatusTransport for MeshTransport {
    fn send_to(&self, peer: &P2pId, packet: Vec<u8>) -> Result<()> {
        self.queue.lock().push_back(Envelope {
            from: self.me.clone(),
            to: peer.clone(),
            data: packet,
        });
        Ok(())
    }

    fn broadcast(&self, packet: Vec<u8>) -> Result<()> {
        let mut queue = self.queue.lock();
        for peer in &self.peers {
            queue.push_back(Envelope {
                from: self.me.clone(),
                to: peer.clone(),
                data: packet.clone(),
            });
        }
        Ok(())
    }
}
