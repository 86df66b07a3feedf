//! Gateway node manager.
//!
//! The [`GatewayNodeManager`] owns the directory state of one gateway:
//! - the local router table of front services registered on this gateway
//! - the local status sequence, bumped once per effective registration change
//! - the last status and gate sequence received from each peer gateway
//! - the aggregate peer router table built from those statuses
//!
//! Local and peer state sit behind separate locks. Every mutation of one side
//! happens under a single write guard, so readers observe either the complete
//! old state or the complete new state. Router tables leave the manager only
//! as snapshots; no guard outlives a call.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::router::{PeerRouterTable, RouterTable};
use crate::status::{GroupNodeInfo, NodeStatus};
use crate::types::{NodeId, P2pId};

/// Mutation and query surface of a gateway directory.
///
/// `H` is the opaque front-service handle stored for local registrations.
pub trait NodeDirectory<H>: Send + Sync {
    /// Registers `(group, node)` locally. Returns `false` if already present.
    fn register_node(&self, group: &str, node: &NodeId, handle: Option<H>) -> bool;

    /// Unregisters `(group, node)`. Returns `false` if it was not present.
    fn unregister_node(&self, group: &str, node: &NodeId) -> bool;

    /// Returns the current local status sequence.
    fn status_seq(&self) -> u32;

    /// Encodes the current local status.
    fn generate_node_status(&self) -> Vec<u8>;

    /// Returns true if `seq` differs from the last sequence recorded for `peer`.
    fn status_changed(&self, peer: &P2pId, seq: u32) -> bool;

    /// Records `seq` as the gate value of `peer` without touching its status.
    fn set_status_seq(&self, peer: &P2pId, seq: u32);

    /// Replaces everything known about `peer` with `status`.
    fn update_peer_status(&self, peer: &P2pId, status: NodeStatus);

    /// Forgets everything known about `peer`.
    fn on_remove_node_ids(&self, peer: &P2pId);

    /// Returns true if `(group, node)` is registered on this gateway.
    fn is_local(&self, group: &str, node: &NodeId) -> bool;

    /// Returns the peers hosting at least one node of `group`.
    fn query_p2p_ids_by_group_id(&self, group: &str) -> BTreeSet<P2pId>;

    /// Returns the peers hosting `(group, node)`.
    fn query_p2p_ids(&self, group: &str, node: &NodeId) -> BTreeSet<P2pId>;

    /// Returns the nodes of `group` known locally or through any peer.
    fn group_node_ids(&self, group: &str) -> Vec<NodeId>;
}

/// Where a `(group, node)` pair can be reached from this gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRoute {
    /// The node is registered on this gateway.
    Local,
    /// The node is hosted by these peer gateways.
    Remote(BTreeSet<P2pId>),
    /// No gateway is known to host the node.
    Unreachable,
}

#[derive(Debug)]
struct LocalState<H> {
    table: RouterTable<Option<H>>,
    seq: u32,
}

#[derive(Debug, Default)]
struct PeerState {
    statuses: HashMap<P2pId, NodeStatus>,
    /// Gate values, moved by a status update or an explicit gate commit.
    seqs: HashMap<P2pId, u32>,
    /// Copy-on-write: a snapshot handed out stays frozen while updates
    /// continue on a fresh copy.
    router: Arc<PeerRouterTable>,
}

/// Directory of local and peer group membership for one gateway.
///
/// Handles passed to [`register_node`](Self::register_node) are stored as-is
/// and never dereferenced; owners that want to keep lifetime control register
/// a `Weak` or an id rather than a strong reference.
#[derive(Debug)]
pub struct GatewayNodeManager<H> {
    config: GatewayConfig,
    uuid: String,
    local: RwLock<LocalState<H>>,
    peers: RwLock<PeerState>,
}

impl<H> GatewayNodeManager<H> {
    /// Creates a manager with the given configuration.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let uuid = config
            .uuid
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let seq = config
            .initial_seq
            .unwrap_or_else(|| chrono::Utc::now().timestamp() as u32);

        debug!(uuid = %uuid, seq, "Created gateway node manager");

        Self {
            config,
            uuid,
            local: RwLock::new(LocalState {
                table: RouterTable::new(),
                seq,
            }),
            peers: RwLock::new(PeerState::default()),
        }
    }

    /// Creates a manager with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(GatewayConfig::default())
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the instance id advertised in generated statuses.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    // ==================== Local Registration ====================

    /// Registers a front service for `(group, node)`.
    ///
    /// Returns `true` and bumps the status sequence if the pair was absent.
    /// Returns `false` and leaves both the stored handle and the sequence
    /// untouched if it was already registered.
    ///
    /// The sequence wraps from `u32::MAX` to 0. Peers gate on inequality, so
    /// the wrapped value still propagates as a change. With the default
    /// wall-clock base the wrap is decades away.
    pub fn register_node(&self, group: &str, node: &NodeId, handle: Option<H>) -> bool {
        let mut local = self.local.write();
        if !local.table.insert(group, node, handle) {
            debug!(group = %group, node = %node, "Node already registered");
            return false;
        }
        local.seq = local.seq.wrapping_add(1);

        info!(group = %group, node = %node, seq = local.seq, "Registered node");
        true
    }

    /// Unregisters `(group, node)`.
    ///
    /// Returns `true` and bumps the status sequence if the pair was present.
    pub fn unregister_node(&self, group: &str, node: &NodeId) -> bool {
        let mut local = self.local.write();
        if !local.table.remove(group, node) {
            debug!(group = %group, node = %node, "Node not registered");
            return false;
        }
        local.seq = local.seq.wrapping_add(1);

        info!(group = %group, node = %node, seq = local.seq, "Unregistered node");
        true
    }

    /// Returns the current local status sequence.
    #[must_use]
    pub fn status_seq(&self) -> u32 {
        self.local.read().seq
    }

    /// Returns a snapshot of the local status.
    ///
    /// Sequence and membership are read under the same guard, so the snapshot
    /// reflects every registration change completed before the call.
    #[must_use]
    pub fn local_status(&self) -> NodeStatus {
        let local = self.local.read();
        let groups = local
            .table
            .groups_and_nodes()
            .into_iter()
            .map(|(group, nodes)| GroupNodeInfo::new(group, nodes))
            .collect();
        NodeStatus::new(local.seq, self.uuid.clone(), groups)
    }

    /// Encodes the current local status for broadcast.
    #[must_use]
    pub fn generate_node_status(&self) -> Vec<u8> {
        let status = self.local_status();
        let data = status.encode();
        debug!(
            seq = status.seq(),
            groups = status.groups().len(),
            size = data.len(),
            "Generated node status"
        );
        data
    }

    /// Runs `f` against the local router table under the read lock.
    ///
    /// `f` must not call back into this manager's registration methods.
    pub fn with_local_router_table<R>(&self, f: impl FnOnce(&RouterTable<Option<H>>) -> R) -> R {
        f(&self.local.read().table)
    }

    /// Returns true if `(group, node)` is registered on this gateway.
    #[must_use]
    pub fn is_local(&self, group: &str, node: &NodeId) -> bool {
        self.local.read().table.contains(group, node)
    }

    // ==================== Peer Status ====================

    /// Returns true if `seq` differs from the gate value recorded for `peer`,
    /// or if nothing has been recorded for it yet.
    ///
    /// Any difference counts, including a lower value: a restarted peer may
    /// legitimately start over from a smaller sequence. This never mutates
    /// state. The gate moves when a status is applied through
    /// [`update_peer_status`](Self::update_peer_status), or when the caller
    /// commits it on its own with [`set_status_seq`](Self::set_status_seq).
    #[must_use]
    pub fn status_changed(&self, peer: &P2pId, seq: u32) -> bool {
        self.peers.read().seqs.get(peer) != Some(&seq)
    }

    /// Records `seq` as the gate value of `peer`.
    ///
    /// The stored status and the peer router table are left as they are.
    pub fn set_status_seq(&self, peer: &P2pId, seq: u32) {
        let previous = self.peers.write().seqs.insert(peer.clone(), seq);
        debug!(peer = %peer, seq, previous = ?previous, "Committed peer status seq");
    }

    /// Replaces the stored status of `peer`, rebuilds its contribution to the
    /// peer router table and records `status.seq()` as its gate value.
    pub fn update_peer_status(&self, peer: &P2pId, status: NodeStatus) {
        let mut peers = self.peers.write();
        let state = &mut *peers;

        Arc::make_mut(&mut state.router).replace_peer(peer, status.groups());
        state.seqs.insert(peer.clone(), status.seq());
        let seq = status.seq();
        let nodes = status.node_count();
        let previous = state.statuses.insert(peer.clone(), status);

        match previous {
            None => info!(peer = %peer, seq, nodes, "Added peer status"),
            Some(old) => debug!(
                peer = %peer,
                old_seq = old.seq(),
                seq,
                nodes,
                "Updated peer status"
            ),
        }
    }

    /// Removes the status, gate value and routes of `peer`.
    ///
    /// Removing an unknown peer is a no-op.
    pub fn on_remove_node_ids(&self, peer: &P2pId) {
        let mut peers = self.peers.write();
        let state = &mut *peers;

        let routes = if state.router.contains_peer(peer) {
            Arc::make_mut(&mut state.router).remove_peer(peer)
        } else {
            0
        };
        state.seqs.remove(peer);
        if state.statuses.remove(peer).is_some() {
            info!(peer = %peer, routes, "Removed peer status");
        }
    }

    /// Returns the last status applied for `peer`.
    #[must_use]
    pub fn peer_status(&self, peer: &P2pId) -> Option<NodeStatus> {
        self.peers.read().statuses.get(peer).cloned()
    }

    /// Returns the gate sequence recorded for `peer`.
    #[must_use]
    pub fn peer_seq(&self, peer: &P2pId) -> Option<u32> {
        self.peers.read().seqs.get(peer).copied()
    }

    /// Returns every peer with a stored status, sorted.
    #[must_use]
    pub fn peers(&self) -> Vec<P2pId> {
        let mut peers: Vec<P2pId> = self.peers.read().statuses.keys().cloned().collect();
        peers.sort();
        peers
    }

    /// Returns a snapshot of the aggregate peer router table.
    ///
    /// The snapshot is shared, not copied, and does not observe later peer
    /// updates. Holding it never blocks the manager.
    #[must_use]
    pub fn peers_router_table(&self) -> Arc<PeerRouterTable> {
        Arc::clone(&self.peers.read().router)
    }

    /// Returns the peers hosting at least one node of `group`.
    #[must_use]
    pub fn query_p2p_ids_by_group_id(&self, group: &str) -> BTreeSet<P2pId> {
        self.peers.read().router.query_p2p_ids_by_group_id(group)
    }

    /// Returns the peers hosting `(group, node)`.
    #[must_use]
    pub fn query_p2p_ids(&self, group: &str, node: &NodeId) -> BTreeSet<P2pId> {
        self.peers.read().router.query_p2p_ids(group, node)
    }

    // ==================== Queries ====================

    /// Returns the nodes of `group` registered locally or reported by any
    /// peer, deduplicated and sorted.
    #[must_use]
    pub fn group_node_ids(&self, group: &str) -> Vec<NodeId> {
        let mut nodes: BTreeSet<NodeId> =
            self.local.read().table.nodes_of(group).into_iter().collect();
        nodes.extend(self.peers.read().router.nodes_of(group));
        nodes.into_iter().collect()
    }

    /// Resolves where `(group, node)` can be reached, preferring this gateway.
    #[must_use]
    pub fn route(&self, group: &str, node: &NodeId) -> NodeRoute {
        if self.is_local(group, node) {
            return NodeRoute::Local;
        }
        let peers = self.query_p2p_ids(group, node);
        if peers.is_empty() {
            NodeRoute::Unreachable
        } else {
            NodeRoute::Remote(peers)
        }
    }
}

impl<H: Clone> GatewayNodeManager<H> {
    /// Returns a copy of the local router table.
    #[must_use]
    pub fn local_router_table(&self) -> RouterTable<Option<H>> {
        self.local.read().table.clone()
    }

    /// Returns the handle registered for `(group, node)`.
    ///
    /// The outer `Option` is `None` when the pair is not registered; the inner
    /// one is the handle as given at registration.
    #[must_use]
    pub fn front_service(&self, group: &str, node: &NodeId) -> Option<Option<H>> {
        self.local.read().table.get(group, node).cloned()
    }
}

impl<H> Default for GatewayNodeManager<H> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<H: Send + Sync> NodeDirectory<H> for GatewayNodeManager<H> {
    fn register_node(&self, group: &str, node: &NodeId, handle: Option<H>) -> bool {
        Self::register_node(self, group, node, handle)
    }

    fn unregister_node(&self, group: &str, node: &NodeId) -> bool {
        Self::unregister_node(self, group, node)
    }

    fn status_seq(&self) -> u32 {
        Self::status_seq(self)
    }

    fn generate_node_status(&self) -> Vec<u8> {
        Self::generate_node_status(self)
    }

    fn status_changed(&self, peer: &P2pId, seq: u32) -> bool {
        Self::status_changed(self, peer, seq)
    }

    fn set_status_seq(&self, peer: &P2pId, seq: u32) {
        Self::set_status_seq(self, peer, seq);
    }

    fn update_peer_status(&self, peer: &P2pId, status: NodeStatus) {
        Self::update_peer_status(self, peer, status);
    }

    fn on_remove_node_ids(&self, peer: &P2pId) {
        Self::on_remove_node_ids(self, peer);
    }

    fn is_local(&self, group: &str, node: &NodeId) -> bool {
        Self::is_local(self, group, node)
    }

    fn query_p2p_ids_by_group_id(&self, group: &str) -> BTreeSet<P2pId> {
        Self::query_p2p_ids_by_group_id(self, group)
    }

    fn query_p2p_ids(&self, group: &str, node: &NodeId) -> BTreeSet<P2pId> {
        Self::query_p2p_ids(self, group, node)
    }

    fn group_node_ids(&self, group: &str) -> Vec<NodeId> {
        Self::group_node_ids(self, group)
    }
}
