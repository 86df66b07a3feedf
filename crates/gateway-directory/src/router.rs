//! Group/node routing tables.
//!
//! - [`RouterTable`]: `group -> node -> value` index with empty-group pruning
//! - [`PeerRouterTable`]: aggregate index answering "which peers host node X
//!   in group G", built from every peer's last status

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::status::GroupNodeInfo;
use crate::types::{GroupId, NodeId, P2pId};

/// Index from group to the nodes registered in it, each carrying a value.
///
/// A `(group, node)` pair appears at most once. A group with no nodes left is
/// removed, so a group is present exactly when it has at least one node.
/// Iteration order is the byte order of group names and node ids.
#[derive(Debug, Clone)]
pub struct RouterTable<H> {
    groups: BTreeMap<GroupId, BTreeMap<NodeId, H>>,
}

impl<H> Default for RouterTable<H> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<H> RouterTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `handle` for `(group, node)` if the pair is absent.
    ///
    /// Returns `false` without touching the stored value when the pair already
    /// exists; remove it first to replace the handle.
    pub fn insert(&mut self, group: &str, node: &NodeId, handle: H) -> bool {
        let nodes = self.groups.entry(group.to_string()).or_default();
        match nodes.entry(node.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Removes `(group, node)`, pruning the group when it becomes empty.
    ///
    /// Returns `true` iff the pair was present.
    pub fn remove(&mut self, group: &str, node: &NodeId) -> bool {
        let Some(nodes) = self.groups.get_mut(group) else {
            return false;
        };
        let removed = nodes.remove(node).is_some();
        if nodes.is_empty() {
            self.groups.remove(group);
        }
        removed
    }

    /// Returns the value stored for `(group, node)`.
    #[must_use]
    pub fn get(&self, group: &str, node: &NodeId) -> Option<&H> {
        self.groups.get(group)?.get(node)
    }

    pub(crate) fn get_mut(&mut self, group: &str, node: &NodeId) -> Option<&mut H> {
        self.groups.get_mut(group)?.get_mut(node)
    }

    /// Returns true if `(group, node)` is registered.
    #[must_use]
    pub fn contains(&self, group: &str, node: &NodeId) -> bool {
        self.get(group, node).is_some()
    }

    /// Returns true if the group has at least one node.
    #[must_use]
    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Returns a snapshot of the nodes in `group`; empty if the group is absent.
    #[must_use]
    pub fn nodes_of(&self, group: &str) -> Vec<NodeId> {
        self.groups
            .get(group)
            .map(|nodes| nodes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns a snapshot of every group with its nodes.
    #[must_use]
    pub fn groups_and_nodes(&self) -> Vec<(GroupId, Vec<NodeId>)> {
        self.groups
            .iter()
            .map(|(group, nodes)| (group.clone(), nodes.keys().cloned().collect()))
            .collect()
    }

    /// Returns the names of all non-empty groups.
    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.keys().cloned().collect()
    }

    /// Iterates over the `(node, value)` pairs of one group.
    pub fn iter_group<'a>(&'a self, group: &str) -> impl Iterator<Item = (&'a NodeId, &'a H)> {
        self.groups.get(group).into_iter().flat_map(|nodes| nodes.iter())
    }

    /// Returns the number of registered `(group, node)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no pair is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the number of non-empty groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl<H: Clone> RouterTable<H> {
    /// Returns a snapshot of the `(node, value)` pairs of one group.
    #[must_use]
    pub fn entries(&self, group: &str) -> Vec<(NodeId, H)> {
        self.iter_group(group)
            .map(|(node, handle)| (node.clone(), handle.clone()))
            .collect()
    }
}

/// Aggregate view of the nodes hosted by every known peer gateway.
///
/// Each `(group, node)` maps to the set of peers whose last status listed it.
/// A reverse index keeps each peer's contributions so that replacing or
/// dropping a peer touches exactly the entries it added.
#[derive(Debug, Clone, Default)]
pub struct PeerRouterTable {
    routes: RouterTable<BTreeSet<P2pId>>,
    contributions: BTreeMap<P2pId, BTreeSet<(GroupId, NodeId)>>,
}

impl PeerRouterTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `peer` hosts `(group, node)`.
    ///
    /// Returns `false` if the peer was already recorded for the pair.
    pub fn insert(&mut self, group: &str, node: &NodeId, peer: &P2pId) -> bool {
        let added = match self.routes.get_mut(group, node) {
            Some(peers) => peers.insert(peer.clone()),
            None => self
                .routes
                .insert(group, node, BTreeSet::from([peer.clone()])),
        };
        if added {
            self.contributions
                .entry(peer.clone())
                .or_default()
                .insert((group.to_string(), node.clone()));
        }
        added
    }

    /// Removes `peer` from `(group, node)`, dropping the pair once no peer
    /// hosts it.
    pub fn remove(&mut self, group: &str, node: &NodeId, peer: &P2pId) -> bool {
        let Some(peers) = self.routes.get_mut(group, node) else {
            return false;
        };
        let removed = peers.remove(peer);
        if peers.is_empty() {
            self.routes.remove(group, node);
        }
        if removed {
            if let Some(owned) = self.contributions.get_mut(peer) {
                owned.remove(&(group.to_string(), node.clone()));
                if owned.is_empty() {
                    self.contributions.remove(peer);
                }
            }
        }
        removed
    }

    /// Removes every contribution of `peer`. Returns how many pairs it held.
    pub fn remove_peer(&mut self, peer: &P2pId) -> usize {
        let Some(owned) = self.contributions.remove(peer) else {
            return 0;
        };
        for (group, node) in &owned {
            if let Some(peers) = self.routes.get_mut(group, node) {
                peers.remove(peer);
                if peers.is_empty() {
                    self.routes.remove(group, node);
                }
            }
        }
        owned.len()
    }

    /// Replaces all contributions of `peer` with the pairs listed in `groups`.
    pub fn replace_peer(&mut self, peer: &P2pId, groups: &[GroupNodeInfo]) {
        self.remove_peer(peer);
        for info in groups {
            for node in info.node_ids() {
                self.insert(info.group_id(), node, peer);
            }
        }
    }

    /// Returns every peer hosting at least one node of `group`.
    #[must_use]
    pub fn query_p2p_ids_by_group_id(&self, group: &str) -> BTreeSet<P2pId> {
        self.routes
            .iter_group(group)
            .flat_map(|(_, peers)| peers.iter().cloned())
            .collect()
    }

    /// Returns the peers whose last status listed `(group, node)`.
    #[must_use]
    pub fn query_p2p_ids(&self, group: &str, node: &NodeId) -> BTreeSet<P2pId> {
        self.routes.get(group, node).cloned().unwrap_or_default()
    }

    /// Returns the nodes of `group` hosted by any peer.
    #[must_use]
    pub fn nodes_of(&self, group: &str) -> Vec<NodeId> {
        self.routes.nodes_of(group)
    }

    /// Returns true if `peer` contributes at least one pair.
    #[must_use]
    pub fn contains_peer(&self, peer: &P2pId) -> bool {
        self.contributions.contains_key(peer)
    }

    /// Returns the number of peers contributing at least one pair.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.contributions.len()
    }

    /// Returns true if no peer contributes anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
