//! Node status snapshots and their binary wire format.
//!
//! A [`NodeStatus`] describes every group/node a gateway hosts, versioned by a
//! sequence number. The encoding is fixed-structure and big-endian:
//!
//! ```text
//! seq:u32 | uuid_len:u32 uuid | group_count:u32 |
//!   ( group_len:u32 group | node_count:u32 | ( node_len:u32 node )* )*
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::types::{GroupId, NodeId};

/// Membership of one group as seen by one gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNodeInfo {
    group_id: GroupId,
    node_ids: Vec<NodeId>,
}

impl GroupNodeInfo {
    /// Creates group info from a group id and its node list.
    #[must_use]
    pub fn new(group_id: impl Into<GroupId>, node_ids: Vec<NodeId>) -> Self {
        Self {
            group_id: group_id.into(),
            node_ids,
        }
    }

    /// Returns the group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns the node ids, in the order they were listed.
    #[must_use]
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }
}

/// A full snapshot of one gateway's local membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    seq: u32,
    uuid: String,
    groups: Vec<GroupNodeInfo>,
}

impl NodeStatus {
    /// Creates a status snapshot.
    #[must_use]
    pub fn new(seq: u32, uuid: impl Into<String>, groups: Vec<GroupNodeInfo>) -> Self {
        Self {
            seq,
            uuid: uuid.into(),
            groups,
        }
    }

    /// Returns the sequence number of this snapshot.
    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }

    /// Returns the instance id of the gateway that produced the snapshot.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Returns the per-group membership.
    #[must_use]
    pub fn groups(&self) -> &[GroupNodeInfo] {
        &self.groups
    }

    /// Returns the number of `(group, node)` pairs listed.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|g| g.node_ids.len()).sum()
    }

    /// Encodes the snapshot into its wire format.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.seq.to_be_bytes());
        put_bytes(&mut buf, self.uuid.as_bytes());
        put_u32(&mut buf, self.groups.len());
        for group in &self.groups {
            put_bytes(&mut buf, group.group_id.as_bytes());
            put_u32(&mut buf, group.node_ids.len());
            for node in &group.node_ids {
                put_bytes(&mut buf, node.as_bytes());
            }
        }
        buf
    }

    /// Decodes a snapshot from its wire format.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedStatus`] if the input is truncated, a
    /// length field disagrees with the remaining bytes, a string is not UTF-8,
    /// or bytes are left over after the last group.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let seq = reader.u32("seq")?;
        let uuid = reader.string("uuid")?;
        let group_count = reader.count("group count")?;

        let mut groups = Vec::with_capacity(group_count);
        for _ in 0..group_count {
            let group_id = reader.string("group id")?;
            let node_count = reader.count("node count")?;
            let mut node_ids = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                node_ids.push(NodeId::from(reader.bytes("node id")?));
            }
            groups.push(GroupNodeInfo { group_id, node_ids });
        }

        if reader.remaining() != 0 {
            return Err(GatewayError::MalformedStatus(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        Ok(Self { seq, uuid, groups })
    }

    fn encoded_len(&self) -> usize {
        let groups: usize = self
            .groups
            .iter()
            .map(|g| {
                let nodes: usize = g.node_ids.iter().map(|n| 4 + n.as_bytes().len()).sum();
                8 + g.group_id.len() + nodes
            })
            .sum();
        12 + self.uuid.len() + groups
    }
}

fn put_u32(buf: &mut Vec<u8>, value: usize) {
    buf.extend_from_slice(&(value as u32).to_be_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buf, bytes.len());
    buf.extend_from_slice(bytes);
}

/// Bounds-checked cursor over an encoded status.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(GatewayError::MalformedStatus(format!(
                "truncated {field}: need {len} bytes, {} left",
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        let raw = self.take(4, field)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(raw);
        Ok(u32::from_be_bytes(word))
    }

    /// Reads an element count. Every element takes at least four bytes, so a
    /// count that cannot fit in the remaining input is rejected up front.
    fn count(&mut self, field: &str) -> Result<usize> {
        let count = self.u32(field)? as usize;
        if count > self.remaining() / 4 {
            return Err(GatewayError::MalformedStatus(format!(
                "{field} {count} exceeds remaining {} bytes",
                self.remaining()
            )));
        }
        Ok(count)
    }

    fn bytes(&mut self, field: &str) -> Result<Vec<u8>> {
        let len = self.u32(field)? as usize;
        Ok(self.take(len, field)?.to_vec())
    }

    fn string(&mut self, field: &str) -> Result<String> {
        String::from_utf8(self.bytes(field)?)
            .map_err(|e| GatewayError::MalformedStatus(format!("{field} is not utf-8: {e}")))
    }
}
