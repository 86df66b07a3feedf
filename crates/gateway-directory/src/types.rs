//! Identifier types shared by the directory.
//!
//! - [`NodeId`]: opaque identity of a node inside a group
//! - [`P2pId`]: transport-level identity of a peer gateway
//! - [`GroupId`]: name of a logical sub-network

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a group (a logical sub-network of nodes sharing state).
pub type GroupId = String;

/// Opaque identity of a node within a group.
///
/// The bytes are usually a serialized public key, but the directory never
/// interprets them: equality and ordering are plain byte comparisons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    bytes: Vec<u8>,
}

impl NodeId {
    /// Creates a node id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the node id.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the id and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the id as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::from_bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for NodeId {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&[u8]> for NodeId {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}

/// Transport-level identity of a peer gateway.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct P2pId(String);

impl P2pId {
    /// Creates a peer id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the peer id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for P2pId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for P2pId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for P2pId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
