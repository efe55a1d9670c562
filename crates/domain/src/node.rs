//! Node: a device endpoint reporting for one or more parking lots.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::parking_lot::GlobalStatus;
use crate::time::Timestamp;

/// Hardware/firmware generation of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeVersion {
    Beta,
    V1,
    V2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub version: Option<NodeVersion>,
    #[serde(default)]
    pub global_status: Option<GlobalStatus>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}
