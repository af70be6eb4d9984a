use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the commands of one invocation run. Fixed before the first dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionTarget {
    /// Run in the local project root; the operator is on the control node.
    Local,
    /// Stage the project to the control host and run there over ssh.
    Remote { control_host: String },
}

impl ExecutionTarget {
    pub fn from_switch(remote: bool, control_host: &str) -> Self {
        if remote {
            ExecutionTarget::Remote {
                control_host: control_host.to_string(),
            }
        } else {
            ExecutionTarget::Local
        }
    }

    pub fn control_host(&self) -> Option<&str> {
        match self {
            ExecutionTarget::Local => None,
            ExecutionTarget::Remote { control_host } => Some(control_host),
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionTarget::Local => write!(f, "local"),
            ExecutionTarget::Remote { control_host } => write!(f, "remote ({control_host})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Up,
    Down,
}

impl NodeStatus {
    pub fn is_up(self) -> bool {
        self == NodeStatus::Up
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Up => write!(f, "UP"),
            NodeStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Snapshot of the cluster as shown by the status commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub control_host: String,
    pub control: NodeStatus,
    pub nodes: Vec<NodeState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    pub address: String,
    pub status: NodeStatus,
}

impl ClusterStatus {
    pub fn nodes_up(&self) -> usize {
        self.nodes.iter().filter(|node| node.status.is_up()).count()
    }
}
