//! Permission node sets with wildcard support

use std::collections::HashSet;

/// Node that grants every permission
pub const WILDCARD: &str = "*";

/// A set of granted permission nodes for one identity
///
/// Nodes are dotted (`acf.tag.add`). Granting `acf.tag.*` covers every node
/// below `acf.tag`, and `*` covers everything.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    pub nodes: HashSet<String>,
}

impl PermissionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant nodes
    pub fn add(&mut self, nodes: &[&str]) {
        for node in nodes {
            self.nodes.insert(node.to_ascii_lowercase());
        }
    }

    /// Revoke nodes
    pub fn remove(&mut self, nodes: &[&str]) {
        for node in nodes {
            self.nodes.remove(&node.to_ascii_lowercase());
        }
    }

    /// Check a single node, honoring wildcards on any ancestor
    pub fn has(&self, node: &str) -> bool {
        let node = node.to_ascii_lowercase();
        if self.nodes.contains(WILDCARD) || self.nodes.contains(&node) {
            return true;
        }

        let mut prefix = node.as_str();
        while let Some((parent, _)) = prefix.rsplit_once('.') {
            if self.nodes.contains(&format!("{parent}.*")) {
                return true;
            }
            prefix = parent;
        }
        false
    }

    /// Check if any node is granted
    pub fn has_any(&self, nodes: &[&str]) -> bool {
        nodes.iter().any(|n| self.has(n))
    }

    /// Check if every node is granted
    pub fn has_all(&self, nodes: &[&str]) -> bool {
        nodes.iter().all(|n| self.has(n))
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
