//! Permission checks for commands
//!
//! Permission strings on groups, sub-commands and parameters may list several
//! nodes separated by commas. Every listed node must be held; empty entries
//! are ignored, so an empty string always passes.
//!
//! A command's effective requirement is the union of its group's, its own and
//! its parameters' nodes. The router checks that union before binding.
//!
//! ```ignore
//! use acf_core::permissions::has_permission;
//!
//! // both nodes required
//! if has_permission(&*issuer, "acf.tag,acf.tag.add") {
//!     // ...
//! }
//! ```

mod types;

use std::collections::BTreeSet;

pub use types::{PermissionSet, WILDCARD};

use crate::issuer::CommandIssuer;
use crate::util::split_list;

/// Check a comma separated permission string against an issuer
pub fn has_permission(issuer: &dyn CommandIssuer, permission: &str) -> bool {
    split_list(permission).all(|node| issuer.has_permission(node))
}

/// Check every node of a set against an issuer
pub fn has_all_permissions(issuer: &dyn CommandIssuer, nodes: &BTreeSet<String>) -> bool {
    nodes.iter().all(|node| issuer.has_permission(node))
}

/// Nodes of `nodes` the issuer does not hold
pub fn missing_permissions(issuer: &dyn CommandIssuer, nodes: &BTreeSet<String>) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| !issuer.has_permission(node))
        .cloned()
        .collect()
}

/// Split a permission string into the nodes it requires
pub fn parse_nodes(permission: &str) -> BTreeSet<String> {
    split_list(permission).map(str::to_string).collect()
}
