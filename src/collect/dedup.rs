//! Fingerprint-keyed unique node set.

use std::collections::HashSet;

use crate::node::{fingerprint, ProxyNode};

/// Result of offering a node to [`UniqueNodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A node with the same fingerprint is already present
    Duplicate,
    /// The node has no fingerprint and was dropped
    Unfingerprintable,
}

/// Insertion-ordered set of nodes, keyed by fingerprint.
///
/// First writer wins: a later duplicate never replaces the stored node, even
/// when it comes from a higher-priority source.
#[derive(Debug, Default)]
pub struct UniqueNodes {
    nodes: Vec<ProxyNode>,
    seen: HashSet<String>,
}

impl UniqueNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ProxyNode) -> InsertOutcome {
        let Some(key) = fingerprint(&node) else {
            return InsertOutcome::Unfingerprintable;
        };
        if !self.seen.insert(key) {
            return InsertOutcome::Duplicate;
        }
        self.nodes.push(node);
        InsertOutcome::Inserted
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyNode> {
        self.nodes.iter()
    }

    /// Nodes in insertion order.
    pub fn into_nodes(self) -> Vec<ProxyNode> {
        self.nodes
    }
}
