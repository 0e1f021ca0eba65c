//! Arena-based character trie mapping plaintext keys to sealed payloads.
//!
//! Nodes are stored in a contiguous arena (`Vec<TrieNode>`) and referenced by
//! opaque [`NodeRef`] handles, which are plain indices. The root node is always
//! at index 0 and represents the empty key.
//!
//! Children of each node are kept sorted by character for O(log n) binary
//! search. A node that terminates an indexed key carries a [`Terminal`]: the
//! key's [`Payload`] and its popularity counter. Because the payload lives
//! inside the `Option<Terminal>`, a terminal node without a payload cannot be
//! represented.
//!
//! The index never inspects payload bytes. Ranking lives in a separate crate
//! and reads popularity straight from the nodes.
//!
//! Snapshots deserialize through [`SnapshotError`]-checked validation, so a
//! loaded index upholds the same shape as one built by [`PrefixIndex::insert`].

use log::{debug, trace};
use sealed_payload::Payload;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle into the index's node arena.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeRef(u32);

impl NodeRef {
    /// Convert to usize for indexing into the arena.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Create from a usize index. Panics if the arena outgrows `u32`.
    #[inline]
    fn from_usize(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "NodeRef overflow: {index}");
        NodeRef(index as u32)
    }
}

/// What a node carries when its path spells a complete key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Terminal {
    payload: Payload,
    popularity: u64,
}

impl Terminal {
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// How many times this key has been reported as selected.
    #[inline]
    pub fn popularity(&self) -> u64 {
        self.popularity
    }
}

/// A single node: one character position in the key space.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrieNode {
    /// The character on the edge leading into this node. `'\0'` for the root.
    pub ch: char,
    terminal: Option<Terminal>,
    /// Child node references, kept sorted by character.
    children: Vec<NodeRef>,
}

impl TrieNode {
    fn new(ch: char) -> Self {
        TrieNode {
            ch,
            terminal: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// The prefix index. Owns the node arena and nothing else.
///
/// # Example
///
/// ```
/// use prefix_index::PrefixIndex;
/// use sealed_payload::Payload;
///
/// let mut index = PrefixIndex::new();
/// index.insert("app", Payload::new(vec![1, 2, 3]));
///
/// assert!(index.locate("ap").is_some());
/// assert!(index.locate("apx").is_none());
///
/// assert!(index.record_selection("app"));
/// assert_eq!(index.popularity("app"), Some(1));
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "RawPrefixIndex")]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    /// Number of terminal nodes.
    keys: usize,
}

/// A snapshot that does not describe a well-formed index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot has no root node")]
    MissingRoot,

    #[error("node {node} points at child {child}, past the end of the arena")]
    ChildOutOfRange { node: usize, child: usize },

    #[error("node {node} lists the root as a child")]
    RootHasParent { node: usize },

    #[error("node {child} is a child of both node {first} and node {second}")]
    SharedChild {
        child: usize,
        first: usize,
        second: usize,
    },

    #[error("children of node {node} are not strictly sorted by character")]
    UnsortedChildren { node: usize },

    #[error("node {node} has no parent")]
    Orphan { node: usize },

    #[error("only {reached} of {total} nodes are reachable from the root")]
    Unreachable { reached: usize, total: usize },

    #[error("snapshot records {recorded} keys but holds {actual} terminal nodes")]
    KeyCountMismatch { recorded: usize, actual: usize },
}

/// Wire shape of a [`PrefixIndex`] before validation.
#[derive(Deserialize)]
struct RawPrefixIndex {
    nodes: Vec<TrieNode>,
    keys: usize,
}

impl TryFrom<RawPrefixIndex> for PrefixIndex {
    type Error = SnapshotError;

    fn try_from(raw: RawPrefixIndex) -> Result<Self, SnapshotError> {
        let RawPrefixIndex { nodes, keys } = raw;
        if nodes.is_empty() {
            return Err(SnapshotError::MissingRoot);
        }

        let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
        for (node, entry) in nodes.iter().enumerate() {
            let mut prev: Option<char> = None;
            for child in entry.children.iter().map(|c| c.as_usize()) {
                let Some(child_node) = nodes.get(child) else {
                    return Err(SnapshotError::ChildOutOfRange { node, child });
                };
                if child == 0 {
                    return Err(SnapshotError::RootHasParent { node });
                }
                if let Some(first) = parent[child] {
                    return Err(SnapshotError::SharedChild {
                        child,
                        first,
                        second: node,
                    });
                }
                parent[child] = Some(node);

                // Strict order also rules out two children on the same edge.
                if prev.is_some_and(|p| p >= child_node.ch) {
                    return Err(SnapshotError::UnsortedChildren { node });
                }
                prev = Some(child_node.ch);
            }
        }

        if let Some(node) = (1..nodes.len()).find(|&i| parent[i].is_none()) {
            return Err(SnapshotError::Orphan { node });
        }

        // Every node has one parent, so a walk from the root is a tree walk;
        // anything it misses sits on a detached cycle.
        let mut reached = 0;
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            reached += 1;
            stack.extend(nodes[node].children.iter().map(|c| c.as_usize()));
        }
        if reached != nodes.len() {
            return Err(SnapshotError::Unreachable {
                reached,
                total: nodes.len(),
            });
        }

        let actual = nodes.iter().filter(|n| n.is_terminal()).count();
        if actual != keys {
            return Err(SnapshotError::KeyCountMismatch {
                recorded: keys,
                actual,
            });
        }

        Ok(PrefixIndex { nodes, keys })
    }
}

impl PrefixIndex {
    /// Create an empty index holding only the root node.
    pub fn new() -> Self {
        PrefixIndex {
            nodes: vec![TrieNode::new('\0')],
            keys: 0,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    /// Access a node by reference.
    #[inline]
    pub fn node(&self, r: NodeRef) -> &TrieNode {
        &self.nodes[r.as_usize()]
    }

    /// Get the child references of a node (sorted by character).
    #[inline]
    pub fn children(&self, parent: NodeRef) -> &[NodeRef] {
        &self.nodes[parent.as_usize()].children
    }

    /// Find an existing child of `parent` on edge `ch`.
    pub fn find_child(&self, parent: NodeRef, ch: char) -> Option<NodeRef> {
        let children = &self.nodes[parent.as_usize()].children;
        children
            .binary_search_by(|child| self.nodes[child.as_usize()].ch.cmp(&ch))
            .ok()
            .map(|idx| children[idx])
    }

    /// Find or create a child of `parent` on edge `ch`.
    fn child_or_insert(&mut self, parent: NodeRef, ch: char) -> NodeRef {
        let search = self.nodes[parent.as_usize()]
            .children
            .binary_search_by(|child| self.nodes[child.as_usize()].ch.cmp(&ch));

        match search {
            Ok(idx) => self.nodes[parent.as_usize()].children[idx],
            Err(idx) => {
                let child = NodeRef::from_usize(self.nodes.len());
                self.nodes.push(TrieNode::new(ch));
                self.nodes[parent.as_usize()].children.insert(idx, child);
                child
            }
        }
    }

    /// Index `key` with `payload`.
    ///
    /// Creates any missing nodes along the path and marks the last one
    /// terminal. Re-inserting a key replaces its payload and keeps its
    /// popularity. The empty key indexes the root itself.
    pub fn insert(&mut self, key: &str, payload: Payload) -> NodeRef {
        let mut node = self.root();
        for ch in key.chars() {
            node = self.child_or_insert(node, ch);
        }

        let target = &mut self.nodes[node.as_usize()];
        if let Some(terminal) = target.terminal.as_mut() {
            terminal.payload = payload;
            trace!(
                "replaced payload of existing key ({} chars)",
                key.chars().count()
            );
        } else {
            target.terminal = Some(Terminal {
                payload,
                popularity: 0,
            });
            self.keys += 1;
        }
        node
    }

    /// Walk `prefix` from the root. `None` as soon as a character has no child.
    pub fn locate(&self, prefix: &str) -> Option<NodeRef> {
        let mut node = self.root();
        for ch in prefix.chars() {
            node = self.find_child(node, ch)?;
        }
        Some(node)
    }

    /// Count one selection of `key`.
    ///
    /// Returns `false`, changing nothing, when `key` is unknown or only a
    /// prefix of indexed keys.
    pub fn record_selection(&mut self, key: &str) -> bool {
        let Some(node) = self.locate(key) else {
            debug!("selection report for unindexed key ignored");
            return false;
        };
        match self.nodes[node.as_usize()].terminal.as_mut() {
            Some(terminal) => {
                terminal.popularity = terminal.popularity.saturating_add(1);
                true
            }
            None => {
                debug!("selection report for non-terminal prefix ignored");
                false
            }
        }
    }

    /// The terminal data for exactly `key`, if indexed.
    pub fn get(&self, key: &str) -> Option<&Terminal> {
        self.locate(key).and_then(|r| self.node(r).terminal())
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn popularity(&self, key: &str) -> Option<u64> {
        self.get(key).map(Terminal::popularity)
    }

    /// Number of distinct indexed keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    /// Total number of nodes in the arena (including root).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every key and node, leaving only an empty root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(TrieNode::new('\0'));
        self.keys = 0;
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::new()
    }
}
