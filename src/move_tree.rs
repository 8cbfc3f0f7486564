//! Move tree representation consumed by the line-sectioning algorithm.
//!
//! A move tree is an arena of positions connected by moves. Each node keeps an ordered list of
//! children (index 0 is the main line) and a non-owning back-reference to its parent. Nodes carry
//! a dotted `LineId` path from which the branch level is derived: the number of forks crossed to
//! reach the node, not its ply.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Index of a node in the tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Side making a move.
pub enum Color {
    /// The side moving first.
    White,
    /// The side moving second.
    Black,
}

impl Color {
    #[must_use]
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Dotted-integer path locating a node in the tree, e.g. `1.2.1`.
pub struct LineId(String);

impl LineId {
    #[must_use]
    /// Line id of the tree root.
    pub fn root() -> Self {
        Self("1".to_string())
    }

    /// Parses a dotted-integer path.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::MalformedLineId` if any segment is empty or not all digits.
    pub fn parse(raw: &str) -> Result<Self, TreeError> {
        let well_formed = raw
            .split('.')
            .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()));
        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(TreeError::MalformedLineId(raw.to_string()))
        }
    }

    #[must_use]
    /// Number of forks crossed to reach the line (dot count plus one).
    pub fn branch_level(&self) -> u32 {
        let dots = self.0.bytes().filter(|&b| b == b'.').count();
        u32::try_from(dots).map_or(u32::MAX, |d| d.saturating_add(1))
    }

    #[must_use]
    /// Id of the `ordinal`-th (0-based) variation forking from this line.
    pub fn fork(&self, ordinal: usize) -> Self {
        Self(format!("{}.{}", self.0, ordinal + 1))
    }

    #[must_use]
    /// The raw dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
/// Structural faults in a move tree. All of them are programming errors upstream.
pub enum TreeError {
    /// A line id is not a dotted-integer path.
    #[error("malformed line id {0:?}")]
    MalformedLineId(String),
    /// A node has not been labelled.
    #[error("node {0:?} has no line id")]
    MissingLineId(NodeId),
    /// Parent and child links disagree.
    #[error("node {child:?} is not linked consistently to parent {parent:?}")]
    BrokenLink {
        /// Claimed parent.
        parent: NodeId,
        /// Child whose link is inconsistent.
        child: NodeId,
    },
    /// A node cannot be reached from the root.
    #[error("node {0:?} is not reachable from the root")]
    Unreachable(NodeId),
    /// A child's branch level is neither its parent's nor one deeper.
    #[error("node {node:?} at branch level {level} under a parent at level {parent_level}")]
    InconsistentBranchLevel {
        /// Offending node.
        node: NodeId,
        /// Its branch level.
        level: u32,
        /// Its parent's branch level.
        parent_level: u32,
    },
    /// The JSON input could not be decoded.
    #[error("invalid move tree json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
/// A position reached by one move from its parent.
pub struct MoveNode {
    /// Move in SAN, empty for the root.
    pub san: String,
    /// Full-move number of the move.
    pub move_number: u32,
    /// Side that made the move.
    pub color: Color,
    /// Dotted path label, set by `MoveTree::assign_line_ids`.
    pub line_id: Option<LineId>,
    /// Back-reference to the parent, `None` at the root.
    pub parent: Option<NodeId>,
    /// Continuations in variation order; index 0 is the main line.
    pub children: Vec<NodeId>,
}

/// Arena of move nodes rooted at `NodeId(0)`.
#[derive(Clone, Debug)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Nested JSON form of a move tree.
#[derive(Deserialize)]
struct JsonMove {
    #[serde(default)]
    san: String,
    #[serde(default)]
    move_number: Option<u32>,
    #[serde(default)]
    to_move: Option<Color>,
    #[serde(default)]
    children: Vec<JsonMove>,
}

impl MoveTree {
    #[must_use]
    /// Tree rooted at the standard starting position, white to move.
    pub fn new() -> Self {
        Self::with_start(0, Color::White)
    }

    #[must_use]
    /// Tree rooted at a position where `to_move` plays next.
    ///
    /// `move_number` is the full-move number of the move that led to the start position, so a
    /// position with black to play move 12 is `with_start(12, Color::Black)`.
    pub fn with_start(move_number: u32, to_move: Color) -> Self {
        let root = MoveNode {
            san: String::new(),
            move_number,
            color: to_move.opposite(),
            line_id: None,
            parent: None,
            children: Vec::new(),
        };
        Self { nodes: vec![root] }
    }

    /// Loads a tree from its nested JSON form and labels it with line ids.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::Json` if the input is not a valid tree description.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        // A full game nests two levels per ply, well past serde_json's default limit of 128.
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let parsed = JsonMove::deserialize(&mut deserializer)?;
        deserializer.end()?;
        let mut tree = Self::with_start(
            parsed.move_number.unwrap_or(0),
            parsed.to_move.unwrap_or(Color::White),
        );

        let mut pending: Vec<(NodeId, &JsonMove)> = vec![(tree.root(), &parsed)];
        while let Some((id, json_node)) = pending.pop() {
            for json_child in &json_node.children {
                let child = tree.add_child(id, &json_child.san);
                pending.push((child, json_child));
            }
        }

        tree.assign_line_ids();
        Ok(tree)
    }

    #[must_use]
    /// The root node id.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    /// True when the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    #[must_use]
    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    #[must_use]
    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Appends a move below `parent` and returns the new node.
    ///
    /// Move number and colour follow from the parent: a white move starts a new full move.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, san: &str) -> NodeId {
        let (move_number, color) = {
            let p = &self.nodes[parent.0];
            let color = p.color.opposite();
            let number = match color {
                Color::White => p.move_number + 1,
                Color::Black => p.move_number,
            };
            (number, color)
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(MoveNode {
            san: san.to_string(),
            move_number,
            color,
            line_id: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends a straight run of moves below `parent`, returning the last node.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_line(&mut self, parent: NodeId, sans: &[&str]) -> NodeId {
        sans.iter().fold(parent, |at, san| self.add_child(at, san))
    }

    /// Labels every node with its dotted line path.
    ///
    /// The root is `1`. A node with a single child hands its id down unchanged; at a fork child
    /// `i` gets `<id>.<i+1>`, so each fork adds one branch level.
    pub fn assign_line_ids(&mut self) {
        let root = self.root();
        self.nodes[root.0].line_id = Some(LineId::root());

        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(line_id) = self.nodes[id.0].line_id.clone() else {
                continue;
            };
            let children = self.nodes[id.0].children.clone();
            let forks = children.len() > 1;
            for (ordinal, child) in children.into_iter().enumerate() {
                self.nodes[child.0].line_id = Some(if forks {
                    line_id.fork(ordinal)
                } else {
                    line_id.clone()
                });
                pending.push(child);
            }
        }
    }

    /// Applies an id map, e.g. the assignments recorded by a sector build.
    pub fn apply_line_ids(&mut self, assignments: &HashMap<NodeId, LineId>) {
        for (id, line_id) in assignments {
            if let Some(node) = self.nodes.get_mut(id.0) {
                node.line_id = Some(line_id.clone());
            }
        }
    }

    /// Checks the structural invariants the sectioning algorithm relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: inconsistent links, unreachable nodes, missing line
    /// ids, or a branch level jump of more than one at a fork.
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self.root();
        if self.nodes[root.0].parent.is_some() {
            return Err(TreeError::Unreachable(root));
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if std::mem::replace(&mut seen[id.0], true) {
                // Reached twice: a child listed under two parents or twice under one.
                let parent = self.nodes[id.0].parent.unwrap_or(root);
                return Err(TreeError::BrokenLink { parent, child: id });
            }

            let level = self.branch_level_of(id)?;
            for &child in &self.nodes[id.0].children {
                let linked = self
                    .nodes
                    .get(child.0)
                    .is_some_and(|c| c.parent == Some(id));
                if !linked {
                    return Err(TreeError::BrokenLink { parent: id, child });
                }

                let child_level = self.branch_level_of(child)?;
                if child_level != level && child_level != level + 1 {
                    return Err(TreeError::InconsistentBranchLevel {
                        node: child,
                        level: child_level,
                        parent_level: level,
                    });
                }
                pending.push(child);
            }
        }

        match seen.iter().position(|reached| !reached) {
            Some(orphan) => Err(TreeError::Unreachable(NodeId(orphan))),
            None => Ok(()),
        }
    }

    /// Branch level derived from a node's line id.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::MissingLineId` for an unlabelled node.
    pub fn branch_level_of(&self, id: NodeId) -> Result<u32, TreeError> {
        self.nodes[id.0]
            .line_id
            .as_ref()
            .map(LineId::branch_level)
            .ok_or(TreeError::MissingLineId(id))
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
#[path = "tests/move_tree.rs"]
mod tests;
