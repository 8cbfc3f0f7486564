//! Line sector representation for sectioned move lists.
//!
//! A sector is a straight run of moves with no internal branching: the unit a move list is typeset
//! in. Sectors form their own tree through parent/child ids, mirroring the forks of the move tree
//! they were cut from.

use crate::move_tree::{LineId, NodeId};
use serde::{Deserialize, Serialize};

/// Monotonically assigned sector id, also the sector's slot in the manager's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How a sector ends.
pub enum SectorType {
    /// The synthetic sector holding only the tree root.
    Root,
    /// The last move has several continuations, each starting a child sector.
    Forking,
    /// The line ends with the sector.
    Leaf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// One item in a sector's sequence.
pub enum SectorEntry {
    /// A move from the tree.
    Move(NodeId),
    /// Start of an inline side line absorbed from a leaf sibling.
    OpenBracket,
    /// End of an inline side line.
    CloseBracket,
}

impl SectorEntry {
    #[must_use]
    /// The tree node, unless this is a bracket marker.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Move(id) => Some(id),
            Self::OpenBracket | Self::CloseBracket => None,
        }
    }
}

#[derive(Clone, Debug)]
/// Contiguous, non-branching run of moves rendered as one segment.
pub struct LineSector {
    /// Unique id, assigned in creation order.
    pub id: SectorId,
    /// Moves and bracket markers in display order.
    pub entries: Vec<SectorEntry>,
    /// Line id shared by every move the sector was built from.
    pub line_id: Option<LineId>,
    /// Forks crossed to reach the sector; 0 only for the root sector.
    pub branch_level: u32,
    /// Indentation group used for rendering; -1 for the root sector.
    pub display_level: i32,
    /// How the sector ends.
    pub sector_type: SectorType,
    /// Containing sector, `None` for the root sector.
    pub parent: Option<SectorId>,
    /// Sectors continuing from this one, in layout order.
    pub children: Vec<SectorId>,
}

impl LineSector {
    pub(crate) fn new(
        id: SectorId,
        parent: Option<SectorId>,
        branch_level: u32,
        display_level: i32,
    ) -> Self {
        Self {
            id,
            entries: Vec::new(),
            line_id: None,
            branch_level,
            display_level,
            sector_type: SectorType::Leaf,
            parent,
            children: Vec::new(),
        }
    }

    /// Tree nodes of the sector, skipping bracket markers.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().filter_map(|entry| entry.node())
    }

    #[must_use]
    /// First tree node of the sector, if any move remains in it.
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes().next()
    }
}
