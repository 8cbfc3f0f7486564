//! The sector layout is the serialisable result of a build, for renderers outside this crate.
//!
//! It flattens the manager's arena into plain records: ids, levels, the sector tree links and
//! each sector's tokens, so a consumer never needs the move tree itself.

use crate::formats::notation::NotationFormat;
use crate::move_tree::MoveTree;
use crate::sector::{SectorEntry, SectorId, SectorType};
use crate::sector_manager::LineSectorManager;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Snapshot of one build.
pub struct SectorLayout {
    /// Index depth the build used.
    pub index_depth: u32,
    /// Deepest branch level in the tree.
    pub max_branch_level: u32,
    /// Branch level of the first index group.
    pub first_index_branch_level: u32,
    /// Whether a stem line precedes the first fork.
    pub has_index_level_zero: bool,
    /// Live sectors in layout order, root sector first.
    pub sectors: Vec<SectorRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One sector, flattened.
pub struct SectorRecord {
    /// Sector id.
    pub id: SectorId,
    /// Containing sector.
    pub parent: Option<SectorId>,
    /// Continuing sectors in layout order.
    pub children: Vec<SectorId>,
    /// Forks crossed to reach the sector.
    pub branch_level: u32,
    /// Rendering indentation group.
    pub display_level: i32,
    /// How the sector ends.
    pub sector_type: SectorType,
    /// Line id shared by the sector's moves.
    pub line_id: Option<String>,
    /// Index label, for sectors in the index section.
    pub label: Option<String>,
    /// Moves in SAN, with `(` and `)` for bracket markers.
    pub tokens: Vec<String>,
    /// Numbered move text.
    pub text: String,
}

impl SectorLayout {
    #[must_use]
    /// Captures the manager's current build of `tree`.
    pub fn from_build(tree: &MoveTree, manager: &LineSectorManager) -> Self {
        let sectors = manager
            .line_sectors()
            .map(|sector| SectorRecord {
                id: sector.id,
                parent: sector.parent,
                children: sector.children.clone(),
                branch_level: sector.branch_level,
                display_level: sector.display_level,
                sector_type: sector.sector_type,
                line_id: sector.line_id.as_ref().map(ToString::to_string),
                label: NotationFormat::sector_label(manager, sector),
                tokens: sector
                    .entries
                    .iter()
                    .map(|entry| match *entry {
                        SectorEntry::Move(id) => tree.node(id).san.clone(),
                        SectorEntry::OpenBracket => "(".to_string(),
                        SectorEntry::CloseBracket => ")".to_string(),
                    })
                    .collect(),
                text: NotationFormat::move_text(tree, &sector.entries),
            })
            .collect();

        Self {
            index_depth: manager.index_depth(),
            max_branch_level: manager.max_branch_level(),
            first_index_branch_level: manager.first_index_branch_level(),
            has_index_level_zero: manager.has_index_level_zero(),
            sectors,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string_pretty(self).map_err(io::Error::other)
    }

    /// Writes the layout as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_json()?)
    }

    /// Reads a layout previously written by `save`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a layout.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
#[path = "tests/layout.rs"]
mod tests;
