//! Decomposes a move tree into line sectors laid out like an opening book.
//!
//! The first few branch levels form an index: every variation gets its own lettered group and
//! display level. Past the index the layout switches to game style, where the main line keeps
//! running at its parent's display level and side lines are indented beneath it. Two merge passes
//! then tidy the result: a leaf side line with a single sibling is bracketed inline into that
//! sibling, and any sector left with one child absorbs it.

use crate::move_tree::{LineId, MoveTree, NodeId, TreeError};
use crate::sector::{LineSector, SectorEntry, SectorId, SectorType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Owns the sectors produced by one build of a move tree.
pub struct LineSectorManager {
    /// Branch levels rendered in index style past the first index level.
    index_depth: u32,
    /// Every sector ever allocated in this build, indexed by `SectorId`.
    arena: Vec<LineSector>,
    /// Live sectors in creation order.
    order: Vec<SectorId>,
    max_branch_level: u32,
    /// 1 when a stem line precedes the first fork, 2 when the root forks immediately.
    first_index_branch_level: u32,
    has_index_level_zero: bool,
    line_ids: HashMap<NodeId, LineId>,
}

impl LineSectorManager {
    #[must_use]
    /// Creates an empty manager rendering `index_depth` levels past the first in index style.
    pub fn new(index_depth: u32) -> Self {
        Self {
            index_depth,
            arena: Vec::new(),
            order: Vec::new(),
            max_branch_level: 0,
            first_index_branch_level: 1,
            has_index_level_zero: false,
            line_ids: HashMap::new(),
        }
    }

    #[must_use]
    /// Configured index depth.
    pub fn index_depth(&self) -> u32 {
        self.index_depth
    }

    /// Changes the index depth. Takes effect on the next build.
    pub fn set_index_depth(&mut self, index_depth: u32) {
        self.index_depth = index_depth;
    }

    /// Rebuilds the sector list from `tree`, discarding any previous build.
    ///
    /// # Errors
    ///
    /// Returns the first structural fault found by `MoveTree::validate`; the previous build is
    /// left untouched in that case.
    pub fn build_line_sectors(&mut self, tree: &MoveTree) -> Result<(), TreeError> {
        tree.validate()?;
        self.reset();

        let root = tree.root();
        let root_sector = self.alloc_sector(None, 0, -1);
        self.push_node(root_sector, root, tree.node(root).line_id.clone());
        self.arena[root_sector.0].sector_type = SectorType::Root;

        let first_moves = tree.children(root);
        self.first_index_branch_level = if first_moves.len() > 1 { 2 } else { 1 };
        self.has_index_level_zero = match first_moves.first() {
            Some(&first) => tree.branch_level_of(first)? == 1,
            None => false,
        };

        self.process_child_sectors(tree, root_sector, root)?;

        let built = self.order.len();
        let bracketed = self.combine_sibling_line_sectors();
        let absorbed = self.combine_top_line_sectors();
        debug!(
            built,
            bracketed,
            absorbed,
            live = self.order.len(),
            max_branch_level = self.max_branch_level,
            "built line sectors"
        );
        Ok(())
    }

    #[must_use]
    /// True when sectors at `branch_level` are laid out in index style.
    pub fn is_index_level(&self, branch_level: u32) -> bool {
        branch_level <= self.index_depth + 1
    }

    #[must_use]
    /// True for the final index-style level; game layout starts below it.
    pub fn is_last_index_line(&self, branch_level: u32) -> bool {
        branch_level == self.index_depth + 1
    }

    #[must_use]
    /// True when a stem line precedes the first fork, so the index has a level 0 group.
    pub fn has_index_level_zero(&self) -> bool {
        self.has_index_level_zero
    }

    #[must_use]
    /// Deepest branch level among the sectors built below the root during the last build.
    ///
    /// The root sector is not counted, so a tree holding only the root reports 0.
    pub fn max_branch_level(&self) -> u32 {
        self.max_branch_level
    }

    #[must_use]
    /// Branch level of the first lettered index group.
    pub fn first_index_branch_level(&self) -> u32 {
        self.first_index_branch_level
    }

    #[must_use]
    /// The synthetic root sector, once a build has run.
    pub fn root_sector(&self) -> Option<SectorId> {
        self.order.first().copied()
    }

    #[must_use]
    /// Sector by id. Sectors merged away remain addressable but are no longer listed.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by the last build.
    pub fn sector(&self, id: SectorId) -> &LineSector {
        &self.arena[id.0]
    }

    /// Live sectors in creation order, root sector first.
    pub fn line_sectors(&self) -> impl Iterator<Item = &LineSector> + '_ {
        self.order.iter().map(|id| &self.arena[id.0])
    }

    #[must_use]
    /// Number of live sectors including the root sector.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    /// True before the first build.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    /// Line id of every node as inherited from the first node of its sector.
    pub fn line_id_assignments(&self) -> &HashMap<NodeId, LineId> {
        &self.line_ids
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.line_ids.clear();
        self.max_branch_level = 0;
        self.first_index_branch_level = 1;
        self.has_index_level_zero = false;
    }

    fn alloc_sector(
        &mut self,
        parent: Option<SectorId>,
        branch_level: u32,
        display_level: i32,
    ) -> SectorId {
        let id = SectorId(self.arena.len());
        self.arena
            .push(LineSector::new(id, parent, branch_level, display_level));
        self.order.push(id);
        id
    }

    fn push_node(&mut self, sector: SectorId, node: NodeId, line_id: Option<LineId>) {
        if let Some(line_id) = &line_id {
            self.line_ids.insert(node, line_id.clone());
        }
        let sector = &mut self.arena[sector.0];
        if sector.line_id.is_none() {
            sector.line_id = line_id;
        }
        sector.entries.push(SectorEntry::Move(node));
    }

    /// Builds the sectors for every child of `node`, the last move of `parent`.
    fn process_child_sectors(
        &mut self,
        tree: &MoveTree,
        parent: SectorId,
        node: NodeId,
    ) -> Result<(), TreeError> {
        let children = tree.children(node);
        let (parent_level, parent_display) = {
            let p = &self.arena[parent.0];
            (p.branch_level, p.display_level)
        };

        if self.is_index_level(parent_level + 1) || Some(parent) == self.root_sector() {
            for &child in children {
                self.build_line_sector(tree, parent, child, parent_display + 1)?;
            }
            return Ok(());
        }

        // Game layout: side lines first, then the main line, which stays level with its parent.
        let Some((&main, side_lines)) = children.split_first() else {
            return Ok(());
        };
        for &child in side_lines {
            self.build_line_sector(tree, parent, child, parent_display + 1)?;
        }
        let main_sector = self.build_line_sector(tree, parent, main, parent_display)?;

        // The main-line move continues the parent's paragraph.
        let continuation = &mut self.arena[main_sector.0].entries;
        if !continuation.is_empty() {
            let first = continuation.remove(0);
            self.arena[parent.0].entries.push(first);
        }
        Ok(())
    }

    /// Collapses the straight run starting at `node` into one sector under `parent`.
    fn build_line_sector(
        &mut self,
        tree: &MoveTree,
        parent: SectorId,
        node: NodeId,
        display_level: i32,
    ) -> Result<SectorId, TreeError> {
        let line_id = tree
            .node(node)
            .line_id
            .clone()
            .ok_or(TreeError::MissingLineId(node))?;
        let branch_level = line_id.branch_level();
        self.max_branch_level = self.max_branch_level.max(branch_level);

        let sector = self.alloc_sector(Some(parent), branch_level, display_level);
        self.push_node(sector, node, Some(line_id.clone()));

        let mut nd = node;
        while let [only] = tree.children(nd) {
            nd = *only;
            self.push_node(sector, nd, Some(line_id.clone()));
        }

        self.arena[parent.0].children.push(sector);
        if tree.children(nd).is_empty() {
            self.arena[sector.0].sector_type = SectorType::Leaf;
        } else {
            self.arena[sector.0].sector_type = SectorType::Forking;
            self.process_child_sectors(tree, sector, nd)?;
        }
        trace!(?sector, branch_level, display_level, "built sector");
        Ok(sector)
    }

    /// Brackets a leaf side line into its only sibling. Returns the number of leaves absorbed.
    fn combine_sibling_line_sectors(&mut self) -> usize {
        let root = self.root_sector();
        let mut to_delete: Vec<SectorId> = Vec::new();

        for idx in 0..self.order.len() {
            let id = self.order[idx];
            let sector = &self.arena[id.0];
            if self.is_index_level(sector.branch_level.saturating_sub(1)) {
                continue;
            }
            let Some(parent) = sector.parent else {
                continue;
            };
            if Some(parent) == root {
                continue;
            }

            let leaf = match self.arena[parent.0].children.as_slice() {
                [first, second]
                    if *second == id && self.arena[first.0].sector_type == SectorType::Leaf =>
                {
                    *first
                }
                _ => continue,
            };

            let absorbed = std::mem::take(&mut self.arena[leaf.0].entries);
            let sector = &mut self.arena[id.0];
            let mut entries = Vec::with_capacity(absorbed.len() + sector.entries.len() + 2);
            entries.push(SectorEntry::OpenBracket);
            entries.extend(absorbed);
            entries.push(SectorEntry::CloseBracket);
            entries.append(&mut sector.entries);
            sector.entries = entries;

            self.arena[parent.0].children.retain(|&child| child != leaf);
            trace!(?leaf, into = ?id, "bracketed leaf sector");
            to_delete.push(leaf);
        }

        let removed = to_delete.len();
        self.order.retain(|id| !to_delete.contains(id));
        removed
    }

    /// Flattens chains of single-child sectors. Returns the number of sectors absorbed.
    fn combine_top_line_sectors(&mut self) -> usize {
        let root = self.root_sector();
        let mut to_delete: HashSet<SectorId> = HashSet::new();

        for idx in 0..self.order.len() {
            let id = self.order[idx];
            if Some(id) == root || to_delete.contains(&id) {
                continue;
            }
            while self.merge_top_lines(id, &mut to_delete) {}
        }

        let removed = to_delete.len();
        self.order.retain(|id| !to_delete.contains(id));
        removed
    }

    fn merge_top_lines(&mut self, id: SectorId, to_delete: &mut HashSet<SectorId>) -> bool {
        let child = match self.arena[id.0].children.as_slice() {
            [only] if !to_delete.contains(only) => *only,
            _ => return false,
        };

        let child_sector = &mut self.arena[child.0];
        let mut entries = std::mem::take(&mut child_sector.entries);
        let grandchildren = std::mem::take(&mut child_sector.children);
        let sector_type = child_sector.sector_type;

        for &grandchild in &grandchildren {
            self.arena[grandchild.0].parent = Some(id);
        }
        let sector = &mut self.arena[id.0];
        sector.entries.append(&mut entries);
        sector.children = grandchildren;
        sector.sector_type = sector_type;

        trace!(?child, into = ?id, "absorbed single child sector");
        to_delete.insert(child);
        true
    }
}

#[cfg(test)]
#[path = "tests/sector_manager.rs"]
mod tests;
