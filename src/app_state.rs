//! The browser state bridging a sector build and the terminal UI.
//!
//! The browser owns the move tree and the manager, and lists every displayed sector in layout
//! order. Navigation follows the sector tree (parent, first child, siblings) rather than the
//! rows on screen. Changing the index depth rebuilds the sectors and keeps the selection on the
//! sector holding the same move.

use crate::move_tree::{MoveTree, NodeId, TreeError};
use crate::sector::{LineSector, SectorId};
use crate::sector_manager::LineSectorManager;
use tracing::debug;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Shows the sector list with navigation.
    List,
    /// Shows the selected sector's full move text.
    Detail,
}

/// Browser state over one move tree.
pub struct AppState {
    /// The tree being laid out.
    pub tree: MoveTree,
    /// Sectors of the current build.
    pub manager: LineSectorManager,
    /// Displayed sectors in layout order; the root sector and emptied sectors are skipped.
    pub rows: Vec<SectorId>,
    /// Selected row.
    pub current_row: usize,
    /// Active UI screen.
    pub current_view: View,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Maximum line width for wrapping in the detail view.
    pub wrap_width: usize,
}

impl AppState {
    /// Builds the sectors of `tree` and selects the first displayed one.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree fails validation.
    pub fn new(tree: MoveTree, index_depth: u32, wrap_width: usize) -> Result<Self, TreeError> {
        let mut manager = LineSectorManager::new(index_depth);
        manager.build_line_sectors(&tree)?;

        let mut state = Self {
            tree,
            manager,
            rows: Vec::new(),
            current_row: 0,
            current_view: View::List,
            message: None,
            wrap_width,
        };
        state.refresh_rows();
        Ok(state)
    }

    fn refresh_rows(&mut self) {
        self.rows = self
            .manager
            .line_sectors()
            .filter(|sector| sector.parent.is_some() && !sector.entries.is_empty())
            .map(|sector| sector.id)
            .collect();
        self.current_row = self.current_row.min(self.rows.len().saturating_sub(1));
    }

    #[must_use]
    /// The selected sector.
    pub fn current_sector(&self) -> Option<&LineSector> {
        self.rows
            .get(self.current_row)
            .map(|&id| self.manager.sector(id))
    }

    #[must_use]
    /// Row showing sector `id`, if it is displayed.
    pub fn row_of(&self, id: SectorId) -> Option<usize> {
        self.rows.iter().position(|&row| row == id)
    }

    fn row_holding(&self, node: NodeId) -> Option<usize> {
        self.rows
            .iter()
            .position(|&id| self.manager.sector(id).nodes().any(|n| n == node))
    }

    /// Rebuilds with a new index depth, keeping the selection on the same move.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree fails validation; the previous build stays displayed.
    pub fn set_index_depth(&mut self, index_depth: u32) -> Result<(), TreeError> {
        let anchor = self.current_sector().and_then(LineSector::first_node);

        self.manager.set_index_depth(index_depth);
        self.manager.build_line_sectors(&self.tree)?;
        self.refresh_rows();

        if let Some(row) = anchor.and_then(|node| self.row_holding(node)) {
            self.current_row = row;
        }
        debug!(index_depth, rows = self.rows.len(), "rebuilt sectors");
        self.message = Some(format!("Index depth {index_depth}"));
        Ok(())
    }

    /// Shows one more branch level as index.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuild fails.
    pub fn increase_index_depth(&mut self) -> Result<(), TreeError> {
        self.set_index_depth(self.manager.index_depth() + 1)
    }

    /// Shows one branch level less as index; stays at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuild fails.
    pub fn decrease_index_depth(&mut self) -> Result<(), TreeError> {
        let depth = self.manager.index_depth();
        if depth == 0 {
            self.message = Some("Index depth already 0".to_string());
            return Ok(());
        }
        self.set_index_depth(depth - 1)
    }

    #[must_use]
    /// Returns the following row index for sequential navigation.
    pub fn find_next_row(&self) -> Option<usize> {
        if self.current_row + 1 < self.rows.len() {
            Some(self.current_row + 1)
        } else {
            None
        }
    }

    #[must_use]
    /// Returns the preceding row index for reverse navigation.
    pub fn find_prev_row(&self) -> Option<usize> {
        self.current_row.checked_sub(1)
    }

    #[must_use]
    /// Moves to the containing sector; the stem and first index groups have none to show.
    pub fn navigate_to_parent(&self) -> Option<usize> {
        let parent = self.current_sector()?.parent?;
        self.row_of(parent)
    }

    #[must_use]
    /// Descends to the first displayed child sector.
    pub fn navigate_to_first_child(&self) -> Option<usize> {
        self.current_sector()?
            .children
            .iter()
            .find_map(|&child| self.row_of(child))
    }

    fn displayed_siblings(&self) -> Option<(Vec<usize>, usize)> {
        let sector = self.current_sector()?;
        let parent = self.manager.sector(sector.parent?);
        let rows: Vec<usize> = parent
            .children
            .iter()
            .filter_map(|&child| self.row_of(child))
            .collect();
        let at = rows.iter().position(|&row| row == self.current_row)?;
        Some((rows, at))
    }

    #[must_use]
    /// Finds the next sector sharing the selected sector's parent.
    pub fn navigate_to_next_sibling(&self) -> Option<usize> {
        let (rows, at) = self.displayed_siblings()?;
        rows.get(at + 1).copied()
    }

    #[must_use]
    /// Finds the previous sector sharing the selected sector's parent.
    pub fn navigate_to_prev_sibling(&self) -> Option<usize> {
        let (rows, at) = self.displayed_siblings()?;
        rows.get(at.checked_sub(1)?).copied()
    }

    #[must_use]
    /// Jumps to the first row.
    pub fn navigate_to_first(&self) -> Option<usize> {
        if self.rows.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    #[must_use]
    /// Jumps to the last row.
    pub fn navigate_to_last(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    #[must_use]
    /// Line ids from the outermost displayed ancestor down to the selected sector.
    pub fn breadcrumb(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = self.current_sector();
        while let Some(sector) = current {
            if sector.parent.is_none() {
                break;
            }
            parts.push(
                sector
                    .line_id
                    .as_ref()
                    .map_or_else(|| format!("#{}", sector.id.0), ToString::to_string),
            );
            current = sector.parent.map(|id| self.manager.sector(id));
        }
        parts.reverse();
        parts
    }

    #[must_use]
    /// Indentation width for the selected sector.
    pub fn get_indent(&self) -> usize {
        self.current_sector()
            .map_or(0, |s| usize::try_from(s.display_level).unwrap_or(0) * 2)
    }

    #[must_use]
    /// Determines available width for text after accounting for indentation.
    pub fn get_max_line_width(&self) -> usize {
        self.wrap_width.saturating_sub(self.get_indent())
    }

    /// Opens the detail view for the selected sector.
    pub fn enter_detail_view(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.current_view = View::Detail;
    }

    /// Returns to the sector list.
    pub fn exit_detail_view(&mut self) {
        self.current_view = View::List;
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
