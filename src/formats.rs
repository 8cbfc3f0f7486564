//! Format trait and implementations for rendering a built sector list.
//!
//! A format turns the sectors of one build into display text, both as plain lines for printing
//! and as styled lines for the terminal browser.

pub mod notation;

use crate::move_tree::MoveTree;
use crate::sector::{LineSector, SectorType};
use crate::sector_manager::LineSectorManager;
use ratatui::text::Line;

/// Renders sectors for output.
pub trait Format {
    /// Short name of the format.
    fn name(&self) -> &'static str;

    /// Plain-text line for one sector, or `None` when the sector shows nothing.
    fn format_sector(
        &self,
        tree: &MoveTree,
        manager: &LineSectorManager,
        sector: &LineSector,
    ) -> Option<String>;

    /// Styled line for one sector in the browser list.
    fn format_sector_display(
        &self,
        tree: &MoveTree,
        manager: &LineSectorManager,
        sector: &LineSector,
    ) -> Line<'static> {
        Line::from(
            self.format_sector(tree, manager, sector)
                .unwrap_or_default(),
        )
    }

    /// Every displayed sector of the build, one per line, in layout order.
    fn render(&self, tree: &MoveTree, manager: &LineSectorManager) -> String {
        manager
            .line_sectors()
            .filter(|sector| sector.sector_type != SectorType::Root)
            .filter_map(|sector| self.format_sector(tree, manager, sector))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
