//! Book-style notation: a lettered index followed by game text.
//!
//! Index sectors are labelled by the path of sibling ordinals leading to them, cycling through
//! capital letters, numbers and small letters (`A)`, `A.1)`, `A.1.a)`). Moves carry their numbers
//! whenever a reader would lose track: every white move, and a black move that opens a sector or
//! follows a bracket.

use crate::formats::Format;
use crate::move_tree::{Color, MoveTree};
use crate::sector::{LineSector, SectorEntry};
use crate::sector_manager::LineSectorManager;
use ratatui::{
    style::{Color as TermColor, Modifier, Style},
    text::{Line, Span},
};

/// Branch level of the outermost lettered group; level 1 is the unlabelled stem line.
const FIRST_LABELLED_LEVEL: u32 = 2;

/// Book-style notation with indentation by display level.
pub struct NotationFormat;

impl NotationFormat {
    #[must_use]
    /// Index label such as `B.2`, for sectors inside the index section.
    pub fn sector_label(manager: &LineSectorManager, sector: &LineSector) -> Option<String> {
        if sector.branch_level < FIRST_LABELLED_LEVEL || !manager.is_index_level(sector.branch_level)
        {
            return None;
        }

        let mut ordinals = Vec::new();
        let mut current = sector;
        while current.branch_level >= FIRST_LABELLED_LEVEL {
            let parent = manager.sector(current.parent?);
            let ordinal = parent
                .children
                .iter()
                .position(|&child| child == current.id)?;
            ordinals.push(ordinal);
            current = parent;
        }
        ordinals.reverse();

        let parts: Vec<String> = ordinals
            .iter()
            .enumerate()
            .map(|(depth, &ordinal)| label_part(depth, ordinal))
            .collect();
        Some(parts.join("."))
    }

    #[must_use]
    /// Numbered move text of a run of entries, with bracket markers as parentheses.
    pub fn move_text(tree: &MoveTree, entries: &[SectorEntry]) -> String {
        let mut out = String::new();
        let mut needs_number = true;

        for entry in entries {
            match *entry {
                SectorEntry::OpenBracket => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push('(');
                    needs_number = true;
                }
                SectorEntry::CloseBracket => {
                    out.push(')');
                    needs_number = true;
                }
                SectorEntry::Move(id) => {
                    let node = tree.node(id);
                    if node.san.is_empty() {
                        continue;
                    }
                    if !out.is_empty() && !out.ends_with('(') {
                        out.push(' ');
                    }
                    let token = match node.color {
                        Color::White => format!("{}.{}", node.move_number, node.san),
                        Color::Black if needs_number => {
                            format!("{}...{}", node.move_number, node.san)
                        }
                        Color::Black => node.san.clone(),
                    };
                    out.push_str(&token);
                    needs_number = false;
                }
            }
        }
        out
    }
}

fn label_part(depth: usize, ordinal: usize) -> String {
    match depth % 3 {
        0 => letter(b'A', ordinal),
        1 => (ordinal + 1).to_string(),
        _ => letter(b'a', ordinal),
    }
}

fn letter(base: u8, ordinal: usize) -> String {
    match u8::try_from(ordinal) {
        Ok(offset) if offset < 26 => char::from(base + offset).to_string(),
        _ => format!("{}{}", char::from(base + 25), ordinal - 25),
    }
}

fn indent(sector: &LineSector) -> String {
    "  ".repeat(usize::try_from(sector.display_level).unwrap_or(0))
}

impl Format for NotationFormat {
    fn name(&self) -> &'static str {
        "notation"
    }

    fn format_sector(
        &self,
        tree: &MoveTree,
        manager: &LineSectorManager,
        sector: &LineSector,
    ) -> Option<String> {
        let text = Self::move_text(tree, &sector.entries);
        if text.is_empty() {
            return None;
        }
        let line = match Self::sector_label(manager, sector) {
            Some(label) => format!("{}{label}) {text}", indent(sector)),
            None => format!("{}{text}", indent(sector)),
        };
        Some(line)
    }

    fn format_sector_display(
        &self,
        tree: &MoveTree,
        manager: &LineSectorManager,
        sector: &LineSector,
    ) -> Line<'static> {
        let mut spans = vec![Span::raw(indent(sector))];

        if let Some(label) = Self::sector_label(manager, sector) {
            spans.push(Span::styled(
                format!("{label}) "),
                Style::default()
                    .fg(TermColor::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let text = Self::move_text(tree, &sector.entries);
        let style = if manager.is_index_level(sector.branch_level) {
            Style::default().fg(TermColor::Yellow)
        } else {
            Style::default()
        };
        spans.push(Span::styled(text, style));

        Line::from(spans)
    }
}

#[cfg(test)]
#[path = "../tests/notation.rs"]
mod tests;
