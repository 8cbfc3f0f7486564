//! The UI renders the browser state into a sector list and a detail pane.
//!
//! The draw function dispatches based on the current view. The list view indents each sector by
//! its display level with index labels in front; the detail view shows the selected sector's
//! full move text wrapped to the configured width.

use crate::app_state::{AppState, View};
use crate::config::Config;
use crate::formats::notation::NotationFormat;
use crate::formats::Format;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &AppState, _cfg: &Config) {
    match app.current_view {
        View::List => draw_list(f, app),
        View::Detail => draw_detail(f, app),
    }
}

fn draw_list(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let format = NotationFormat;

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|&id| {
            let sector = app.manager.sector(id);
            let line = format.format_sector_display(&app.tree, &app.manager, sector);
            ListItem::new(line)
        })
        .collect();

    let title = format!(
        "Sectors ({} shown, index depth {}, max branch level {})",
        app.rows.len(),
        app.manager.index_depth(),
        app.manager.max_branch_level()
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    if !app.rows.is_empty() {
        list_state.select(Some(app.current_row));
    }
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let help = app.message.clone().unwrap_or_else(|| {
        "↑/↓: Navigate | Shift+↑/↓: Siblings | ←/→: Parent/Child | +/-: Index depth | Enter: Detail | q: Quit"
            .to_string()
    });

    let help_widget = Paragraph::new(help).block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[1]);
}

fn draw_detail(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Breadcrumb
            Constraint::Min(0),    // Moves
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let Some(sector) = app.current_sector() else {
        return;
    };

    let breadcrumb = app.breadcrumb().join(" > ");
    let breadcrumb_widget =
        Paragraph::new(breadcrumb).block(Block::default().borders(Borders::ALL).title("Lines"));
    f.render_widget(breadcrumb_widget, chunks[0]);

    let label = NotationFormat::sector_label(&app.manager, sector)
        .map(|label| format!("{label}) "))
        .unwrap_or_default();
    let title = format!(
        "{label}Sector {} ({:?}, branch level {}, display level {})",
        sector.id.0, sector.sector_type, sector.branch_level, sector.display_level
    );

    // Wrap inside the configured width, not the whole terminal.
    let mut area = chunks[1];
    let max_width = u16::try_from(app.get_max_line_width().saturating_add(2)).unwrap_or(u16::MAX);
    area.width = area.width.min(max_width);

    let text = NotationFormat::move_text(&app.tree, &sector.entries);
    let moves = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(moves, area);

    let help = Paragraph::new("Esc: Back | ←/→: Parent/Child | ↑/↓: Prev/Next | q: Quit")
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
