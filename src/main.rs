//! linesector: sectioned move-list layout for chess study trees.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use linesector::formats::notation::NotationFormat;
use linesector::formats::Format;
use linesector::layout::SectorLayout;
use linesector::move_tree::MoveTree;
use linesector::{app_state, config, ui};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "linesector")]
#[command(about = "Sectioned move-list layout for chess study trees", long_about = None)]
struct Args {
    /// Move tree in nested JSON form
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Branch levels rendered as a lettered index (overrides linesector.toml)
    #[arg(long, short = 'd', value_name = "N")]
    index_depth: Option<u32>,

    /// Print the sectioned move list instead of opening the browser
    #[arg(long, conflicts_with = "json")]
    print: bool,

    /// Print the sector layout as JSON instead of opening the browser
    #[arg(long)]
    json: bool,

    /// Also write the sector layout as JSON to this file
    #[arg(long, value_name = "FILE")]
    save_layout: Option<PathBuf>,
}

fn invalid_data(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn main() -> io::Result<()> {
    linesector::init_tracing();

    let args = Args::parse();
    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(depth) = args.index_depth {
        cfg.variation_index_depth = depth;
    }

    let contents = std::fs::read_to_string(&args.path)?;
    let tree = MoveTree::from_json(&contents).map_err(invalid_data)?;
    info!(path = %args.path.display(), nodes = tree.len(), "loaded move tree");

    let state = app_state::AppState::new(tree, cfg.variation_index_depth, cfg.wrap_width)
        .map_err(invalid_data)?;

    if let Some(out) = &args.save_layout {
        SectorLayout::from_build(&state.tree, &state.manager).save(out)?;
    }

    if args.print {
        println!("{}", NotationFormat.render(&state.tree, &state.manager));
        return Ok(());
    }
    if args.json {
        let layout = SectorLayout::from_build(&state.tree, &state.manager);
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    if state.rows.is_empty() {
        eprintln!("No moves found in {}", args.path.display());
        return Ok(());
    }

    run_tui(state, &cfg)
}

fn run_tui(mut app: app_state::AppState, cfg: &config::Config) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::AppState,
    cfg: &config::Config,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, cfg))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        app.message = None;

        let target = match (app.current_view, key.code) {
            (_, KeyCode::Char('q')) => return Ok(()),
            (app_state::View::Detail, KeyCode::Esc) => {
                app.exit_detail_view();
                None
            }
            (app_state::View::List, KeyCode::Enter) => {
                app.enter_detail_view();
                None
            }
            (_, KeyCode::Up) if key.modifiers.contains(KeyModifiers::SHIFT) => {
                app.navigate_to_prev_sibling()
            }
            (_, KeyCode::Down) if key.modifiers.contains(KeyModifiers::SHIFT) => {
                app.navigate_to_next_sibling()
            }
            (_, KeyCode::Up) => app.find_prev_row(),
            (_, KeyCode::Down) => app.find_next_row(),
            (_, KeyCode::Left | KeyCode::Char('h')) => app.navigate_to_parent(),
            (_, KeyCode::Right | KeyCode::Char('l')) => app.navigate_to_first_child(),
            (_, KeyCode::Home) => app.navigate_to_first(),
            (_, KeyCode::End) => app.navigate_to_last(),
            (app_state::View::List, KeyCode::Char('+')) => {
                app.increase_index_depth().map_err(invalid_data)?;
                None
            }
            (app_state::View::List, KeyCode::Char('-')) => {
                app.decrease_index_depth().map_err(invalid_data)?;
                None
            }
            _ => None,
        };

        if let Some(row) = target {
            app.current_row = row;
        }
    }
}
