//! linesector: sectioned move-list layout for chess study trees.
//!
//! A move tree is cut into line sectors (straight runs of moves) which are then arranged the way
//! opening books typeset variations: a lettered index for the first branch levels, followed by
//! game-style text with side lines indented under the main line.
#![allow(clippy::multiple_crate_versions)]

pub mod app_state;
pub mod config;
pub mod formats;
pub mod layout;
pub mod move_tree;
pub mod sector;
pub mod sector_manager;
pub mod ui;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, so the terminal UI is left alone by default. Safe to
/// call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
