mod action;
mod app;
mod async_diff;
mod cli;
mod comments;
mod components;
mod config;
mod event;
mod git;
mod logging;
mod state;
mod theme;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use tracing::info;

use crate::app::App;
use crate::cli::Cli;
use crate::config::ConfigPreferences;
use crate::git::types::ComparisonTarget;
use crate::git::{list_refs, DiffEngine, RepoCache};
use crate::theme::{PaletteSurface, ThemeStore};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();
    tui::install_panic_hook();

    let cli = Cli::parse();
    logging::init_tracing()?;

    let cwd = match cli.directory {
        Some(ref dir) => dir.clone(),
        None => env::current_dir()?,
    };

    let repo = match RepoCache::open(&cwd) {
        Ok(r) => r,
        Err(_) => {
            eprintln!(
                "differ: not a git repository (or any parent up to mount point /)\n\
                 Run this command from inside a git working tree."
            );
            std::process::exit(1);
        }
    };

    let config = config::load_config(&config::config_path());

    let mut target = ComparisonTarget::new(&cli.base, cli.compare.clone());
    if let Some(lines) = cli.context_lines.or(config.context_lines) {
        target.context_lines = lines;
    }

    if cli.list_refs {
        let refs = list_refs(repo.repo())?;
        println!("{}", serde_json::to_string_pretty(&refs)?);
        return Ok(());
    }

    if cli.json {
        let diff = DiffEngine::compute_diff(repo.repo(), &target)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&diff).context("Failed to serialize diff")?
        );
        return Ok(());
    }

    let repo_path = repo.workdir().to_path_buf();
    drop(repo);
    info!(repo = %repo_path.display(), base = %target.base, compare = target.compare_label(), "starting");

    let theme = ThemeStore::new(
        Box::new(ConfigPreferences::new(config.path.clone())),
        PaletteSurface::new(config.colors.clone()),
    )
    .with_session_override(cli.theme);

    let mut app = App::new(target, repo_path, theme, config.scheme_poll);

    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal).await;
    tui::restore();

    match app.finish() {
        Ok(Some((count, path))) => {
            eprintln!("differ: wrote {count} comment(s) to {}", path.display())
        }
        Ok(None) => {}
        Err(e) => eprintln!("differ: failed to save comments: {e:#}"),
    }

    result
}
