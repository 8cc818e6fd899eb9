use clap::Parser;
use std::path::PathBuf;

use crate::theme::ThemePreference;

#[derive(Parser, Debug)]
#[command(
    name = "differ",
    version,
    about = "Review git diffs in the terminal, tracking which files you have viewed"
)]
pub struct Cli {
    /// Base revision (branch, tag, or commit)
    #[arg(default_value = "HEAD")]
    pub base: String,

    /// Revision to compare against the base. Defaults to the working tree
    pub compare: Option<String>,

    /// Run as if started in DIR
    #[arg(short = 'C', value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Theme for this session only: light, dark, or system
    #[arg(long, value_name = "PREF")]
    pub theme: Option<ThemePreference>,

    /// Lines of context around each change
    #[arg(short = 'U', long = "context", value_name = "N")]
    pub context_lines: Option<u32>,

    /// Print the diff as JSON instead of starting the TUI
    #[arg(long, conflicts_with = "list_refs")]
    pub json: bool,

    /// Print branches, tags, and worktrees as JSON and exit
    #[arg(long)]
    pub list_refs: bool,
}
