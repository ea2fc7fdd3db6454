use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::state::SectionId;

#[derive(Debug, Parser)]
#[command(author, version, about = "Render table-comparison results as collapsible report sections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a single diff payload file
    Render(RenderArgs),
    /// Flip one section between expanded and collapsed in a state file
    Toggle(ToggleArgs),
    /// Select a model from a payload directory, replay host events, and render it
    View(ViewArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Diff payload JSON file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// JSON file holding the expanded/collapsed section state
    #[arg(short, long)]
    pub state: Option<PathBuf>,
    /// YAML view configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Highlight source/target columns with ANSI colors in text output
    #[arg(long)]
    pub color: bool,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// JSON file holding the expanded/collapsed section state
    #[arg(short, long)]
    pub state: PathBuf,
    /// Section to flip
    #[arg(long, value_enum)]
    pub section: SectionId,
    /// YAML view configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Directory holding models.json and one <model>.json payload per model
    #[arg(short, long)]
    pub dir: PathBuf,
    /// File focused in the editor when the panel opens
    #[arg(long = "active-file")]
    pub active_file: Option<PathBuf>,
    /// Focused-file events, applied in order
    #[arg(long = "focus", action = clap::ArgAction::Append)]
    pub focus: Vec<PathBuf>,
    /// Saved-file events, applied after focus events
    #[arg(long = "saved", action = clap::ArgAction::Append)]
    pub saved: Vec<PathBuf>,
    /// JSON file holding the expanded/collapsed section state
    #[arg(short, long)]
    pub state: Option<PathBuf>,
    /// YAML view configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Highlight source/target columns with ANSI colors in text output
    #[arg(long)]
    pub color: bool,
}
