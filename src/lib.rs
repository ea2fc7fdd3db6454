pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod grouping;
pub mod payload;
pub mod report;
pub mod row_stats;
pub mod schema_changes;
pub mod session;
pub mod state;
pub mod table;
pub mod text;

use std::{
    env,
    fs,
    io::{self, Read},
    path::Path,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, OutputFormat},
    config::ViewConfig,
    error::Rejection,
    report::DisplayTree,
    session::{DirectorySource, HostEvent, PanelSession, PanelView},
    state::{JsonFileStore, MemoryStore, StateStore, load_expanded, save_expanded},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tablediff_view", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => handle_render(&args),
        Commands::Toggle(args) => handle_toggle(&args),
        Commands::View(args) => handle_view(&args),
    }
}

fn handle_render(args: &cli::RenderArgs) -> Result<()> {
    let config = ViewConfig::load_or_default(args.config.as_deref())?;
    let raw = read_input(&args.input)?;
    let outcome = payload::validate_str(&raw);
    if let Err(rejection) = &outcome {
        log_rejection(&args.input, rejection);
    }

    let expanded = match &args.state {
        Some(path) => load_expanded(
            &JsonFileStore::new(path),
            &config.state_key,
            config.default_expanded,
        ),
        None => config.default_expanded,
    };
    debug!("Section state: {expanded:?}");

    let tree = report::render(&outcome, &expanded, &config);
    match args.format {
        OutputFormat::Text => print!("{}", text::render_text(&tree, args.color)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&tree).context("Serializing display tree")?
        ),
    }
    info!(
        "Rendered {} section(s) from {:?}",
        tree.sections().len(),
        args.input
    );
    Ok(())
}

fn handle_toggle(args: &cli::ToggleArgs) -> Result<()> {
    let config = ViewConfig::load_or_default(args.config.as_deref())?;
    let mut store = JsonFileStore::new(&args.state);
    let current = load_expanded(&store, &config.state_key, config.default_expanded);
    let next = current.toggled(args.section);
    save_expanded(&mut store, &config.state_key, &next);
    info!(
        "Section {:?} is now {}",
        args.section,
        if next.is_expanded(args.section) {
            "expanded"
        } else {
            "collapsed"
        }
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&next).context("Serializing section state")?
    );
    Ok(())
}

fn handle_view(args: &cli::ViewArgs) -> Result<()> {
    let config = ViewConfig::load_or_default(args.config.as_deref())?;
    let source = DirectorySource::new(&args.dir);
    match &args.state {
        Some(path) => run_view(args, source, JsonFileStore::new(path), config),
        None => run_view(args, source, MemoryStore::new(), config),
    }
}

fn run_view<T: StateStore>(
    args: &cli::ViewArgs,
    source: DirectorySource,
    store: T,
    config: ViewConfig,
) -> Result<()> {
    let mut session = PanelSession::new(source, store, config);
    session.initialize(args.active_file.as_deref());
    let events = args
        .focus
        .iter()
        .cloned()
        .map(HostEvent::ChangeFocusedFile)
        .chain(args.saved.iter().cloned().map(HostEvent::SavedFile));
    for event in events {
        session.handle_event(&event);
    }

    let view = session.view();
    match args.format {
        OutputFormat::Text => print!("{}", render_view_text(&view, args.color)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Serializing panel view")?
        ),
    }
    if let Some(model) = session.selected_model() {
        info!("Rendered model '{model}' from {:?}", args.dir);
    }
    Ok(())
}

fn render_view_text(view: &PanelView, color: bool) -> String {
    match view {
        PanelView::Loading => "Loading models...\n".to_string(),
        PanelView::Error { message } => format!("Error: {message}\n"),
        PanelView::Ready { tree } => text::render_text(tree, color),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading payload from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("Reading payload file {path:?}"))
    }
}

fn log_rejection(input: &Path, rejection: &Rejection) {
    match rejection {
        Rejection::NoData => info!("No payload data in {input:?}"),
        Rejection::InvalidStructure { detail } => {
            warn!("Payload {input:?} rejected: {detail}")
        }
    }
}

/// Convenience for hosts holding raw JSON: validate and render in one step.
pub fn render_json(
    raw: Option<&serde_json::Value>,
    expanded: &state::ExpandedSections,
    config: &ViewConfig,
) -> DisplayTree {
    report::render(&payload::validate(raw), expanded, config)
}
