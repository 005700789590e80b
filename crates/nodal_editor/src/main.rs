//! Nodal command line
//!
//! Headless entry point: loads a graph document through the same editor
//! state a graphical host would use, reports what it contains, and can
//! write the normalized document back out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use nodal_core::IdRegistry;
use nodal_editor::{EditorPreferences, EditorState, SceneSerializer, NAME, VERSION};

#[derive(Parser, Debug)]
#[command(name = "nodal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Load, inspect and normalize node graph documents")]
struct Cli {
    /// Graph document (JSON) to load
    file: PathBuf,

    /// Write the loaded document back out to this path
    #[arg(long, value_name = "OUT")]
    resave: Option<PathBuf>,

    /// Preferences file (TOML); defaults to the user config directory
    #[arg(long, value_name = "TOML")]
    preferences: Option<PathBuf>,
}

fn run(cli: Cli) -> nodal_editor::Result<()> {
    let preferences = match &cli.preferences {
        Some(path) => EditorPreferences::load(path)?,
        None => EditorPreferences::load_or_default(),
    };

    let mut state = EditorState::with_preferences(preferences, IdRegistry::global());
    SceneSerializer::load(&mut state, &cli.file)?;

    let scene = &state.scene;
    let sockets: usize = scene.nodes().iter().map(|n| n.sockets().count()).sum();
    let (width, height) = scene.bounds();

    println!("{}", state.display_name());
    println!("  scene    {} ({} x {})", scene.id(), width, height);
    println!("  nodes    {}", scene.node_count());
    println!("  sockets  {}", sockets);
    println!("  edges    {}", scene.edge_count());
    println!(
        "  history  {} (limit {})",
        state.history.descriptions().collect::<Vec<_>>().join(", "),
        state.history.limit()
    );

    if let Some(out) = &cli.resave {
        SceneSerializer::save(&mut state, out)?;
        println!("  saved    {}", out.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("{} {}", NAME, VERSION);

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
