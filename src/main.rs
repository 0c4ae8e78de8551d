use anyhow::anyhow;
use clap::Parser;
use drip_paint::gui::PaintApp;
use drip_paint::logging;
use drip_paint::paint::settings::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use drip_paint::paint::settings_store::{FileStore, StateStore};
use drip_paint::paint::PaintSession;
use eframe::egui;
use std::path::PathBuf;

/// Freehand painting with a speed-sensitive drip brush
#[derive(Parser, Debug)]
#[command(name = "drip_paint")]
#[command(version)]
struct Args {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(long)]
    debug: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Folder holding the saved painting state (defaults to one beside the executable)
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.debug, args.log_file);

    let store = match args.state_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::beside_executable()?,
    };
    tracing::info!(dir = %store.dir().display(), "using state folder");
    let store: Box<dyn StateStore> = Box::new(store);
    let session = PaintSession::load(store, (DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Drip Paint",
        native_options,
        Box::new(move |cc| Box::new(PaintApp::new(cc, session))),
    )
    .map_err(|e| anyhow!("run painting window: {e}"))
}
