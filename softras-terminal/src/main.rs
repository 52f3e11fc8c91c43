/// softras - interactive terminal model viewer
///
/// Usage: softras [--config FILE] [--fov DEG] [--fps N] [--wireframe] [--ascii] [MODEL.obj]
/// Controls:
///   - Left drag: Orbit
///   - Right/middle drag: Pan
///   - Wheel: Dolly
///   - R: Reset camera, W: Toggle wireframe, P: Save TGA snapshot
///   - Q/ESC: Quit

use std::fs::File;
use std::sync::Mutex;

use anyhow::Context;
use softras_core::raster::validate;
use softras_core::{load_obj, Model};
use softras_terminal::{TerminalApp, ViewerConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::from_args(std::env::args().skip(1))?;
    init_tracing(&config)?;

    let model = match &config.model {
        Some(path) => load_obj(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => Model::cube(2.0),
    };
    validate(&model).context("model cannot be rasterized")?;
    info!(
        vertices = model.vertices().len(),
        faces = model.faces().len(),
        "model ready"
    );

    let (cols, rows) = crossterm::terminal::size().context("failed to query terminal size")?;
    let mut app = TerminalApp::new(model, config, cols, rows);
    app.run().context("terminal session failed")?;

    info!("viewer closed");
    Ok(())
}

/// Logs go to a file; stdout and stderr share the terminal with the frame.
fn init_tracing(config: &ViewerConfig) -> anyhow::Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("failed to create log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
