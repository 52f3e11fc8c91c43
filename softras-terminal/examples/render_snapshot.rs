/// Example: Render one frame of an OBJ file without a terminal and save it as TGA
///
/// Usage: cargo run --example render_snapshot -- [path/to/model.obj] [out.tga]

use std::env;

use anyhow::Context;
use softras_core::{load_obj, save_tga, Model};
use softras_terminal::{TerminalApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let model = match args.get(1) {
        Some(path) => load_obj(path).with_context(|| format!("failed to load {path}"))?,
        None => {
            eprintln!("No OBJ file provided, using default cube...");
            Model::cube(2.0)
        }
    };
    let out = args.get(2).map(String::as_str).unwrap_or("snapshot.tga");

    // 160x60 cells, i.e. a 160x120 pixel frame
    let mut app = TerminalApp::new(model, ViewerConfig::default(), 160, 60);
    if !app.render_frame() {
        anyhow::bail!("{}", app.status_line());
    }
    save_tga(app.frame(), out).with_context(|| format!("failed to write {out}"))?;

    let stats = app.stats();
    println!(
        "Rendered {} triangles ({} culled), {} fragments -> {}",
        stats.triangles, stats.culled, stats.fragments, out
    );
    Ok(())
}
