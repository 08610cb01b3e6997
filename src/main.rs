use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, bail};
use annotation_canvas::capture::data_uri;
use annotation_canvas::{AnnotationCanvas, CanvasConfig, CanvasMsg};

const USAGE: &str = "usage: annotation-canvas <background> <script.json> <output.png>";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [background, script, output] = args.as_slice() else {
        bail!(USAGE);
    };
    run(background, Path::new(script), Path::new(output))
}

/// Replay a JSON script of canvas messages over `background` and write the
/// last emitted image to `output`
fn run(background: &str, script: &Path, output: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let msgs: Vec<CanvasMsg> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing script {}", script.display()))?;

    let latest: Rc<RefCell<Option<String>>> = Rc::default();
    let sink = Rc::clone(&latest);
    let mut canvas = AnnotationCanvas::new(CanvasConfig::load())
        .with_save_sink(move |uri| *sink.borrow_mut() = Some(uri.to_string()));

    canvas.load_background(background)?;
    canvas.after_render()?;

    let mut emitted = 0usize;
    for msg in msgs {
        canvas.update(msg);
        if canvas.after_render()? {
            emitted += 1;
        }
    }
    log::info!(
        "Replayed script: {} shapes, {} images emitted",
        canvas.shapes().len(),
        emitted
    );

    let Some(uri) = latest.borrow_mut().take() else {
        bail!("canvas never emitted an image");
    };
    let img = data_uri::decode_image(&uri)?;
    img.save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}
