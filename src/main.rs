mod core;
mod gui;
mod video;

use eframe::egui;
use gui::VideoBoxApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // An optional source descriptor on the command line overrides the
    // configured startup source.
    let source_override = std::env::args().nth(1);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 600.0])
            .with_title("Video Box"),
        ..Default::default()
    };

    eframe::run_native(
        "Video Box",
        options,
        Box::new(|cc| match VideoBoxApp::new(cc, source_override) {
            Ok(app) => Ok(Box::new(app)),
            Err(e) => {
                eprintln!("Failed to initialize app: {}", e);
                std::process::exit(1);
            }
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
