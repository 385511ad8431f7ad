use atelier::app::Atelier;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 560.0])
            .with_title("Atelier"),
        ..Default::default()
    };

    eframe::run_native(
        "Atelier",
        options,
        Box::new(|cc| Ok(Box::new(Atelier::new(cc)))),
    )
}
