#[cfg(feature = "egui_ui")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dbdesk::run()
}

#[cfg(not(feature = "egui_ui"))]
fn main() {
    eprintln!("Error: No UI feature enabled. Use --features egui_ui");
    std::process::exit(1);
}
