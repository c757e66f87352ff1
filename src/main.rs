use cdi_dashboard::app::DashboardApp;
use cdi_dashboard::cli::Args;
use cdi_dashboard::config::Config;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config = Config::resolve(&args)?;
    log::debug!("Configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CDI Dashboard – Chronic Disease Indicators",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
