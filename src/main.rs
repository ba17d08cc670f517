use clap::Parser;
use iced::Size;
use minima::{SettingsStore, ViewerApp};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PDF to open on start
    file_name: Option<PathBuf>,

    /// Settings file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn main() -> iced::Result {
    init_logging();
    let args = Args::parse();

    let settings = match args.config {
        Some(path) => SettingsStore::open(path),
        None => SettingsStore::open_default(),
    };
    if let Some(path) = settings.path() {
        tracing::info!("Using settings at {}", path.display());
    }

    let window_size = Size::new(
        settings.viewer().initial_window_width,
        settings.viewer().initial_window_height,
    );
    let file_name = args.file_name;

    iced::application(
        move || ViewerApp::new(file_name.clone(), settings.clone()),
        ViewerApp::update,
        ViewerApp::view,
    )
    .title(ViewerApp::title)
    .subscription(ViewerApp::subscription)
    .window_size(window_size)
    .run()
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minima=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
