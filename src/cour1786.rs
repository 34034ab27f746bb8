use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::explorer::{Explorer, ExplorerSettings};
use crate::timeline::Speed;

mod category;
mod config;
mod dataset;
mod dates;
mod error;
mod explorer;
mod gui;
mod jump;
mod layout;
mod legend;
mod markers;
mod route;
mod search;
mod timeline;
mod visibility;

#[derive(Parser, Debug)]
#[command(author, version, about = "Map of the royal court's theatres and stays in 1786", long_about = None)]
struct Cli {
    /// Dataset with "theatres" and "places" collections (overrides [data] path)
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Config file to use instead of cour1786.conf in the user config dir
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start with the timeline filter on
    #[arg(long)]
    timeline: bool,

    /// Keep places visited before the selected date on the map
    #[arg(long)]
    history: bool,

    /// Playback speed: 1, 5 or 10
    #[arg(long)]
    speed: Option<u32>,
}

impl Cli {
    fn validate(&self) -> Result<(), String> {
        if let Some(speed) = self.speed
            && Speed::try_from(speed).is_err()
        {
            return Err(format!("Invalid speed {}. Use one of: 1, 5, 10", speed));
        }

        if let Some(ref path) = self.data
            && !path.is_file()
        {
            return Err(format!("Dataset file does not exist: {:?}", path));
        }

        if self.history && !self.timeline {
            log::warn!("--history has no effect until the timeline is enabled");
        }

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_or_create(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;

    let data_path = args.data.clone().unwrap_or_else(|| config.data.path.clone());
    let dataset = match Dataset::load(&data_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Cannot load the dataset: {}", e);
            std::process::exit(1);
        }
    };

    let settings = ExplorerSettings {
        search: config.search_settings(),
        base_interval: config.base_interval(),
        focus_zoom: config.map.focus_zoom,
    };
    let mut explorer = Explorer::new(dataset, settings);

    let speed = args.speed.unwrap_or(config.timeline.speed);
    match Speed::try_from(speed) {
        Ok(speed) => explorer.set_speed(speed, std::time::Instant::now()),
        Err(e) => log::warn!("Ignoring configured timeline speed: {}", e),
    }
    if args.history || config.timeline.history {
        explorer.set_history_mode(true);
    }
    if args.timeline || config.timeline.enabled {
        explorer.set_timeline_enabled(true);
    }

    let app = gui::GuiApp::new(explorer, &config, config_path);
    if let Err(e) = app.run() {
        log::error!("GUI Error: {}", e);
    }
    Ok(())
}
