use std::process::ExitCode;
use std::sync::Mutex;

mod controller;
mod domain;
mod fetch;
mod inputter;
mod model;
mod schema;
mod table;
mod ui;

use clap::Parser;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use controller::Controller;
use domain::{CtvConfig, CtvError, DEFAULT_COUNTRIES_URL, DEFAULT_FIELDS_URL};
use model::{Model, Status};
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Countries API endpoint
    #[arg(long, default_value = DEFAULT_COUNTRIES_URL)]
    api_url: String,

    /// Markdown document listing the available fields
    #[arg(long, default_value = DEFAULT_FIELDS_URL)]
    fields_url: String,

    /// Log file, stdout belongs to the UI
    #[arg(long, default_value = "ctv.log")]
    log_file: String,

    /// Log filter, e.g. "debug" or "ctv=trace"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), CtvError> {
    let args = Args::parse();

    let log_file = std::fs::File::create(&args.log_file)?;
    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log_level))
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();

    let cfg = CtvConfig {
        countries_url: args.api_url,
        fields_url: args.fields_url,
        ..CtvConfig::default()
    };

    println!("Starting ctv, fetching country data ...");
    let mut model = Model::new(&cfg);
    model.load();

    let ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Run any re-fetch deferred by the last update, after the draw
        // so its loading status is visible while the request blocks
        model.service_pending();

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }
    }

    Ok(())
}
