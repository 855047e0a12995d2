use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;

use price_prediction::config::AppConfig;
use price_prediction::session::Session;
use price_prediction::workflow::PricePrediction;

/// Predicts listing prices with linear and random forest regression
#[derive(Parser, Debug)]
#[command(version, name = "price-prediction")]
struct Cli {
    /// Parquet or CSV file with the listings
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML file overriding the built-in configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// `local`, `local[*]` or `local[N]`
    #[arg(long)]
    master: Option<String>,
    #[arg(long)]
    partitions: Option<usize>,
    /// Seed of the train/test split
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    train_ratio: Option<f64>,
    #[arg(long)]
    forest_seed: Option<u64>,
    #[arg(long)]
    show_rows: Option<usize>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(master) = self.master {
            config.master = master;
        }
        if let Some(partitions) = self.partitions {
            config.partitions = partitions;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(train_ratio) = self.train_ratio {
            config.train_ratio = train_ratio;
        }
        if self.forest_seed.is_some() {
            config.forest.seed = self.forest_seed;
        }
        if let Some(show_rows) = self.show_rows {
            config.show_rows = show_rows;
        }
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let level = record.level();
            let target = record.target();
            let style = buf.default_level_style(level);
            let timestamp = buf.timestamp();
            let args = record.args();
            writeln!(buf, "[{timestamp} {style}{level}{style:#} {target}] {args}")
        })
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let session = Session::builder()
        .app_name(config.app_name.as_str())
        .master(config.master.as_str())
        .build()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = PricePrediction::new(config).run(&session, &mut out)?;
    writeln!(out, "Completed")?;
    info!(
        "trained {} models on {} rows",
        report.models.len(),
        report.total_rows
    );

    session.stop();
    Ok(())
}
