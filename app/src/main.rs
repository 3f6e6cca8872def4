use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod report;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Args)]
struct Source {
    #[arg(short, long, default_value = "config.yaml")]
    config_file: String,
    /// Overrides `settings.data_dir`
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Only use plots reading this dataset
    #[arg(long)]
    only: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List datasets in the data directory
    Ls {
        #[command(flatten)]
        source: Source,
    },
    /// Render charts from the latest output of each dataset
    Plot {
        #[command(flatten)]
        source: Source,
        /// Overrides `settings.plot_dir`
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },
    /// Print aggregated results without rendering
    Print {
        #[command(flatten)]
        source: Source,
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("bench_report={log_level}"));

    if !args.log.is_empty() {
        for log in &args.log {
            env_filter = env_filter.add_directive(log.parse()?);
        }
    }

    for module in default_plots::PLUGIN_NAMES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    let result = match args.command {
        Commands::Ls { source } => {
            report::load_config(&source).and_then(|config| report::list_datasets(&config))
        }
        Commands::Plot { source, plot_dir } => report::load_config(&source).and_then(|mut config| {
            if let Some(plot_dir) = plot_dir {
                config.settings.plot_dir = plot_dir;
            }
            report::plot(&config)
        }),
        Commands::Print { source, json } => {
            report::load_config(&source).and_then(|config| report::print_summaries(&config, json))
        }
    };

    if let Err(err) = &result {
        error!("{err:#?}");
    }
    result
}
