use std::{fs::read_to_string, path::Path};

use common::{
    config::{Config, Settings},
    locate,
    plot::{self, summarise},
    render::BarChart,
};
use eyre::{Context, Result, bail};
use tracing::debug;

use crate::Source;

fn read_config(config_file: &str) -> Result<Config> {
    if !Path::new(config_file).exists() {
        debug!("No {config_file}, using default plots");
        return Ok(Config {
            settings: Settings::default(),
            plots: default_plots::default_plots(),
        });
    }
    let contents =
        read_to_string(config_file).wrap_err_with(|| format!("Read {config_file}"))?;
    serde_yml::from_str(&contents).context(format!("Parse {config_file}"))
}

pub fn load_config(source: &Source) -> Result<Config> {
    let mut config = read_config(&source.config_file)?;
    if let Some(data_dir) = &source.data_dir {
        config.settings.data_dir = data_dir.clone();
    }
    if let Some(dataset) = &source.only {
        config.retain_dataset(dataset);
        if config.plots.is_empty() {
            bail!("No plot reads dataset {dataset}");
        }
    }
    debug!("Settings: {:?}, plots: {:?}", config.settings, config.plots);
    Ok(config)
}

pub fn list_datasets(config: &Config) -> Result<()> {
    let data_dir = &config.settings.data_dir;
    for (name, files) in locate::list_datasets(data_dir)? {
        println!("{name}:");
        let latest = files.len() - 1;
        for (i, file) in files.iter().enumerate() {
            let file_name = file.file_name().and_then(|f| f.to_str()).unwrap_or_default();
            if i == latest {
                println!("  {file_name} (latest)");
            } else {
                println!("  {file_name}");
            }
        }
    }
    Ok(())
}

pub fn plot(config: &Config) -> Result<()> {
    let written = plot::plot(
        &config.plots,
        &config.settings.data_dir,
        &config.settings.plot_dir,
    )?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn format_chart(chart: &BarChart) -> String {
    let width = chart
        .bars
        .iter()
        .map(|b| b.label.len())
        .max()
        .unwrap_or(0);
    let mut out = format!("{} ({})\n", chart.title.as_deref().unwrap_or(&chart.name), chart.y_label);
    for bar in &chart.bars {
        let std = if bar.stats.std.is_nan() {
            "-".to_owned()
        } else {
            chart.value_label.format(bar.stats.std)
        };
        out.push_str(&format!(
            "  {:width$}  {:>10}  ±{:<10}  n={}\n",
            bar.label,
            chart.value_label.format(bar.stats.mean),
            std,
            bar.stats.count,
        ));
    }
    out
}

pub fn print_summaries(config: &Config, json: bool) -> Result<()> {
    let mut all = Vec::new();
    for plot in &config.plots {
        let (csv_path, charts) = summarise(plot.as_ref(), &config.settings.data_dir)
            .wrap_err_with(|| format!("Summarising {}", plot.dataset()))?;
        if json {
            all.extend(charts);
            continue;
        }
        println!("# {}", csv_path.display());
        for chart in &charts {
            println!("{}", format_chart(chart));
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    }
    Ok(())
}
