//! forecast-history CLI.
//!
//! Commands:
//! - `run` - download today's forecasts for every configured site and append them
//!   to the historical logs
//! - `inspect` - print the most recent rows of one historical log

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use forecast_history::{
    get_default_output_dir, ForecastHistory, ForecastJob, IndexTimezone, IrradianceModel,
    NcssClient, RunReport, SiteTable, DEFAULT_BASE_URL,
};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "forecast-history",
    version,
    about = "Keeps historical logs of NOAA weather forecasts for solar sites"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Site table CSV with `Plant Name`, `Latitude`, `Longitude` and `Timezone` columns.
    #[arg(long, env = "FORECAST_SITES")]
    sites: PathBuf,

    /// Directory holding the historical logs. Defaults to the platform data directory.
    #[arg(long, env = "FORECAST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Treat the row after the header as a site instead of a units row.
    #[arg(long, default_value_t = false)]
    no_units_row: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download forecasts for every site and append them to the logs.
    Run {
        #[command(flatten)]
        common: Common,

        /// THREDDS server to query.
        #[arg(long, env = "THREDDS_URL", default_value = DEFAULT_BASE_URL)]
        thredds_url: String,

        /// Forecast jobs such as `day_1_hrrr` or `day_2_gfs`. Defaults to
        /// day_1_hrrr, day_1_rap, day_1_gfs and day_2_gfs.
        #[arg(long = "forecast", value_name = "LABEL")]
        forecasts: Vec<ForecastJob>,

        /// Day the horizons are counted from (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Write the `Date` index as site-local wall-clock time or as UTC.
        #[arg(long, default_value_t = IndexTimezone::Local)]
        index_timezone: IndexTimezone,

        /// Cloud cover to irradiance conversion: `clearsky_scaling` or `liu_jordan`.
        #[arg(long, default_value_t = IrradianceModel::ClearskyScaling)]
        irradiance_model: IrradianceModel,

        /// Log failed jobs and continue with the next one.
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 120)]
        timeout: u64,

        /// Write a JSON run report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the most recent rows of one site's log.
    Inspect {
        #[command(flatten)]
        common: Common,

        /// Site name as written in the site table.
        #[arg(long)]
        site: String,

        /// Forecast job label, e.g. `day_1_hrrr`.
        #[arg(long = "forecast", value_name = "LABEL")]
        forecast: ForecastJob,

        /// Number of rows to print.
        #[arg(long, default_value_t = 24)]
        rows: usize,

        /// First day to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            common,
            thredds_url,
            forecasts,
            date,
            index_timezone,
            irradiance_model,
            keep_going,
            timeout,
            report,
        } => {
            let client = NcssClient::builder()
                .base_url(thredds_url)
                .timeout(Duration::from_secs(timeout))
                .build()?;
            let sites = load_sites(&common).await?;
            let history = ForecastHistory::with_source(client, output_dir(&common)?)
                .await?
                .with_index_timezone(index_timezone)
                .with_irradiance_model(irradiance_model);

            let jobs = if forecasts.is_empty() {
                ForecastJob::defaults()
            } else {
                forecasts
            };
            let run_report = history
                .run()
                .sites(sites.sites())
                .jobs(&jobs)
                .maybe_today(date)
                .keep_going(keep_going)
                .call()
                .await?;

            if let Some(path) = report {
                write_report(&run_report, &path)?;
            }
            if !run_report.is_success() {
                bail!("{} forecast jobs failed", run_report.failures.len());
            }
        }
        Commands::Inspect {
            common,
            site,
            forecast,
            rows,
            from,
            to,
        } => {
            let sites = load_sites(&common).await?;
            let site = sites
                .get(&site)
                .with_context(|| format!("Site '{}' is not in {}", site, common.sites.display()))?;
            let history = ForecastHistory::with_output_folder(output_dir(&common)?).await?;

            let Some(frame) = history.history().site(site).job(&forecast).call().await? else {
                println!("No history recorded for {} {} yet", site, forecast);
                return Ok(());
            };
            let df = frame.get_days(from, to).latest(rows).frame.collect()?;
            println!("{}", df);
        }
    }

    Ok(())
}

async fn load_sites(common: &Common) -> Result<SiteTable> {
    SiteTable::load(&common.sites, !common.no_units_row)
        .await
        .with_context(|| format!("Failed to load sites from {}", common.sites.display()))
}

fn output_dir(common: &Common) -> Result<PathBuf> {
    match &common.output_dir {
        Some(dir) => Ok(dir.clone()),
        None => get_default_output_dir()
            .context("Could not determine a default output directory, pass --output-dir"),
    }
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    info!("Run report written to {}", path.display());
    Ok(())
}
