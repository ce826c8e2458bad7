use crate::config::{Args, RunConfig};
use crate::domain::RecordDecoder;
use crate::errors::RunError;
use crate::scraper::{
    HttpTransport, PageFetcher, ReqwestTransport, RunReport, ScrapePipeline, BROWSER_HEADERS,
};
use crate::spreadsheets::{CsvListingSink, ListingSink};
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod domain;
mod errors;
mod scraper;
mod spreadsheets;

#[cfg(test)]
mod tests;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let report = run(&args).context("market search aborted")?;

    if report.stop.is_failure() {
        error!(stop = %report.stop, written = report.listings_written, "Run stopped early");
        anyhow::bail!("{}", report.stop);
    }

    println!(
        "Wrote {} item(s) to {} ({} page request(s), {})",
        report.listings_written,
        args.output.display(),
        report.pages_requested,
        report.stop
    );
    Ok(())
}

/// Resolve configuration, open the output, and drive the pipeline.
fn run(args: &Args) -> Result<RunReport, RunError> {
    let config = RunConfig::from_args(args)?;

    info!(
        realm = ?config.realm,
        url = %config.base_url,
        max_price = %config.filter.max_price,
        min_utility = config.filter.min_utility,
        max_utility = config.filter.max_utility,
        early_stop = ?config.early_stop,
        "Starting market search"
    );

    let transport = ReqwestTransport::new(BROWSER_HEADERS, &config.cookies, config.timeout)?;
    let mut sink = CsvListingSink::open(&config.output_path, config.output_mode)?;

    scrape(&config, transport, &mut sink)
}

pub(crate) fn scrape<T: HttpTransport, S: ListingSink + ?Sized>(
    config: &RunConfig,
    transport: T,
    sink: &mut S,
) -> Result<RunReport, RunError> {
    let fetcher = PageFetcher::new(transport, config.base_url.clone());
    let pipeline = ScrapePipeline::new(fetcher, RecordDecoder::default(), &config.filter)
        .early_stop(config.early_stop)
        .max_pages(config.max_pages);

    Ok(pipeline.run(sink)?)
}
