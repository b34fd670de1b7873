//! Reanalysis of tier 3 variants against current panel data.

pub mod ds;
pub mod eval;
pub mod reconcile;
pub mod report;
pub mod result;
pub mod runner;

use std::path::PathBuf;

use clap::Parser;

use crate::case::{self, Case};
use crate::cipapi;
use crate::panelapp::client::{PanelAppClient, DEFAULT_BASE_URL};

use self::report::{ReportWriter, SummaryWriter};
use self::runner::Runner;

/// Command line arguments for `reanalyze` command.
#[derive(Parser, Debug)]
#[command(about = "Reanalyse tier 3 variants against current panel data", long_about = None)]
pub struct Args {
    /// Path to a local case JSON file.
    #[clap(long, conflicts_with_all = ["case_id", "case_version"])]
    pub json: Option<PathBuf>,
    /// Case identifier, e.g. 1234.
    #[clap(long, requires = "case_version")]
    pub case_id: Option<u32>,
    /// Case version, e.g. 1.
    #[clap(long, requires = "case_id")]
    pub case_version: Option<u32>,
    /// Path to a TOML file with case-management API credentials.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the panel catalog API.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub panelapp_url: String,
    /// Output directory for the report files.
    #[clap(long, default_value = ".")]
    pub outdir: PathBuf,
}

/// Main entry point for the `reanalyze` command.
///
/// # Arguments
///
/// * `common_args` - Commonly used command line arguments.
/// * `args` - Command line arguments specific to `reanalyze` command.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `reanalyze`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    std::fs::create_dir_all(&args.outdir)
        .map_err(|e| anyhow::anyhow!("problem creating output directory: {}", e))?;

    let (record, fetched_raw) = load_record(args)?;

    let provider = PanelAppClient::new(&args.panelapp_url);
    let mut case = Case::new(record, &provider)?;
    tracing::info!("reanalysing case {}", &case.id);

    if let Some(raw) = &fetched_raw {
        let path = args.outdir.join(format!("{}.json", &case.id));
        tracing::info!("saving case record to {:?}", &path);
        case::save_raw(raw, path)?;
    }

    tracing::info!("searching for renamed or merged panels");
    reconcile::reconcile(&provider, &mut case)?;

    let report_path = args.outdir.join(format!("{}.retier.tsv", &case.id));
    let summary_path = args.outdir.join(format!("{}.retier.summary.tsv", &case.id));
    tracing::info!("writing results to {:?} and {:?}", &report_path, &summary_path);

    let mut report_writer = ReportWriter::to_path(&report_path)?;
    let mut summary_writer = SummaryWriter::to_path(&summary_path)?;
    let mut count = 0usize;
    for record in Runner::new().run(&case) {
        let record = record?;
        report_writer.write(&record)?;
        summary_writer.write(&record)?;
        count += 1;
    }
    report_writer.finish()?;
    summary_writer.finish()?;

    tracing::info!("reclassified {} report events", count);
    Ok(())
}

/// Load the case record from a file or the case-management API.
///
/// For fetched cases the raw JSON is returned alongside so it can be saved
/// next to the reanalysis outputs.
fn load_record(
    args: &Args,
) -> Result<(case::ds::CaseRecord, Option<serde_json::Value>), anyhow::Error> {
    if let Some(path) = &args.json {
        tracing::info!("reading case from local file {:?}", path);
        Ok((case::read_record(path)?, None))
    } else if let (Some(case_id), Some(case_version)) = (args.case_id, args.case_version) {
        let config_path = args
            .config
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("--config is required to fetch a case"))?;
        tracing::info!("fetching case {}-{} from the API", case_id, case_version);
        let config = cipapi::Config::load(config_path)?;
        let session = cipapi::Session::authenticate(&config)?;
        let raw = session.interpretation_request(case_id, case_version)?;
        let record = case::ds::CaseRecord::from_value(raw.clone())?;
        Ok((record, Some(raw)))
    } else {
        anyhow::bail!("either --json or --case-id and --case-version must be given")
    }
}
