use std::path::PathBuf;

use anyhow::{bail, Context};
use harvest_logging::{harvest_info, harvest_warn};
use harvester_core::{BlockedTerms, RecencyWindow};
use harvester_engine::{
    ensure_output_dir, CheckpointStore, Harvester, HttpFeedSource, JsonCheckpointStore,
    JsonFileSink,
};
use tokio_util::sync::CancellationToken;

use super::args::Args;
use super::config_file::{self, PersistedConfig};
use super::logging;

const CHECKPOINT_FILENAME: &str = "checkpoint.json";
const RECORDS_FILENAME: &str = "records.json";
const DEFAULT_OUTPUT_DIR: &str = "./harvest_output";

pub async fn run(args: Args) -> anyhow::Result<()> {
    logging::initialize(args.log.into());

    let persisted = match &args.config {
        Some(path) => config_file::load(path)?,
        None => PersistedConfig::default(),
    };

    let mut config = persisted.harvest_config();
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(hours) = args.window_hours {
        config.window = RecencyWindow::from_hours(hours);
    }

    let Some(feed_url) = args.feed_url.clone().or_else(|| persisted.feed_url.clone()) else {
        bail!("no feed url given; pass --feed-url or set feed_url in the config file");
    };
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| persisted.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    ensure_output_dir(&output_dir)
        .with_context(|| format!("preparing output dir {}", output_dir.display()))?;

    let checkpoints = JsonCheckpointStore::new(output_dir.join(CHECKPOINT_FILENAME));
    let resume = if args.resume {
        let records = checkpoints
            .load()
            .with_context(|| format!("loading {}", checkpoints.path().display()))?;
        if records.is_empty() {
            harvest_warn!("No checkpoint to resume from at {:?}", checkpoints.path());
        }
        records
    } else {
        Vec::new()
    };
    let checkpoint_path = checkpoints.path().to_path_buf();
    let records_path = output_dir.join(RECORDS_FILENAME);

    let source = HttpFeedSource::new(&feed_url, persisted.feed_settings())?;
    let cancel = CancellationToken::new();
    let mut harvester = Harvester::new(source, config, Box::new(checkpoints))?
        .with_sink(Box::new(JsonFileSink::new(records_path.clone())))
        .with_cancellation(cancel.clone())
        .resume_from(resume);
    if let Some(seed) = args.seed.or(persisted.seed) {
        harvester = harvester.with_pacing_seed(seed);
    }
    let blocked = BlockedTerms::new(&persisted.blocked_terms);
    if !blocked.is_empty() {
        harvester = harvester.with_filter(Box::new(blocked));
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    harvest_info!("Harvesting {} into {:?}", feed_url, output_dir);
    let report = harvester.run().await?;

    println!("Stopped: {}", report.reason);
    println!("Rounds: {}", report.rounds);
    println!(
        "Records: {} collected, {} written",
        report.collected,
        report.final_records.len()
    );
    println!("Stale hits: {}", report.stale_hits);
    println!("Checkpoint: {}", checkpoint_path.display());
    println!("Output: {}", records_path.display());
    Ok(())
}
