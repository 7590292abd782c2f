use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_trace, harvest_warn};
use harvester_core::{
    authoritative_pass, update, AcceptAll, ContentFilter, CooldownReason, Effect, Extraction,
    ExtractedRecord, FieldExtractor, HarvestConfig, HarvestState, Msg, PacingController,
    RecordExtractor, RoundTally, StopReason,
};
use tokio_util::sync::CancellationToken;

use crate::checkpoint::CheckpointStore;
use crate::sink::RecordSink;
use crate::source::ContentSource;
use crate::{HarvestError, HarvestReport};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Drives one harvest run against a content source.
///
/// Rounds are strictly sequential. Cancellation is observed between rounds and
/// interrupts any pacing or cooldown wait. Whatever ends the run, the final
/// checkpoint is written before `run` returns.
pub struct Harvester<S: ContentSource> {
    source: S,
    config: HarvestConfig,
    checkpoints: Box<dyn CheckpointStore>,
    extractor: Box<dyn RecordExtractor>,
    filter: Box<dyn ContentFilter>,
    sink: Option<Box<dyn RecordSink>>,
    pacing: PacingController,
    clock: Clock,
    cancel: CancellationToken,
    resume: Vec<ExtractedRecord>,
}

impl<S: ContentSource> Harvester<S> {
    pub fn new(
        source: S,
        config: HarvestConfig,
        checkpoints: Box<dyn CheckpointStore>,
    ) -> Result<Self, HarvestError> {
        config.validate()?;
        Ok(Self {
            source,
            pacing: PacingController::new(config.pacing),
            config,
            checkpoints,
            extractor: Box::new(FieldExtractor),
            filter: Box::new(AcceptAll),
            sink: None,
            clock: Arc::new(Utc::now),
            cancel: CancellationToken::new(),
            resume: Vec::new(),
        })
    }

    pub fn with_extractor(mut self, extractor: Box<dyn RecordExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_filter(mut self, filter: Box<dyn ContentFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pacing_seed(mut self, seed: u64) -> Self {
        self.pacing = PacingController::with_seed(self.config.pacing, seed);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Seeds the run with records from an earlier checkpoint.
    pub fn resume_from(mut self, records: Vec<ExtractedRecord>) -> Self {
        self.resume = records;
        self
    }

    pub async fn run(mut self) -> Result<HarvestReport, HarvestError> {
        let mut state = HarvestState::new(self.config.clone());
        let restored = state.restore(std::mem::take(&mut self.resume));
        if restored > 0 {
            harvest_info!("Resumed with {} records from checkpoint", restored);
        }

        let polled = self.poll(&mut state).await;
        let saved = self.checkpoints.save(state.collected());
        let reason = match (polled, saved) {
            (Ok(reason), Ok(())) => reason,
            (Ok(_), Err(err)) => {
                harvest_error!("Final checkpoint failed: {}", err);
                return Err(err.into());
            }
            (Err(err), saved) => {
                if let Err(save_err) = saved {
                    harvest_error!("Final checkpoint failed: {}", save_err);
                }
                harvest_error!(
                    "Harvest failed with {} records collected: {}",
                    state.collected().len(),
                    err
                );
                return Err(err);
            }
        };

        let view = state.view();
        let cutoff = self.config.window.cutoff((self.clock)());
        let final_records = authoritative_pass(state.into_collected(), cutoff);
        if let Some(sink) = self.sink.as_mut() {
            sink.write(&final_records)?;
        }

        harvest_info!(
            "Harvest stopped: {}; {} records collected, {} after final filter",
            reason,
            view.collected,
            final_records.len()
        );
        Ok(HarvestReport {
            reason,
            rounds: view.rounds,
            collected: view.collected,
            stale_hits: view.stale_hits,
            final_records,
        })
    }

    async fn poll(&mut self, state: &mut HarvestState) -> Result<StopReason, HarvestError> {
        if state.is_full() {
            return Ok(StopReason::TargetReached);
        }
        loop {
            if self.cancel.is_cancelled() {
                return Ok(self.cancel_now(state));
            }
            harvest_logging::set_round(state.rounds() + 1);

            let msg = if self.source.healthy().await? {
                let batch = self.source.current_batch().await?;
                Msg::RoundCompleted(self.scan(state, &batch))
            } else {
                harvest_warn!("Source is showing a failure surface");
                Msg::SourceUnhealthy
            };

            if let Some(reason) = self.dispatch(state, msg).await? {
                return Ok(reason);
            }
        }
    }

    /// Runs the trailing window of `batch` through extraction and admission.
    fn scan(&self, state: &mut HarvestState, batch: &[S::Item]) -> RoundTally {
        let cutoff = self.config.window.cutoff((self.clock)());
        let start = batch.len().saturating_sub(self.config.tail_window_size);
        let mut tally = RoundTally::default();

        for item in &batch[start..] {
            if state.is_full() {
                break;
            }
            tally.scanned += 1;
            match self.extractor.extract(item, cutoff) {
                Extraction::Stale => tally.stale += 1,
                Extraction::Rejected(reason) => {
                    tally.rejected += 1;
                    harvest_trace!("Skipped malformed item: {:?}", reason);
                }
                Extraction::Fresh(record) => {
                    if !self.filter.accept(&record) {
                        tally.filtered += 1;
                    } else if state.admit(record) {
                        tally.admitted += 1;
                    } else {
                        tally.duplicates += 1;
                    }
                }
            }
        }

        harvest_debug!(
            "Scanned {} of {} items: {} new, {} duplicate, {} stale, {} rejected, {} filtered",
            tally.scanned,
            batch.len(),
            tally.admitted,
            tally.duplicates,
            tally.stale,
            tally.rejected,
            tally.filtered
        );
        tally
    }

    async fn dispatch(
        &mut self,
        state: &mut HarvestState,
        msg: Msg,
    ) -> Result<Option<StopReason>, HarvestError> {
        let (next, effects) = update(std::mem::take(state), msg);
        *state = next;

        for effect in effects {
            match effect {
                Effect::Terminate(reason) => return Ok(Some(reason)),
                Effect::Checkpoint => {
                    self.checkpoints.save(state.collected())?;
                    let view = state.view();
                    harvest_info!(
                        "Checkpoint saved: {}/{} records, {} stale hits",
                        view.collected,
                        view.target,
                        view.stale_hits
                    );
                }
                Effect::Cooldown { duration, reason } => {
                    match reason {
                        CooldownReason::ErrorRecovery { attempt } => harvest_warn!(
                            "Error recovery {} : cooling down for {:?}",
                            attempt + 1,
                            duration
                        ),
                        CooldownReason::Throttle => harvest_warn!(
                            "No new records for {} rounds; throttle cooldown for {:?}",
                            state.rounds_since_new_record(),
                            duration
                        ),
                    }
                    if !self.wait(duration).await {
                        return Ok(Some(self.cancel_now(state)));
                    }
                }
                Effect::Refresh { reason } => {
                    harvest_info!("Refreshing source ({:?})", reason);
                    self.source.refresh().await?;
                }
                Effect::Advance { new_records } => {
                    self.source.advance().await?;
                    let delay = self.pacing.next_delay(new_records);
                    harvest_debug!("{} new records; next poll in {:?}", new_records, delay);
                    if !self.wait(delay).await {
                        return Ok(Some(self.cancel_now(state)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// A run already terminated by the machine keeps its original reason.
    fn cancel_now(&self, state: &mut HarvestState) -> StopReason {
        harvest_info!("Cancellation requested");
        let (next, _) = update(std::mem::take(state), Msg::CancelRequested);
        *state = next;
        state.stop_reason().unwrap_or(StopReason::Cancelled)
    }

    /// Sleeps for `duration`; returns `false` if cancelled first.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
