use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use tokio::runtime::Handle;

#[cfg(debug_assertions)]
use crate::config::debug::PRINT_PIPELINE_STAGES;
use crate::data::{HistoricalDataSource, SubscriptionSink};
use crate::domain::{StraddleSelection, Timeframe};
use crate::errors::ConfigError;
use crate::models::{IndicatorSettings, LiveQuote, RenderableSeries, StraddleHistory};

use super::live::LiveMergeEngine;
use super::messages::{FetchResult, JobRequest, SubscriptionResult, WorkerEvent};
use super::state::{ChartState, PipelineState};
use super::subscriptions::SubscribedSymbolSet;
use super::worker;

pub struct ChartEngine {
    /// Front buffer, pipeline state and generation
    pub chart: ChartState,

    /// The Live Configuration State
    selection: Option<StraddleSelection>,
    timeframe: Timeframe,
    settings: IndicatorSettings,

    /// Raw candles of the current selection (shared with the worker, never mutated)
    history: Option<Arc<StraddleHistory>>,

    /// Collaborators
    source: Arc<dyn HistoricalDataSource>,
    /// Scheduled refreshes go here when set (e.g. straight to the network)
    refresh_source: Option<Arc<dyn HistoricalDataSource>>,
    sink: Arc<dyn SubscriptionSink>,
    runtime: Handle,

    subscriptions: SubscribedSymbolSet,
    live: LiveMergeEngine,

    /// Worker Communication
    job_tx: Sender<JobRequest>,
    worker_rx: Receiver<WorkerEvent>,

    /// Async task results
    fetch_tx: Sender<FetchResult>,
    fetch_rx: Receiver<FetchResult>,
    subscription_tx: Sender<SubscriptionResult>,
    subscription_rx: Receiver<SubscriptionResult>,

    /// Live Data Feed
    quote_tx: Sender<LiveQuote>,
    quote_rx: Receiver<LiveQuote>,

    discarded_results: u64,
}

impl ChartEngine {
    /// Initialize the engine and spawn the pipeline worker.
    /// Fetches and subscriptions are spawned onto `runtime`.
    pub fn new(
        source: Arc<dyn HistoricalDataSource>,
        sink: Arc<dyn SubscriptionSink>,
        runtime: Handle,
    ) -> Self {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (worker_tx, worker_rx) = channel::<WorkerEvent>();
        let (fetch_tx, fetch_rx) = channel::<FetchResult>();
        let (subscription_tx, subscription_rx) = channel::<SubscriptionResult>();
        let (quote_tx, quote_rx) = channel::<LiveQuote>();

        worker::spawn_worker_thread(job_rx, worker_tx);

        Self {
            chart: ChartState::new(),
            selection: None,
            timeframe: Timeframe::default(),
            settings: IndicatorSettings::default(),
            history: None,
            source,
            refresh_source: None,
            sink,
            runtime,
            subscriptions: SubscribedSymbolSet::new(),
            live: LiveMergeEngine::new(),
            job_tx,
            worker_rx,
            fetch_tx,
            fetch_rx,
            subscription_tx,
            subscription_rx,
            quote_tx,
            quote_rx,
            discarded_results: 0,
        }
    }

    /// Serve `refresh` from a different source than `select`.
    pub fn with_refresh_source(mut self, source: Arc<dyn HistoricalDataSource>) -> Self {
        self.refresh_source = Some(source);
        self
    }

    /// THE GAME LOOP.
    /// Returns TRUE while a run is in flight, so the caller knows to keep polling.
    pub fn update(&mut self) -> bool {
        // 1. Fetch results (may dispatch compute)
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.handle_fetch_result(result);
        }

        // 2. Worker progress and results (Swap Buffers)
        while let Ok(event) = self.worker_rx.try_recv() {
            self.handle_worker_event(event);
        }

        // 3. Subscription acknowledgements
        while let Ok(result) = self.subscription_rx.try_recv() {
            self.handle_subscription_result(result);
        }

        // 4. Live quotes onto whatever is displayed now
        while let Ok(quote) = self.quote_rx.try_recv() {
            self.apply_quote(quote);
        }

        self.chart.pipeline.is_busy()
    }

    // --- TRIGGERS ---

    /// Instrument/strike change: restart from Fetching.
    pub fn select(&mut self, selection: StraddleSelection) {
        // Raw data belongs to the old selection
        self.history = None;
        self.selection = Some(selection.clone());
        self.start_fetch(selection, self.source.clone());
    }

    /// Re-fetch the current selection (periodic refresh). No-op before the first selection.
    pub fn refresh(&mut self) {
        if let Some(selection) = self.selection.clone() {
            let source = self.refresh_source.clone().unwrap_or_else(|| self.source.clone());
            self.start_fetch(selection, source);
        }
    }

    /// Timeframe change: restart from Resampling with the held raw data.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.recompute();
    }

    /// Indicator change: restart from Resampling with the held raw data.
    /// Invalid settings are rejected without disturbing what is displayed.
    pub fn set_indicator_settings(&mut self, settings: IndicatorSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.settings = settings;
        self.recompute();
        Ok(())
    }

    /// Apply one quote now. Normally quotes arrive through `quote_sender` and are drained by `update`.
    pub fn apply_quote(&mut self, quote: LiveQuote) -> bool {
        self.live.apply(&mut self.chart.displayed, quote)
    }

    /// Channel for a live quote source to push into.
    pub fn quote_sender(&self) -> Sender<LiveQuote> {
        self.quote_tx.clone()
    }

    // --- ACCESSORS ---

    /// The currently displayed series set
    pub fn displayed(&self) -> Option<Arc<RenderableSeries>> {
        self.chart.displayed.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.chart.pipeline
    }

    pub fn generation(&self) -> u64 {
        self.chart.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.chart.last_error.as_deref()
    }

    pub fn selection(&self) -> Option<&StraddleSelection> {
        self.selection.as_ref()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn subscriptions(&self) -> &SubscribedSymbolSet {
        &self.subscriptions
    }

    pub fn latest_price(&self, symbol: &str) -> Option<f64> {
        self.live.latest_price(symbol)
    }

    /// Results dropped because a newer trigger superseded them
    pub fn discarded_results(&self) -> u64 {
        self.discarded_results
    }

    // --- TELEMETRY ---

    pub fn get_status_msg(&self) -> String {
        let target = self
            .selection
            .as_ref()
            .map(|s| format!("{} {}", s, self.timeframe))
            .unwrap_or_else(|| "no selection".to_string());
        match (&self.chart.pipeline, &self.chart.last_error) {
            (PipelineState::Error, Some(e)) => format!("{}: Error ({})", target, e),
            (state, _) => format!("{}: {} (gen {})", target, state, self.chart.generation),
        }
    }

    // --- INTERNAL LOGIC ---

    fn start_fetch(&mut self, selection: StraddleSelection, source: Arc<dyn HistoricalDataSource>) {
        let generation = self.chart.begin_run(PipelineState::Fetching);
        self.log_stage(generation, PipelineState::Fetching);

        let tx = self.fetch_tx.clone();
        self.runtime.spawn(async move {
            let result = source.fetch_historical_straddle(&selection).await;
            // Receiver gone means the engine was dropped
            let _ = tx.send(FetchResult {
                generation,
                selection,
                result,
            });
        });
    }

    fn recompute(&mut self) {
        // The in-flight fetch picks up the latest timeframe/settings when it lands
        if self.chart.pipeline == PipelineState::Fetching {
            return;
        }
        if self.history.is_none() {
            return;
        }
        let generation = self.chart.begin_run(PipelineState::Resampling);
        self.dispatch_job(generation);
    }

    fn dispatch_job(&mut self, generation: u64) {
        let (Some(history), Some(selection)) = (self.history.clone(), self.selection.clone()) else {
            return;
        };

        self.chart.pipeline = PipelineState::Resampling;
        let req = JobRequest {
            generation,
            selection,
            history,
            timeframe: self.timeframe,
            settings: self.settings,
        };

        if self.job_tx.send(req).is_err() {
            log::error!("Pipeline worker is gone; cannot compute gen {}", generation);
            self.chart.mark_error("pipeline worker stopped".to_string());
        }
    }

    fn handle_fetch_result(&mut self, result: FetchResult) {
        if !self.chart.is_current(result.generation) {
            self.discard("fetch", result.generation);
            return;
        }

        match result.result {
            Ok(history) => {
                let mislabeled = history.mislabeled_legs();
                if !mislabeled.is_empty() {
                    log::warn!("{}: unexpected symbol for legs {:?}", result.selection, mislabeled);
                }
                let invalid = history.invalid_candle_count();
                if invalid > 0 {
                    log::warn!("{}: {} candles violate OHLC bounds", result.selection, invalid);
                }
                log::info!(
                    "Fetched {}: {} CE / {} PE candles",
                    result.selection,
                    history.ce_candles.len(),
                    history.pe_candles.len()
                );

                self.request_subscriptions(&history);
                self.history = Some(Arc::new(history));
                self.dispatch_job(result.generation);
            }
            Err(e) => {
                log::error!("Fetch failed for {}: {}", result.selection, e);
                self.chart.mark_error(e.to_string());
            }
        }
    }

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Stage { generation, stage } => {
                if self.chart.is_current(generation) && self.chart.pipeline.is_busy() {
                    self.chart.pipeline = stage;
                    self.log_stage(generation, stage);
                }
            }
            WorkerEvent::Finished(result) => {
                if !self.chart.is_current(result.generation) {
                    self.discard("pipeline", result.generation);
                    return;
                }
                log::info!(
                    "Gen {} ready: {} points, {} series in {}ms",
                    result.generation,
                    result.series.len(),
                    result.series.series.len(),
                    result.duration_ms
                );
                self.chart.update_buffer(result.series);
            }
        }
    }

    fn request_subscriptions(&mut self, history: &StraddleHistory) {
        let fresh = self.subscriptions.begin(&history.symbols());
        if fresh.is_empty() {
            return;
        }

        let sink = self.sink.clone();
        let tx = self.subscription_tx.clone();
        self.runtime.spawn(async move {
            let result = sink.subscribe(&fresh).await;
            let _ = tx.send(SubscriptionResult {
                symbols: fresh,
                result,
            });
        });
    }

    fn handle_subscription_result(&mut self, result: SubscriptionResult) {
        match &result.result {
            Ok(()) => log::info!("Live feed subscribed: {:?}", result.symbols),
            Err(e) => log::warn!("Subscription for {:?} failed: {}", result.symbols, e),
        }
        self.subscriptions.complete(&result.symbols, result.result.is_ok());
    }

    fn discard(&mut self, what: &str, generation: u64) {
        self.discarded_results += 1;
        log::debug!(
            "Discarding stale {} result (gen {}, current {})",
            what,
            generation,
            self.chart.generation
        );
    }

    fn log_stage(&self, _generation: u64, _stage: PipelineState) {
        #[cfg(debug_assertions)]
        if PRINT_PIPELINE_STAGES {
            log::info!("[pipeline] gen {} -> {}", _generation, _stage);
        }
    }
}
