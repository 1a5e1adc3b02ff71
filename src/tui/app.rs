use crate::tui::chart::{ChartSlot, StrategyChart};
use serverscope::client::normalize_server_id;
use serverscope::config::ScopeConfig;
use serverscope::{rank_strategies, FetchedReport, ReportError, ServerDataClient, StrategyRanking};
use std::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Result of one submission, tagged with the submission that produced it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<FetchedReport, ReportError>,
}

pub struct App {
    pub should_quit: bool,
    pub config: ScopeConfig,
    client: ServerDataClient,
    // Form
    pub input: String,
    pub editing: bool,
    // Results
    pub loading: bool,
    pub pending_server_id: Option<String>,
    pub report: Option<FetchedReport>,
    pub ranking: Option<StrategyRanking>,
    pub chart: ChartSlot,
    pub error: Option<String>,
    pub details_scroll: u16,
    pub last_event: Option<String>,
    // In-flight request
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    result_tx: Sender<FetchOutcome>,
    result_rx: Receiver<FetchOutcome>,
}

impl App {
    pub fn new(config: ScopeConfig) -> Self {
        let client = ServerDataClient::from_config(&config);
        let (tx, rx) = std::sync::mpsc::channel();

        App {
            should_quit: false,
            config,
            client,
            input: String::new(),
            editing: true,
            loading: false,
            pending_server_id: None,
            report: None,
            ranking: None,
            chart: ChartSlot::default(),
            error: None,
            details_scroll: 0,
            last_event: None,
            generation: 0,
            in_flight: None,
            result_tx: tx,
            result_rx: rx,
        }
    }

    pub fn quit(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.should_quit = true;
    }

    /// Clears the previous result and starts a fetch for the current input.
    /// A fetch still in flight is aborted; its result would be ignored anyway.
    pub fn submit(&mut self) {
        let Some((generation, server_id)) = self.begin_submission() else {
            return;
        };

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = client.fetch_report(&server_id).await;
            let _ = tx.send(FetchOutcome { generation, result });
        }));
    }

    /// Resets the display for a new submission. Returns `None` when the input
    /// is empty, in which case the error slot explains why.
    pub fn begin_submission(&mut self) -> Option<(u64, String)> {
        self.report = None;
        self.ranking = None;
        self.chart.clear();
        self.error = None;
        self.details_scroll = 0;

        if let Some(handle) = self.in_flight.take() {
            debug!(generation = self.generation, "aborting superseded fetch");
            handle.abort();
        }
        // Anything still queued belongs to an older submission.
        self.generation += 1;
        self.loading = false;
        self.pending_server_id = None;

        let server_id = match normalize_server_id(&self.input) {
            Ok(id) => id.to_string(),
            Err(err) => {
                self.error = Some(err.to_string());
                return None;
            }
        };

        self.loading = true;
        self.pending_server_id = Some(server_id.clone());
        self.last_event = Some(format!("🔎 Fetching server {}...", server_id));
        info!(server_id = %server_id, generation = self.generation, "submitting");
        Some((self.generation, server_id))
    }

    pub fn on_tick(&mut self) {
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "discarding result of superseded submission"
            );
            return;
        }

        self.loading = false;
        self.in_flight = None;
        let server_id = self.pending_server_id.take().unwrap_or_default();

        match outcome.result {
            Ok(report) => {
                match rank_strategies(&report.record.strategy_scores) {
                    Ok(ranking) => {
                        self.chart.replace(StrategyChart::from_ranking(&ranking));
                        self.ranking = Some(ranking);
                    }
                    Err(_) => {
                        // Nothing to chart.
                        self.chart.clear();
                        self.ranking = None;
                    }
                }
                self.last_event = Some(format!(
                    "✅ Loaded {} at {}",
                    report.record.server_name,
                    report.fetched_at.format("%H:%M:%S")
                ));
                self.report = Some(report);
            }
            Err(err) => {
                self.last_event = Some(format!("❌ {}: {}", server_id, err));
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn scroll_down(&mut self) {
        self.details_scroll = self.details_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.details_scroll = self.details_scroll.saturating_sub(1);
    }
}
