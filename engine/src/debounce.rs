//! Keystroke debouncing and stale-result discarding.
//!
//! [`Debouncer`] delays work until input has been quiet for a fixed period.
//! [`SuggestionRefresher`] builds on it: every keystroke reschedules a
//! query, and a finished query is published only if the input it was
//! computed for is still the latest input.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shellsense_core::Suggestion;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::orchestrator::{SuggestOptions, SuggestionEngine};

/// Runs the most recently scheduled job after `delay` of quiet.
///
/// Scheduling a job cancels the previous one if its timer has not fired yet.
/// Once a timer fires, its job runs to completion on its own task and is no
/// longer cancellable here.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `job`, replacing any job whose timer is still running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(job);
        });
        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Cancels the pending job, if its timer has not fired.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Suggestions computed for one input snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionUpdate {
    pub input: String,
    pub suggestions: Vec<Suggestion>,
}

/// Debounced, stale-safe suggestion refresh for one input field.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use shellsense_db::EngineConfig;
/// use shellsense_engine::{SuggestOptions, SuggestionEngine, SuggestionRefresher};
///
/// # async fn demo() {
/// let engine = Arc::new(SuggestionEngine::new(EngineConfig::default()));
/// let refresher = SuggestionRefresher::new(engine);
/// let mut updates = refresher.subscribe();
///
/// refresher.input_changed("git st", "/repo", SuggestOptions::default());
/// updates.changed().await.unwrap();
/// if let Some(update) = updates.borrow().as_ref() {
///     println!("{} suggestions for {:?}", update.suggestions.len(), update.input);
/// }
/// # }
/// ```
pub struct SuggestionRefresher {
    engine: Arc<SuggestionEngine>,
    debouncer: Debouncer,
    latest_input: Arc<watch::Sender<String>>,
    updates: Arc<watch::Sender<Option<SuggestionUpdate>>>,
}

impl SuggestionRefresher {
    /// Uses the engine's configured debounce delay.
    pub fn new(engine: Arc<SuggestionEngine>) -> Self {
        let delay = engine.config().debounce();
        Self::with_delay(engine, delay)
    }

    pub fn with_delay(engine: Arc<SuggestionEngine>, delay: Duration) -> Self {
        let (latest_input, _) = watch::channel(String::new());
        let (updates, _) = watch::channel(None);
        Self {
            engine,
            debouncer: Debouncer::new(delay),
            latest_input: Arc::new(latest_input),
            updates: Arc::new(updates),
        }
    }

    /// Receiver for published updates. Starts at `None`.
    pub fn subscribe(&self) -> watch::Receiver<Option<SuggestionUpdate>> {
        self.updates.subscribe()
    }

    pub fn latest_input(&self) -> String {
        self.latest_input.borrow().clone()
    }

    /// Records a keystroke and schedules a refresh for it.
    pub fn input_changed(&self, input: &str, cwd: &str, options: SuggestOptions) {
        self.latest_input.send_replace(input.to_string());

        let engine = Arc::clone(&self.engine);
        let latest_input = Arc::clone(&self.latest_input);
        let updates = Arc::clone(&self.updates);
        let input = input.to_string();
        let cwd = cwd.to_string();

        self.debouncer.schedule(async move {
            let suggestions = engine.suggestions(&input, &cwd, &options).await;
            if *latest_input.borrow() != input {
                debug!(input = %input, "Discarding stale suggestions");
                return;
            }
            updates.send_replace(Some(SuggestionUpdate { input, suggestions }));
        });
    }

    /// Drops any refresh whose timer has not fired yet.
    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}
