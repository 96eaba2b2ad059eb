use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::{CarrierDetector, DetectError};
use crate::domain::{CarrierVerdict, InputFormatError};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings for [`InputPipeline`].
///
/// The input length limit belongs to the [`CarrierDetector`] the pipeline wraps
/// (see [`crate::CarrierDetectorBuilder::max_input_len`]).
pub struct PipelineConfig {
    /// Quiet period after the last edit before a resolution runs.
    pub debounce: Duration,
    /// Region hint passed to the normalizer with every resolution.
    pub country_hint: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            country_hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Observable state of an [`InputPipeline`].
pub enum PipelineState {
    Idle,
    Loading,
    Resolved(CarrierVerdict),
    /// User-facing message for an input or normalization failure.
    Error(String),
}

/// Debounced bridge between keystrokes and [`CarrierDetector`].
///
/// Each edit cancels the pending resolution and schedules a new one; only the last
/// edit of a burst is ever resolved. At most one resolution is pending at a time.
///
/// Resolutions run on the Tokio runtime captured at construction.
pub struct InputPipeline {
    detector: Arc<CarrierDetector>,
    config: PipelineConfig,
    runtime: Handle,
    state: Arc<watch::Sender<PipelineState>>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl InputPipeline {
    /// Create a pipeline on the current Tokio runtime.
    ///
    /// Fails with [`DetectError::Runtime`] when called outside of one.
    pub fn new(
        detector: Arc<CarrierDetector>,
        config: PipelineConfig,
    ) -> Result<Self, DetectError> {
        Ok(Self::with_handle(detector, config, Handle::try_current()?))
    }

    /// Create a pipeline whose resolutions run on `runtime`.
    pub fn with_handle(
        detector: Arc<CarrierDetector>,
        config: PipelineConfig,
        runtime: Handle,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            detector,
            config,
            runtime,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// `true` while a resolution is scheduled and not yet finished.
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Feed the full current text of the input field.
    ///
    /// Validation happens immediately: disallowed characters set
    /// [`PipelineState::Error`] and are returned without scheduling anything.
    pub fn edit(&mut self, text: &str) -> Result<(), InputFormatError> {
        self.cancel_pending();

        let input = match self.detector.validate(text) {
            Ok(input) => input,
            Err(err) => {
                self.state.send_replace(PipelineState::Error(err.to_string()));
                return Err(err);
            }
        };

        if input.is_blank() {
            self.state.send_replace(PipelineState::Idle);
            return Ok(());
        }

        self.state.send_replace(PipelineState::Loading);

        let generation = self.generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let detector = Arc::clone(&self.detector);
        let debounce = self.config.debounce;
        let hint = self.config.country_hint.clone();

        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;

            let next = match detector.detect_input(&input, hint.as_deref()) {
                Ok(verdict) => PipelineState::Resolved(verdict),
                Err(err) => {
                    log::debug!("resolution of {:?} failed: {err}", input.as_str());
                    PipelineState::Error(DetectError::from(err).user_message())
                }
            };

            // Checked under the channel lock so a newer edit always wins.
            state.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = next;
                true
            });
        }));

        Ok(())
    }

    /// Cancel any pending resolution.
    ///
    /// A `Loading` state has nothing left to finish it and falls back to `Idle`.
    /// Any other state is left as is.
    pub fn shutdown(&mut self) {
        self.cancel_pending();
        self.state.send_if_modified(|slot| {
            if *slot != PipelineState::Loading {
                return false;
            }
            *slot = PipelineState::Idle;
            true
        });
    }

    fn cancel_pending(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(job) = self.pending.take() {
            job.abort();
        }
    }
}

impl Drop for InputPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
