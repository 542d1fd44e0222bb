//! Fitting on a worker thread so callers can show a "fitting" state.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::debug;

use crate::cache::{FitCache, FitKey};
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::sarima::{FittedModel, ModelFitter, ModelSpec};

/// Progress of a background fit.
#[derive(Debug, Clone)]
pub enum FitStatus {
    /// The worker is still running.
    Fitting,
    Ready(Arc<FittedModel>),
    Failed(ForecastError),
}

impl FitStatus {
    pub fn is_fitting(&self) -> bool {
        matches!(self, FitStatus::Fitting)
    }
}

/// Handle to a fit running on its own thread.
#[derive(Debug)]
pub struct FitHandle {
    receiver: Receiver<Result<Arc<FittedModel>>>,
    outcome: Option<Result<Arc<FittedModel>>>,
}

impl FitHandle {
    fn finished(outcome: Result<Arc<FittedModel>>) -> Self {
        let (_, receiver) = bounded(1);
        Self {
            receiver,
            outcome: Some(outcome),
        }
    }

    /// Check progress without blocking.
    pub fn poll(&mut self) -> FitStatus {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => return FitStatus::Fitting,
                Err(TryRecvError::Disconnected) => self.outcome = Some(Err(worker_lost())),
            }
        }
        match &self.outcome {
            Some(Ok(model)) => FitStatus::Ready(Arc::clone(model)),
            Some(Err(err)) => FitStatus::Failed(err.clone()),
            None => FitStatus::Fitting,
        }
    }

    /// Block until the fit finishes.
    pub fn wait(mut self) -> Result<Arc<FittedModel>> {
        match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.receiver.recv().unwrap_or_else(|_| Err(worker_lost())),
        }
    }
}

fn worker_lost() -> ForecastError {
    ForecastError::ComputationError("fit worker stopped without a result".to_string())
}

fn spawn_worker<F>(job: F) -> FitHandle
where
    F: FnOnce() -> Result<Arc<FittedModel>> + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    let spawned = thread::Builder::new()
        .name("sarima-fit".to_string())
        .spawn(move || {
            if sender.send(job()).is_err() {
                debug!("fit handle dropped before the result arrived");
            }
        });

    match spawned {
        Ok(_) => FitHandle {
            receiver,
            outcome: None,
        },
        Err(err) => FitHandle::finished(Err(ForecastError::ComputationError(format!(
            "failed to spawn fit worker: {}",
            err
        )))),
    }
}

/// Fit `spec` to `series` on a new thread.
pub fn spawn_fit(fitter: ModelFitter, series: TimeSeries, spec: ModelSpec) -> FitHandle {
    debug!(spec = %spec, n = series.len(), "spawning background fit");
    spawn_worker(move || fitter.fit(&series, &spec).map(Arc::new))
}

/// Like [`spawn_fit`], but consults and fills `cache`. A cached model is
/// returned immediately without starting a thread.
pub fn spawn_cached(
    cache: Arc<FitCache>,
    fitter: ModelFitter,
    series: TimeSeries,
    spec: ModelSpec,
) -> FitHandle {
    let key = FitKey::new(&series, &spec, fitter.options());
    if let Some(model) = cache.get(&key) {
        return FitHandle::finished(Ok(model));
    }
    debug!(spec = %spec, n = series.len(), "spawning cached background fit");
    spawn_worker(move || cache.get_or_fit(&fitter, &series, &spec))
}
