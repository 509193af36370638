//! Shared service state.
//!
//! Handlers read the current [`PredictionContext`] through an
//! [`ArcSwap`], so a reload replaces schema, statistics and model together
//! and a request in flight keeps the snapshot it started with.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use aurum_forecast::error::Result;
use aurum_forecast::pipeline::{ArtifactPaths, LoadOptions, PredictionContext};

/// Current prediction snapshot plus what is needed to rebuild it.
#[derive(Debug)]
pub struct AppState {
    snapshot: ArcSwap<PredictionContext>,
    paths: ArtifactPaths,
    options: LoadOptions,
    /// Number of successful reloads since startup.
    generation: AtomicU64,
}

impl AppState {
    /// Wrap an already loaded context.
    pub fn new(context: PredictionContext, paths: ArtifactPaths, options: LoadOptions) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(context),
            paths,
            options,
            generation: AtomicU64::new(0),
        }
    }

    /// Load the initial snapshot from disk.
    pub fn load(paths: ArtifactPaths, options: LoadOptions) -> Result<Self> {
        let context = PredictionContext::load(&paths, &options)?;
        Ok(Self::new(context, paths, options))
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<PredictionContext> {
        self.snapshot.load_full()
    }

    /// Re-read every artifact and swap in the new snapshot.
    ///
    /// On failure the previous snapshot keeps serving.
    pub fn reload(&self) -> Result<Arc<PredictionContext>> {
        let context = Arc::new(PredictionContext::load(&self.paths, &self.options)?);
        self.snapshot.store(Arc::clone(&context));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(
            generation,
            model = context.model_name(),
            features = context.schema().len(),
            "prediction snapshot reloaded"
        );

        Ok(context)
    }

    /// Number of successful reloads since startup.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
