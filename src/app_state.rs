use crate::cli::CommandLineArgs;
use crate::dataset::Dataset;
use crate::error::SurfsUpError;

use std::sync::Arc;

/// Shared application state passed to each request handler.
#[derive(Debug)]
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Read-only dataset.
    pub dataset: Dataset,
}

impl AppState {
    /// Create and return an [AppState], opening the dataset named by the arguments.
    pub fn new(args: &CommandLineArgs) -> Result<Self, SurfsUpError> {
        let dataset = Dataset::open(&args.database, args.connection_limit)?;
        Ok(Self::with_dataset(args, dataset))
    }

    /// Create and return an [AppState] around an already opened dataset.
    pub fn with_dataset(args: &CommandLineArgs, dataset: Dataset) -> Self {
        Self {
            args: args.clone(),
            dataset,
        }
    }

    /// Run a blocking dataset query on the blocking thread pool.
    pub async fn query<T, F>(self: &Arc<Self>, f: F) -> Result<T, SurfsUpError>
    where
        F: FnOnce(&Dataset) -> Result<T, SurfsUpError> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&state.dataset)).await?
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
