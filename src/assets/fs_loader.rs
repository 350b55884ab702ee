//! Async model loading from disk with bounded concurrency

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{AssetError, Result};
use super::{parse_model, AssetLoadResult, AssetLoader, AssetRequestId};

/// Request to load a model
#[derive(Debug, Clone)]
struct LoadRequest {
    id: AssetRequestId,
    url: String,
}

/// Reads JSON model descriptors relative to a base directory on a dedicated
/// tokio runtime. Results are drained by `poll` from the frame loop.
pub struct FsAssetLoader {
    /// Channel for sending load requests to the worker task
    request_tx: mpsc::UnboundedSender<LoadRequest>,
    /// Channel for receiving load results
    result_rx: mpsc::UnboundedReceiver<AssetLoadResult>,
    /// Requests the worker never accepted, reported on the next poll
    rejected: Vec<AssetLoadResult>,
    pending: usize,
    next_id: u64,
    base_dir: PathBuf,
    _runtime: Runtime,
}

impl FsAssetLoader {
    /// Create a new loader
    ///
    /// # Arguments
    /// * `base_dir` - Directory model URLs are resolved against
    /// * `max_concurrent` - Maximum number of concurrent reads
    pub fn new(base_dir: impl Into<PathBuf>, max_concurrent: usize) -> Result<Self> {
        let base_dir = base_dir.into();
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<AssetLoadResult>();

        let runtime = Runtime::new()?;

        let worker_dir = base_dir.clone();
        let max_concurrent = max_concurrent.max(1);
        runtime.spawn(async move {
            Self::worker_loop(worker_dir, max_concurrent, &mut request_rx, result_tx).await;
        });

        log::debug!("Asset loader started for {}", base_dir.display());

        Ok(Self {
            request_tx,
            result_rx,
            rejected: Vec::new(),
            pending: 0,
            next_id: 0,
            base_dir,
            _runtime: runtime,
        })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Worker loop that processes load requests with concurrency control
    async fn worker_loop(
        base_dir: PathBuf,
        max_concurrent: usize,
        request_rx: &mut mpsc::UnboundedReceiver<LoadRequest>,
        result_tx: mpsc::UnboundedSender<AssetLoadResult>,
    ) {
        use tokio::task::JoinSet;

        let mut active_tasks = JoinSet::new();
        let mut queued: VecDeque<LoadRequest> = VecDeque::new();

        loop {
            tokio::select! {
                Some(request) = request_rx.recv() => {
                    queued.push_back(request);
                }

                Some(result) = active_tasks.join_next(), if !active_tasks.is_empty() => {
                    match result {
                        Ok(load_result) => {
                            let _ = result_tx.send(load_result);
                        }
                        Err(e) => {
                            log::error!("Asset load task panicked: {}", e);
                        }
                    }
                }

                // Exit when channel is closed and no more work
                else => {
                    if queued.is_empty() && active_tasks.is_empty() {
                        break;
                    }
                }
            }

            // FIFO: models requested first are usually the dish bases
            while active_tasks.len() < max_concurrent {
                let Some(request) = queued.pop_front() else {
                    break;
                };
                let dir = base_dir.clone();
                active_tasks.spawn(async move { Self::load_task(dir, request).await });
            }
        }
    }

    /// Task that loads a single model
    async fn load_task(base_dir: PathBuf, request: LoadRequest) -> AssetLoadResult {
        let path = base_dir.join(&request.url);
        let outcome = match tokio::fs::read_to_string(&path).await {
            Ok(json) => parse_model(&request.url, &json).map(Arc::new),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(request.url.clone()))
            }
            Err(e) => Err(AssetError::Io {
                url: request.url.clone(),
                reason: e.to_string(),
            }),
        };
        AssetLoadResult {
            id: request.id,
            url: request.url,
            outcome,
        }
    }
}

impl AssetLoader for FsAssetLoader {
    fn request(&mut self, url: &str) -> AssetRequestId {
        let id = AssetRequestId(self.next_id);
        self.next_id += 1;
        self.pending += 1;

        let request = LoadRequest { id, url: url.to_string() };
        if let Err(e) = self.request_tx.send(request) {
            log::error!("Asset worker is gone, failing request for {}", url);
            self.rejected.push(AssetLoadResult {
                id,
                url: url.to_string(),
                outcome: Err(AssetError::Io {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            });
        }
        id
    }

    fn poll(&mut self) -> Vec<AssetLoadResult> {
        let mut results: Vec<AssetLoadResult> = self.rejected.drain(..).collect();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        self.pending = self.pending.saturating_sub(results.len());
        results
    }

    fn pending_count(&self) -> usize {
        self.pending
    }
}
