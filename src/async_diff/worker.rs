use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::git::types::DiffResult;
use crate::git::{DiffEngine, RepoCache};

use super::channel::{DiffOutcome, DiffRequest};

/// Computes diffs off the UI task. Every request produces exactly one
/// outcome tagged with the request's generation.
pub struct DiffWorker {
    request_tx: mpsc::UnboundedSender<DiffRequest>,
    result_rx: mpsc::UnboundedReceiver<DiffOutcome>,
}

fn run_request(repo_path: &Path, request: &DiffRequest) -> Result<DiffResult, String> {
    let repo = RepoCache::open(repo_path).map_err(|e| format!("{e:#}"))?;
    DiffEngine::compute_diff(repo.repo(), &request.target).map_err(|e| format!("{e:#}"))
}

impl DiffWorker {
    pub fn new(repo_path: PathBuf) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<DiffRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<DiffOutcome>();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let path = repo_path.clone();
                let tx = result_tx.clone();

                tokio::task::spawn_blocking(move || {
                    let result = run_request(&path, &request);
                    match &result {
                        Ok(diff) => debug!(
                            generation = request.generation,
                            files = diff.files.len(),
                            "diff computed"
                        ),
                        Err(e) => warn!(generation = request.generation, "diff failed: {e}"),
                    }
                    let _ = tx.send(DiffOutcome {
                        generation: request.generation,
                        result,
                    });
                });
            }
        });

        Self {
            request_tx,
            result_rx,
        }
    }

    pub fn request(&self, req: DiffRequest) {
        let _ = self.request_tx.send(req);
    }

    pub fn try_recv(&mut self) -> Option<DiffOutcome> {
        self.result_rx.try_recv().ok()
    }
}
