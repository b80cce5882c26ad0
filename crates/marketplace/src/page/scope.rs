//! Request lifetime bound to a mounted page.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;

use crate::error::{RequestError, RequestResult};

#[derive(Debug, Default)]
struct ScopeState {
    closed: AtomicBool,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ScopeState {
    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        let aborted = tasks.len();
        for task in tasks.drain(..) {
            task.abort();
        }
        tracing::debug!(aborted, "View scope closed");
    }
}

/// Runs requests as tasks that are aborted when the scope closes.
///
/// Results of requests that were in flight at close are reported as
/// [`RequestError::Cancelled`]. The scope closes when dropped.
#[derive(Debug, Default)]
pub struct ViewScope {
    state: Arc<ScopeState>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that can close this scope from elsewhere (e.g. a shutdown signal).
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.state.close();
    }

    /// Run `request` to completion unless the scope closes first.
    pub async fn run<F, T>(&self, request: F) -> RequestResult<T>
    where
        F: Future<Output = RequestResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(RequestError::Cancelled);
        }

        let task = tokio::spawn(request);
        {
            let mut tasks = self.state.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.retain(|t| !t.is_finished());
            tasks.push(task.abort_handle());
        }

        match task.await {
            // A response that raced the close is discarded too.
            Ok(_) if self.is_closed() => Err(RequestError::Cancelled),
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(RequestError::Cancelled),
            Err(e) => Err(RequestError::Transport(format!("Request task failed: {}", e))),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.state.close();
    }
}

/// Cloneable handle used to close a [`ViewScope`].
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    state: Arc<ScopeState>,
}

impl ScopeHandle {
    pub fn close(&self) {
        self.state.close();
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}
