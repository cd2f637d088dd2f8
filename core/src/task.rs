//! Background execution for async-mode queries.
//!
//! Work handed to these functions starts before they return. Inside a
//! tokio runtime it runs on that runtime; anywhere else it gets a thread of
//! its own, so async mode also works under `futures::executor::block_on`
//! or with no executor at all. The returned future is only a handle to the
//! result: dropping it does not cancel the work.

use std::future::Future;
use std::thread;

use futures::channel::oneshot;
use futures::future::{self, BoxFuture};
use tokio::runtime::Handle;
use tracing::warn;

/// Run a blocking `job` off the calling thread.
///
/// Resolves to `None` if the job panicked or could not be started.
pub(crate) fn spawn_blocking<T, F>(job: F) -> BoxFuture<'static, Option<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            let joined = handle.spawn_blocking(job);
            Box::pin(async move {
                match joined.await {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(error = %e, "blocking query task did not complete");
                        None
                    }
                }
            })
        }
        Err(_) => on_thread(job),
    }
}

/// Drive `work` to completion in the background.
///
/// Resolves to `None` if the work panicked or could not be started.
pub(crate) fn spawn<T, F>(work: F) -> BoxFuture<'static, Option<T>>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            let joined = handle.spawn(work);
            Box::pin(async move {
                match joined.await {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(error = %e, "query task did not complete");
                        None
                    }
                }
            })
        }
        Err(_) => on_thread(move || futures::executor::block_on(work)),
    }
}

fn on_thread<T, F>(job: F) -> BoxFuture<'static, Option<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let started = thread::Builder::new()
        .name("sparql-query".to_string())
        .spawn(move || {
            // The receiver may already be gone; the job ran regardless.
            let _ = tx.send(job());
        });
    match started {
        Ok(_) => Box::pin(async move { rx.await.ok() }),
        Err(e) => {
            warn!(error = %e, "could not start query thread");
            Box::pin(future::ready(None))
        }
    }
}
