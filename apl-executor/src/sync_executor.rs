//! Bridges the async executor to synchronous callers via a lazily-started
//! background worker thread with its own task loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::thread;

use apl_layer::PolicyLayer;
use apl_types::{EventType, SessionMetadata};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::context::LifecycleContext;
use crate::error::Result;
use crate::executor::LifecycleExecutor;

type Job = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

struct Worker {
    sender: mpsc::UnboundedSender<Job>,
}

static WORKER: OnceLock<Worker> = OnceLock::new();

fn worker() -> &'static Worker {
    WORKER.get_or_init(|| {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        thread::Builder::new()
            .name("apl-executor-sync-bridge".to_owned())
            .spawn(move || {
                let runtime = Runtime::new().expect("failed to start sync executor bridge runtime");
                runtime.block_on(async move {
                    while let Some(job) = receiver.recv().await {
                        job().await;
                    }
                });
            })
            .expect("failed to spawn sync executor bridge thread");

        Worker { sender }
    })
}

/// Runs `sequence` against `layer` from a synchronous caller, blocking
/// until the background worker thread has processed it.
///
/// The worker thread is started lazily on first use and lives for the
/// rest of the process; every subsequent call reuses it.
///
/// # Panics
///
/// Panics if the background worker thread has died (e.g. its runtime
/// failed to construct) or dropped its reply channel without responding.
pub fn run_sequence_blocking<R>(
    layer: Arc<PolicyLayer>,
    metadata: SessionMetadata,
    sequence: &'static [EventType],
    mut context: LifecycleContext<R>,
) -> (LifecycleContext<R>, Result<()>)
where
    R: Send + 'static,
{
    let (reply_tx, reply_rx) = std::sync::mpsc::channel();

    let job: Job = Box::new(move || {
        Box::pin(async move {
            let executor = LifecycleExecutor::new(&layer, metadata);
            let result = executor.run_sequence(sequence, &mut context).await;
            let _ = reply_tx.send((context, result));
        })
    });

    worker()
        .sender
        .send(job)
        .expect("sync executor bridge worker thread died");

    reply_rx
        .recv()
        .expect("sync executor bridge worker dropped the reply channel")
}
