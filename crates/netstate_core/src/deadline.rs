//! Retrieval with a deadline.

use crate::error::{NetStateError, NetStateResult};
use crate::native::NativeLibrary;
use crate::retriever::NetStateRetriever;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Retrieves net state on a worker thread, waiting at most `timeout`.
///
/// The native call cannot be interrupted. When the deadline passes the worker
/// is abandoned: it keeps running until the native call returns, releases its
/// buffers, and discards the result.
pub fn retrieve_with_timeout<L>(
    retriever: &Arc<NetStateRetriever<L>>,
    timeout: Duration,
) -> NetStateResult<String>
where
    L: NativeLibrary + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    let worker = Arc::clone(retriever);

    thread::Builder::new()
        .name("netstate-retrieve".into())
        .spawn(move || {
            // The receiver is gone if the caller timed out.
            let _ = tx.send(worker.retrieve());
        })
        .map_err(NetStateError::WorkerSpawn)?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            debug!(?timeout, "abandoning net state retrieval worker");
            Err(NetStateError::Timeout(timeout))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(NetStateError::WorkerPanicked),
    }
}
