//! A thin wrapper around [`tokio::spawn`] that names tasks in tracing spans,
//! in the shape of `mz_ore::task::spawn`.

use std::future::Future;

use tracing::Instrument;

/// Spawns `future` on the current runtime, wrapping it in a tracing span
/// named by `name` so task panics and logs are attributable.
pub fn spawn<Fut>(name: impl FnOnce() -> &'static str, future: Fut) -> tokio::task::JoinHandle<Fut::Output>
where
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let span = tracing::info_span!("task", name = name());
    tokio::spawn(future.instrument(span))
}
