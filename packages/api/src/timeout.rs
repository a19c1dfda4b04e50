//! Platform-aware request deadline.
//!
//! Races a future against a timer (`tokio::time` natively, `gloo-timers` on
//! wasm) so a stalled network call can never suspend the caller forever.

use std::future::Future;
use std::time::Duration;

use futures::future::{self, Either};

/// The deadline passed before the future settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Run `fut` to completion or give up after `duration`.
pub async fn with_timeout<F: Future>(duration: Duration, fut: F) -> Result<F::Output, Elapsed> {
    let timer = sleep(duration);
    futures::pin_mut!(fut);
    futures::pin_mut!(timer);
    match future::select(fut, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed(duration)),
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_future_wins() {
        let out = with_timeout(Duration::from_secs(5), async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_stalled_future_times_out() {
        let out = with_timeout(Duration::from_millis(20), std::future::pending::<()>()).await;
        assert_eq!(out, Err(Elapsed(Duration::from_millis(20))));
    }
}
