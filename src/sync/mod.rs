// src/sync/mod.rs
//! Synchronizers: each one owns one piece of canonical state and the
//! requests that load or mutate it.

pub mod collection;
pub mod news;

use std::future::Future;
use std::time::Duration;

use crate::error::DashboardError;

/// Await a service call, optionally bounded by `timeout`, and fold any
/// failure into the dashboard taxonomy.
pub(crate) async fn bounded<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, DashboardError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let res = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(r) => r,
            Err(_) => return Err(DashboardError::Timeout(limit.as_millis() as u64)),
        },
        None => fut.await,
    };
    res.map_err(|e| DashboardError::from_service(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timeout_maps_to_timeout_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, anyhow::Error>(1)
        };
        let err = bounded(Some(Duration::from_millis(250)), slow).await.unwrap_err();
        assert_eq!(err, DashboardError::Timeout(250));
    }

    #[tokio::test]
    async fn unbounded_passes_results_through() {
        let ok = bounded(None, async { Ok::<_, anyhow::Error>(7) }).await;
        assert_eq!(ok, Ok(7));

        let err = bounded(None, async { Err::<u8, _>(anyhow::anyhow!("503")) }).await;
        assert_eq!(err, Err(DashboardError::Service("503".into())));
    }
}
