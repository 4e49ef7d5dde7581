use std::future::Future;

use log::warn;
use seasonality_market_data::{RetryPolicy, Sleeper};

use crate::errors::Result;

/// Runs `op`, and if the store reports throttling waits the policy's
/// cooldown once and runs it a second time.
///
/// Any other error, or a second throttle, is returned unchanged.
pub async fn with_store_cooldown<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(e) if e.is_store_throttled() => {
            warn!(
                "{}: store throttled ({}), retrying once in {:?}",
                label, e, policy.stale_cooldown
            );
            sleeper.sleep(policy.stale_cooldown).await;
            op().await
        }
        other => other,
    }
}
