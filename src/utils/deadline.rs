// src/utils/deadline.rs

use std::{future::Future, time::Duration};

use crate::error::AppError;

/// Runs `fut` under a deadline. Running out of time is a 504.
pub async fn within<F, T>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Request exceeded its {:?} deadline", limit);
            Err(AppError::Timeout(format!(
                "Request did not finish within {} seconds",
                limit.as_secs()
            )))
        }
    }
}
