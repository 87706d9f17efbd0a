use core::{future::Future, time::Duration};

use crate::{IdGenStatus, Result, SnowflakeGenerator, SnowflakeId, validate_batch_size};

/// Extension trait for generating Snowflake IDs on the
/// [`tokio`](https://docs.rs/tokio) runtime.
///
/// When the sequence for the current millisecond is spent, the returned future
/// sleeps with [`tokio::time::sleep`] instead of blocking the worker thread. A
/// lost compare-and-swap yields back to the scheduler and retries.
pub trait SnowflakeGeneratorAsyncTokioExt: SnowflakeGenerator + Sync {
    /// Returns a future that resolves to the next ID.
    ///
    /// # Errors
    ///
    /// Any error from [`SnowflakeGenerator::try_poll_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use chirpid::{Generator, SnowflakeGeneratorAsyncTokioExt, SystemClock};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let generator = Generator::try_new(1, SystemClock::default()).unwrap();
    /// let id = generator.generate_async().await.unwrap();
    /// assert_eq!(id.machine_id(), 1);
    /// # }
    /// ```
    fn generate_async(&self) -> impl Future<Output = Result<SnowflakeId>> + Send;

    /// Returns a future that resolves to `count` IDs in increasing order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `count` is outside `1..=1000`
    /// - any error from [`Self::generate_async`]
    ///
    /// [`Error::InvalidArgument`]: crate::Error::InvalidArgument
    fn generate_batch_async(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<SnowflakeId>>> + Send;
}

impl<G> SnowflakeGeneratorAsyncTokioExt for G
where
    G: SnowflakeGenerator + Sync,
{
    fn generate_async(&self) -> impl Future<Output = Result<SnowflakeId>> + Send {
        async {
            loop {
                match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_for: 0 } => tokio::task::yield_now().await,
                    IdGenStatus::Pending { yield_for } => {
                        tokio::time::sleep(Duration::from_millis(yield_for)).await;
                    }
                }
            }
        }
    }

    fn generate_batch_async(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<SnowflakeId>>> + Send {
        async move {
            let count = validate_batch_size(count)?;
            let mut ids = Vec::with_capacity(count);
            for _ in 0..count {
                ids.push(self.generate_async().await?);
            }
            Ok(ids)
        }
    }
}
