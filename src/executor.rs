use crate::catalog::pipeline::RawCollections;
use crate::config::ApiConfig;
use crate::fetch::{RecordFetcher, Resource};
use crate::traits::FetchError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

/// Runs collection fetches with a concurrency limit and a per-request timeout.
pub struct FetchExecutor {
    semaphore: Arc<Semaphore>,
    request_timeout: Duration,
}

impl FetchExecutor {
    pub fn new(concurrency_limit: usize, request_timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            request_timeout,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.max_concurrent_fetches(), config.timeout())
    }

    /// Fetches one collection. Never fails: errors and timeouts yield an empty list.
    #[instrument(skip(self, fetcher, query))]
    pub async fn execute<T>(
        &self,
        fetcher: &RecordFetcher,
        resource: Resource,
        query: &[(&str, &str)],
    ) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!(error = %e, "Semaphore closed, skipping fetch");
                return Vec::new();
            }
        };

        info!("Starting fetch for resource: {}", resource);

        match timeout(
            self.request_timeout,
            fetcher.try_fetch_collection(resource, query),
        )
        .await
        {
            Ok(Ok(records)) => {
                info!(count = records.len(), "Finished fetch for resource: {}", resource);
                records
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Fetch failed for resource: {}", resource);
                Vec::new()
            }
            Err(_) => {
                let e = FetchError::Timeout(self.request_timeout);
                warn!(error = %e, "Fetch failed for resource: {}", resource);
                Vec::new()
            }
        }
    }

    /// Fetches every browsing collection concurrently.
    pub async fn fetch_all(&self, fetcher: &RecordFetcher) -> RawCollections {
        let (pathogens, vaccines, manufacturers, licensers, nitags, candidates) = tokio::join!(
            self.execute(fetcher, Resource::PathogensPopulated, &[]),
            self.execute(fetcher, Resource::VaccinesPopulated, &[]),
            self.execute(fetcher, Resource::ManufacturersPopulated, &[]),
            self.execute(fetcher, Resource::Licensers, &[]),
            self.execute(fetcher, Resource::Nitags, &[]),
            self.execute(fetcher, Resource::CandidateVaccines, &[]),
        );

        RawCollections {
            pathogens,
            vaccines,
            manufacturers,
            licensers,
            nitags,
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawLicenser;
    use crate::traits::{CachePolicy, Transport, TransportResponse};
    use async_trait::async_trait;

    struct SlowTransport;

    #[async_trait]
    impl Transport for SlowTransport {
        async fn get(
            &self,
            _url: &str,
            _cache: CachePolicy,
        ) -> Result<TransportResponse, FetchError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(TransportResponse {
                status: 200,
                body: r#"{"licensers": [{"acronym": "FDA"}]}"#.to_string(),
            })
        }
    }

    fn fetcher() -> RecordFetcher {
        RecordFetcher::with_transport(ApiConfig::default(), Arc::new(SlowTransport))
    }

    #[tokio::test]
    async fn test_execute_returns_records() {
        let executor = FetchExecutor::new(2, Duration::from_secs(5));
        let records: Vec<RawLicenser> = executor
            .execute(&fetcher(), Resource::Licensers, &[])
            .await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_times_out_to_empty() {
        let executor = FetchExecutor::new(2, Duration::from_millis(20));
        let records: Vec<RawLicenser> = executor
            .execute(&fetcher(), Resource::Licensers, &[])
            .await;
        assert!(records.is_empty());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let executor = FetchExecutor::new(0, Duration::from_secs(1));
        assert_eq!(executor.semaphore.available_permits(), 1);
    }
}
