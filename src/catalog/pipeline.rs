//! Catalog pipeline executor.
//!
//! This module provides the [`CatalogPipeline`] coordinator that executes
//! sequential stages (Fetch → Normalize → Index) with:
//! - Parallel, bounded collection fetches via [`FetchExecutor`]
//! - Structured logging via `tracing`
//! - Per-stage timing statistics

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::catalog::index::IndexBuilder;
use crate::catalog::normalize::Normalizer;
use crate::catalog::traits::CatalogStage;
use crate::catalog::view::{CandidateVaccine, Licenser, Manufacturer, Nitag, Pathogen, Vaccine};
use crate::catalog::Catalog;
use crate::executor::FetchExecutor;
use crate::fetch::{RecordFetcher, Resource};
use crate::model::{
    RawCandidateVaccine, RawLicenser, RawManufacturer, RawNitag, RawPathogen, RawVaccine,
};

// ============================================================================
// Pipeline Types
// ============================================================================

/// Raw collections as fetched, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    pub pathogens: Vec<RawPathogen>,
    pub vaccines: Vec<RawVaccine>,
    pub manufacturers: Vec<RawManufacturer>,
    pub licensers: Vec<RawLicenser>,
    pub nitags: Vec<RawNitag>,
    pub candidates: Vec<RawCandidateVaccine>,
}

impl RawCollections {
    pub fn record_count(&self) -> usize {
        self.pathogens.len()
            + self.vaccines.len()
            + self.manufacturers.len()
            + self.licensers.len()
            + self.nitags.len()
            + self.candidates.len()
    }

    /// Collections that came back without a single record.
    pub fn empty_resources(&self) -> Vec<Resource> {
        let mut empty = Vec::new();
        if self.pathogens.is_empty() {
            empty.push(Resource::PathogensPopulated);
        }
        if self.vaccines.is_empty() {
            empty.push(Resource::VaccinesPopulated);
        }
        if self.manufacturers.is_empty() {
            empty.push(Resource::ManufacturersPopulated);
        }
        if self.licensers.is_empty() {
            empty.push(Resource::Licensers);
        }
        if self.nitags.is_empty() {
            empty.push(Resource::Nitags);
        }
        if self.candidates.is_empty() {
            empty.push(Resource::CandidateVaccines);
        }
        empty
    }
}

/// Canonical records, before indexing.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRecords {
    pub pathogens: Vec<Pathogen>,
    pub vaccines: Vec<Vaccine>,
    pub licensers: Vec<Licenser>,
    pub manufacturers: Vec<Manufacturer>,
    pub candidates: Vec<CandidateVaccine>,
    pub nitags: Vec<Nitag>,
}

/// Complete pipeline result with the catalog and statistics.
#[derive(Debug)]
pub struct CatalogResult {
    pub catalog: Catalog,
    pub stats: CatalogStats,
}

/// Statistics about one pipeline run.
#[derive(Debug, Default, Clone)]
pub struct CatalogStats {
    /// Total time spent on the whole run (milliseconds)
    pub total_duration_ms: u64,

    /// Time spent fetching collections (milliseconds)
    pub fetch_duration_ms: u64,

    /// Time spent normalizing (milliseconds)
    pub normalize_duration_ms: u64,

    /// Time spent building indexes (milliseconds)
    pub index_duration_ms: u64,

    /// Raw records received across all collections
    pub records_fetched: usize,

    /// Vaccines after merging duplicates
    pub vaccines: usize,

    /// Collections that came back empty (failed or genuinely empty)
    pub empty_resources: Vec<Resource>,
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Catalog pipeline.
///
/// Stages run in order:
/// 1. **Fetch**: every collection, in parallel, each degrading to empty on failure
/// 2. **Normalize**: raw records into canonical views
/// 3. **Index**: lookup structures over the views
///
/// The run never fails; the worst case is an empty catalog.
///
/// # Example
///
/// ```ignore
/// use vacciprofile::{ApiConfig, RecordFetcher};
/// use vacciprofile::catalog::pipeline::CatalogPipeline;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = Arc::new(RecordFetcher::new(ApiConfig::from_env()?)?);
///     let result = CatalogPipeline::standard(fetcher).execute().await;
///     println!("{} vaccines", result.catalog.vaccines().len());
///     Ok(())
/// }
/// ```
pub struct CatalogPipeline<N, X>
where
    N: CatalogStage<Input = RawCollections, Output = NormalizedRecords>,
    X: CatalogStage<Input = NormalizedRecords, Output = Catalog>,
{
    fetcher: Arc<RecordFetcher>,
    executor: FetchExecutor,
    normalizer: N,
    indexer: X,
}

impl CatalogPipeline<Normalizer, IndexBuilder> {
    /// Pipeline with the standard stages and an executor configured from the fetcher.
    pub fn standard(fetcher: Arc<RecordFetcher>) -> Self {
        Self::new(fetcher, Normalizer, IndexBuilder)
    }
}

impl<N, X> CatalogPipeline<N, X>
where
    N: CatalogStage<Input = RawCollections, Output = NormalizedRecords>,
    X: CatalogStage<Input = NormalizedRecords, Output = Catalog>,
{
    pub fn new(fetcher: Arc<RecordFetcher>, normalizer: N, indexer: X) -> Self {
        let executor = FetchExecutor::from_config(fetcher.config());
        Self {
            fetcher,
            executor,
            normalizer,
            indexer,
        }
    }

    /// Replaces the fetch executor.
    pub fn with_executor(mut self, executor: FetchExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Fetches every collection and builds the catalog, recording every stage's duration.
    pub async fn execute(&self) -> CatalogResult {
        let fetch_start = Instant::now();
        let raw = self.fetch().await;
        let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
        info!(
            duration_ms = fetch_duration_ms,
            records = raw.record_count(),
            "Fetch completed"
        );

        let mut result = self.build(raw);
        result.stats.fetch_duration_ms = fetch_duration_ms;
        result.stats.total_duration_ms += fetch_duration_ms;
        result
    }

    /// Runs the fetch stage only.
    pub async fn fetch(&self) -> RawCollections {
        info!("Starting fetch stage");
        self.executor.fetch_all(&self.fetcher).await
    }

    /// Runs the normalize and index stages over already fetched collections.
    pub fn build(&self, raw: RawCollections) -> CatalogResult {
        let start = Instant::now();
        let mut stats = CatalogStats {
            records_fetched: raw.record_count(),
            empty_resources: raw.empty_resources(),
            ..Default::default()
        };
        if !stats.empty_resources.is_empty() {
            warn!(
                empty = ?stats.empty_resources,
                "Some collections are empty"
            );
        }

        // ====================================================================
        // Stage: Normalize
        // ====================================================================

        let normalize_start = Instant::now();
        let records = self.normalizer.execute(raw);
        stats.normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;
        stats.vaccines = records.vaccines.len();
        info!(
            stage = self.normalizer.stage_name(),
            duration_ms = stats.normalize_duration_ms,
            vaccines = stats.vaccines,
            "Normalization completed"
        );

        // ====================================================================
        // Stage: Index
        // ====================================================================

        let index_start = Instant::now();
        let catalog = self.indexer.execute(records);
        stats.index_duration_ms = index_start.elapsed().as_millis() as u64;
        info!(
            stage = self.indexer.stage_name(),
            duration_ms = stats.index_duration_ms,
            pathogens = catalog.index().by_pathogen.len(),
            authorities = catalog.index().by_authority.len(),
            "Indexing completed"
        );

        stats.total_duration_ms = start.elapsed().as_millis() as u64;
        CatalogResult { catalog, stats }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::fetch::tests::MockTransport;
    use crate::traits::{CachePolicy, FetchError, Transport, TransportResponse};

    fn api() -> MockTransport {
        MockTransport::default()
            .route(
                "/api/pathogens/populated",
                200,
                r#"{"success": true, "count": 2, "pathogens": [
                    {"pathogenId": 1, "name": "Ebola", "vaccines": [
                        {"vaccineId": 10, "name": "Ervebo", "vaccineType": "Single",
                         "manufacturers": [{"name": "Merck"}],
                         "licensingDates": [{"name": "FDA", "source": "https://fda.gov/ervebo"},
                                            {"name": "FDA", "source": "https://fda.gov/ervebo"}]}
                    ]},
                    {"pathogenId": 2, "name": "Measles", "vaccines": []}
                ]}"#,
            )
            .route(
                "/api/vaccines/populated",
                200,
                r#"{"vaccines": [{"vaccineId": 10, "name": "Ervebo", "pathogens": ["Ebola"],
                                  "licensers": [{"acronym": "EMA"}]}]}"#,
            )
            .route(
                "/api/licensers",
                200,
                r#"{"licensers": [
                    {"licenserId": 1, "acronym": "FDA", "fullName": "Food and Drug Administration", "country": "United States"},
                    {"licenserId": 2, "acronym": "EMA", "fullName": "European Medicines Agency", "country": "European Union"}
                ]}"#,
            )
            .route(
                "/api/manufacturers/populated",
                200,
                r#"{"manufacturers": [{"manufacturerId": 3, "name": "Merck",
                    "candidateVaccines": [{"name": "EBO-2", "pathogenName": "Ebola", "clinicalPhase": "Phase II"}]}]}"#,
            )
            .route("/api/nitags", 200, r#"{"data": [{"country": "Kenya", "available": true}]}"#)
            .route("/candidate-vaccines", 500, "boom")
    }

    fn pipeline(transport: MockTransport) -> CatalogPipeline<Normalizer, IndexBuilder> {
        let fetcher = RecordFetcher::with_transport(ApiConfig::default(), Arc::new(transport));
        CatalogPipeline::standard(Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_pipeline_execution() {
        let result = pipeline(api()).execute().await;
        let catalog = &result.catalog;

        assert_eq!(catalog.pathogens().len(), 2);
        assert_eq!(catalog.vaccines().len(), 1);
        assert_eq!(catalog.manufacturers().len(), 1);
        assert_eq!(catalog.candidates().len(), 1);

        let ervebo = &catalog.vaccines()[0];
        assert_eq!(ervebo.authority_names(), vec!["FDA", "EMA"]);
        assert_eq!(ervebo.manufacturer_display, "Merck");

        assert_eq!(catalog.vaccines_for_authority("FDA").len(), 1);
        assert_eq!(catalog.vaccines_for_authority("EMA").len(), 1);
        assert_eq!(catalog.vaccines_for_pathogen("Ebola").len(), 1);
        assert!(catalog.vaccines_for_pathogen("Measles").is_empty());
        assert_eq!(catalog.candidates_for_manufacturer("Merck").len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_stats() {
        let result = pipeline(api()).execute().await;

        assert_eq!(result.stats.vaccines, 1);
        assert_eq!(result.stats.records_fetched, 7);
        assert_eq!(
            result.stats.empty_resources,
            vec![Resource::CandidateVaccines]
        );
        assert!(result.stats.total_duration_ms >= result.stats.fetch_duration_ms);
    }

    /// Delays every request before answering from the inner mock.
    struct DelayedTransport(MockTransport);

    #[async_trait::async_trait]
    impl Transport for DelayedTransport {
        async fn get(
            &self,
            url: &str,
            cache: CachePolicy,
        ) -> Result<TransportResponse, FetchError> {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            self.0.get(url, cache).await
        }
    }

    #[tokio::test]
    async fn test_execute_records_fetch_duration() {
        let fetcher =
            RecordFetcher::with_transport(ApiConfig::default(), Arc::new(DelayedTransport(api())));
        let result = CatalogPipeline::standard(Arc::new(fetcher)).execute().await;

        assert!(result.stats.fetch_duration_ms >= 25);
        assert!(result.stats.total_duration_ms >= result.stats.fetch_duration_ms);
        assert_eq!(result.catalog.vaccines().len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_with_unreachable_api() {
        let result = pipeline(MockTransport::default()).execute().await;

        assert!(result.catalog.is_empty());
        assert_eq!(result.stats.records_fetched, 0);
        assert_eq!(result.stats.empty_resources.len(), 6);
    }
}
