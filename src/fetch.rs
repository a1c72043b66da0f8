//! Record fetcher for the VacciProfile REST API.
//!
//! Every collection is fetched with a single best-effort GET. Failures are logged and degrade to
//! an empty collection; [`RecordFetcher::try_fetch_collection`] exposes the underlying error for
//! callers that want it.

use crate::config::ApiConfig;
use crate::model::{
    RawCandidateVaccine, RawLicenser, RawLicensingDate, RawManufacturer, RawNitag, RawPathogen,
    RawProductProfile, RawVaccine,
};
use crate::traits::{CachePolicy, ConfigError, FetchError, Transport, TransportResponse};
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Resource collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    PathogensPopulated,
    ManufacturersPopulated,
    Licensers,
    VaccinesPopulated,
    Nitags,
    ProductProfiles,
    LicensingDates,
    CandidateVaccines,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::PathogensPopulated => "/api/pathogens/populated",
            Resource::ManufacturersPopulated => "/api/manufacturers/populated",
            Resource::Licensers => "/api/licensers",
            Resource::VaccinesPopulated => "/api/vaccines/populated",
            Resource::Nitags => "/api/nitags",
            Resource::ProductProfiles => "/api/product-profiles",
            Resource::LicensingDates => "/api/licensing-dates",
            Resource::CandidateVaccines => "/candidate-vaccines",
        }
    }

    /// Key holding the records inside the `{ success, count, <key>: [...] }` envelope.
    pub fn envelope_key(&self) -> &'static str {
        match self {
            Resource::PathogensPopulated => "pathogens",
            Resource::ManufacturersPopulated => "manufacturers",
            Resource::Licensers => "licensers",
            Resource::VaccinesPopulated => "vaccines",
            Resource::Nitags => "nitags",
            Resource::ProductProfiles => "productProfiles",
            Resource::LicensingDates => "licensingDates",
            Resource::CandidateVaccines => "candidateVaccines",
        }
    }

    /// Collections are cached for `ttl`; per-vaccine detail and candidates never are.
    pub fn cache_policy(&self, ttl: Duration) -> CachePolicy {
        match self {
            Resource::ProductProfiles | Resource::LicensingDates | Resource::CandidateVaccines => {
                CachePolicy::NoStore
            }
            _ if ttl.is_zero() => CachePolicy::NoStore,
            _ => CachePolicy::Revalidate(ttl),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.envelope_key())
    }
}

/// [`Transport`] backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, cache: CachePolicy) -> Result<TransportResponse, FetchError> {
        let cache_control = match cache {
            CachePolicy::NoStore => "no-store".to_string(),
            CachePolicy::Revalidate(ttl) => format!("max-age={}", ttl.as_secs()),
        };

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, cache_control)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

struct CachedBody {
    stored_at: Instant,
    body: String,
}

pub struct RecordFetcher {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    cache: Mutex<HashMap<String, CachedBody>>,
}

impl RecordFetcher {
    /// Creates a fetcher that talks HTTP through `reqwest`.
    pub fn new(config: ApiConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn url_for(&self, resource: Resource, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .config
            .base_url()
            .join(resource.path().trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }

    /// Fetches a collection, logging and swallowing any failure.
    pub async fn fetch_collection<T>(&self, resource: Resource, query: &[(&str, &str)]) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        match self.try_fetch_collection(resource, query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(resource = %resource, error = %e, "Fetch failed, using empty collection");
                Vec::new()
            }
        }
    }

    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn try_fetch_collection<T>(
        &self,
        resource: Resource,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(resource, query)?;
        let policy = resource.cache_policy(self.config.cache_ttl());

        let body = match self.cached(url.as_str(), policy) {
            Some(body) => {
                debug!(url = %url, "Serving response from cache");
                body
            }
            None => {
                let response = self.transport.get(url.as_str(), policy).await?;
                if !response.is_success() {
                    return Err(FetchError::Status {
                        status: response.status,
                        url: url.to_string(),
                    });
                }
                self.store(url.as_str(), policy, &response.body);
                response.body
            }
        };

        let value: Value = serde_json::from_str(&body)?;
        Ok(decode_records(value, resource))
    }

    fn cached(&self, url: &str, policy: CachePolicy) -> Option<String> {
        let CachePolicy::Revalidate(ttl) = policy else {
            return None;
        };
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(url)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.body.clone())
    }

    fn store(&self, url: &str, policy: CachePolicy, body: &str) {
        if let CachePolicy::Revalidate(_) = policy {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.insert(
                url.to_string(),
                CachedBody {
                    stored_at: Instant::now(),
                    body: body.to_string(),
                },
            );
        }
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub async fn pathogens(&self) -> Vec<RawPathogen> {
        self.fetch_collection(Resource::PathogensPopulated, &[]).await
    }

    pub async fn manufacturers(&self) -> Vec<RawManufacturer> {
        self.fetch_collection(Resource::ManufacturersPopulated, &[])
            .await
    }

    pub async fn licensers(&self) -> Vec<RawLicenser> {
        self.fetch_collection(Resource::Licensers, &[]).await
    }

    pub async fn vaccines(&self) -> Vec<RawVaccine> {
        self.fetch_collection(Resource::VaccinesPopulated, &[]).await
    }

    pub async fn nitags(&self) -> Vec<RawNitag> {
        self.fetch_collection(Resource::Nitags, &[]).await
    }

    pub async fn candidate_vaccines(&self) -> Vec<RawCandidateVaccine> {
        self.fetch_collection(Resource::CandidateVaccines, &[]).await
    }

    pub async fn product_profiles(&self, vaccine_name: &str) -> Vec<RawProductProfile> {
        self.fetch_collection(Resource::ProductProfiles, &[("vaccineName", vaccine_name)])
            .await
    }

    pub async fn licensing_dates(&self, vaccine_name: &str) -> Vec<RawLicensingDate> {
        self.fetch_collection(Resource::LicensingDates, &[("vaccineName", vaccine_name)])
            .await
    }
}

/// Pulls the record list out of the current envelope, the legacy `{ data }` envelope or a bare
/// array, skipping records that fail to decode.
pub fn decode_records<T>(value: Value, resource: Resource) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                warn!(resource = %resource, "API reported success=false");
                return Vec::new();
            }
            match map
                .remove(resource.envelope_key())
                .or_else(|| map.remove("data"))
            {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![other],
            }
        }
        _ => {
            warn!(resource = %resource, "Response body is neither an object nor an array");
            Vec::new()
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(resource = %resource, index = i, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}
