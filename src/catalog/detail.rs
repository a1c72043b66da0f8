//! Per-vaccine detail loading.
//!
//! Product profiles and licensing dates for the selected vaccine are fetched concurrently.
//! Each request takes a generation token; only the response holding the latest token is
//! published, so a slow answer for an earlier selection never replaces a newer one.

use crate::catalog::normalize::{normalize_licensing_date, normalize_profiles};
use crate::catalog::view::{ComparisonTable, LicensingDate, ProductProfile};
use crate::fetch::RecordFetcher;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VaccineDetail {
    pub vaccine_name: String,
    /// Token of the request that produced this detail.
    pub generation: u64,
    /// Sorted EMA > WHO > FDA > others.
    pub product_profiles: Vec<ProductProfile>,
    pub licensing_dates: Vec<LicensingDate>,
}

impl VaccineDetail {
    /// Highest-priority profile, if any.
    pub fn primary_profile(&self) -> Option<&ProductProfile> {
        self.product_profiles.first()
    }

    pub fn is_empty(&self) -> bool {
        self.product_profiles.is_empty() && self.licensing_dates.is_empty()
    }
}

/// Fetches both detail collections for one vaccine without any generation bookkeeping.
pub async fn fetch_detail(fetcher: &RecordFetcher, vaccine_name: &str) -> VaccineDetail {
    let (profiles, dates) = tokio::join!(
        fetcher.product_profiles(vaccine_name),
        fetcher.licensing_dates(vaccine_name),
    );
    VaccineDetail {
        vaccine_name: vaccine_name.to_string(),
        generation: 0,
        product_profiles: normalize_profiles(&profiles),
        licensing_dates: dates.iter().map(normalize_licensing_date).collect(),
    }
}

/// Side-by-side table of each vaccine's highest-priority profile.
pub fn compare_details(details: &[VaccineDetail]) -> ComparisonTable {
    let columns: Vec<(&str, Option<&ProductProfile>)> = details
        .iter()
        .map(|d| (d.vaccine_name.as_str(), d.primary_profile()))
        .collect();
    ComparisonTable::build(&columns)
}

pub struct DetailLoader {
    fetcher: Arc<RecordFetcher>,
    generation: AtomicU64,
    current: Mutex<Option<VaccineDetail>>,
}

impl DetailLoader {
    pub fn new(fetcher: Arc<RecordFetcher>) -> Self {
        Self {
            fetcher,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Loads detail for `vaccine_name`.
    ///
    /// Returns `None` when a newer request was issued while this one was in flight; the newer
    /// request's result stays published.
    pub async fn load(&self, vaccine_name: &str) -> Option<VaccineDetail> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(vaccine = %vaccine_name, generation = token, "Loading vaccine detail");

        let mut detail = fetch_detail(&self.fetcher, vaccine_name).await;
        detail.generation = token;
        self.publish(detail)
    }

    fn publish(&self, detail: VaccineDetail) -> Option<VaccineDetail> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::SeqCst) != detail.generation {
            debug!(
                vaccine = %detail.vaccine_name,
                generation = detail.generation,
                "Discarding stale vaccine detail"
            );
            return None;
        }
        *current = Some(detail.clone());
        Some(detail)
    }

    /// Detail of the most recent request, once it has completed.
    pub fn current(&self) -> Option<VaccineDetail> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Drops the published detail and makes every in-flight request stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
