pub mod catalog;
pub mod config;
pub mod executor;
pub mod fetch;
pub mod model;
pub mod render;
pub mod traits;

// Re-export common types for convenience
pub use catalog::{Catalog, CatalogPipeline, DetailLoader, Selection, VaccineDetail};
pub use config::ApiConfig;
pub use executor::*;
pub use fetch::{RecordFetcher, ReqwestTransport, Resource};
pub use model::*;
pub use traits::*;
