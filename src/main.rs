use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vacciprofile::catalog::detail::{compare_details, fetch_detail};
use vacciprofile::catalog::geo::map_layer;
use vacciprofile::catalog::view::Nitag;
use vacciprofile::render;
use vacciprofile::{
    ApiConfig, Catalog, CatalogPipeline, DetailLoader, RecordFetcher, Selection, VaccineDetail,
};

#[derive(Parser)]
#[command(name = "vacciprofile")]
#[command(about = "Browse vaccines, pathogens, authorities and manufacturers from a VacciProfile API")]
struct Cli {
    /// API base URL (overrides VACCIPROFILE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Case-insensitive substring filter for lists
    #[arg(long, global = true)]
    search: Option<String>,

    /// First-letter filter for lists ('#' for non-letters)
    #[arg(long, global = true)]
    letter: Option<char>,

    /// Initial selection as a deep-link query, e.g. "pathogen=Ebola&vaccine=Ervebo"
    #[arg(long, global = true)]
    query: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pathogens
    Pathogens,
    /// Show a pathogen with its licensed and candidate vaccines
    Pathogen {
        name: String,
        /// Also load product profiles and licensing dates for this vaccine
        #[arg(long)]
        vaccine: Option<String>,
    },
    /// List licensing authorities, pinned ones first
    Authorities {
        /// Also list vaccines licensed by authorities based in this country
        #[arg(long)]
        country: Option<String>,
    },
    /// Show an authority and the vaccines it approved
    Authority { name: String },
    /// List manufacturers
    Manufacturers,
    /// Show a manufacturer with its licensed and candidate vaccines
    Manufacturer { name: String },
    /// Compare the product profiles of two or more vaccines
    Compare {
        #[arg(required = true, num_args = 2..)]
        vaccines: Vec<String>,
    },
    /// List NITAGs, or show the one for a country
    Nitags { country: Option<String> },
    /// Per-country NITAG and licensing status
    Map,
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ApiConfig::from_env().context("invalid API configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config
            .with_base_url(url)
            .with_context(|| format!("invalid --api-url {}", url))?;
    }
    info!(base_url = %config.base_url(), "Using VacciProfile API");

    let mut selection = Selection::from_query(cli.query.as_deref().unwrap_or(""));
    if let Some(search) = cli.search.as_deref() {
        selection.set_search(search);
    }
    if cli.letter.is_some() {
        selection.set_letter(cli.letter);
    }

    let fetcher = Arc::new(RecordFetcher::new(config)?);

    match cli.command {
        Commands::Pathogens => {
            let catalog = load_catalog(&fetcher).await;
            let page = catalog.pathogen_page(&selection);
            emit(cli.json, &page, || render::render_pathogen_page(&page))?;
        }
        Commands::Pathogen { name, vaccine } => {
            let catalog = load_catalog(&fetcher).await;
            selection.select_pathogen(&name);
            if let Some(vaccine) = vaccine.as_deref() {
                selection.select_vaccine(vaccine);
            }
            let page = catalog.pathogen_page(&selection);
            emit(cli.json, &page, || render::render_pathogen_page(&page))?;

            match (page.selected_vaccine, selection.vaccine.as_deref()) {
                (Some(vaccine), _) => {
                    let loader = DetailLoader::new(fetcher.clone());
                    if let Some(detail) = loader.load(&vaccine.brand_name).await {
                        emit(cli.json, &detail, || render::render_detail(&detail))?;
                    }
                }
                (None, Some(vaccine)) => bail!("vaccine {} is not listed for {}", vaccine, name),
                (None, None) => {}
            }
        }
        Commands::Authorities { country } => {
            let catalog = load_catalog(&fetcher).await;
            if let Some(country) = country.as_deref() {
                selection.select_country(country);
            }
            let page = catalog.authority_page(&selection);
            emit(cli.json, &page, || render::render_authority_page(&page))?;
        }
        Commands::Authority { name } => {
            let catalog = load_catalog(&fetcher).await;
            selection.select_authority(&name);
            let page = catalog.authority_page(&selection);
            emit(cli.json, &page, || render::render_authority_page(&page))?;
        }
        Commands::Manufacturers => {
            let catalog = load_catalog(&fetcher).await;
            let page = catalog.manufacturer_page(&selection);
            emit(cli.json, &page, || render::render_manufacturer_page(&page))?;
        }
        Commands::Manufacturer { name } => {
            let catalog = load_catalog(&fetcher).await;
            selection.select_manufacturer(&name);
            let page = catalog.manufacturer_page(&selection);
            emit(cli.json, &page, || render::render_manufacturer_page(&page))?;
        }
        Commands::Compare { vaccines } => {
            let details = load_details(&fetcher, &vaccines).await;
            let table = compare_details(&details);
            emit(cli.json, &table, || render::render_comparison(&table))?;
        }
        Commands::Nitags { country } => {
            let catalog = load_catalog(&fetcher).await;
            let nitags: Vec<&Nitag> = match country.as_deref() {
                Some(country) => catalog.nitag_for_country(country).into_iter().collect(),
                None => selection.filter(catalog.nitags()),
            };
            emit(cli.json, &nitags, || render::render_nitags(&nitags))?;
        }
        Commands::Map => {
            let catalog = load_catalog(&fetcher).await;
            let layer = map_layer(&catalog);
            emit(cli.json, &layer, || render::render_map(&layer))?;
        }
    }

    Ok(())
}

async fn load_catalog(fetcher: &Arc<RecordFetcher>) -> Catalog {
    let result = CatalogPipeline::standard(fetcher.clone()).execute().await;
    info!(
        duration_ms = result.stats.total_duration_ms,
        vaccines = result.stats.vaccines,
        empty = result.stats.empty_resources.len(),
        "Catalog ready"
    );
    result.catalog
}

/// Loads every vaccine's detail concurrently, keeping argument order.
async fn load_details(fetcher: &Arc<RecordFetcher>, vaccines: &[String]) -> Vec<VaccineDetail> {
    let mut set = JoinSet::new();
    for (i, name) in vaccines.iter().enumerate() {
        let fetcher = fetcher.clone();
        let name = name.clone();
        set.spawn(async move { (i, fetch_detail(&fetcher, &name).await) });
    }

    let mut details = Vec::with_capacity(vaccines.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(detail) => details.push(detail),
            Err(e) => warn!(error = %e, "Detail task failed"),
        }
    }
    details.sort_by_key(|(i, _)| *i);
    details.into_iter().map(|(_, d)| d).collect()
}
