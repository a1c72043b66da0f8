//! Catalog module - normalized VacciProfile records and the lookups built over them.
//!
//! - **View models**: canonical records via [`view`]
//! - **Normalizer**: raw API shapes → views via [`normalize`]
//! - **Indexes**: name-based joins via [`index`]
//! - **Selection**: search, letter and deep-link state via [`selection`]
//! - **Pipeline**: fetch → normalize → index via [`pipeline::CatalogPipeline`]
//! - **Detail**: latest-wins vaccine detail loading via [`detail::DetailLoader`]
//! - **Map**: country aliases and per-country status via [`geo`]

pub mod detail;
pub mod geo;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod selection;
pub mod traits;
pub mod view;

pub use detail::{DetailLoader, VaccineDetail};
pub use index::{match_authority, AuthorityMatch, CatalogIndex, IndexBuilder};
pub use normalize::Normalizer;
pub use pipeline::{CatalogPipeline, CatalogResult, CatalogStats, NormalizedRecords, RawCollections};
pub use selection::{available_letters, Searchable, Selection};
pub use traits::CatalogStage;
pub use view::{
    AuthorityPage, CandidateVaccine, ComparisonTable, Licenser, Manufacturer, ManufacturerPage,
    Nitag, Pathogen, PathogenPage, ProductProfile, Vaccine, PINNED_AUTHORITIES,
};

use index::{match_name, Buckets};

/// Immutable snapshot of every record fetched for one page load, with its indexes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pathogens: Vec<Pathogen>,
    vaccines: Vec<Vaccine>,
    licensers: Vec<Licenser>,
    manufacturers: Vec<Manufacturer>,
    candidates: Vec<CandidateVaccine>,
    nitags: Vec<Nitag>,
    index: CatalogIndex,
}

fn resolve<'a, T>(items: &'a [T], positions: &[usize]) -> Vec<&'a T> {
    positions.iter().filter_map(|&p| items.get(p)).collect()
}

impl Catalog {
    pub(crate) fn from_parts(records: NormalizedRecords, index: CatalogIndex) -> Self {
        Self {
            pathogens: records.pathogens,
            vaccines: records.vaccines,
            licensers: records.licensers,
            manufacturers: records.manufacturers,
            candidates: records.candidates,
            nitags: records.nitags,
            index,
        }
    }

    /// Indexes already normalized records.
    pub fn build(records: NormalizedRecords) -> Self {
        IndexBuilder.execute(records)
    }

    pub fn pathogens(&self) -> &[Pathogen] {
        &self.pathogens
    }

    pub fn vaccines(&self) -> &[Vaccine] {
        &self.vaccines
    }

    pub fn licensers(&self) -> &[Licenser] {
        &self.licensers
    }

    pub fn manufacturers(&self) -> &[Manufacturer] {
        &self.manufacturers
    }

    pub fn candidates(&self) -> &[CandidateVaccine] {
        &self.candidates
    }

    pub fn nitags(&self) -> &[Nitag] {
        &self.nitags
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.pathogens.is_empty()
            && self.vaccines.is_empty()
            && self.licensers.is_empty()
            && self.manufacturers.is_empty()
            && self.candidates.is_empty()
            && self.nitags.is_empty()
    }

    fn pathogen_key<'a>(&'a self, name: &'a str) -> &'a str {
        match_name(name, self.pathogens.iter().map(|p| p.name.as_str()))
            .map(|i| self.pathogens[i].name.as_str())
            .unwrap_or(name)
    }

    fn manufacturer_key<'a>(&'a self, name: &'a str) -> &'a str {
        match_name(name, self.manufacturers.iter().map(|m| m.name.as_str()))
            .map(|i| self.manufacturers[i].name.as_str())
            .unwrap_or(name)
    }

    fn lookup<'a, T>(items: &'a [T], buckets: &Buckets, key: &str) -> Vec<&'a T> {
        resolve(items, buckets.get(key))
    }

    pub fn find_pathogen(&self, name: &str) -> Option<&Pathogen> {
        match_name(name, self.pathogens.iter().map(|p| p.name.as_str())).map(|i| &self.pathogens[i])
    }

    /// Finds a vaccine by id, then by brand name (case-insensitive).
    pub fn find_vaccine(&self, id_or_name: &str) -> Option<&Vaccine> {
        let needle = id_or_name.trim();
        if needle.is_empty() {
            return None;
        }
        self.vaccines
            .iter()
            .find(|v| v.id == needle)
            .or_else(|| {
                self.vaccines
                    .iter()
                    .find(|v| v.brand_name.eq_ignore_ascii_case(needle))
            })
    }

    pub fn find_licenser(&self, name: &str) -> Option<&Licenser> {
        match_authority(name, &self.licensers).map(|(i, _)| &self.licensers[i])
    }

    pub fn find_manufacturer(&self, name: &str) -> Option<&Manufacturer> {
        match_name(name, self.manufacturers.iter().map(|m| m.name.as_str()))
            .map(|i| &self.manufacturers[i])
    }

    pub fn nitag_for_country(&self, country: &str) -> Option<&Nitag> {
        self.nitags
            .iter()
            .find(|n| geo::same_country(&n.country, country))
    }

    pub fn vaccines_for_pathogen(&self, name: &str) -> Vec<&Vaccine> {
        Self::lookup(&self.vaccines, &self.index.by_pathogen, self.pathogen_key(name))
    }

    /// Vaccines approved by an authority given by acronym, full name or any spelling the
    /// authority matcher accepts.
    pub fn vaccines_for_authority(&self, name: &str) -> Vec<&Vaccine> {
        if self.index.by_authority.contains_key(name) {
            return Self::lookup(&self.vaccines, &self.index.by_authority, name);
        }
        match self.find_licenser(name) {
            Some(licenser) => {
                Self::lookup(&self.vaccines, &self.index.by_authority, licenser.label())
            }
            None => Vec::new(),
        }
    }

    /// Vaccines approved by any authority based in `country` (alias-aware).
    pub fn vaccines_for_country(&self, country: &str) -> Vec<&Vaccine> {
        let mut seen = std::collections::HashSet::new();
        let positions: Vec<usize> = self
            .index
            .by_country
            .keys()
            .filter(|key| geo::same_country(key, country))
            .flat_map(|key| self.index.by_country.get(key).iter().copied())
            .filter(|p| seen.insert(*p))
            .collect();
        resolve(&self.vaccines, &positions)
    }

    pub fn vaccines_for_manufacturer(&self, name: &str) -> Vec<&Vaccine> {
        Self::lookup(
            &self.vaccines,
            &self.index.by_manufacturer,
            self.manufacturer_key(name),
        )
    }

    pub fn candidates_for_manufacturer(&self, name: &str) -> Vec<&CandidateVaccine> {
        Self::lookup(
            &self.candidates,
            &self.index.candidates_by_manufacturer,
            self.manufacturer_key(name),
        )
    }

    pub fn candidates_for_pathogen(&self, name: &str) -> Vec<&CandidateVaccine> {
        Self::lookup(
            &self.candidates,
            &self.index.candidates_by_pathogen,
            self.pathogen_key(name),
        )
    }

    /// Pinned authorities in EMA, FDA, WHO order, then the rest by label.
    pub fn partition_licensers(&self) -> (Vec<&Licenser>, Vec<&Licenser>) {
        let (mut pinned, mut others): (Vec<&Licenser>, Vec<&Licenser>) =
            self.licensers.iter().partition(|l| l.is_pinned());
        pinned.sort_by_key(|l| {
            PINNED_AUTHORITIES
                .iter()
                .position(|p| p.eq_ignore_ascii_case(l.acronym.trim()))
                .unwrap_or(PINNED_AUTHORITIES.len())
        });
        others.sort_by_cached_key(|l| l.label().to_lowercase());
        (pinned, others)
    }

    pub fn pathogen_page(&self, selection: &Selection) -> PathogenPage<'_> {
        let pathogen = selection
            .pathogen
            .as_deref()
            .and_then(|name| self.find_pathogen(name));
        let (vaccines, candidates) = match selection.pathogen.as_deref() {
            Some(name) => (
                self.vaccines_for_pathogen(name),
                self.candidates_for_pathogen(name),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let selected_vaccine = selection.vaccine.as_deref().and_then(|name| {
            vaccines
                .iter()
                .copied()
                .find(|v| v.id == name || v.brand_name.eq_ignore_ascii_case(name))
        });

        PathogenPage {
            pathogens: selection.filter(&self.pathogens),
            pathogen,
            vaccines,
            candidates,
            selected_vaccine,
        }
    }

    pub fn authority_page(&self, selection: &Selection) -> AuthorityPage<'_> {
        let (pinned, others) = self.partition_licensers();
        let licenser = selection
            .authority
            .as_deref()
            .and_then(|name| self.find_licenser(name));
        let vaccines = match selection.authority.as_deref() {
            Some(name) => self.vaccines_for_authority(name),
            None => Vec::new(),
        };
        let country_vaccines = selection
            .country
            .as_deref()
            .map(|c| self.vaccines_for_country(c))
            .unwrap_or_default();

        AuthorityPage {
            pinned: selection.filter(pinned),
            others: selection.filter(others),
            licenser,
            vaccines,
            country_vaccines,
        }
    }

    pub fn manufacturer_page(&self, selection: &Selection) -> ManufacturerPage<'_> {
        let manufacturer = selection
            .manufacturer
            .as_deref()
            .and_then(|name| self.find_manufacturer(name));
        let (licensed_vaccines, candidate_vaccines) = match selection.manufacturer.as_deref() {
            Some(name) => (
                self.vaccines_for_manufacturer(name),
                self.candidates_for_manufacturer(name),
            ),
            None => (Vec::new(), Vec::new()),
        };

        ManufacturerPage {
            manufacturers: selection.filter(&self.manufacturers),
            manufacturer,
            licensed_vaccines,
            candidate_vaccines,
        }
    }

    /// Compares vaccines by the product profiles embedded in the catalog.
    pub fn compare(&self, names: &[&str]) -> ComparisonTable {
        let columns: Vec<(&str, Option<&ProductProfile>)> = names
            .iter()
            .map(|name| match self.find_vaccine(name) {
                Some(v) => (v.brand_name.as_str(), v.product_profiles.first()),
                None => (*name, None),
            })
            .collect();
        ComparisonTable::build(&columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::view::AuthorityApproval;

    fn vaccine(id: &str, name: &str, pathogens: &[&str], authorities: &[&str]) -> Vaccine {
        Vaccine {
            id: id.to_string(),
            brand_name: name.to_string(),
            pathogens: pathogens.iter().map(|p| p.to_string()).collect(),
            authorities: authorities
                .iter()
                .map(|a| AuthorityApproval {
                    name: a.to_string(),
                    link: String::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn licenser(acronym: &str, full_name: &str, country: &str) -> Licenser {
        Licenser {
            acronym: acronym.to_string(),
            full_name: full_name.to_string(),
            country: country.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::build(NormalizedRecords {
            pathogens: vec![
                Pathogen {
                    name: "A".to_string(),
                    ..Default::default()
                },
                Pathogen {
                    name: "B".to_string(),
                    ..Default::default()
                },
            ],
            vaccines: vec![
                vaccine("1", "Alpha", &["A"], &["FDA", "Food and Drug Administration"]),
                vaccine("2", "Beta", &["B"], &["European Medicines Agency (EMA)"]),
            ],
            licensers: vec![
                licenser("TGA", "Therapeutic Goods Administration", "Australia"),
                licenser("FDA", "Food and Drug Administration", "United States"),
                licenser("WHO", "World Health Organization", ""),
                licenser("EMA", "European Medicines Agency", "European Union"),
            ],
            nitags: vec![Nitag {
                country: "Viet Nam".to_string(),
                available: true,
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    #[test]
    fn test_selecting_pathogen_yields_its_vaccines_only() {
        let catalog = catalog();
        let mut selection = Selection::new();
        selection.select_pathogen("A");

        let page = catalog.pathogen_page(&selection);
        assert_eq!(page.vaccines.len(), 1);
        assert_eq!(page.vaccines[0].brand_name, "Alpha");
        assert_eq!(page.pathogen.unwrap().name, "A");
        assert_eq!(page.pathogens.len(), 2);
    }

    #[test]
    fn test_authority_lookup_by_any_spelling() {
        let catalog = catalog();

        assert_eq!(catalog.vaccines_for_authority("FDA").len(), 1);
        assert_eq!(
            catalog
                .vaccines_for_authority("Food and Drug Administration")
                .len(),
            1
        );
        assert_eq!(catalog.vaccines_for_authority("EMA")[0].brand_name, "Beta");
        assert!(catalog.vaccines_for_authority("TGA").is_empty());
        assert!(catalog.vaccines_for_authority("Nobody").is_empty());
    }

    #[test]
    fn test_country_lookup_is_alias_aware() {
        let catalog = catalog();
        assert_eq!(catalog.vaccines_for_country("USA").len(), 1);
        assert_eq!(catalog.nitag_for_country("Vietnam").unwrap().country, "Viet Nam");
    }

    #[test]
    fn test_pinned_authorities_come_first_in_fixed_order() {
        let catalog = catalog();
        let (pinned, others) = catalog.partition_licensers();

        let pinned: Vec<&str> = pinned.iter().map(|l| l.label()).collect();
        let others: Vec<&str> = others.iter().map(|l| l.label()).collect();
        assert_eq!(pinned, vec!["EMA", "FDA", "WHO"]);
        assert_eq!(others, vec!["TGA"]);
    }

    #[test]
    fn test_authority_page_filters_lists() {
        let catalog = catalog();
        let mut selection = Selection::from_query("licenser=FDA&search=food");

        let page = catalog.authority_page(&selection);
        assert_eq!(page.licenser.unwrap().acronym, "FDA");
        assert_eq!(page.vaccines.len(), 1);
        assert_eq!(page.pinned.len(), 1);
        assert!(page.others.is_empty());

        selection.clear_filters();
        assert_eq!(catalog.authority_page(&selection).others.len(), 1);
    }

    #[test]
    fn test_empty_catalog_pages_are_empty() {
        let catalog = Catalog::default();
        let selection = Selection::from_query("pathogen=A&manufacturer=Acme");

        assert!(catalog.is_empty());
        assert!(catalog.pathogen_page(&selection).vaccines.is_empty());
        assert!(catalog.manufacturer_page(&selection).manufacturer.is_none());
        assert!(catalog.compare(&["Alpha", "Beta"]).is_empty());
    }
}
