//! Country names for the world map layer.
//!
//! Map geometry uses Natural Earth short names ("United States of America", "Dem. Rep. Congo")
//! while the API uses its own spellings. The alias table maps both onto one canonical name.

use crate::catalog::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;

/// `(alias, canonical)` pairs. Matching is case-insensitive.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("United States of America", "United States"),
    ("USA", "United States"),
    ("US", "United States"),
    ("United Kingdom of Great Britain and Northern Ireland", "United Kingdom"),
    ("UK", "United Kingdom"),
    ("Russian Federation", "Russia"),
    ("Dem. Rep. Congo", "Democratic Republic of the Congo"),
    ("DR Congo", "Democratic Republic of the Congo"),
    ("Congo, Dem. Rep.", "Democratic Republic of the Congo"),
    ("Congo", "Republic of the Congo"),
    ("Central African Rep.", "Central African Republic"),
    ("Dominican Rep.", "Dominican Republic"),
    ("Eq. Guinea", "Equatorial Guinea"),
    ("S. Sudan", "South Sudan"),
    ("Bosnia and Herz.", "Bosnia and Herzegovina"),
    ("Macedonia", "North Macedonia"),
    ("Czechia", "Czech Republic"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Cote d'Ivoire", "Ivory Coast"),
    ("Lao PDR", "Laos"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Viet Nam", "Vietnam"),
    ("Korea", "South Korea"),
    ("Republic of Korea", "South Korea"),
    ("Dem. Rep. Korea", "North Korea"),
    ("Democratic People's Republic of Korea", "North Korea"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Syrian Arab Republic", "Syria"),
    ("United Republic of Tanzania", "Tanzania"),
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Venezuela (Bolivarian Republic of)", "Venezuela"),
    ("Republic of Moldova", "Moldova"),
    ("Brunei Darussalam", "Brunei"),
    ("eSwatini", "Eswatini"),
    ("Swaziland", "Eswatini"),
    ("Solomon Is.", "Solomon Islands"),
    ("Falkland Is.", "Falkland Islands"),
    ("W. Sahara", "Western Sahara"),
    ("Timor-Leste", "East Timor"),
    ("Cabo Verde", "Cape Verde"),
    ("Türkiye", "Turkey"),
    ("The Gambia", "Gambia"),
    ("The Bahamas", "Bahamas"),
    ("EU", "European Union"),
];

/// Canonical spelling of a country name; unknown names are returned trimmed.
pub fn canonical_country(name: &str) -> String {
    let name = name.trim();
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Whether two spellings name the same country.
pub fn same_country(a: &str, b: &str) -> bool {
    let (a, b) = (canonical_country(a), canonical_country(b));
    !a.is_empty() && a.eq_ignore_ascii_case(&b)
}

/// What the map shows for one country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryStatus {
    pub country: String,
    pub has_nitag: bool,
    pub nitag_available: bool,
    pub nitag_established: Option<i32>,
    /// Labels of licensers based in the country.
    pub authorities: Vec<String>,
    /// Vaccines licensed by those authorities.
    pub licensed_vaccines: usize,
}

/// Per-country status keyed by canonical country name.
pub fn map_layer(catalog: &Catalog) -> BTreeMap<String, CountryStatus> {
    let mut layer: BTreeMap<String, CountryStatus> = BTreeMap::new();

    for nitag in catalog.nitags() {
        let country = canonical_country(&nitag.country);
        if country.is_empty() {
            continue;
        }
        let status = layer.entry(country.clone()).or_insert_with(|| CountryStatus {
            country,
            ..Default::default()
        });
        status.has_nitag = true;
        status.nitag_available |= nitag.available;
        status.nitag_established = status.nitag_established.or(nitag.established);
    }

    for licenser in catalog.licensers() {
        let country = canonical_country(&licenser.country);
        if country.is_empty() {
            continue;
        }
        let licensed = catalog.vaccines_for_authority(licenser.label()).len();
        let status = layer.entry(country.clone()).or_insert_with(|| CountryStatus {
            country,
            ..Default::default()
        });
        status.authorities.push(licenser.label().to_string());
        status.licensed_vaccines += licensed;
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_country_resolves_aliases() {
        assert_eq!(canonical_country("United States of America"), "United States");
        assert_eq!(canonical_country("dem. rep. congo"), "Democratic Republic of the Congo");
        assert_eq!(canonical_country(" Kenya "), "Kenya");
        assert_eq!(canonical_country(""), "");
    }

    #[test]
    fn test_same_country() {
        assert!(same_country("USA", "united states"));
        assert!(same_country("Viet Nam", "Vietnam"));
        assert!(!same_country("Niger", "Nigeria"));
        assert!(!same_country("", ""));
    }
}
