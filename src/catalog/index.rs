//! Join/index builder.
//!
//! Maps natural keys (pathogen name, licenser acronym, licenser country, manufacturer name) to
//! positions in the catalog's record arrays. Joins are name based and heuristic; the matching
//! order below is part of the observable behaviour and must not be reordered.

use crate::catalog::pipeline::NormalizedRecords;
use crate::catalog::traits::CatalogStage;
use crate::catalog::view::{CandidateVaccine, Licenser, Vaccine};
use crate::catalog::Catalog;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct Bucket {
    positions: Vec<usize>,
    ids: HashSet<String>,
}

/// Key → record positions, each record at most once per key, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    entries: BTreeMap<String, Bucket>,
}

impl Buckets {
    /// Creates an empty bucket for `key` if none exists.
    pub fn ensure(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            self.entries.entry(key.to_string()).or_default();
        }
    }

    /// Adds the record at `position` under `key`. Returns `false` if `id` is already there.
    /// Records without an id are told apart by position.
    pub fn insert(&mut self, key: &str, id: &str, position: usize) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        let id = match id.trim() {
            "" => format!("#{}", position),
            id => id.to_lowercase(),
        };
        let bucket = self.entries.entry(key.to_string()).or_default();
        if !bucket.ids.insert(id) {
            return false;
        }
        bucket.positions.push(position);
        true
    }

    /// Positions stored under `key`, falling back to a case-insensitive key match.
    pub fn get(&self, key: &str) -> &[usize] {
        let key = key.trim();
        if let Some(bucket) = self.entries.get(key) {
            return &bucket.positions;
        }
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, b)| b.positions.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let key = key.trim();
        self.entries.keys().any(|k| k.eq_ignore_ascii_case(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which rule joined an authority name to a licenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorityMatch {
    Acronym,
    FullName,
    Composite,
    Contains,
}

fn contains_either(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

/// Finds the licenser an authority name refers to.
///
/// Rules are tried in order, each across all licensers, and the first hit wins:
/// 1. exact acronym
/// 2. exact full name
/// 3. exact `"full name (country)"` or `"full name (acronym)"`
/// 4. case-insensitive containment in either direction
pub fn match_authority(name: &str, licensers: &[Licenser]) -> Option<(usize, AuthorityMatch)> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if let Some(i) = licensers.iter().position(|l| l.acronym == name) {
        return Some((i, AuthorityMatch::Acronym));
    }
    if let Some(i) = licensers.iter().position(|l| l.full_name == name) {
        return Some((i, AuthorityMatch::FullName));
    }
    if let Some(i) = licensers.iter().position(|l| {
        !l.full_name.is_empty()
            && (format!("{} ({})", l.full_name, l.country) == name
                || format!("{} ({})", l.full_name, l.acronym) == name)
    }) {
        return Some((i, AuthorityMatch::Composite));
    }
    licensers
        .iter()
        .position(|l| contains_either(&l.full_name, name) || contains_either(&l.acronym, name))
        .map(|i| (i, AuthorityMatch::Contains))
}

/// Finds a name by exact, then case-insensitive, then substring match.
pub fn match_name<'a, I>(needle: &str, names: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let names: Vec<&str> = names.into_iter().map(str::trim).collect();
    names
        .iter()
        .position(|n| *n == needle)
        .or_else(|| names.iter().position(|n| n.eq_ignore_ascii_case(needle)))
        .or_else(|| names.iter().position(|n| contains_either(n, needle)))
}

/// Lookup structures over a catalog's records.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub by_pathogen: Buckets,
    /// Keyed by licenser label (acronym, or full name when the acronym is missing).
    pub by_authority: Buckets,
    pub by_country: Buckets,
    pub by_manufacturer: Buckets,
    pub candidates_by_manufacturer: Buckets,
    pub candidates_by_pathogen: Buckets,
}

impl CatalogIndex {
    pub fn build(
        pathogen_names: &[&str],
        manufacturer_names: &[&str],
        licensers: &[Licenser],
        vaccines: &[Vaccine],
        candidates: &[CandidateVaccine],
    ) -> Self {
        let mut index = CatalogIndex::default();

        for name in pathogen_names {
            index.by_pathogen.ensure(name);
            index.candidates_by_pathogen.ensure(name);
        }
        for name in manufacturer_names {
            index.by_manufacturer.ensure(name);
            index.candidates_by_manufacturer.ensure(name);
        }
        for licenser in licensers {
            index.by_authority.ensure(licenser.label());
            index.by_country.ensure(&licenser.country);
        }

        for (pos, vaccine) in vaccines.iter().enumerate() {
            let id = vaccine.dedup_key();

            for pathogen in &vaccine.pathogens {
                let key = match_name(pathogen, pathogen_names.iter().copied())
                    .map(|i| pathogen_names[i])
                    .unwrap_or(pathogen.as_str());
                index.by_pathogen.insert(key, id, pos);
            }

            for approval in &vaccine.authorities {
                match match_authority(&approval.name, licensers) {
                    Some((i, rule)) => {
                        let licenser = &licensers[i];
                        index.by_authority.insert(licenser.label(), id, pos);
                        index.by_country.insert(&licenser.country, id, pos);
                        debug!(
                            vaccine = %vaccine.brand_name,
                            authority = %approval.name,
                            licenser = %licenser.label(),
                            ?rule,
                            "Joined vaccine to licenser"
                        );
                    }
                    None => {
                        index.by_authority.insert(&approval.name, id, pos);
                    }
                }
            }

            for manufacturer in &vaccine.manufacturers {
                let key = match_name(manufacturer, manufacturer_names.iter().copied())
                    .map(|i| manufacturer_names[i])
                    .unwrap_or(manufacturer.as_str());
                index.by_manufacturer.insert(key, id, pos);
            }
        }

        for (pos, candidate) in candidates.iter().enumerate() {
            let id = candidate.dedup_key();
            for manufacturer in &candidate.manufacturers {
                let key = match_name(manufacturer, manufacturer_names.iter().copied())
                    .map(|i| manufacturer_names[i])
                    .unwrap_or(manufacturer.as_str());
                index.candidates_by_manufacturer.insert(key, &id, pos);
            }
            let key = match_name(&candidate.pathogen_name, pathogen_names.iter().copied())
                .map(|i| pathogen_names[i])
                .unwrap_or(candidate.pathogen_name.as_str());
            index.candidates_by_pathogen.insert(key, &id, pos);
        }

        index
    }
}

/// Index stage of the catalog pipeline.
pub struct IndexBuilder;

impl CatalogStage for IndexBuilder {
    type Input = NormalizedRecords;
    type Output = Catalog;

    fn execute(&self, input: Self::Input) -> Self::Output {
        let pathogen_names: Vec<&str> = input.pathogens.iter().map(|p| p.name.as_str()).collect();
        let manufacturer_names: Vec<&str> = input
            .manufacturers
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        let index = CatalogIndex::build(
            &pathogen_names,
            &manufacturer_names,
            &input.licensers,
            &input.vaccines,
            &input.candidates,
        );
        Catalog::from_parts(input, index)
    }

    fn stage_name(&self) -> &'static str {
        "index"
    }
}
