//! Canonical view models.
//!
//! Every field is populated: missing text is `""`, missing lists are empty.

use serde::{Deserialize, Serialize};

/// Acronyms of the authorities listed ahead of all others.
pub const PINNED_AUTHORITIES: [&str; 3] = ["EMA", "FDA", "WHO"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccineKind {
    Single,
    Combination,
    #[default]
    Unknown,
}

/// One regulatory approval of a vaccine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityApproval {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: String,
    pub brand_name: String,
    pub kind: VaccineKind,
    pub pathogens: Vec<String>,
    /// Comma-joined pathogen names.
    pub pathogen_display: String,
    pub manufacturers: Vec<String>,
    /// Comma-joined manufacturer names.
    pub manufacturer_display: String,
    pub authorities: Vec<AuthorityApproval>,
    pub product_profiles: Vec<ProductProfile>,
    pub licensing_dates: Vec<LicensingDate>,
    pub link: String,
}

impl Vaccine {
    pub fn authority_names(&self) -> Vec<&str> {
        self.authorities.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn authority_links(&self) -> Vec<&str> {
        self.authorities.iter().map(|a| a.link.as_str()).collect()
    }

    /// First pathogen, used for linking. Empty when there is none.
    pub fn first_pathogen(&self) -> &str {
        self.pathogens.first().map(String::as_str).unwrap_or("")
    }

    /// First manufacturer, used for linking. Empty when there is none.
    pub fn first_manufacturer(&self) -> &str {
        self.manufacturers.first().map(String::as_str).unwrap_or("")
    }

    /// Key used for deduplication when the API omits ids.
    pub fn dedup_key(&self) -> &str {
        if self.id.is_empty() {
            &self.brand_name
        } else {
            &self.id
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pathogen {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licenser {
    pub id: String,
    pub acronym: String,
    pub region: String,
    pub country: String,
    pub full_name: String,
    pub description: String,
    pub website: String,
}

impl Licenser {
    pub fn is_pinned(&self) -> bool {
        PINNED_AUTHORITIES
            .iter()
            .any(|p| p.eq_ignore_ascii_case(self.acronym.trim()))
    }

    /// Acronym when present, full name otherwise.
    pub fn label(&self) -> &str {
        if self.acronym.is_empty() {
            &self.full_name
        } else {
            &self.acronym
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub history: String,
    pub founded: String,
    pub headquarters: String,
    pub ceo: String,
    pub revenue: String,
    pub operating_income: String,
    pub net_income: String,
    pub total_assets: String,
    pub total_equity: String,
    pub website: String,
    pub licensed_vaccines: Vec<Vaccine>,
    pub candidate_vaccines: Vec<CandidateVaccine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClinicalPhase {
    I,
    II,
    III,
    IV,
}

/// A candidate's manufacturer placed in the column of its clinical phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBuckets {
    pub phase_i: Option<String>,
    pub phase_ii: Option<String>,
    pub phase_iii: Option<String>,
    pub phase_iv: Option<String>,
}

impl PhaseBuckets {
    pub fn phase(&self) -> Option<ClinicalPhase> {
        if self.phase_iv.is_some() {
            Some(ClinicalPhase::IV)
        } else if self.phase_iii.is_some() {
            Some(ClinicalPhase::III)
        } else if self.phase_ii.is_some() {
            Some(ClinicalPhase::II)
        } else if self.phase_i.is_some() {
            Some(ClinicalPhase::I)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateVaccine {
    pub id: String,
    pub pathogen_name: String,
    pub name: String,
    pub manufacturers: Vec<String>,
    pub manufacturer_display: String,
    pub clinical_phase: String,
    pub phases: PhaseBuckets,
    pub link: String,
    pub last_updated: String,
}

impl CandidateVaccine {
    /// Key used for deduplication when the API omits ids; `""` when there is nothing to key on.
    pub fn dedup_key(&self) -> String {
        if !self.id.is_empty() {
            self.id.clone()
        } else if self.name.is_empty() {
            String::new()
        } else {
            format!("{}|{}", self.name, self.manufacturer_display)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nitag {
    pub id: String,
    pub country: String,
    pub name: String,
    pub available: bool,
    pub website: String,
    pub established: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub id: String,
    pub vaccine_name: String,
    /// Issuing authority.
    pub profile_type: String,
    pub name: String,
    pub composition: String,
    pub strain_coverage: String,
    pub indication: String,
    pub contraindication: String,
    pub dosing: String,
    pub immunogenicity: String,
    pub efficacy: String,
    pub duration_of_protection: String,
    pub co_administration: String,
    pub reactogenicity: String,
    pub safety: String,
    pub vaccination_goal: String,
    pub others: String,
}

impl ProductProfile {
    /// Labelled fields in display order.
    pub fn fields(&self) -> [(&'static str, &str); 13] {
        [
            ("Composition", self.composition.as_str()),
            ("Strain coverage", self.strain_coverage.as_str()),
            ("Indication", self.indication.as_str()),
            ("Contraindication", self.contraindication.as_str()),
            ("Dosing", self.dosing.as_str()),
            ("Immunogenicity", self.immunogenicity.as_str()),
            ("Efficacy", self.efficacy.as_str()),
            ("Duration of protection", self.duration_of_protection.as_str()),
            ("Co-administration", self.co_administration.as_str()),
            ("Reactogenicity", self.reactogenicity.as_str()),
            ("Safety", self.safety.as_str()),
            ("Vaccination goal", self.vaccination_goal.as_str()),
            ("Others", self.others.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensingDate {
    pub id: String,
    pub vaccine_name: String,
    pub authority: String,
    pub date_type: String,
    pub approval_date: String,
    pub source: String,
    pub last_updated: String,
}

/// Pathogen page: filtered pathogen list plus the selected pathogen's vaccines.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathogenPage<'a> {
    pub pathogens: Vec<&'a Pathogen>,
    pub pathogen: Option<&'a Pathogen>,
    pub vaccines: Vec<&'a Vaccine>,
    pub candidates: Vec<&'a CandidateVaccine>,
    pub selected_vaccine: Option<&'a Vaccine>,
}

/// Authority page: pinned and other licensers plus the selected licenser's vaccines.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorityPage<'a> {
    pub pinned: Vec<&'a Licenser>,
    pub others: Vec<&'a Licenser>,
    pub licenser: Option<&'a Licenser>,
    pub vaccines: Vec<&'a Vaccine>,
    /// Vaccines licensed in the selected country, by any authority based there.
    pub country_vaccines: Vec<&'a Vaccine>,
}

/// Manufacturer page: filtered manufacturer list plus the selected manufacturer's portfolio.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManufacturerPage<'a> {
    pub manufacturers: Vec<&'a Manufacturer>,
    pub manufacturer: Option<&'a Manufacturer>,
    pub licensed_vaccines: Vec<&'a Vaccine>,
    pub candidate_vaccines: Vec<&'a CandidateVaccine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub field: String,
    /// One value per compared vaccine, `""` where the profile says nothing.
    pub values: Vec<String>,
}

/// Side-by-side product profiles, one column per vaccine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    pub vaccines: Vec<String>,
    /// Authority whose profile fills each column, `""` when a vaccine has none.
    pub sources: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Builds the table from each vaccine's highest-priority profile. Rows empty in every
    /// column are dropped.
    pub fn build(columns: &[(&str, Option<&ProductProfile>)]) -> Self {
        let vaccines = columns.iter().map(|(name, _)| name.to_string()).collect();
        let sources = columns
            .iter()
            .map(|(_, p)| p.map(|p| p.profile_type.clone()).unwrap_or_default())
            .collect();

        let labels = ProductProfile::default().fields().map(|(label, _)| label);
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, label)| ComparisonRow {
                field: label.to_string(),
                values: columns
                    .iter()
                    .map(|(_, p)| p.map(|p| p.fields()[i].1.to_string()).unwrap_or_default())
                    .collect(),
            })
            .filter(|row| row.values.iter().any(|v| !v.is_empty()))
            .collect();

        Self {
            vaccines,
            sources,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_authorities() {
        let fda = Licenser {
            acronym: "fda".to_string(),
            ..Default::default()
        };
        let tga = Licenser {
            acronym: "TGA".to_string(),
            ..Default::default()
        };
        assert!(fda.is_pinned());
        assert!(!tga.is_pinned());
    }

    #[test]
    fn test_authority_arrays_are_parallel() {
        let vaccine = Vaccine {
            authorities: vec![
                AuthorityApproval {
                    name: "FDA".to_string(),
                    link: "https://fda.gov".to_string(),
                },
                AuthorityApproval {
                    name: "EMA".to_string(),
                    link: String::new(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(vaccine.authority_names(), vec!["FDA", "EMA"]);
        assert_eq!(vaccine.authority_links(), vec!["https://fda.gov", ""]);
    }

    #[test]
    fn test_comparison_table_drops_empty_rows() {
        let ema = ProductProfile {
            profile_type: "EMA".to_string(),
            efficacy: "97%".to_string(),
            ..Default::default()
        };
        let who = ProductProfile {
            profile_type: "WHO".to_string(),
            dosing: "Single dose".to_string(),
            ..Default::default()
        };

        let table =
            ComparisonTable::build(&[("Ervebo", Some(&ema)), ("Zabdeno", Some(&who)), ("X", None)]);

        assert_eq!(table.vaccines, vec!["Ervebo", "Zabdeno", "X"]);
        assert_eq!(table.sources, vec!["EMA", "WHO", ""]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].field, "Dosing");
        assert_eq!(table.rows[0].values, vec!["", "Single dose", ""]);
        assert_eq!(table.rows[1].field, "Efficacy");
        assert_eq!(table.rows[1].values, vec!["97%", "", ""]);
    }

    #[test]
    fn test_phase_buckets_report_highest_phase() {
        let buckets = PhaseBuckets {
            phase_ii: Some("Acme".to_string()),
            ..Default::default()
        };
        assert_eq!(buckets.phase(), Some(ClinicalPhase::II));
        assert_eq!(PhaseBuckets::default().phase(), None);
    }
}
