//! View-model normalizer.
//!
//! Converts raw API records into canonical views. Nothing here fails: malformed or missing input
//! degrades to empty strings, empty lists or `None`.

use crate::catalog::pipeline::{NormalizedRecords, RawCollections};
use crate::catalog::traits::CatalogStage;
use crate::catalog::view::{
    AuthorityApproval, CandidateVaccine, ClinicalPhase, Licenser, LicensingDate, Manufacturer,
    Nitag, Pathogen, PhaseBuckets, ProductProfile, Vaccine, VaccineKind,
};
use crate::model::{
    Flag, NameEntry, NameField, RawCandidateVaccine, RawLicenser, RawLicensingDate,
    RawManufacturer, RawNitag, RawPathogen, RawProductProfile, RawVaccine, Scalar,
};
use std::collections::HashMap;

/// Trimmed text, or `""` when absent.
pub fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn scalar_text(value: &Option<Scalar>) -> String {
    value.as_ref().map(Scalar::to_text).unwrap_or_default()
}

/// Flattens a name field into individual names. A single string is split on commas; list
/// elements and named objects are kept whole.
pub fn name_list(field: Option<&NameField>) -> Vec<String> {
    match field {
        Some(NameField::One(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => other.names(),
        None => Vec::new(),
    }
}

/// Comma-joined display string: `"X, Y"` and `["X", "Y"]` both give `"X, Y"`.
pub fn display_names(field: Option<&NameField>) -> String {
    name_list(field).join(", ")
}

/// First name of a string-or-list field, for linking.
pub fn first_name(field: Option<&NameField>) -> String {
    name_list(field).into_iter().next().unwrap_or_default()
}

pub fn classify_kind(vaccine_type: &str) -> VaccineKind {
    let lowered = vaccine_type.to_lowercase();
    if lowered.contains("combination") {
        VaccineKind::Combination
    } else if lowered.contains("single") {
        VaccineKind::Single
    } else {
        VaccineKind::Unknown
    }
}

fn phase_token(token: &str) -> Option<ClinicalPhase> {
    let stem = token
        .strip_suffix('a')
        .or_else(|| token.strip_suffix('b'))
        .filter(|s| !s.is_empty())
        .unwrap_or(token);
    match stem {
        "i" | "1" => Some(ClinicalPhase::I),
        "ii" | "2" => Some(ClinicalPhase::II),
        "iii" | "3" => Some(ClinicalPhase::III),
        "iv" | "4" => Some(ClinicalPhase::IV),
        _ => None,
    }
}

/// Clinical phase named right after the word "phase", e.g. `"Phase III"`, `"Phase 1/2"` or
/// `"Phase II-III"`. A run of numerals joined by `/` or `-` resolves to the highest one; the run
/// ends at the first other token, so later numbers in the text are ignored.
pub fn parse_phase(phase: &str) -> Option<ClinicalPhase> {
    let lowered = phase.to_lowercase();
    let rest = match lowered.find("phase") {
        Some(i) => &lowered[i + "phase".len()..],
        None => lowered.as_str(),
    };

    let mut remaining =
        rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
    let mut highest = None;
    loop {
        let end = remaining
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(remaining.len());
        let Some(found) = phase_token(&remaining[..end]) else {
            break;
        };
        highest = highest.max(Some(found));

        let after = remaining[end..].trim_start();
        match after.strip_prefix('/').or_else(|| after.strip_prefix('-')) {
            Some(next) => remaining = next.trim_start(),
            None => break,
        }
    }
    highest
}

/// Places `manufacturer` in the bucket of the phase parsed from `phase`.
pub fn phase_buckets(phase: &str, manufacturer: &str) -> PhaseBuckets {
    let mut buckets = PhaseBuckets::default();
    let name = Some(manufacturer.to_string());
    match parse_phase(phase) {
        Some(ClinicalPhase::I) => buckets.phase_i = name,
        Some(ClinicalPhase::II) => buckets.phase_ii = name,
        Some(ClinicalPhase::III) => buckets.phase_iii = name,
        Some(ClinicalPhase::IV) => buckets.phase_iv = name,
        None => {}
    }
    buckets
}

fn flag(value: &Option<Flag>) -> bool {
    match value {
        Some(Flag::Bool(b)) => *b,
        Some(Flag::Number(n)) => *n != 0,
        Some(Flag::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "y" | "true" | "1" | "available"
        ),
        None => false,
    }
}

fn year(value: &Option<Scalar>) -> Option<i32> {
    match value.as_ref()? {
        Scalar::Int(i) => i32::try_from(*i).ok(),
        Scalar::Float(f) if f.is_finite() => Some(*f as i32),
        Scalar::Float(_) => None,
        Scalar::Text(s) => s.trim().parse().ok(),
    }
}

/// Sort rank of a profile's issuing authority: EMA, WHO, FDA, then everything else.
pub fn profile_rank(profile_type: &str) -> u8 {
    match profile_type.trim().to_uppercase().as_str() {
        "EMA" => 0,
        "WHO" => 1,
        "FDA" => 2,
        _ => 3,
    }
}

/// Stable sort into EMA > WHO > FDA > others.
pub fn sort_profiles(profiles: &mut [ProductProfile]) {
    profiles.sort_by_key(|p| profile_rank(&p.profile_type));
}

pub fn normalize_profile(raw: &RawProductProfile) -> ProductProfile {
    ProductProfile {
        id: raw.id.clone(),
        vaccine_name: text(&raw.vaccine_name),
        profile_type: text(&raw.profile_type),
        name: text(&raw.name),
        composition: text(&raw.composition),
        strain_coverage: text(&raw.strain_coverage),
        indication: text(&raw.indication),
        contraindication: text(&raw.contraindication),
        dosing: text(&raw.dosing),
        immunogenicity: text(&raw.immunogenicity),
        efficacy: text(&raw.efficacy),
        duration_of_protection: text(&raw.duration_of_protection),
        co_administration: text(&raw.co_administration),
        reactogenicity: text(&raw.reactogenicity),
        safety: text(&raw.safety),
        vaccination_goal: text(&raw.vaccination_goal),
        others: text(&raw.others),
    }
}

pub fn normalize_profiles(raw: &[RawProductProfile]) -> Vec<ProductProfile> {
    let mut profiles: Vec<ProductProfile> = raw.iter().map(normalize_profile).collect();
    sort_profiles(&mut profiles);
    profiles
}

pub fn normalize_licensing_date(raw: &RawLicensingDate) -> LicensingDate {
    LicensingDate {
        id: raw.id.clone(),
        vaccine_name: text(&raw.vaccine_name),
        authority: text(&raw.name),
        date_type: text(&raw.date_type),
        approval_date: text(&raw.approval_date),
        source: text(&raw.source),
        last_updated: text(&raw.last_updated),
    }
}

/// Adds an approval, or fills in its link if the authority is already listed without one.
fn push_approval(approvals: &mut Vec<AuthorityApproval>, name: &str, link: &str) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    match approvals
        .iter_mut()
        .find(|a| a.name.eq_ignore_ascii_case(name))
    {
        Some(existing) => {
            if existing.link.is_empty() {
                existing.link = link.trim().to_string();
            }
        }
        None => approvals.push(AuthorityApproval {
            name: name.to_string(),
            link: link.trim().to_string(),
        }),
    }
}

/// Collects approvals from licensing dates, parallel name/link arrays and licenser references.
fn approvals(raw: &RawVaccine, dates: &[LicensingDate]) -> Vec<AuthorityApproval> {
    let mut approvals = Vec::new();

    for date in dates {
        push_approval(&mut approvals, &date.authority, &date.source);
    }

    let names = name_list(raw.authority_names.as_ref());
    let links = raw
        .authority_links
        .as_ref()
        .map(NameField::names)
        .unwrap_or_default();
    for (i, name) in names.iter().enumerate() {
        let link = links.get(i).map(String::as_str).unwrap_or("");
        push_approval(&mut approvals, name, link);
    }

    let refs: Vec<(&str, &str)> = match &raw.licensers {
        Some(NameField::Many(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let link = match entry {
                    NameEntry::Named(r) => r.website.as_deref().unwrap_or(""),
                    NameEntry::Plain(_) => "",
                };
                entry.label().map(|label| (label, link))
            })
            .collect(),
        Some(NameField::Named(r)) => r
            .label()
            .map(|label| (label, r.website.as_deref().unwrap_or("")))
            .into_iter()
            .collect(),
        Some(NameField::One(_)) | None => Vec::new(),
    };
    for (name, link) in refs {
        push_approval(&mut approvals, name, link);
    }
    if let Some(NameField::One(_)) = &raw.licensers {
        for name in name_list(raw.licensers.as_ref()) {
            push_approval(&mut approvals, &name, "");
        }
    }

    approvals
}

/// Normalizes a vaccine. `pathogen_hint` and `manufacturer_hint` fill in names the nested API
/// shapes leave implicit.
pub fn normalize_vaccine(
    raw: &RawVaccine,
    pathogen_hint: Option<&str>,
    manufacturer_hint: Option<&str>,
) -> Vaccine {
    let mut pathogens = name_list(raw.pathogens.as_ref());
    if pathogens.is_empty() {
        pathogens.extend(hint(pathogen_hint));
    }
    let mut manufacturers = name_list(raw.manufacturers.as_ref());
    if manufacturers.is_empty() {
        manufacturers.extend(hint(manufacturer_hint));
    }

    let licensing_dates: Vec<LicensingDate> = raw
        .licensing_dates
        .iter()
        .map(normalize_licensing_date)
        .collect();

    Vaccine {
        id: raw.id.clone(),
        brand_name: text(&raw.name),
        kind: classify_kind(raw.vaccine_type.as_deref().unwrap_or("")),
        pathogen_display: pathogens.join(", "),
        pathogens,
        manufacturer_display: manufacturers.join(", "),
        manufacturers,
        authorities: approvals(raw, &licensing_dates),
        product_profiles: normalize_profiles(&raw.product_profiles),
        licensing_dates,
        link: text(&raw.link),
    }
}

fn hint(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn push_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !target.iter().any(|t| t.eq_ignore_ascii_case(value)) {
            target.push(value.clone());
        }
    }
}

/// Folds `other` into `into`; both describe the same vaccine.
pub fn merge_vaccine(into: &mut Vaccine, other: &Vaccine) {
    push_unique(&mut into.pathogens, &other.pathogens);
    into.pathogen_display = into.pathogens.join(", ");
    push_unique(&mut into.manufacturers, &other.manufacturers);
    into.manufacturer_display = into.manufacturers.join(", ");
    for approval in &other.authorities {
        push_approval(&mut into.authorities, &approval.name, &approval.link);
    }
    if into.kind == VaccineKind::Unknown {
        into.kind = other.kind;
    }
    if into.brand_name.is_empty() {
        into.brand_name = other.brand_name.clone();
    }
    if into.link.is_empty() {
        into.link = other.link.clone();
    }
    if into.product_profiles.is_empty() {
        into.product_profiles = other.product_profiles.clone();
    }
    if into.licensing_dates.is_empty() {
        into.licensing_dates = other.licensing_dates.clone();
    }
}

/// Deduplicates vaccines by id (or brand name when ids are missing), merging duplicates.
pub fn merge_vaccines(vaccines: Vec<Vaccine>) -> Vec<Vaccine> {
    let mut merged: Vec<Vaccine> = Vec::with_capacity(vaccines.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for vaccine in vaccines {
        let key = vaccine.dedup_key().to_lowercase();
        if key.is_empty() {
            merged.push(vaccine);
            continue;
        }
        match positions.get(&key) {
            Some(&pos) => merge_vaccine(&mut merged[pos], &vaccine),
            None => {
                positions.insert(key, merged.len());
                merged.push(vaccine);
            }
        }
    }
    merged
}

pub fn normalize_pathogen(raw: &RawPathogen) -> (Pathogen, Vec<Vaccine>) {
    let pathogen = Pathogen {
        id: raw.id.clone(),
        name: text(&raw.name),
        description: text(&raw.description),
        image: text(&raw.image),
    };
    let vaccines = raw
        .vaccines
        .iter()
        .map(|v| normalize_vaccine(v, Some(&pathogen.name), None))
        .collect();
    (pathogen, vaccines)
}

pub fn normalize_licenser(raw: &RawLicenser) -> Licenser {
    Licenser {
        id: raw.id.clone(),
        acronym: text(&raw.acronym),
        region: text(&raw.region),
        country: text(&raw.country),
        full_name: text(&raw.full_name),
        description: text(&raw.description),
        website: text(&raw.website),
    }
}

pub fn normalize_candidate(
    raw: &RawCandidateVaccine,
    manufacturer_hint: Option<&str>,
) -> CandidateVaccine {
    let mut manufacturers = name_list(raw.manufacturer.as_ref());
    if manufacturers.is_empty() {
        manufacturers.extend(hint(manufacturer_hint));
    }
    let manufacturer_display = manufacturers.join(", ");
    let clinical_phase = text(&raw.clinical_phase);

    CandidateVaccine {
        id: raw.id.clone(),
        pathogen_name: text(&raw.pathogen_name),
        name: text(&raw.name),
        phases: phase_buckets(&clinical_phase, &manufacturer_display),
        manufacturers,
        manufacturer_display,
        clinical_phase,
        link: text(&raw.link),
        last_updated: text(&raw.last_updated),
    }
}

pub fn normalize_manufacturer(raw: &RawManufacturer) -> Manufacturer {
    let name = text(&raw.name);
    Manufacturer {
        id: raw.id.clone(),
        description: text(&raw.description),
        history: text(&raw.history),
        founded: scalar_text(&raw.founded),
        headquarters: text(&raw.headquarters),
        ceo: text(&raw.ceo),
        revenue: scalar_text(&raw.revenue),
        operating_income: scalar_text(&raw.operating_income),
        net_income: scalar_text(&raw.net_income),
        total_assets: scalar_text(&raw.total_assets),
        total_equity: scalar_text(&raw.total_equity),
        website: text(&raw.website),
        licensed_vaccines: raw
            .licensed_vaccines
            .iter()
            .map(|v| normalize_vaccine(v, None, Some(&name)))
            .collect(),
        candidate_vaccines: raw
            .candidate_vaccines
            .iter()
            .map(|c| normalize_candidate(c, Some(&name)))
            .collect(),
        name,
    }
}

pub fn normalize_nitag(raw: &RawNitag) -> Nitag {
    Nitag {
        id: raw.id.clone(),
        country: text(&raw.country),
        name: text(&raw.name),
        available: flag(&raw.available),
        website: text(&raw.website),
        established: year(&raw.established),
    }
}

fn by_name<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| name(item).to_lowercase());
}

/// Normalization stage of the catalog pipeline.
pub struct Normalizer;

impl CatalogStage for Normalizer {
    type Input = RawCollections;
    type Output = NormalizedRecords;

    fn execute(&self, input: Self::Input) -> Self::Output {
        let mut pathogens = Vec::with_capacity(input.pathogens.len());
        let mut vaccines = Vec::new();
        for raw in &input.pathogens {
            let (pathogen, nested) = normalize_pathogen(raw);
            pathogens.push(pathogen);
            vaccines.extend(nested);
        }
        vaccines.extend(input.vaccines.iter().map(|v| normalize_vaccine(v, None, None)));

        let mut manufacturers: Vec<Manufacturer> = input
            .manufacturers
            .iter()
            .map(normalize_manufacturer)
            .collect();
        for manufacturer in &manufacturers {
            vaccines.extend(manufacturer.licensed_vaccines.iter().cloned());
        }
        let vaccines = merge_vaccines(vaccines);

        let mut candidates: Vec<CandidateVaccine> = input
            .candidates
            .iter()
            .map(|c| normalize_candidate(c, None))
            .collect();
        for manufacturer in &manufacturers {
            candidates.extend(manufacturer.candidate_vaccines.iter().cloned());
        }
        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| {
            let key = c.dedup_key().to_lowercase();
            key.is_empty() || seen.insert(key)
        });

        let licensers = input.licensers.iter().map(normalize_licenser).collect();
        let mut nitags: Vec<Nitag> = input.nitags.iter().map(normalize_nitag).collect();

        by_name(&mut pathogens, |p| p.name.as_str());
        by_name(&mut manufacturers, |m| m.name.as_str());
        by_name(&mut nitags, |n| n.country.as_str());

        NormalizedRecords {
            pathogens,
            vaccines,
            licensers,
            manufacturers,
            candidates,
            nitags,
        }
    }

    fn stage_name(&self) -> &'static str {
        "normalize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_list_manufacturers_display_identically() {
        let from_string = NameField::from("X, Y");
        let from_list = NameField::from(vec!["X", "Y"]);

        assert_eq!(display_names(Some(&from_string)), "X, Y");
        assert_eq!(display_names(Some(&from_list)), "X, Y");
        assert_eq!(first_name(Some(&from_string)), "X");
        assert_eq!(first_name(Some(&from_list)), "X");
        assert_eq!(display_names(None), "");
    }

    #[test]
    fn test_phase_iii_bucket() {
        let buckets = phase_buckets("Phase III", "Acme");
        assert_eq!(
            buckets,
            PhaseBuckets {
                phase_i: None,
                phase_ii: None,
                phase_iii: Some("Acme".to_string()),
                phase_iv: None,
            }
        );
    }

    #[test]
    fn test_phase_parsing_variants() {
        assert_eq!(parse_phase("Phase I"), Some(ClinicalPhase::I));
        assert_eq!(parse_phase("phase iv"), Some(ClinicalPhase::IV));
        assert_eq!(parse_phase("Phase 1/2"), Some(ClinicalPhase::II));
        assert_eq!(parse_phase("Phase IIb"), Some(ClinicalPhase::II));
        assert_eq!(parse_phase("Approved in 3 regions, Phase I"), Some(ClinicalPhase::I));
        assert_eq!(parse_phase("Phase II/III"), Some(ClinicalPhase::III));
        assert_eq!(parse_phase("Phase 2 - 3"), Some(ClinicalPhase::III));
        assert_eq!(parse_phase("Phase: IV"), Some(ClinicalPhase::IV));
        assert_eq!(parse_phase("Preclinical"), None);
        assert_eq!(parse_phase(""), None);
    }

    #[test]
    fn test_later_numbers_do_not_override_phase() {
        assert_eq!(parse_phase("Phase I (2 sites)"), Some(ClinicalPhase::I));
        assert_eq!(parse_phase("Phase II, 4 arms"), Some(ClinicalPhase::II));
        assert_eq!(parse_phase("Phase 1 trial with 3 cohorts"), Some(ClinicalPhase::I));
        assert_eq!(
            phase_buckets("Phase I (2 sites)", "Acme").phase_i.as_deref(),
            Some("Acme")
        );
    }

    #[test]
    fn test_list_elements_are_not_split_on_commas() {
        let listed = NameField::from(vec!["Merck Sharp & Dohme, LLC"]);
        assert_eq!(name_list(Some(&listed)), vec!["Merck Sharp & Dohme, LLC"]);

        let joined = NameField::from("Merck Sharp & Dohme, LLC");
        assert_eq!(name_list(Some(&joined)), vec!["Merck Sharp & Dohme", "LLC"]);

        let raw: RawVaccine = serde_json::from_value(serde_json::json!({
            "name": "Ervebo",
            "manufacturers": [{"name": "Merck Sharp & Dohme, LLC"}]
        }))
        .unwrap();
        let vaccine = normalize_vaccine(&raw, None, None);
        assert_eq!(vaccine.manufacturers, vec!["Merck Sharp & Dohme, LLC"]);
    }

    #[test]
    fn test_single_object_pathogen_and_licenser() {
        let raw: RawVaccine = serde_json::from_value(serde_json::json!({
            "vaccineId": 1,
            "name": "Ervebo",
            "pathogen": {"name": "Ebola"},
            "licensers": {"acronym": "EMA", "website": "https://ema.europa.eu"}
        }))
        .unwrap();

        let vaccine = normalize_vaccine(&raw, None, None);
        assert_eq!(vaccine.pathogens, vec!["Ebola"]);
        assert_eq!(vaccine.authority_names(), vec!["EMA"]);
        assert_eq!(vaccine.authority_links(), vec!["https://ema.europa.eu"]);
    }

    #[test]
    fn test_classify_kind() {
        assert_eq!(classify_kind("Single Pathogen Vaccine"), VaccineKind::Single);
        assert_eq!(classify_kind("COMBINATION"), VaccineKind::Combination);
        assert_eq!(classify_kind(""), VaccineKind::Unknown);
    }

    #[test]
    fn test_vaccine_defaults_when_fields_missing() {
        let vaccine = normalize_vaccine(&RawVaccine::default(), None, None);
        assert_eq!(vaccine.brand_name, "");
        assert_eq!(vaccine.pathogen_display, "");
        assert!(vaccine.pathogens.is_empty());
        assert!(vaccine.authorities.is_empty());
        assert_eq!(vaccine.kind, VaccineKind::Unknown);
    }

    #[test]
    fn test_approvals_from_all_sources_stay_parallel() {
        let raw: RawVaccine = serde_json::from_value(serde_json::json!({
            "name": "Ervebo",
            "licensingDates": [
                {"name": "FDA", "source": "https://fda.gov/ervebo"},
                {"name": "FDA", "source": "https://fda.gov/duplicate"}
            ],
            "authorityNames": ["EMA", "WHO"],
            "authorityLinks": ["https://ema.europa.eu/ervebo"],
            "licensers": [{"acronym": "fda"}, {"acronym": "SAHPRA", "website": "https://sahpra.org.za"}]
        }))
        .unwrap();

        let vaccine = normalize_vaccine(&raw, Some("Ebola"), None);
        assert_eq!(vaccine.authority_names(), vec!["FDA", "EMA", "WHO", "SAHPRA"]);
        assert_eq!(
            vaccine.authority_links(),
            vec![
                "https://fda.gov/ervebo",
                "https://ema.europa.eu/ervebo",
                "",
                "https://sahpra.org.za"
            ]
        );
        assert_eq!(vaccine.pathogens, vec!["Ebola"]);
    }

    #[test]
    fn test_profiles_sorted_by_authority_priority() {
        let raw: Vec<RawProductProfile> = ["FDA", "Other", "WHO", "EMA", "fda"]
            .iter()
            .map(|t| RawProductProfile {
                profile_type: Some(t.to_string()),
                ..Default::default()
            })
            .collect();

        let types: Vec<String> = normalize_profiles(&raw)
            .into_iter()
            .map(|p| p.profile_type)
            .collect();
        assert_eq!(types, vec!["EMA", "WHO", "FDA", "fda", "Other"]);
    }

    #[test]
    fn test_merge_vaccines_unions_pathogens() {
        let a = Vaccine {
            id: "7".to_string(),
            brand_name: "Vaxelis".to_string(),
            pathogens: vec!["Diphtheria".to_string()],
            ..Default::default()
        };
        let b = Vaccine {
            id: "7".to_string(),
            brand_name: "Vaxelis".to_string(),
            pathogens: vec!["Tetanus".to_string(), "diphtheria".to_string()],
            kind: VaccineKind::Combination,
            ..Default::default()
        };

        let merged = merge_vaccines(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pathogen_display, "Diphtheria, Tetanus");
        assert_eq!(merged[0].kind, VaccineKind::Combination);
    }

    #[test]
    fn test_nitag_flags_and_years() {
        let raw: RawNitag = serde_json::from_value(serde_json::json!({
            "country": " Kenya ",
            "available": "Yes",
            "established": "2014"
        }))
        .unwrap();
        let nitag = normalize_nitag(&raw);
        assert_eq!(nitag.country, "Kenya");
        assert!(nitag.available);
        assert_eq!(nitag.established, Some(2014));

        let missing = normalize_nitag(&RawNitag::default());
        assert!(!missing.available);
        assert_eq!(missing.established, None);
    }

    #[test]
    fn test_manufacturer_nested_records_inherit_name() {
        let raw: RawManufacturer = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "founded": 1901,
            "vaccines": [{"vaccineId": 1, "name": "AcmeVax"}],
            "candidateVaccines": [{"name": "AC-2", "clinicalPhase": "Phase II"}]
        }))
        .unwrap();

        let manufacturer = normalize_manufacturer(&raw);
        assert_eq!(manufacturer.founded, "1901");
        assert_eq!(manufacturer.licensed_vaccines[0].manufacturer_display, "Acme");
        assert_eq!(
            manufacturer.candidate_vaccines[0].phases.phase_ii.as_deref(),
            Some("Acme")
        );
    }
}
