//! Plain-text rendering of catalog pages.
//!
//! Every list section prints [`NO_DATA`] instead of an empty body.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::catalog::detail::VaccineDetail;
use crate::catalog::geo::CountryStatus;
use crate::catalog::selection::Searchable;
use crate::catalog::view::{
    AuthorityPage, CandidateVaccine, ComparisonTable, ManufacturerPage, Nitag, PathogenPage,
    Vaccine, VaccineKind,
};

pub const NO_DATA: &str = "No data found";

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "  {}: {}", label, value);
    }
}

/// Renders one name per line, or [`NO_DATA`].
pub fn render_names<T: Searchable>(title: &str, items: &[&T]) -> String {
    let mut out = String::new();
    heading(&mut out, title);
    if items.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
    }
    for item in items {
        let _ = writeln!(out, "{}", item.display_name());
    }
    out
}

fn kind_label(kind: VaccineKind) -> &'static str {
    match kind {
        VaccineKind::Single => "single",
        VaccineKind::Combination => "combination",
        VaccineKind::Unknown => "",
    }
}

fn vaccine_lines(out: &mut String, vaccines: &[&Vaccine]) {
    if vaccines.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
        return;
    }
    for vaccine in vaccines {
        let _ = writeln!(out, "{}", vaccine.brand_name);
        field(out, "Pathogens", &vaccine.pathogen_display);
        field(out, "Type", kind_label(vaccine.kind));
        field(out, "Manufacturers", &vaccine.manufacturer_display);
        field(out, "Approved by", &vaccine.authority_names().join(", "));
    }
}

fn candidate_lines(out: &mut String, candidates: &[&CandidateVaccine]) {
    if candidates.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
        return;
    }
    for candidate in candidates {
        let _ = writeln!(out, "{}", candidate.name);
        field(out, "Pathogen", &candidate.pathogen_name);
        field(out, "Manufacturer", &candidate.manufacturer_display);
        field(out, "Phase", &candidate.clinical_phase);
    }
}

pub fn render_pathogen_page(page: &PathogenPage<'_>) -> String {
    let Some(pathogen) = page.pathogen else {
        return render_names("Pathogens", &page.pathogens);
    };

    let mut out = String::new();
    heading(&mut out, &pathogen.name);
    if !pathogen.description.is_empty() {
        let _ = writeln!(out, "{}", pathogen.description);
    }
    out.push('\n');
    heading(&mut out, "Licensed vaccines");
    vaccine_lines(&mut out, &page.vaccines);
    out.push('\n');
    heading(&mut out, "Candidate vaccines");
    candidate_lines(&mut out, &page.candidates);

    if let Some(vaccine) = page.selected_vaccine {
        out.push('\n');
        heading(&mut out, &format!("Selected: {}", vaccine.brand_name));
        for approval in &vaccine.authorities {
            field(&mut out, &approval.name, &approval.link);
        }
    }
    out
}

pub fn render_authority_page(page: &AuthorityPage<'_>) -> String {
    let mut out = String::new();
    match page.licenser {
        Some(licenser) => {
            heading(&mut out, licenser.label());
            field(&mut out, "Name", &licenser.full_name);
            field(&mut out, "Country", &licenser.country);
            field(&mut out, "Region", &licenser.region);
            field(&mut out, "Website", &licenser.website);
            out.push('\n');
            heading(&mut out, "Approved vaccines");
            vaccine_lines(&mut out, &page.vaccines);
        }
        None => {
            out.push_str(&render_names("Authorities", &page.pinned));
            out.push('\n');
            out.push_str(&render_names("Other authorities", &page.others));
        }
    }
    if !page.country_vaccines.is_empty() {
        out.push('\n');
        heading(&mut out, "Vaccines licensed in country");
        vaccine_lines(&mut out, &page.country_vaccines);
    }
    out
}

pub fn render_manufacturer_page(page: &ManufacturerPage<'_>) -> String {
    let Some(manufacturer) = page.manufacturer else {
        return render_names("Manufacturers", &page.manufacturers);
    };

    let mut out = String::new();
    heading(&mut out, &manufacturer.name);
    field(&mut out, "Founded", &manufacturer.founded);
    field(&mut out, "Headquarters", &manufacturer.headquarters);
    field(&mut out, "CEO", &manufacturer.ceo);
    field(&mut out, "Revenue", &manufacturer.revenue);
    field(&mut out, "Operating income", &manufacturer.operating_income);
    field(&mut out, "Net income", &manufacturer.net_income);
    field(&mut out, "Total assets", &manufacturer.total_assets);
    field(&mut out, "Total equity", &manufacturer.total_equity);
    field(&mut out, "Website", &manufacturer.website);
    out.push('\n');
    heading(&mut out, "Licensed vaccines");
    vaccine_lines(&mut out, &page.licensed_vaccines);
    out.push('\n');
    heading(&mut out, "Candidate vaccines");
    candidate_lines(&mut out, &page.candidate_vaccines);
    out
}

pub fn render_detail(detail: &VaccineDetail) -> String {
    let mut out = String::new();
    heading(&mut out, &detail.vaccine_name);
    if detail.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
        return out;
    }
    for profile in &detail.product_profiles {
        let _ = writeln!(out, "Product profile ({})", profile.profile_type);
        for (label, value) in profile.fields() {
            field(&mut out, label, value);
        }
    }
    for date in &detail.licensing_dates {
        let _ = writeln!(
            out,
            "Licensed by {} on {} {}",
            date.authority, date.approval_date, date.source
        );
    }
    out
}

pub fn render_comparison(table: &ComparisonTable) -> String {
    let mut out = String::new();
    heading(&mut out, &table.vaccines.join(" vs "));
    if table.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
        return out;
    }
    for row in &table.rows {
        let _ = writeln!(out, "{}", row.field);
        for (vaccine, value) in table.vaccines.iter().zip(&row.values) {
            let value = if value.is_empty() { "-" } else { value.as_str() };
            let _ = writeln!(out, "  {}: {}", vaccine, value);
        }
    }
    out
}

pub fn render_nitags(nitags: &[&Nitag]) -> String {
    let mut out = String::new();
    heading(&mut out, "NITAGs");
    if nitags.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
    }
    for nitag in nitags {
        let status = if nitag.available { "available" } else { "not available" };
        let _ = writeln!(out, "{} ({})", nitag.country, status);
        field(&mut out, "Name", &nitag.name);
        if let Some(year) = nitag.established {
            field(&mut out, "Established", &year.to_string());
        }
        field(&mut out, "Website", &nitag.website);
    }
    out
}

pub fn render_map(layer: &BTreeMap<String, CountryStatus>) -> String {
    let mut out = String::new();
    heading(&mut out, "Countries");
    if layer.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA);
    }
    for status in layer.values() {
        let nitag = match (status.has_nitag, status.nitag_available) {
            (true, true) => "NITAG",
            (true, false) => "NITAG (inactive)",
            _ => "no NITAG",
        };
        let _ = writeln!(
            out,
            "{}: {}, {} authorities, {} licensed vaccines",
            status.country,
            nitag,
            status.authorities.len(),
            status.licensed_vaccines
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::pipeline::CatalogPipeline;
    use crate::catalog::selection::Selection;
    use crate::config::ApiConfig;
    use crate::fetch::tests::MockTransport;
    use crate::fetch::RecordFetcher;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_server_error_renders_no_data() {
        let transport = MockTransport::default().route("/api/pathogens/populated", 500, "oops");
        let fetcher = RecordFetcher::with_transport(ApiConfig::default(), Arc::new(transport));
        let result = CatalogPipeline::standard(Arc::new(fetcher)).execute().await;

        let page = result.catalog.pathogen_page(&Selection::new());
        let text = render_pathogen_page(&page);
        assert!(text.starts_with("Pathogens\n"));
        assert!(text.contains(NO_DATA));
    }

    #[test]
    fn test_selected_pathogen_without_vaccines() {
        let pathogen = crate::catalog::view::Pathogen {
            name: "Measles".to_string(),
            ..Default::default()
        };
        let page = PathogenPage {
            pathogen: Some(&pathogen),
            ..Default::default()
        };

        let text = render_pathogen_page(&page);
        assert!(text.starts_with("Measles\n-------\n"));
        assert_eq!(text.matches(NO_DATA).count(), 2);
    }

    #[test]
    fn test_comparison_marks_missing_values() {
        let table = ComparisonTable {
            vaccines: vec!["A".to_string(), "B".to_string()],
            sources: vec!["EMA".to_string(), String::new()],
            rows: vec![crate::catalog::view::ComparisonRow {
                field: "Dosing".to_string(),
                values: vec!["2 doses".to_string(), String::new()],
            }],
        };

        let text = render_comparison(&table);
        assert!(text.contains("  A: 2 doses\n"));
        assert!(text.contains("  B: -\n"));
    }
}
