//! Raw records as served by the VacciProfile API.
//!
//! Everything here is deliberately loose: fields are optional, alternate key names are accepted
//! through aliases, and union fields may arrive as a string, a list of strings or a list of
//! objects. The [`crate::catalog::normalize`] module turns these into canonical views.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A field that may be a single string, a single named object, or a list of either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameField {
    One(String),
    Many(Vec<NameEntry>),
    Named(NamedRef),
}

impl NameField {
    /// All non-empty names, trimmed, in source order.
    pub fn names(&self) -> Vec<String> {
        match self {
            NameField::One(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else {
                    vec![trimmed.to_string()]
                }
            }
            NameField::Many(entries) => entries
                .iter()
                .filter_map(NameEntry::label)
                .map(str::to_string)
                .collect(),
            NameField::Named(r) => r.label().map(str::to_string).into_iter().collect(),
        }
    }
}

impl From<&str> for NameField {
    fn from(value: &str) -> Self {
        NameField::One(value.to_string())
    }
}

impl From<Vec<&str>> for NameField {
    fn from(values: Vec<&str>) -> Self {
        NameField::Many(
            values
                .into_iter()
                .map(|v| NameEntry::Plain(v.to_string()))
                .collect(),
        )
    }
}

/// One element of a [`NameField`] list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameEntry {
    Plain(String),
    Named(NamedRef),
}

impl NameEntry {
    pub fn label(&self) -> Option<&str> {
        match self {
            NameEntry::Plain(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            NameEntry::Named(r) => r.label(),
        }
    }
}

/// Nested reference object, e.g. `{ "name": "Pfizer" }` or `{ "acronym": "FDA" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub acronym: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub website: Option<String>,
}

impl NamedRef {
    /// Name, else acronym, else full name; trimmed and non-empty.
    pub fn label(&self) -> Option<&str> {
        [&self.name, &self.acronym, &self.full_name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Booleans that sometimes arrive as `"Yes"`/`"No"` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
}

/// Numbers that sometimes arrive as strings (ids, years).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }
}

/// Deserializes an id that may be a number, a string or null into a string. Anything else
/// becomes `""`.
fn record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, Scalar>(deserializer)?
        .map(|s| s.to_text())
        .unwrap_or_default())
}

/// Deserializes an optional field, mapping null or a value of the wrong shape to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes a list that may be null or of the wrong shape; elements that fail to decode are
/// dropped.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPathogen {
    #[serde(default, alias = "pathogenId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub vaccines: Vec<RawVaccine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVaccine {
    #[serde(default, alias = "vaccineId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, alias = "vaccineName", alias = "brandName", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "type", alias = "singleOrCombination", deserialize_with = "lenient")]
    pub vaccine_type: Option<String>,
    #[serde(
        default,
        alias = "pathogen",
        alias = "pathogenName",
        alias = "pathogenNames",
        deserialize_with = "lenient",
    )]
    pub pathogens: Option<NameField>,
    #[serde(
        default,
        alias = "manufacturer",
        alias = "manufacturerName",
        alias = "manufacturerNames",
        deserialize_with = "lenient",
    )]
    pub manufacturers: Option<NameField>,
    #[serde(
        default,
        alias = "licenser",
        alias = "licensingAuthorities",
        deserialize_with = "lenient",
    )]
    pub licensers: Option<NameField>,
    #[serde(default, deserialize_with = "lenient")]
    pub authority_names: Option<NameField>,
    #[serde(default, deserialize_with = "lenient")]
    pub authority_links: Option<NameField>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub licensing_dates: Vec<RawLicensingDate>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub product_profiles: Vec<RawProductProfile>,
    #[serde(default, alias = "url", deserialize_with = "lenient")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLicenser {
    #[serde(default, alias = "licenserId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub acronym: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(default, alias = "name", deserialize_with = "lenient")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, alias = "url", deserialize_with = "lenient")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawManufacturer {
    #[serde(default, alias = "manufacturerId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub history: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub founded: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub headquarters: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ceo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub revenue: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub operating_income: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub net_income: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_assets: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_equity: Option<Scalar>,
    #[serde(default, alias = "url", deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(default, alias = "vaccines", deserialize_with = "nullable_list")]
    pub licensed_vaccines: Vec<RawVaccine>,
    #[serde(default, alias = "candidates", deserialize_with = "nullable_list")]
    pub candidate_vaccines: Vec<RawCandidateVaccine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidateVaccine {
    #[serde(default, alias = "candidateVaccineId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, alias = "pathogen", deserialize_with = "lenient")]
    pub pathogen_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "manufacturers", deserialize_with = "lenient")]
    pub manufacturer: Option<NameField>,
    #[serde(default, alias = "phase", deserialize_with = "lenient")]
    pub clinical_phase: Option<String>,
    #[serde(default, alias = "links", alias = "other", deserialize_with = "lenient")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNitag {
    #[serde(default, alias = "nitagId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(
        default,
        alias = "availableNitag",
        alias = "nitagAvailable",
        deserialize_with = "lenient",
    )]
    pub available: Option<Flag>,
    #[serde(default, alias = "url", deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(
        default,
        alias = "establishedYear",
        alias = "yearEstablished",
        deserialize_with = "lenient",
    )]
    pub established: Option<Scalar>,
    #[serde(default, alias = "nitagName", deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProductProfile {
    #[serde(default, alias = "productProfileId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub vaccine_name: Option<String>,
    /// Issuing authority, e.g. "EMA".
    #[serde(default, rename = "type", alias = "authority", deserialize_with = "lenient")]
    pub profile_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub composition: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub strain_coverage: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub indication: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contraindication: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dosing: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub immunogenicity: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub efficacy: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration_of_protection: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub co_administration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reactogenicity: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub safety: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vaccination_goal: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub others: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLicensingDate {
    #[serde(default, alias = "licensingDateId", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub vaccine_name: Option<String>,
    /// Authority name, e.g. "FDA".
    #[serde(default, alias = "authority", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub date_type: Option<String>,
    #[serde(default, alias = "date", deserialize_with = "lenient")]
    pub approval_date: Option<String>,
    #[serde(default, alias = "link", alias = "url", deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<String>,
}
