//! Selection and filter state.
//!
//! A [`Selection`] is a plain value owned by whoever renders a page. Filtering is the AND of a
//! case-insensitive substring search and a first-letter filter.

use crate::catalog::view::{CandidateVaccine, Licenser, Manufacturer, Nitag, Pathogen, Vaccine};
use std::collections::BTreeSet;
use url::form_urlencoded;

/// Letter filter value matching names that do not start with a letter.
pub const NON_ALPHA_LETTER: char = '#';

/// Records that can be searched and filtered by initial.
pub trait Searchable {
    /// Name shown in lists; the letter filter applies to it.
    fn display_name(&self) -> &str;

    /// Fields the free-text search looks at.
    fn search_fields(&self) -> Vec<&str> {
        vec![self.display_name()]
    }
}

impl Searchable for Pathogen {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Searchable for Vaccine {
    fn display_name(&self) -> &str {
        &self.brand_name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.brand_name.as_str(),
            self.pathogen_display.as_str(),
            self.manufacturer_display.as_str(),
        ]
    }
}

impl Searchable for Licenser {
    fn display_name(&self) -> &str {
        self.label()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.acronym.as_str(),
            self.full_name.as_str(),
            self.country.as_str(),
            self.region.as_str(),
        ]
    }
}

impl Searchable for Manufacturer {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Searchable for CandidateVaccine {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.pathogen_name.as_str(),
            self.manufacturer_display.as_str(),
        ]
    }
}

impl Searchable for Nitag {
    fn display_name(&self) -> &str {
        &self.country
    }
}

fn initial(name: &str) -> Option<char> {
    name.trim().chars().next().map(|c| {
        if c.is_alphabetic() {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            NON_ALPHA_LETTER
        }
    })
}

/// Initials present in `items`, for rendering an A–Z bar.
pub fn available_letters<'a, T, I>(items: I) -> BTreeSet<char>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter_map(|item| initial(item.display_name()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub pathogen: Option<String>,
    pub authority: Option<String>,
    pub manufacturer: Option<String>,
    pub country: Option<String>,
    pub vaccine: Option<String>,
    pub search: String,
    pub letter: Option<char>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn same(current: &Option<String>, next: &Option<String>) -> bool {
    match (current, next) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a pathogen. A different pathogen clears the selected vaccine.
    pub fn select_pathogen(&mut self, name: &str) {
        let next = non_empty(name);
        if !same(&self.pathogen, &next) {
            self.vaccine = None;
        }
        self.pathogen = next;
    }

    /// Selects an authority. A different authority clears the selected vaccine.
    pub fn select_authority(&mut self, name: &str) {
        let next = non_empty(name);
        if !same(&self.authority, &next) {
            self.vaccine = None;
        }
        self.authority = next;
    }

    /// Selects a manufacturer. A different manufacturer clears the selected vaccine.
    pub fn select_manufacturer(&mut self, name: &str) {
        let next = non_empty(name);
        if !same(&self.manufacturer, &next) {
            self.vaccine = None;
        }
        self.manufacturer = next;
    }

    pub fn select_country(&mut self, name: &str) {
        self.country = non_empty(name);
    }

    pub fn select_vaccine(&mut self, name: &str) {
        self.vaccine = non_empty(name);
    }

    pub fn clear_vaccine(&mut self) {
        self.vaccine = None;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_string();
    }

    /// Sets the letter filter; `None` shows every initial.
    pub fn set_letter(&mut self, letter: Option<char>) {
        self.letter = letter.map(|c| c.to_uppercase().next().unwrap_or(c));
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.letter = None;
    }

    /// Whether `item` passes both the search and the letter filter.
    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        };
        let letter_ok = match self.letter {
            None => true,
            Some(letter) => initial(item.display_name()) == Some(letter),
        };
        search_ok && letter_ok
    }

    pub fn filter<'a, T, I>(&self, items: I) -> Vec<&'a T>
    where
        T: Searchable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().filter(|item| self.matches(*item)).collect()
    }

    /// Builds the initial selection from a deep-link query string.
    ///
    /// Recognised keys: `pathogen`, `authority` (or `licenser`), `manufacturer`, `country`,
    /// `vaccine`, `search` (or `q`) and `letter`. Unknown keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut selection = Selection::new();
        let query = query.trim().trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "pathogen" => selection.pathogen = non_empty(&value),
                "authority" | "licenser" => selection.authority = non_empty(&value),
                "manufacturer" => selection.manufacturer = non_empty(&value),
                "country" => selection.country = non_empty(&value),
                "vaccine" => selection.vaccine = non_empty(&value),
                "search" | "q" => selection.set_search(&value),
                "letter" => selection.set_letter(value.trim().chars().next()),
                _ => {}
            }
        }
        selection
    }

    /// Serializes the selection back into a shareable query string.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let pairs = [
            ("pathogen", self.pathogen.as_deref()),
            ("authority", self.authority.as_deref()),
            ("manufacturer", self.manufacturer.as_deref()),
            ("country", self.country.as_deref()),
            ("vaccine", self.vaccine.as_deref()),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        if !self.search.is_empty() {
            serializer.append_pair("search", &self.search);
        }
        if let Some(letter) = self.letter {
            serializer.append_pair("letter", &letter.to_string());
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pathogens(names: &[&str]) -> Vec<Pathogen> {
        names
            .iter()
            .map(|n| Pathogen {
                name: n.to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn names<T: Searchable>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.display_name().to_string()).collect()
    }

    #[test]
    fn test_search_and_letter_filters_combine() {
        let all = pathogens(&["Ebola", "Zebovirus", "Measles", "ebola Sudan", "Echovirus"]);
        let mut selection = Selection::new();
        selection.set_search("ebo");
        selection.set_letter(Some('E'));

        let filtered = selection.filter(&all);
        assert_eq!(names(&filtered), vec!["Ebola", "ebola Sudan"]);
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let all = pathogens(&["Ebola", "Measles"]);
        assert_eq!(Selection::new().filter(&all).len(), 2);
    }

    #[test]
    fn test_non_alpha_letter_bucket() {
        let all = pathogens(&["4CMenB target", "Mumps"]);
        let mut selection = Selection::new();
        selection.set_letter(Some(NON_ALPHA_LETTER));
        assert_eq!(names(&selection.filter(&all)), vec!["4CMenB target"]);

        let letters = available_letters(&all);
        assert_eq!(letters.into_iter().collect::<Vec<_>>(), vec!['#', 'M']);
    }

    #[test]
    fn test_vaccine_search_covers_manufacturer() {
        let vaccines = vec![
            Vaccine {
                brand_name: "Ervebo".to_string(),
                manufacturer_display: "Merck".to_string(),
                ..Default::default()
            },
            Vaccine {
                brand_name: "Qdenga".to_string(),
                manufacturer_display: "Takeda".to_string(),
                ..Default::default()
            },
        ];
        let mut selection = Selection::new();
        selection.set_search("MERCK");
        assert_eq!(names(&selection.filter(&vaccines)), vec!["Ervebo"]);
    }

    #[test]
    fn test_pathogen_change_clears_vaccine() {
        let mut selection = Selection::new();
        selection.select_pathogen("Ebola");
        selection.select_vaccine("Ervebo");

        selection.select_pathogen("ebola");
        assert_eq!(selection.vaccine.as_deref(), Some("Ervebo"));

        selection.select_pathogen("Measles");
        assert_eq!(selection.vaccine, None);
        assert_eq!(selection.pathogen.as_deref(), Some("Measles"));
    }

    #[test]
    fn test_query_round_trip() {
        let selection =
            Selection::from_query("?pathogen=Yellow%20Fever&licenser=FDA&country=&letter=y&x=1");
        assert_eq!(selection.pathogen.as_deref(), Some("Yellow Fever"));
        assert_eq!(selection.authority.as_deref(), Some("FDA"));
        assert_eq!(selection.country, None);
        assert_eq!(selection.letter, Some('Y'));

        assert_eq!(
            selection.to_query(),
            "pathogen=Yellow+Fever&authority=FDA&letter=Y"
        );
    }
}
