use lexcorpus_model::{Category, DocType, DocumentId};
use lexcorpus_vectorstore::Filter;

/// The closed set of concrete [`DocType`] variants this crate knows how to
/// reverse-map from a [`Category`] selection. `DocType::Other` carries no
/// fixed category and is never returned by [`types_for_categories`].
const KNOWN_TYPES: &[DocType] = &[
    DocType::Ukpga,
    DocType::Ukla,
    DocType::Uksi,
    DocType::Ukci,
    DocType::Asp,
    DocType::Ssi,
    DocType::Asc,
    DocType::Wsi,
    DocType::Nia,
    DocType::Nisr,
    DocType::Nisi,
    DocType::Ukcm,
    DocType::Eur,
    DocType::Eudn,
    DocType::Eudr,
];

/// The selection criteria a caller of `search_sections`/`search_acts` may
/// supply, mirroring `LegislationSectionSearch`/`LegislationActSearch`'s
/// filter fields. A present `parent_document_id` overrides every other field
/// (§4.10: "a specific legislation_id overrides all other filters").
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub categories: Vec<Category>,
    pub doc_types: Vec<DocType>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub parent_document_id: Option<DocumentId>,
}

impl SearchFilters {
    /// `get_legislation_types(category_selection, type_selection)`: an
    /// explicit type selection wins outright; otherwise every type whose
    /// derived category is in the selection is returned. Returns `None`
    /// when neither selection narrows anything.
    fn legislation_types(&self) -> Option<Vec<String>> {
        if !self.doc_types.is_empty() {
            return Some(self.doc_types.iter().map(|t| t.as_str().to_string()).collect());
        }
        if !self.categories.is_empty() {
            return Some(
                KNOWN_TYPES
                    .iter()
                    .filter(|t| self.categories.contains(&t.derived_category()))
                    .map(|t| t.as_str().to_string())
                    .collect(),
            );
        }
        None
    }

    /// `build_year_filters(year_from, year_to, year_field)`.
    fn year_range(&self, year_field: &str) -> Option<Filter> {
        if self.year_from.is_none() && self.year_to.is_none() {
            return None;
        }
        Some(Filter::between(
            year_field,
            self.year_from.map(|y| serde_json::json!(y)),
            self.year_to.map(|y| serde_json::json!(y)),
        ))
    }

    /// `get_filters(...)` against the sections collection: `legislation_id`
    /// (when present) is the sole condition, matched against the stored
    /// `parent_document_id` field; otherwise type/category and year-range
    /// compose conjunctively.
    pub fn to_section_filter(&self) -> Option<Filter> {
        if let Some(id) = &self.parent_document_id {
            return Some(Filter::eq("parent_document_id", serde_json::json!(id.as_str())));
        }

        let mut clauses = Vec::new();
        if let Some(types) = self.legislation_types() {
            clauses.push(Filter::in_set("legislation_type", types.into_iter().map(|t| serde_json::json!(t)).collect()));
        }
        if let Some(range) = self.year_range("legislation_year") {
            clauses.push(range);
        }
        Filter::and(clauses)
    }

    /// The same composition against the documents collection's own
    /// `type`/`year` fields, used by `search_acts`'s batch parent lookup to
    /// keep the two queries consistent (§4.10: "apply the same year filters
    /// to the legislation lookup to ensure consistency").
    pub fn to_document_filter(&self) -> Option<Filter> {
        let mut clauses = Vec::new();
        if let Some(types) = self.legislation_types() {
            clauses.push(Filter::in_set("type", types.into_iter().map(|t| serde_json::json!(t)).collect()));
        }
        if let Some(range) = self.year_range("year") {
            clauses.push(range);
        }
        Filter::and(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legislation_id_overrides_every_other_field() {
        let filters = SearchFilters {
            doc_types: vec![DocType::Uksi],
            year_from: Some(1999),
            parent_document_id: Some(DocumentId::new("ukpga", 2006, "46")),
            ..Default::default()
        };
        assert_eq!(
            filters.to_section_filter(),
            Some(Filter::eq("parent_document_id", serde_json::json!("ukpga/2006/46")))
        );
    }

    #[test]
    fn explicit_type_selection_wins_over_category() {
        let filters = SearchFilters {
            categories: vec![Category::Secondary],
            doc_types: vec![DocType::Ukpga],
            ..Default::default()
        };
        assert_eq!(filters.legislation_types(), Some(vec!["ukpga".to_string()]));
    }

    #[test]
    fn category_selection_expands_to_its_member_types() {
        let filters = SearchFilters { categories: vec![Category::European], ..Default::default() };
        let mut types = filters.legislation_types().unwrap();
        types.sort();
        assert_eq!(types, vec!["eudn".to_string(), "eudr".to_string(), "eur".to_string()]);
    }

    #[test]
    fn no_selection_leaves_type_unfiltered() {
        let filters = SearchFilters::default();
        assert!(filters.to_section_filter().is_none());
    }

    #[test]
    fn year_range_and_type_compose_conjunctively() {
        let filters = SearchFilters { doc_types: vec![DocType::Ukpga], year_from: Some(2017), year_to: Some(2018), ..Default::default() };
        let filter = filters.to_section_filter().unwrap();
        assert!(filter.matches_payload(&serde_json::json!({"legislation_type": "ukpga", "legislation_year": 2018})));
        assert!(!filter.matches_payload(&serde_json::json!({"legislation_type": "ukpga", "legislation_year": 2020})));
        assert!(!filter.matches_payload(&serde_json::json!({"legislation_type": "uksi", "legislation_year": 2018})));
    }

    #[test]
    fn document_filter_uses_bare_year_and_type_field_names() {
        let filters = SearchFilters { doc_types: vec![DocType::Ukpga], year_to: Some(2020), ..Default::default() };
        let filter = filters.to_document_filter().unwrap();
        assert!(filter.matches_payload(&serde_json::json!({"type": "ukpga", "year": 2015})));
    }
}
