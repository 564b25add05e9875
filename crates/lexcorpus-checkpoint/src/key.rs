/// Builds the checkpoint key `<doc-type>_<min-year>_<max-year>_<sorted-subtypes>`
/// (§4.2) that identifies one logical pipeline run.
pub fn checkpoint_key(doc_type: &str, min_year: i32, max_year: i32, subtypes: &[&str]) -> String {
    let mut sorted_subtypes = subtypes.to_vec();
    sorted_subtypes.sort_unstable();
    let subtypes_part = sorted_subtypes.join("-");
    if subtypes_part.is_empty() {
        format!("{doc_type}_{min_year}_{max_year}")
    } else {
        format!("{doc_type}_{min_year}_{max_year}_{subtypes_part}")
    }
}

/// Builds the `"<type>_<year>"` combination key used by
/// `is_combination_complete`/`mark_combination_complete`.
pub fn combination_key(doc_type: &str, year: i32) -> String {
    format!("{doc_type}_{year}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtypes_are_sorted_for_determinism() {
        let a = checkpoint_key("ukpga", 2000, 2020, &["b", "a", "c"]);
        let b = checkpoint_key("ukpga", 2000, 2020, &["c", "b", "a"]);
        assert_eq!(a, b);
        assert_eq!(a, "ukpga_2000_2020_a-b-c");
    }

    #[test]
    fn no_subtypes_omits_trailing_segment() {
        assert_eq!(checkpoint_key("ukpga", 2000, 2020, &[]), "ukpga_2000_2020");
    }

    #[test]
    fn combination_key_joins_type_and_year() {
        assert_eq!(combination_key("ukpga", 2015), "ukpga_2015");
    }
}
