use regex::Regex;

/// Minimum section text length (characters) below which a parsed document
/// is considered to have "no usable body" and the PDF/OCR path takes over
/// (§4.5). Mirrors the original pipeline's own threshold.
pub const MIN_VALID_TEXT_LENGTH: usize = 100;

/// Extracts every `.pdf`-suffixed `href` from a resources page's HTML,
/// preferring one ending `_en.pdf` (the English-language edition; Welsh
/// legislation's resources page often lists both `_en.pdf` and `_cy.pdf`).
/// Falls back to the first PDF link found when no `_en.pdf` variant exists.
pub fn extract_pdf_url(base_url: &str, html: &str) -> Option<String> {
    let re = Regex::new(r#"href=["']([^"']+\.pdf)["']"#).expect("static pdf-href pattern is valid");
    let mut candidates: Vec<String> = re
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| resolve_url(base_url, m.as_str()))
        .collect();
    candidates.dedup();

    candidates
        .iter()
        .find(|url| url.ends_with("_en.pdf"))
        .cloned()
        .or_else(|| candidates.into_iter().next())
}

fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_en_suffixed_pdf() {
        let html = r#"<a href="/ukpga/2020/1/pdfs/ukpga_20200001_cy.pdf">Welsh</a>
                       <a href="/ukpga/2020/1/pdfs/ukpga_20200001_en.pdf">English</a>"#;
        let url = extract_pdf_url("https://www.legislation.gov.uk", html).unwrap();
        assert!(url.ends_with("_en.pdf"));
    }

    #[test]
    fn falls_back_to_first_pdf_when_no_en_variant() {
        let html = r#"<a href="/ukpga/2020/1/pdfs/ukpga_20200001.pdf">Only copy</a>"#;
        let url = extract_pdf_url("https://www.legislation.gov.uk", html).unwrap();
        assert!(url.ends_with("ukpga_20200001.pdf"));
    }

    #[test]
    fn returns_none_when_no_pdf_links_present() {
        assert!(extract_pdf_url("https://www.legislation.gov.uk", "<p>no resources</p>").is_none());
    }

    #[test]
    fn absolute_links_pass_through_unchanged() {
        let html = r#"<a href="https://cdn.example.invalid/a_en.pdf">x</a>"#;
        let url = extract_pdf_url("https://www.legislation.gov.uk", html).unwrap();
        assert_eq!(url, "https://cdn.example.invalid/a_en.pdf");
    }
}
