use lexcorpus_model::Section;

use crate::link::MIN_VALID_TEXT_LENGTH;

/// Whether an XML-parsed item has "no usable body" and should fall through
/// to the PDF/OCR path (§4.5): either it produced no sections at all, or
/// its combined section text is implausibly short — a common symptom of an
/// upstream item whose body is an image-only scan wrapped in a near-empty
/// XML envelope.
pub fn needs_pdf_fallback(sections: &[Section]) -> bool {
    if sections.is_empty() {
        return true;
    }
    let total_len: usize = sections.iter().map(|s| s.text.len()).sum();
    total_len < MIN_VALID_TEXT_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexcorpus_model::{DocumentId, ProvisionType};

    fn section_with_text(text: &str) -> Section {
        let id = DocumentId::new("ukpga", 2006, "46");
        serde_json::from_value(serde_json::json!({
            "id": id.child(ProvisionType::Section, "1").as_str(),
            "uri": "https://www.legislation.gov.uk/id/ukpga/2006/46/section/1",
            "parent_document_id": id.as_str(),
            "title": "",
            "text": text,
            "extent": [],
            "provision_type": "section",
        }))
        .unwrap()
    }

    #[test]
    fn empty_section_list_needs_fallback() {
        assert!(needs_pdf_fallback(&[]));
    }

    #[test]
    fn short_combined_text_needs_fallback() {
        assert!(needs_pdf_fallback(&[section_with_text("too short")]));
    }

    #[test]
    fn long_enough_text_does_not_need_fallback() {
        let long_text = "x".repeat(200);
        assert!(!needs_pdf_fallback(&[section_with_text(&long_text)]));
    }
}
