use lexcorpus_model::{Amendment, Document, DocumentId, ExplanatoryNote, Section};

use crate::error::{Error, Result};

/// Item XML URLs follow `<base>/<type>/<year>/<number>/data.xml` (§6.1);
/// this recovers the item's `DocumentId` and its sibling `/resources` page
/// URL from that shape alone, without an extra HTTP round trip.
pub(crate) fn derive_id_and_resources(item_url: &str) -> Option<(DocumentId, String)> {
    let trimmed = item_url.strip_suffix("/data.xml")?;
    let mut parts = trimmed.rsplitn(4, '/');
    let number = parts.next()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let doc_type = parts.next()?;
    Some((DocumentId::new(doc_type, year, number), format!("{trimmed}/resources")))
}

/// Fetches and parses one legislation item, falling through to the PDF/OCR
/// path when the XML envelope has no usable body (§4.4, §4.5).
#[tracing::instrument(skip(http, pdf))]
pub(crate) async fn fetch_and_parse_legislation(
    http: &lexcorpus_http::Client,
    pdf: &lexcorpus_pdf::FallbackClient,
    item_url: &str,
    authority_base: &str,
) -> Result<(Document, Vec<Section>)> {
    let (fallback_id, resources_url) =
        derive_id_and_resources(item_url).ok_or_else(|| Error::UnresolvableUrl(item_url.to_string()))?;

    let response = http.get(item_url, &[]).await?;
    let xml = response.text().unwrap_or_default();
    let parsed = lexcorpus_xml::parse(&xml, &fallback_id, authority_base)?;

    if lexcorpus_pdf::needs_pdf_fallback(&parsed.sections) {
        tracing::info!(id = %fallback_id, "xml body unusable, falling back to pdf/ocr");
        let (document, sections) = pdf.resolve(&resources_url, &fallback_id).await?;
        return Ok((document, sections));
    }
    Ok((parsed.document, parsed.sections))
}

/// Fetches the amendments recorded against one item. Grounded on the same
/// item XML the legislation stage fetches — the amendments feed is an
/// `<Amendments>` envelope embedded within the item's own document (§3).
#[tracing::instrument(skip(http))]
pub(crate) async fn fetch_amendments(
    http: &lexcorpus_http::Client,
    item_url: &str,
    fallback_affecting_year: i32,
) -> Result<Vec<Amendment>> {
    let response = http.get(item_url, &[]).await?;
    let xml = response.text().unwrap_or_default();
    Ok(lexcorpus_xml::parse_amendments(&xml, fallback_affecting_year)?)
}

/// Fetches the explanatory notes for one item, from the sibling
/// `/notes/data.xml` resource.
#[tracing::instrument(skip(http))]
pub(crate) async fn fetch_explanatory_notes(http: &lexcorpus_http::Client, item_url: &str) -> Result<Vec<ExplanatoryNote>> {
    let (parent_id, _) = derive_id_and_resources(item_url).ok_or_else(|| Error::UnresolvableUrl(item_url.to_string()))?;
    let notes_url = item_url
        .strip_suffix("/data.xml")
        .map(|prefix| format!("{prefix}/notes/data.xml"))
        .ok_or_else(|| Error::UnresolvableUrl(item_url.to_string()))?;

    let response = http.get(&notes_url, &[]).await?;
    let xml = response.text().unwrap_or_default();
    Ok(lexcorpus_xml::parse_explanatory_notes(&xml, &parent_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_id_and_resources_url_from_item_url() {
        let (id, resources) = derive_id_and_resources("https://www.legislation.gov.uk/ukpga/2020/1/data.xml").unwrap();
        assert_eq!(id.as_str(), "ukpga/2020/1");
        assert_eq!(resources, "https://www.legislation.gov.uk/ukpga/2020/1/resources");
    }

    #[test]
    fn rejects_urls_without_the_expected_suffix() {
        assert!(derive_id_and_resources("https://www.legislation.gov.uk/ukpga/2020/1").is_none());
    }
}
