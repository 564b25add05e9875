use serde::Deserialize;

use lexcorpus_model::{Document, DocumentId, Provenance, ProvisionType, Section};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::link;

/// The JSON shape returned by the external OCR/document-extraction RPC.
/// Fetching and running the extractor model itself is out of scope for
/// this crate (§1) — this is the wire contract the fallback path expects
/// from whatever service is configured at `ocr_endpoint`.
#[derive(Debug, Deserialize)]
pub struct OcrExtraction {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<OcrSection>,
    pub response_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OcrSection {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
}

/// Coordinates the PDF/OCR fallback path (§4.5): locate the resources
/// page's PDF link, submit it to the OCR extractor, and convert the result
/// into the same `Document`/`Section` shape the XML parser produces, so
/// downstream stages never need to know which path an item took.
#[derive(Clone)]
pub struct FallbackClient {
    http: lexcorpus_http::Client,
    config: Config,
}

impl FallbackClient {
    pub fn new(http: lexcorpus_http::Client, config: Config) -> Self {
        Self { http, config }
    }

    pub fn from_env(http: lexcorpus_http::Client) -> Self {
        Self::new(http, Config::from_env())
    }

    /// `resources_page_url` is the item's `/resources` listing page;
    /// `doc_id`/`doc_type` are whatever the enumerator or XML parser
    /// already resolved for this item (§4.5: year/number/category still
    /// come from the id, never from the OCR output).
    pub async fn resolve(&self, resources_page_url: &str, doc_id: &DocumentId) -> Result<(Document, Vec<Section>)> {
        let response = self.http.get(resources_page_url, &[]).await?;
        let html = response.text().unwrap_or_default();
        let pdf_url = link::extract_pdf_url(&self.config.authority_base, &html)
            .ok_or_else(|| Error::NoPdfFound(resources_page_url.to_string()))?;

        let extraction = self.extract(&pdf_url).await?;
        Ok(self.to_document(extraction, doc_id))
    }

    async fn extract(&self, pdf_url: &str) -> Result<OcrExtraction> {
        let body = serde_json::json!({ "pdf_url": pdf_url, "model": self.config.ocr_model });
        let response = self.http.post(&self.config.ocr_endpoint, &body).await?;
        if !response.is_success() {
            return Err(Error::ExtractorFailed {
                url: self.config.ocr_endpoint.clone(),
                status: response.status,
            });
        }
        Ok(response.json::<OcrExtraction>()?)
    }

    fn to_document(&self, extraction: OcrExtraction, doc_id: &DocumentId) -> (Document, Vec<Section>) {
        let (doc_type_tag, year, number) = doc_id
            .split_head()
            .expect("doc_id passed to the fallback path is already validated");
        let doc_type = lexcorpus_model::DocType::from_tag(doc_type_tag);
        let provenance = Provenance::ocr(self.config.ocr_model.clone(), extraction.response_id.clone());

        let sections: Vec<Section> = extraction
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let number = section.number.clone().unwrap_or_else(|| (index + 1).to_string());
                let id = doc_id.child(ProvisionType::Section, &number);
                Section {
                    uri: id.canonical_uri(&self.config.authority_base),
                    id,
                    parent_document_id: doc_id.clone(),
                    title: section.title.clone().unwrap_or_default(),
                    text: section.text.clone(),
                    extent: Vec::new(),
                    provision_type: ProvisionType::Section,
                    number: Some(number),
                    provenance: Some(provenance.clone()),
                    commentary_refs: Vec::new(),
                }
            })
            .collect();

        let document = Document {
            uri: doc_id.canonical_uri(&self.config.authority_base),
            id: doc_id.clone(),
            title: extraction.title.unwrap_or_default(),
            description: extraction.description.unwrap_or_default(),
            enactment_date: None,
            category: doc_type.derived_category(),
            doc_type,
            year,
            number: number.to_string(),
            status: String::new(),
            extent: Vec::new(),
            provision_count: sections.len() as u32,
            modified_date: chrono::Utc::now(),
            provenance: Some(provenance),
        };

        (document, sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FallbackClient {
        let dir = tempfile::tempdir().unwrap();
        let http = lexcorpus_http::Client::new(lexcorpus_http::Config {
            cache_root: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        FallbackClient::new(
            http,
            Config {
                ocr_endpoint: "https://ocr.example.invalid/extract".to_string(),
                ocr_model: "document-ocr-v1".to_string(),
                authority_base: "https://www.legislation.gov.uk".to_string(),
            },
        )
    }

    #[test]
    fn converts_ocr_output_into_document_and_sections() {
        let client = client();
        let doc_id = DocumentId::new("ukpga", 1985, "12");
        let extraction = OcrExtraction {
            title: Some("An Old Act".to_string()),
            description: None,
            sections: vec![
                OcrSection {
                    number: Some("1".to_string()),
                    title: Some("Short title".to_string()),
                    text: "This Act may be cited as the Old Act 1985.".to_string(),
                },
                OcrSection {
                    number: None,
                    title: None,
                    text: "Second provision.".to_string(),
                },
            ],
            response_id: "resp-123".to_string(),
        };

        let (document, sections) = client.to_document(extraction, &doc_id);

        assert_eq!(document.title, "An Old Act");
        assert_eq!(document.year, 1985);
        assert_eq!(document.provenance.as_ref().unwrap().model.as_deref(), Some("document-ocr-v1"));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].id.as_str(), "ukpga/1985/12/section/1");
        assert_eq!(sections[1].number.as_deref(), Some("2"));
        assert_eq!(sections[1].provenance.as_ref().unwrap().source, lexcorpus_model::ProvenanceSource::Ocr);
    }
}
