use page_turner::{PageTurner, PageTurnerOutput, TurnedPage};

use crate::error::Error;

/// One listing-page fetch, keyed by (type, year, page). Mirrors the
/// "offset-bearing request wrapper" shape `flow-client::pagination`
/// builds around `postgrest::Builder`, here built around our own
/// `?page=N` query parameter instead of a `Range` header.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub doc_type: String,
    pub year: i32,
    pub page: u32,
}

impl ListingRequest {
    pub fn new(doc_type: impl Into<String>, year: i32) -> Self {
        Self {
            doc_type: doc_type.into(),
            year,
            page: 1,
        }
    }

    fn next_page(mut self) -> Self {
        self.page += 1;
        self
    }
}

/// Thin wrapper so `turn_page` has somewhere to carry the HTTP client and
/// base URL; unlike `flow-client`'s placeholder, this one actually performs
/// the request itself (there's no sub-client to delegate to).
#[derive(Clone)]
pub struct ListingClient {
    http: lexcorpus_http::Client,
    base_url: String,
}

const NO_RESULTS_MARKERS: &[&str] = &["no results", "nothing found", "no legislation found"];

impl ListingClient {
    pub fn new(http: lexcorpus_http::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn listing_url(&self, request: &ListingRequest) -> String {
        format!("{}/{}/{}", self.base_url, request.doc_type, request.year)
    }

    /// The canonical item detail pattern is `<base>/<type>/<year>/<number>`;
    /// we extract it from hrefs on the listing page via regex, since no
    /// HTML-parsing crate appears anywhere in the retrieval corpus.
    fn extract_item_urls(&self, request: &ListingRequest, body: &str) -> Vec<String> {
        let pattern = format!(
            r#"/{}/{}/(\d+)(?:/(?:contents|made|enacted))?(?:["'?#]|\s|$)"#,
            regex::escape(&request.doc_type),
            request.year
        );
        let re = regex::Regex::new(&pattern).expect("static listing-item pattern is valid");

        let mut numbers: Vec<u32> = re
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();

        numbers
            .into_iter()
            .map(|number| {
                format!(
                    "{}/{}/{}/{}/data.xml",
                    self.base_url, request.doc_type, request.year, number
                )
            })
            .collect()
    }

    fn has_warning_banner(body: &str) -> bool {
        let lowered = body.to_lowercase();
        NO_RESULTS_MARKERS.iter().any(|marker| lowered.contains(marker))
    }

    fn has_next_page(&self, request: &ListingRequest, body: &str) -> bool {
        let next_page = request.page + 1;
        body.contains(&format!("page={next_page}"))
    }
}

#[async_trait::async_trait]
impl PageTurner<ListingRequest> for ListingClient {
    type PageItem = String;
    type PageError = Error;

    async fn turn_page(&self, request: ListingRequest) -> PageTurnerOutput<Self, ListingRequest> {
        let url = self.listing_url(&request);
        let response = match self.http.get(&url, &[("page", &request.page.to_string())]).await {
            Ok(response) => response,
            Err(err) => {
                if matches!(err, lexcorpus_http::Error::Transport { .. }) {
                    tracing::warn!(%url, page = request.page, ?err, "listing page request failed, stopping pagination for this combination");
                    return Ok(TurnedPage::last(Vec::new()));
                }
                return Err(err.into());
            }
        };

        if response.is_server_error() {
            tracing::warn!(%url, page = request.page, status = response.status, "listing page returned 5xx, stopping pagination for this combination");
            return Ok(TurnedPage::last(Vec::new()));
        }

        let body = response.text().unwrap_or_default();
        if Self::has_warning_banner(&body) {
            tracing::debug!(%url, "empty listing detected via warning banner");
            return Ok(TurnedPage::last(Vec::new()));
        }

        let items = self.extract_item_urls(&request, &body);
        if self.has_next_page(&request, &body) {
            Ok(TurnedPage::next(items, request.next_page()))
        } else {
            Ok(TurnedPage::last(items))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ListingClient {
        ListingClient::new(
            lexcorpus_http::Client::new(lexcorpus_http::Config {
                cache_root: std::env::temp_dir().join("lexcorpus-enumerate-test"),
                ..Default::default()
            })
            .unwrap(),
            "https://www.legislation.gov.uk",
        )
    }

    #[test]
    fn extracts_and_dedupes_item_numbers() {
        let client = client();
        let request = ListingRequest::new("ukpga", 2020);
        let body = r#"<a href="/ukpga/2020/1/contents">One</a>
                       <a href="/ukpga/2020/2/made">Two</a>
                       <a href="/ukpga/2020/1/contents">One again</a>"#;
        let urls = client.extract_item_urls(&request, body);
        assert_eq!(
            urls,
            vec![
                "https://www.legislation.gov.uk/ukpga/2020/1/data.xml".to_string(),
                "https://www.legislation.gov.uk/ukpga/2020/2/data.xml".to_string(),
            ]
        );
    }

    #[test]
    fn detects_no_results_banner_case_insensitively() {
        assert!(ListingClient::has_warning_banner("<div>No Results Found for this year</div>"));
        assert!(!ListingClient::has_warning_banner("<div>1 result</div>"));
    }

    #[test]
    fn detects_next_page_link() {
        let client = client();
        let request = ListingRequest::new("ukpga", 2020);
        assert!(client.has_next_page(&request, r#"<a href="?page=2">Next</a>"#));
        assert!(!client.has_next_page(&request, "<div>no more pages</div>"));
    }
}
