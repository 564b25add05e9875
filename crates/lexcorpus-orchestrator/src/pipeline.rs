use chrono::Datelike;
use futures::StreamExt;
use lexcorpus_checkpoint::{checkpoint_key, combination_key, Store};
use lexcorpus_embed::EmbeddingService;
use lexcorpus_enumerate::{enumerate, ListingClient};
use lexcorpus_model::DocType;
use lexcorpus_pdf::FallbackClient;
use lexcorpus_vectorstore::VectorStore;

use crate::batch::{AmendmentBatch, DocumentSectionBatch, NoteBatch};
use crate::config::Config;
use crate::error::{is_rate_limited, Result};
use crate::ingest;
use crate::outcome::{PipelineOutcome, StageOutcome, StageReport, StageStats};

/// A small per-combination cap for "daily" runs (§4.8: "current and
/// previous year, small limit") — large enough to pick up a normal day's
/// worth of new/amended items without re-walking an entire year's listing.
const DAILY_COMBINATION_LIMIT: usize = 50;

/// The pipeline orchestrator (C8): wires C1–C7 together into a two-stage
/// ingest DAG and couples it to the checkpoint store. Owns one instance of
/// each downstream component rather than constructing them per call, so a
/// `Pipeline` is the composition root callers build once per process.
#[derive(Clone)]
pub struct Pipeline {
    http: lexcorpus_http::Client,
    embed: EmbeddingService,
    store: VectorStore,
    pdf: FallbackClient,
    config: Config,
}

impl Pipeline {
    pub fn new(http: lexcorpus_http::Client, embed: EmbeddingService, store: VectorStore, pdf: FallbackClient, config: Config) -> Self {
        Self { http, embed, store, pdf, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http_client(&self) -> &lexcorpus_http::Client {
        &self.http
    }

    pub fn embedding_service(&self) -> &EmbeddingService {
        &self.embed
    }

    pub fn vector_store(&self) -> &VectorStore {
        &self.store
    }

    pub fn pdf_client(&self) -> &FallbackClient {
        &self.pdf
    }

    pub fn authority_base(&self) -> &str {
        &self.config.authority_base
    }

    pub fn documents_collection(&self) -> String {
        self.config.documents_collection.clone()
    }

    pub fn sections_collection(&self) -> String {
        self.config.sections_collection.clone()
    }

    pub fn from_env() -> Result<Self> {
        let http = lexcorpus_http::Client::from_env()?;
        let embed = EmbeddingService::from_env(http.clone());
        let store = VectorStore::from_env(http.clone());
        let pdf = FallbackClient::from_env(http.clone());
        Ok(Self::new(http, embed, store, pdf, Config::from_env()))
    }

    /// "Daily" run (§4.8): current and previous year, a small per-combination
    /// limit so a scheduled run stays cheap.
    pub async fn run_daily(&self, doc_types: Vec<DocType>) -> Result<PipelineOutcome> {
        let current_year = chrono::Utc::now().year();
        self.run(doc_types, vec![current_year - 1, current_year], Some(DAILY_COMBINATION_LIMIT)).await
    }

    /// "Full" run (§4.8): an unbounded historical sweep over the given
    /// doc-type/year matrix.
    pub async fn run_full(&self, doc_types: Vec<DocType>, years: Vec<i32>) -> Result<PipelineOutcome> {
        self.run(doc_types, years, None).await
    }

    async fn run(&self, doc_types: Vec<DocType>, years: Vec<i32>, limit: Option<usize>) -> Result<PipelineOutcome> {
        // Stage 1: legislation, amendments, and explanatory notes run as
        // concurrent sibling tasks with per-branch error isolation — a
        // `join!` (not `try_join!`) so one branch's fatal error never
        // aborts the others, mirroring `asyncio.gather(return_exceptions=True)`.
        let (legislation, amendments, notes) = futures::join!(
            self.run_legislation(doc_types.clone(), years.clone(), limit),
            self.run_amendments(doc_types.clone(), years.clone(), limit),
            self.run_explanatory_notes(doc_types.clone(), years.clone(), limit),
        );

        let legislation = legislation.unwrap_or_else(|err| {
            tracing::error!(%err, "legislation stage failed");
            StageOutcome::failed()
        });
        let amendments = amendments.unwrap_or_else(|err| {
            tracing::error!(%err, "amendments stage failed");
            StageOutcome::failed()
        });
        let notes = notes.unwrap_or_else(|err| {
            tracing::error!(%err, "explanatory-notes stage failed");
            StageOutcome::failed()
        });

        let report = StageReport {
            legislation: legislation.stats,
            amendments: amendments.stats,
            explanatory_notes: notes.stats,
        };

        if legislation.rate_limited || amendments.rate_limited || notes.rate_limited {
            tracing::warn!("pipeline degraded: consecutive rate limits exceeded, exiting cleanly");
            Ok(PipelineOutcome::RateLimited(report))
        } else {
            Ok(PipelineOutcome::Completed(report))
        }
    }

    fn completed_combinations(&self, stage: &str, doc_types: &[DocType], years: &[i32], checkpoint: &Store) -> Vec<String> {
        doc_types
            .iter()
            .flat_map(|doc_type| years.iter().map(move |year| combination_key(doc_type.as_str(), *year)))
            .filter(|key| checkpoint.is_combination_complete(key))
            .inspect(|key| tracing::debug!(stage, key, "skipping already-complete combination"))
            .collect()
    }

    fn checkpoint_for(&self, stage: &str, doc_types: &[DocType], years: &[i32]) -> Result<Store> {
        let min_year = years.iter().copied().min().unwrap_or(0);
        let max_year = years.iter().copied().max().unwrap_or(0);
        let subtypes: Vec<&str> = doc_types.iter().map(DocType::as_str).collect();
        let key = checkpoint_key(stage, min_year, max_year, &subtypes);
        Ok(Store::open(&self.config.cache_root, &format!("{stage}_{key}"))?)
    }

    async fn run_legislation(&self, doc_types: Vec<DocType>, years: Vec<i32>, limit: Option<usize>) -> Result<StageOutcome> {
        let checkpoint = self.checkpoint_for("legislation", &doc_types, &years)?;
        let completed = self.completed_combinations("legislation", &doc_types, &years, &checkpoint);
        let listing = ListingClient::new(self.http.clone(), self.config.authority_base.clone());
        let mut stream = Box::pin(enumerate(listing, doc_types.clone(), years.clone(), limit, completed));

        let mut batch = DocumentSectionBatch::new(self.config.batch_size);
        let mut stats = StageStats::default();
        let mut consecutive_rate_limits: u32 = 0;

        while let Some(item) = stream.next().await {
            let url = match item {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(%err, "legislation enumeration error");
                    continue;
                }
            };
            if checkpoint.is_processed(&url) {
                continue;
            }

            match ingest::fetch_and_parse_legislation(&self.http, &self.pdf, &url, &self.config.authority_base).await {
                Ok((document, sections)) => {
                    consecutive_rate_limits = 0;
                    stats.documents_ingested += 1;
                    stats.sections_ingested += sections.len() as u64;
                    batch.push(document, sections);
                    if batch.is_full() {
                        batch
                            .flush(&self.embed, &self.store, &self.config.documents_collection, &self.config.sections_collection)
                            .await?;
                    }
                    checkpoint.mark_processed(&url)?;
                }
                Err(err) => {
                    if is_rate_limited(&err) {
                        consecutive_rate_limits += 1;
                        tracing::warn!(%url, consecutive_rate_limits, "rate limited ingesting legislation item");
                        if consecutive_rate_limits >= self.config.max_consecutive_rate_limits {
                            batch
                                .flush(&self.embed, &self.store, &self.config.documents_collection, &self.config.sections_collection)
                                .await
                                .ok();
                            checkpoint.flush()?;
                            return Ok(StageOutcome { stats, rate_limited: true });
                        }
                    } else {
                        tracing::warn!(%url, %err, "legislation item failed, marking and continuing");
                        checkpoint.mark_failed(&url, &err)?;
                        stats.failed += 1;
                    }
                }
            }
        }

        batch
            .flush(&self.embed, &self.store, &self.config.documents_collection, &self.config.sections_collection)
            .await?;
        self.mark_combinations_complete(&doc_types, &years, &checkpoint)?;
        checkpoint.flush()?;
        Ok(StageOutcome { stats, rate_limited: false })
    }

    async fn run_amendments(&self, doc_types: Vec<DocType>, years: Vec<i32>, limit: Option<usize>) -> Result<StageOutcome> {
        let checkpoint = self.checkpoint_for("amendments", &doc_types, &years)?;
        let completed = self.completed_combinations("amendments", &doc_types, &years, &checkpoint);
        let listing = ListingClient::new(self.http.clone(), self.config.authority_base.clone());
        let mut stream = Box::pin(enumerate(listing, doc_types.clone(), years.clone(), limit, completed));

        let mut batch = AmendmentBatch::new(self.config.batch_size);
        let mut stats = StageStats::default();
        let mut consecutive_rate_limits: u32 = 0;

        while let Some(item) = stream.next().await {
            let url = match item {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(%err, "amendments enumeration error");
                    continue;
                }
            };
            if checkpoint.is_processed(&url) {
                continue;
            }
            let fallback_year = ingest::derive_id_and_resources(&url)
                .and_then(|(id, _)| id.parent_year().ok())
                .unwrap_or(0);

            match ingest::fetch_amendments(&self.http, &url, fallback_year).await {
                Ok(amendments) => {
                    consecutive_rate_limits = 0;
                    stats.documents_ingested += amendments.len() as u64;
                    for amendment in amendments {
                        batch.push(amendment);
                    }
                    if batch.is_full() {
                        batch.flush(&self.embed, &self.store, &self.config.amendments_collection).await?;
                    }
                    checkpoint.mark_processed(&url)?;
                }
                Err(err) => {
                    if is_rate_limited(&err) {
                        consecutive_rate_limits += 1;
                        if consecutive_rate_limits >= self.config.max_consecutive_rate_limits {
                            batch.flush(&self.embed, &self.store, &self.config.amendments_collection).await.ok();
                            checkpoint.flush()?;
                            return Ok(StageOutcome { stats, rate_limited: true });
                        }
                    } else {
                        tracing::warn!(%url, %err, "amendments item failed, marking and continuing");
                        checkpoint.mark_failed(&url, &err)?;
                        stats.failed += 1;
                    }
                }
            }
        }

        batch.flush(&self.embed, &self.store, &self.config.amendments_collection).await?;
        self.mark_combinations_complete(&doc_types, &years, &checkpoint)?;
        checkpoint.flush()?;
        Ok(StageOutcome { stats, rate_limited: false })
    }

    async fn run_explanatory_notes(&self, doc_types: Vec<DocType>, years: Vec<i32>, limit: Option<usize>) -> Result<StageOutcome> {
        let checkpoint = self.checkpoint_for("explanatory_notes", &doc_types, &years)?;
        let completed = self.completed_combinations("explanatory_notes", &doc_types, &years, &checkpoint);
        let listing = ListingClient::new(self.http.clone(), self.config.authority_base.clone());
        let mut stream = Box::pin(enumerate(listing, doc_types.clone(), years.clone(), limit, completed));

        let mut batch = NoteBatch::new(self.config.batch_size);
        let mut stats = StageStats::default();
        let mut consecutive_rate_limits: u32 = 0;

        while let Some(item) = stream.next().await {
            let url = match item {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(%err, "explanatory notes enumeration error");
                    continue;
                }
            };
            if checkpoint.is_processed(&url) {
                continue;
            }

            match ingest::fetch_explanatory_notes(&self.http, &url).await {
                Ok(notes) => {
                    consecutive_rate_limits = 0;
                    stats.documents_ingested += notes.len() as u64;
                    for note in notes {
                        batch.push(note);
                    }
                    if batch.is_full() {
                        batch.flush(&self.embed, &self.store, &self.config.explanatory_notes_collection).await?;
                    }
                    checkpoint.mark_processed(&url)?;
                }
                Err(err) => {
                    if is_rate_limited(&err) {
                        consecutive_rate_limits += 1;
                        if consecutive_rate_limits >= self.config.max_consecutive_rate_limits {
                            batch.flush(&self.embed, &self.store, &self.config.explanatory_notes_collection).await.ok();
                            checkpoint.flush()?;
                            return Ok(StageOutcome { stats, rate_limited: true });
                        }
                    } else {
                        tracing::warn!(%url, %err, "explanatory notes item failed, marking and continuing");
                        checkpoint.mark_failed(&url, &err)?;
                        stats.failed += 1;
                    }
                }
            }
        }

        batch.flush(&self.embed, &self.store, &self.config.explanatory_notes_collection).await?;
        self.mark_combinations_complete(&doc_types, &years, &checkpoint)?;
        checkpoint.flush()?;
        Ok(StageOutcome { stats, rate_limited: false })
    }

    /// A `(type, year)` combination is complete once the enumerator for it
    /// has been fully drained (§4.2) — recorded after the stream ends
    /// normally, never on a rate-limited early exit.
    fn mark_combinations_complete(&self, doc_types: &[DocType], years: &[i32], checkpoint: &Store) -> Result<()> {
        for doc_type in doc_types {
            for year in years {
                if doc_type.is_active_in(*year) {
                    checkpoint.mark_combination_complete(&combination_key(doc_type.as_str(), *year))?;
                }
            }
        }
        Ok(())
    }
}
