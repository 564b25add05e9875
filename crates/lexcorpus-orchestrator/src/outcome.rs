use serde::Serialize;

/// Per-component tallies for one run (§4.8). `failed` counts item-level
/// errors that were checkpointed and skipped, not pipeline-scoped ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageStats {
    pub documents_ingested: u64,
    pub sections_ingested: u64,
    pub failed: u64,
}

/// The three stage-1 components run as siblings (§4.8); case-law summaries
/// (stage 2) are out of scope per the Open Questions resolution recorded in
/// DESIGN.md.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageReport {
    pub legislation: StageStats,
    pub amendments: StageStats,
    pub explanatory_notes: StageStats,
}

/// The result of one pipeline run. `RateLimited` is not an error: it is the
/// graceful-degradation exit of §4.8, always paired with a flushed
/// checkpoint, and maps to exit code 0 in an external CLI adapter.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Completed(StageReport),
    RateLimited(StageReport),
}

impl PipelineOutcome {
    pub fn report(&self) -> &StageReport {
        match self {
            PipelineOutcome::Completed(report) => report,
            PipelineOutcome::RateLimited(report) => report,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PipelineOutcome::RateLimited(_))
    }
}

/// The outcome of a single stage's run, before it's folded into a
/// [`PipelineOutcome`] by the caller.
pub(crate) struct StageOutcome {
    pub stats: StageStats,
    pub rate_limited: bool,
}

impl StageOutcome {
    pub(crate) fn failed() -> Self {
        Self { stats: StageStats::default(), rate_limited: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_outcome_reports_its_stats_and_is_not_rate_limited() {
        let mut report = StageReport::default();
        report.legislation.documents_ingested = 3;
        let outcome = PipelineOutcome::Completed(report);
        assert_eq!(outcome.report().legislation.documents_ingested, 3);
        assert!(!outcome.is_rate_limited());
    }

    #[test]
    fn rate_limited_outcome_still_carries_partial_stats() {
        let mut report = StageReport::default();
        report.amendments.failed = 1;
        let outcome = PipelineOutcome::RateLimited(report);
        assert_eq!(outcome.report().amendments.failed, 1);
        assert!(outcome.is_rate_limited());
    }

    #[test]
    fn failed_stage_outcome_is_not_rate_limited() {
        let outcome = StageOutcome::failed();
        assert!(!outcome.rate_limited);
        assert_eq!(outcome.stats.documents_ingested, 0);
    }
}
