use std::collections::HashMap;

use uuid::Uuid;

/// Distribution-Based Score Fusion (§4.7, GLOSSARY): normalize each
/// candidate list onto the `[0, 1]` bracket `(score - (mean - 3σ)) / (6σ)`,
/// the same min-max normalization Qdrant's own `Fusion.DBSF` applies
/// (`original_source/scripts/bulk_search_qdrant.py`), then sum per-id
/// across lists. A list with no spread (a single candidate, or every
/// candidate tied) collapses the bracket to its lower bound and every score
/// in it normalizes to `0` rather than going negative, so an outer-join
/// contribution from a one-list match never drags a fused score below what
/// a same-score two-list match would get.
fn z_normalize(candidates: &[(Uuid, f32)]) -> HashMap<Uuid, f32> {
    if candidates.is_empty() {
        return HashMap::new();
    }
    let n = candidates.len() as f32;
    let mean = candidates.iter().map(|(_, s)| *s).sum::<f32>() / n;
    let variance = candidates.iter().map(|(_, s)| (*s - mean).powi(2)).sum::<f32>() / n;
    let stddev = variance.sqrt();
    let low = mean - 3.0 * stddev;
    let high = mean + 3.0 * stddev;
    let scale = (high - low).max(f32::EPSILON);
    candidates.iter().map(|(id, s)| (*id, (*s - low) / scale)).collect()
}

/// Fuses a dense-search candidate list and a sparse-search candidate list
/// into one ranked list, per §4.7's "prefetch-and-fuse" algorithm. Ids
/// present in only one list still contribute their single normalized
/// score (an outer join, not an intersection).
pub fn dbsf_fuse(dense: &[(Uuid, f32)], sparse: &[(Uuid, f32)]) -> Vec<(Uuid, f32)> {
    let mut summed: HashMap<Uuid, f32> = HashMap::new();
    for (id, score) in z_normalize(dense) {
        *summed.entry(id).or_insert(0.0) += score;
    }
    for (id, score) in z_normalize(sparse) {
        *summed.entry(id).or_insert(0.0) += score;
    }
    let mut fused: Vec<(Uuid, f32)> = summed.into_iter().collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused
}

/// §4.10's score normalization: divide every score by the maximum.
/// Guarantees every returned score lies in `[0, 1]` with the top result(s)
/// at exactly `1.0` whenever the list is non-empty (P4).
///
/// When the maximum is non-positive (a single-candidate result, or every
/// candidate tied at or below zero — the degenerate fused sets `z_normalize`
/// can produce when a list has no spread to discriminate on), division
/// can't manufacture a `1.0` from it: dividing a non-positive max by itself
/// and clamping to zero sends everything to `0`, silently violating P4. In
/// that case every candidate tied with the maximum is reported at `1.0`
/// directly instead, and the rest clamp to `0`.
pub fn max_normalize(mut scored: Vec<(Uuid, f32)>) -> Vec<(Uuid, f32)> {
    if scored.is_empty() {
        return scored;
    }
    let max_score = scored.iter().map(|(_, s)| *s).fold(f32::MIN, f32::max);
    if max_score > 0.0 {
        for (_, score) in scored.iter_mut() {
            *score = (*score / max_score).max(0.0);
        }
    } else {
        for (_, score) in scored.iter_mut() {
            *score = if *score >= max_score { 1.0 } else { 0.0 };
        }
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Uuid {
        Uuid::from_bytes([n; 16])
    }

    #[test]
    fn fused_scores_are_sorted_descending() {
        let dense = vec![(id(1), 0.9), (id(2), 0.3), (id(3), 0.5)];
        let sparse = vec![(id(1), 2.0), (id(2), 8.0)];
        let fused = dbsf_fuse(&dense, &sparse);
        let mut scores = fused.iter().map(|(_, s)| *s);
        let mut previous = scores.next().unwrap();
        for score in scores {
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn ids_present_in_only_one_list_still_contribute() {
        let dense = vec![(id(1), 0.9)];
        let sparse: Vec<(Uuid, f32)> = Vec::new();
        let fused = dbsf_fuse(&dense, &sparse);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].0, id(1));
    }

    #[test]
    fn max_normalize_bounds_every_score_in_unit_interval() {
        let scored = vec![(id(1), 4.0), (id(2), 1.0), (id(3), -2.0)];
        let normalized = max_normalize(scored);
        assert!(normalized.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
        assert!(normalized.iter().any(|(_, s)| *s == 1.0));
    }

    #[test]
    fn max_normalize_forces_the_top_score_to_one_when_the_maximum_is_nonpositive() {
        let scored = vec![(id(1), -1.0), (id(2), -3.0)];
        let normalized: HashMap<Uuid, f32> = max_normalize(scored).into_iter().collect();
        assert_eq!(normalized[&id(1)], 1.0);
        assert_eq!(normalized[&id(2)], 0.0);
    }

    #[test]
    fn max_normalize_forces_a_single_nonpositive_result_to_one() {
        let scored = vec![(id(1), 0.0)];
        let normalized = max_normalize(scored);
        assert_eq!(normalized[0].1, 1.0);
    }

    #[test]
    fn max_normalize_forces_every_tied_candidate_to_one() {
        let scored = vec![(id(1), -2.0), (id(2), -2.0)];
        let normalized = max_normalize(scored);
        assert!(normalized.iter().all(|(_, s)| *s == 1.0));
    }

    #[test]
    fn increasing_one_dense_score_never_decreases_its_final_rank() {
        let sparse = vec![(id(1), 1.0), (id(2), 2.0), (id(3), 3.0)];
        let low_dense = vec![(id(1), 0.1), (id(2), 0.5), (id(3), 0.5)];
        let high_dense = vec![(id(1), 0.9), (id(2), 0.5), (id(3), 0.5)];

        let rank_of = |fused: &[(Uuid, f32)], target: Uuid| fused.iter().position(|(id, _)| *id == target).unwrap();

        let before = max_normalize(dbsf_fuse(&low_dense, &sparse));
        let after = max_normalize(dbsf_fuse(&high_dense, &sparse));
        assert!(rank_of(&after, id(1)) <= rank_of(&before, id(1)));
    }
}
