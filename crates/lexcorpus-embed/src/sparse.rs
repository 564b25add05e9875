use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// One term of a sparse vector: a 64-bit hash of the token and its BM25
/// weight. The point-store adapter (C7) serializes these as the `sparse`
/// vector slot.
pub type SparseTerm = (u64, f32);

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Local BM25-style sparse embedding (§4.6, resolved in SPEC_FULL.md §4.6):
/// tokens are lower-cased, NFKD-normalized word runs; each distinct token is
/// hashed with `fxhash` to a term id; the weight is the standard Okapi BM25
/// term-saturation formula using the document's own token-frequency
/// statistics as a per-document stand-in for corpus statistics. There is no
/// corpus-wide IDF pass — this is a local computation, not an index.
pub fn sparse_embed(text: &str) -> Vec<SparseTerm> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Vec::new();
    }

    let doc_len = tokens.len() as f32;
    let mut term_freq: HashMap<u64, u32> = HashMap::new();
    for token in &tokens {
        *term_freq.entry(fxhash::hash64(token.as_bytes())).or_insert(0) += 1;
    }

    // With a single document as its own "corpus", avg_doc_len == doc_len,
    // which collapses the length-normalization term to exactly 1.0 whenever
    // B is applied uniformly — kept explicit anyway so the formula reads the
    // same as a corpus-backed BM25 implementation would.
    let avg_doc_len = doc_len;

    let mut weights: Vec<SparseTerm> = term_freq
        .into_iter()
        .map(|(term_id, freq)| {
            let tf = freq as f32;
            let numerator = tf * (K1 + 1.0);
            let denominator = tf + K1 * (1.0 - B + B * (doc_len / avg_doc_len));
            (term_id, numerator / denominator)
        })
        .collect();
    weights.sort_by_key(|(term_id, _)| *term_id);
    weights
}

fn tokenize(text: &str) -> Vec<String> {
    text.nfkd()
        .collect::<String>()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_terms() {
        assert!(sparse_embed("").is_empty());
    }

    #[test]
    fn repeated_token_gets_higher_weight_than_single_occurrence() {
        let repeated = sparse_embed("penalty penalty penalty offence");
        let single = sparse_embed("penalty offence");
        let penalty_id = fxhash::hash64("penalty".as_bytes());
        let repeated_weight = repeated.iter().find(|(id, _)| *id == penalty_id).unwrap().1;
        let single_weight = single.iter().find(|(id, _)| *id == penalty_id).unwrap().1;
        assert!(repeated_weight > single_weight);
    }

    #[test]
    fn terms_are_sorted_by_id_and_deduplicated() {
        let terms = sparse_embed("a a b b b c");
        let mut ids: Vec<u64> = terms.iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), terms.len());
        assert_eq!(ids, sorted);
    }

    #[test]
    fn case_and_normalization_fold_to_the_same_term() {
        let upper = sparse_embed("PENALTY");
        let lower = sparse_embed("penalty");
        assert_eq!(upper[0].0, lower[0].0);
    }
}
