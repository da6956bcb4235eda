//! Property tests for normalization, scoring and ranking

use proptest::prelude::*;
use resume_screener::processing::keywords::KeywordMatcher;
use resume_screener::processing::normalizer::Normalizer;
use resume_screener::processing::ranker::{rank, MatchTier, SimilarityResult};
use resume_screener::processing::vectorizer::TfidfVectorizer;

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,10}", 0..30).prop_map(|words| words.join(" "))
}

/// Words mixed with numbers, punctuation and page-like markers
fn resume_text() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        "[a-z]{1,10}",
        "[A-Z][a-z]{1,8}",
        "[0-9]{1,3}",
        Just("page".to_string()),
        Just("pages".to_string()),
        Just("Page".to_string()),
        "(page|Pages)[-:.,]?[0-9]{1,2}",
        "[a-z]{1,6}[-:.,!?]",
    ];
    prop::collection::vec(token, 0..30).prop_map(|tokens| tokens.join(" "))
}

fn tier_order(tier: MatchTier) -> u8 {
    match tier {
        MatchTier::Poor => 0,
        MatchTier::Fair => 1,
        MatchTier::Good => 2,
        MatchTier::Excellent => 3,
    }
}

proptest! {
    /// Normalizing normalized text changes nothing
    #[test]
    fn prop_normalize_is_idempotent(text in resume_text()) {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&text);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    /// Output is lowercase, single-spaced and free of stopwords
    #[test]
    fn prop_normalized_tokens_are_clean(text in "[A-Za-z0-9 ,.!?\n]{0,200}") {
        let normalizer = Normalizer::new();
        let normalized = normalizer.normalize(&text);

        prop_assert!(!normalized.contains("  "));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        for token in normalized.split(' ').filter(|t| !t.is_empty()) {
            prop_assert!(token.chars().all(|c| c.is_alphanumeric()));
            prop_assert_eq!(token.to_lowercase(), token);
            prop_assert!(!["the", "and", "of", "is"].contains(&token));
        }
    }

    /// Scores are in [0, 1], sorted descending, one per candidate
    #[test]
    fn prop_scores_bounded_and_sorted(
        query in words(),
        candidates in prop::collection::vec(words(), 1..8),
    ) {
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let outcome = TfidfVectorizer::default().fit_score(&query, &refs).unwrap();

        if outcome.model.is_some() {
            prop_assert_eq!(outcome.scores.len(), candidates.len());
        }
        for score in &outcome.scores {
            prop_assert!((0.0..=1.0).contains(&score.score));
        }
        for pair in outcome.scores.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    /// Ranks are 1..=n and tiers never increase down the list
    #[test]
    fn prop_rank_positions_and_tiers(mut scores in prop::collection::vec(0.0f64..=1.0, 0..20)) {
        scores.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let results: Vec<SimilarityResult> = scores
            .iter()
            .enumerate()
            .map(|(index, &score)| SimilarityResult { index, document_id: index.to_string(), score })
            .collect();

        let ranked = rank(&results);
        prop_assert_eq!(ranked.len(), scores.len());
        for (i, entry) in ranked.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
            prop_assert_eq!(entry.match_tier, MatchTier::from_score(entry.score));
        }
        for pair in ranked.windows(2) {
            prop_assert!(tier_order(pair[0].match_tier) >= tier_order(pair[1].match_tier));
        }
    }

    /// Matched keywords appear in both texts, are long enough and respect the limit
    #[test]
    fn prop_keywords_are_shared(query in words(), candidate in words(), top_n in 0usize..20) {
        let matcher = KeywordMatcher::default();
        let keywords = matcher.match_normalized(&query, &candidate, top_n);

        prop_assert!(keywords.len() <= top_n);
        for keyword in &keywords {
            prop_assert!(keyword.len() > 2);
            prop_assert!(query.split_whitespace().any(|t| t == keyword.as_str()));
            prop_assert!(candidate.split_whitespace().any(|t| t == keyword.as_str()));
        }
    }
}
