use intent_core::{edit_distance, resolve, similarity, Catalog, DomainVocabulary, PatternScorer, Query};
use proptest::prelude::*;

const SAMPLE_CATALOG: &str = include_str!("../../data/intents.json");

proptest! {
    #[test]
    fn identical_tokens_are_fully_similar(s in "\\PC{1,24}") {
        prop_assert_eq!(similarity(&s, &s), 1.0);
    }

    #[test]
    fn empty_token_is_nothing_alike(s in "\\PC{1,24}") {
        prop_assert_eq!(similarity(&s, ""), 0.0);
        prop_assert_eq!(similarity("", &s), 0.0);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
        let forward = similarity(&a, &b);
        prop_assert_eq!(forward, similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&forward));
    }

    #[test]
    fn edit_distance_bounded_by_longer_length(a in "\\PC{0,16}", b in "\\PC{0,16}") {
        let distance = edit_distance(&a, &b);
        let longest = a.chars().count().max(b.chars().count());
        prop_assert!(distance <= longest);
        prop_assert_eq!(distance == 0, a == b);
    }

    #[test]
    fn resolution_is_deterministic(query in "[a-z ?]{0,40}") {
        let catalog = Catalog::from_json_str(SAMPLE_CATALOG).unwrap();
        let scorer = PatternScorer::new(DomainVocabulary::new(&["cut", "fever", "headache"]).unwrap());

        let first = resolve(Query::Text(&query), Some(&catalog), &scorer).unwrap();
        let second = resolve(Query::Text(&query), Some(&catalog), &scorer).unwrap();
        prop_assert_eq!(first.label(), second.label());
        prop_assert_eq!(first.score, second.score);
        prop_assert!((0.0..=1.0 + 1e-9).contains(&first.score));
    }
}

#[test]
fn empty_tokens_are_identical() {
    assert_eq!(similarity("", ""), 1.0);
}
