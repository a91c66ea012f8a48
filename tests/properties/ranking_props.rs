use proptest::prelude::*;

use blockref::config::SearchFields;
use blockref::corpus::Document;
use blockref::extract::BlockRecord;
use blockref::index::{SearchableRecord, build_index, search_text};
use blockref::rank::{NEUTRAL_SCORE, fold_char, rank};

fn record_strategy() -> impl Strategy<Value = BlockRecord> {
    ("[a-z]{1,8}(/[a-z]{1,8})?\\.md", "[A-Za-z0-9-]{1,6}", "[ -~]{0,40}").prop_map(
        |(path, id, content)| BlockRecord {
            document: Document::new(path),
            id,
            content,
        },
    )
}

fn index_strategy() -> impl Strategy<Value = Vec<SearchableRecord>> {
    prop::collection::vec(record_strategy(), 0..24)
        .prop_map(|records| build_index(records, SearchFields::default()))
}

fn is_subsequence(query: &str, text: &str) -> bool {
    let mut text = text.chars().map(fold_char);
    query
        .chars()
        .map(fold_char)
        .all(|q| text.any(|t| t == q))
}

proptest! {
    #[test]
    fn search_text_concatenates_content_path_id(record in record_strategy()) {
        let expected = format!("{}{}{}", record.content, record.document.path, record.id);
        prop_assert_eq!(search_text(&record, SearchFields::default()), expected);
    }

    #[test]
    fn results_are_subsequence_matches(index in index_strategy(), query in "[a-zA-Z ]{1,4}") {
        for result in rank(&query, &index, 50) {
            let text = &index[result.candidate].search_text;
            prop_assert!(is_subsequence(&query, text), "{query:?} not in {text:?}");
            prop_assert_eq!(result.positions.len(), query.chars().count());
            prop_assert!(result.positions.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(result.score > NEUTRAL_SCORE);
        }
    }

    #[test]
    fn every_subsequence_match_is_returned(index in index_strategy(), query in "[a-z]{1,3}") {
        let expected = index.iter().filter(|r| is_subsequence(&query, &r.search_text)).count();
        prop_assert_eq!(rank(&query, &index, usize::MAX).len(), expected);
    }

    #[test]
    fn empty_query_keeps_corpus_order(index in index_strategy(), limit in 1usize..=50) {
        let results = rank("", &index, limit);
        prop_assert_eq!(results.len(), index.len().min(limit));
        for (position, result) in results.iter().enumerate() {
            prop_assert_eq!(result.candidate, position);
            prop_assert_eq!(result.score, NEUTRAL_SCORE);
        }
    }

    #[test]
    fn limit_is_never_exceeded(
        index in index_strategy(),
        query in "[a-z]{0,3}",
        limit in 1usize..=50,
    ) {
        prop_assert!(rank(&query, &index, limit).len() <= limit);
    }

    #[test]
    fn ties_keep_corpus_order(index in index_strategy(), query in "[a-z]{1,3}") {
        let results = rank(&query, &index, 50);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].candidate < pair[1].candidate);
            }
        }
    }
}
