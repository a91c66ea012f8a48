use proptest::prelude::*;

use blockref::config::SearchFields;
use blockref::corpus::{CorpusProvider, MemoryCorpus};
use blockref::extract::extract;
use blockref::index::build_index;
use blockref::rank::{fuzzy_match, rank};

proptest! {
    #[test]
    fn ranking_is_deterministic(
        texts in prop::collection::vec("[ -~]{0,30}", 0..16),
        query in "[a-z]{0,4}",
    ) {
        let blocks: Vec<(String, String)> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| (format!("b{i}"), format!("{text} ^b{i}")))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            blocks.iter().map(|(id, text)| (id.as_str(), text.as_str())).collect();
        let corpus = MemoryCorpus::new().with_blocks("note.md", &borrowed);

        let index = build_index(extract(&corpus), SearchFields::default());
        prop_assert_eq!(index.len(), texts.len());
        prop_assert_eq!(rank(&query, &index, 50), rank(&query, &index, 50));
    }

    #[test]
    fn extraction_is_deterministic(texts in prop::collection::vec("[a-z ]{1,20}", 1..8)) {
        let blocks: Vec<(String, String)> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| (format!("id{i}"), format!("{text} ^id{i}")))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            blocks.iter().map(|(id, text)| (id.as_str(), text.as_str())).collect();
        let corpus = MemoryCorpus::new().with_blocks("n.md", &borrowed);

        prop_assert_eq!(corpus.list_documents().len(), 1);
        let first = extract(&corpus);
        prop_assert_eq!(&first, &extract(&corpus));
        for (record, (id, _)) in first.iter().zip(&blocks) {
            prop_assert_eq!(&record.id, id);
        }
    }

    #[test]
    fn case_does_not_change_the_match(text in "[a-zA-Z]{1,20}", query in "[a-z]{1,3}") {
        let lower = fuzzy_match(&query, &text);
        let upper = fuzzy_match(&query.to_uppercase(), &text);
        prop_assert_eq!(lower, upper);
    }
}
