//! Property tests for the list view and tag sanitation

use std::collections::HashMap;

use orangepad_core::metadata::sanitize_tags;
use orangepad_core::view::ActiveFilter;
use orangepad_core::{arrange, PromptRecord, SortConfig, SortField, SortOrder};
use proptest::prelude::*;
use serde_json::Value;

const UNTITLED: &str = "Untitled Prompt";
const FAVORITES: &str = "🍊 Favorites";

fn record_strategy() -> impl Strategy<Value = PromptRecord> {
    (
        "[a-zA-Z ]{0,8}",
        proptest::sample::subsequence(vec!["food", "code", "travel"], 0..=3),
        any::<bool>(),
        0i64..20,
        0u32..5,
        proptest::option::of(1i64..20),
    )
        .prop_map(|(title, tags, is_favorite, created_at, use_count, last_copied_at)| {
            let mut record = PromptRecord::new("text", title, created_at);
            record.tags = tags.into_iter().map(String::from).collect();
            record.is_favorite = is_favorite;
            record.use_count = use_count;
            record.last_copied_at = last_copied_at;
            record
        })
}

fn sort_strategy() -> impl Strategy<Value = SortConfig> {
    (
        prop_oneof![
            Just(SortField::CreatedAt),
            Just(SortField::Title),
            Just(SortField::UseCount),
            Just(SortField::LastCopiedAt),
        ],
        prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)],
    )
        .prop_map(|(field, order)| SortConfig::new(field, order))
}

fn filter_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("")),
        Just(Some(FAVORITES)),
        Just(Some("food")),
        Just(Some("Food")),
    ]
}

/// Numeric sort key, `None` for title sorts
fn numeric_key(record: &PromptRecord, field: SortField) -> Option<i64> {
    match field {
        SortField::CreatedAt => Some(record.created_at),
        SortField::UseCount => Some(i64::from(record.use_count)),
        SortField::LastCopiedAt => Some(record.last_copied_at.unwrap_or(0)),
        SortField::Title => None,
    }
}

proptest! {
    #[test]
    fn favorites_always_come_first(
        records in proptest::collection::vec(record_strategy(), 0..30),
        sort in sort_strategy(),
        filter in filter_strategy(),
    ) {
        let arranged = arrange(&records, sort, filter, UNTITLED, FAVORITES);
        let first_plain = arranged.iter().position(|r| !r.is_favorite).unwrap_or(arranged.len());
        prop_assert!(arranged[first_plain..].iter().all(|r| !r.is_favorite));
    }

    #[test]
    fn filter_keeps_exactly_the_matching_records(
        records in proptest::collection::vec(record_strategy(), 0..30),
        sort in sort_strategy(),
        filter in filter_strategy(),
    ) {
        let arranged = arrange(&records, sort, filter, UNTITLED, FAVORITES);
        let resolved = ActiveFilter::resolve(filter, FAVORITES);

        let expected = records
            .iter()
            .filter(|r| resolved.map_or(true, |f| f.matches(r)))
            .count();
        prop_assert_eq!(arranged.len(), expected);

        match filter {
            Some(FAVORITES) => prop_assert!(arranged.iter().all(|r| r.is_favorite)),
            Some("food") => prop_assert!(arranged.iter().all(|r| r.has_tag("food"))),
            // Tag matching is case-sensitive and stored tags are lowercase
            Some("Food") => prop_assert!(arranged.is_empty()),
            _ => prop_assert_eq!(arranged.len(), records.len()),
        }
    }

    #[test]
    fn numeric_sorts_are_ordered_and_stable(
        records in proptest::collection::vec(record_strategy(), 0..30),
        sort in sort_strategy(),
    ) {
        prop_assume!(sort.field != SortField::Title);

        let position: HashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.as_str(), i))
            .collect();
        let arranged = arrange(&records, sort, None, UNTITLED, FAVORITES);

        for pair in arranged.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.is_favorite != b.is_favorite {
                continue;
            }
            let (ka, kb) = (numeric_key(a, sort.field), numeric_key(b, sort.field));
            match sort.order {
                SortOrder::Asc => prop_assert!(ka <= kb),
                SortOrder::Desc => prop_assert!(ka >= kb),
            }
            if ka == kb {
                prop_assert!(position[a.id.as_str()] < position[b.id.as_str()]);
            }
        }
    }

    #[test]
    fn order_only_flips_within_favorite_groups(
        records in proptest::collection::vec(record_strategy(), 0..30),
    ) {
        let asc = arrange(&records, SortConfig::new(SortField::UseCount, SortOrder::Asc), None, UNTITLED, FAVORITES);
        let desc = arrange(&records, SortConfig::new(SortField::UseCount, SortOrder::Desc), None, UNTITLED, FAVORITES);

        let flags = |list: &[&PromptRecord]| list.iter().map(|r| r.is_favorite).collect::<Vec<_>>();
        prop_assert_eq!(flags(&asc), flags(&desc));
    }

    #[test]
    fn sanitize_tags_is_idempotent(raw in proptest::collection::vec("[ a-zA-Z]{0,6}", 0..12)) {
        let values: Vec<Value> = raw.into_iter().map(Value::String).collect();
        let once = sanitize_tags(&values);
        let again: Vec<Value> = once.iter().cloned().map(Value::String).collect();

        prop_assert_eq!(sanitize_tags(&again), once.clone());
        for tag in &once {
            prop_assert_eq!(tag.trim(), tag.as_str());
            prop_assert_eq!(tag.to_lowercase(), tag.clone());
            prop_assert!(!tag.is_empty());
        }
    }
}
