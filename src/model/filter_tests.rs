//! Tests for filter normalization and collection helpers.

use super::*;

fn contains(tags: &[&str]) -> ColumnFilterCondition {
    ColumnFilterCondition::new(OperatorCode::Contains, tags.iter().copied())
}

// ===== Condition Normalization =====

#[test]
fn normalized_condition_trims_tags() {
    let condition = contains(&["  acme ", "\tcorp"]);
    assert_eq!(condition.normalized().search_tags, vec!["acme", "corp"]);
}

#[test]
fn normalized_condition_drops_empty_and_whitespace_tags() {
    let condition = contains(&["", "   ", "acme"]);
    assert_eq!(condition.normalized().search_tags, vec!["acme"]);
}

#[test]
fn normalized_condition_drops_repeated_tags_after_trim() {
    let condition = contains(&["acme", " acme", "corp", "acme "]);
    assert_eq!(condition.normalized().search_tags, vec!["acme", "corp"]);
}

#[test]
fn valueless_operator_clears_tags() {
    let condition = ColumnFilterCondition::new(OperatorCode::IsBlank, ["foo"]);
    let normalized = condition.normalized();
    assert_eq!(normalized.condition_type, OperatorCode::IsBlank);
    assert!(normalized.search_tags.is_empty());
}

#[test]
fn is_satisfiable_requires_tags_for_value_operators() {
    assert!(!contains(&[]).is_satisfiable());
    assert!(contains(&["x"]).is_satisfiable());
    assert!(ColumnFilterCondition::valueless(OperatorCode::IsNotBlank).is_satisfiable());
}

// ===== Filter Normalization =====

#[test]
fn filter_with_empty_secondary_degrades_to_single() {
    let filter = ColumnFilter::pair(
        "email",
        FilterType::MultiText,
        JoinOperator::And,
        contains(&["acme"]),
        contains(&["  "]),
    );

    let normalized = filter.normalized().expect("primary survives");

    assert_eq!(normalized.operator, None);
    assert_eq!(normalized.conditions, vec![contains(&["acme"])]);
}

#[test]
fn filter_with_no_surviving_conditions_collapses() {
    let filter = ColumnFilter::single("email", FilterType::Text, contains(&[" "]));
    assert_eq!(filter.normalized(), None);
}

#[test]
fn filter_pair_without_operator_defaults_to_or() {
    let filter = ColumnFilter {
        column_name: "status".to_string(),
        filter_type: FilterType::MultiText,
        operator: None,
        conditions: vec![contains(&["a"]), contains(&["b"])],
    };

    let normalized = filter.normalized().unwrap();
    assert_eq!(normalized.operator, Some(JoinOperator::Or));
}

#[test]
fn filter_keeps_at_most_two_conditions() {
    let filter = ColumnFilter {
        column_name: "status".to_string(),
        filter_type: FilterType::MultiText,
        operator: Some(JoinOperator::And),
        conditions: vec![contains(&["a"]), contains(&["b"]), contains(&["c"])],
    };

    let normalized = filter.normalized().unwrap();
    assert_eq!(normalized.conditions.len(), 2);
    assert_eq!(normalized.operator, Some(JoinOperator::And));
}

#[test]
fn normalize_filters_removes_collapsed_entries() {
    let filters = vec![
        ColumnFilter::single("email", FilterType::MultiText, contains(&["acme"])),
        ColumnFilter::single("name", FilterType::MultiText, contains(&[""])),
    ];

    let normalized = normalize_filters(&filters);

    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].column_name, "email");
}

#[test]
fn normalize_filters_keeps_first_entry_per_column() {
    let filters = vec![
        ColumnFilter::single("email", FilterType::MultiText, contains(&["first"])),
        ColumnFilter::single("email", FilterType::MultiText, contains(&["second"])),
    ];

    let normalized = normalize_filters(&filters);

    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].conditions[0].search_tags, vec!["first"]);
}

#[test]
fn normalize_filters_drops_entries_without_column_name() {
    let filters = vec![ColumnFilter::single("", FilterType::Text, contains(&["x"]))];
    assert!(normalize_filters(&filters).is_empty());
}

#[test]
fn normalize_filters_is_idempotent_byte_for_byte() {
    let filters = vec![
        ColumnFilter::pair(
            "email",
            FilterType::MultiText,
            JoinOperator::And,
            contains(&[" acme ", "acme", ""]),
            ColumnFilterCondition::new(OperatorCode::IsNotBlank, ["ignored"]),
        ),
        ColumnFilter::single("status", FilterType::Text, contains(&["open "])),
    ];

    let once = normalize_filters(&filters);
    let twice = normalize_filters(&once);

    assert_eq!(
        serde_json::to_string(&once).unwrap(),
        serde_json::to_string(&twice).unwrap()
    );
}

// ===== Collection Helpers =====

#[test]
fn upsert_filter_appends_new_column() {
    let mut filters = Vec::new();
    upsert_filter(
        &mut filters,
        ColumnFilter::single("email", FilterType::MultiText, contains(&["acme"])),
    );
    assert_eq!(filters.len(), 1);
}

#[test]
fn upsert_filter_replaces_in_place() {
    let mut filters = vec![
        ColumnFilter::single("email", FilterType::MultiText, contains(&["acme"])),
        ColumnFilter::single("status", FilterType::MultiText, contains(&["open"])),
    ];

    upsert_filter(
        &mut filters,
        ColumnFilter::pair(
            "email",
            FilterType::MultiText,
            JoinOperator::Or,
            contains(&["a"]),
            contains(&["b"]),
        ),
    );

    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0].column_name, "email");
    assert_eq!(filters[0].operator, Some(JoinOperator::Or));
    assert_eq!(filters[0].conditions.len(), 2);
}

#[test]
fn remove_filter_reports_whether_anything_was_removed() {
    let mut filters = vec![ColumnFilter::single(
        "email",
        FilterType::MultiText,
        contains(&["acme"]),
    )];

    assert!(!remove_filter(&mut filters, "status"));
    assert!(remove_filter(&mut filters, "email"));
    assert!(filters.is_empty());
}

#[test]
fn find_filter_by_column_name() {
    let filters = vec![ColumnFilter::single(
        "email",
        FilterType::MultiText,
        contains(&["acme"]),
    )];
    assert!(find_filter(&filters, "email").is_some());
    assert!(find_filter(&filters, "name").is_none());
}

// ===== Wire Format =====

#[test]
fn single_condition_filter_serializes_null_operator() {
    let filter = ColumnFilter::single("email", FilterType::MultiText, contains(&["acme"]));

    let value = serde_json::to_value(&filter).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "columnName": "email",
            "filterType": "multi-text",
            "operator": null,
            "conditions": [{ "type": "contains", "searchTags": ["acme"] }]
        })
    );
}

#[test]
fn filter_deserializes_wire_operator_codes() {
    let raw = r#"{
        "columnName": "name",
        "filterType": "text",
        "operator": "and",
        "conditions": [
            { "type": "does_not_contain", "searchTags": ["x"] },
            { "type": "is_not_blank", "searchTags": [] }
        ]
    }"#;

    let filter: ColumnFilter = serde_json::from_str(raw).unwrap();

    assert_eq!(filter.filter_type, FilterType::Text);
    assert_eq!(filter.operator, Some(JoinOperator::And));
    assert_eq!(filter.conditions[0].condition_type, OperatorCode::DoesNotContain);
    assert_eq!(filter.conditions[1].condition_type, OperatorCode::IsNotBlank);
}

#[test]
fn operator_code_matches_serde_representation() {
    for op in OperatorCode::ALL {
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, format!("\"{}\"", op.code()));
    }
}

// ===== Display =====

#[test]
fn display_single_condition() {
    let filter = ColumnFilter::single("email", FilterType::MultiText, contains(&["acme"]));
    assert_eq!(filter.to_string(), "email contains \"acme\"");
}

#[test]
fn display_pair_with_valueless_operator() {
    let filter = ColumnFilter::pair(
        "status",
        FilterType::MultiText,
        JoinOperator::Or,
        ColumnFilterCondition::valueless(OperatorCode::IsBlank),
        ColumnFilterCondition::new(OperatorCode::Equals, ["x", "y"]),
    );
    assert_eq!(
        filter.to_string(),
        "status is blank or equals \"x\", \"y\""
    );
}
