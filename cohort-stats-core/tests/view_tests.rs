use cohort_stats_core::domain::{FlatTable, IndexKey, IndexedView, Value};
use cohort_stats_core::error::CoreError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn table() -> FlatTable {
    let rows: Vec<Vec<Value>> = vec![
        vec!["Developing".into(), "Chad".into(), 2000i64.into(), 50.1.into()],
        vec!["Developed".into(), "Austria".into(), 2000i64.into(), 78.0.into()],
        vec!["Developing".into(), "Chad".into(), 2001i64.into(), 50.6.into()],
        vec!["Developing".into(), "Peru".into(), 2000i64.into(), 71.9.into()],
        vec!["Developed".into(), "Austria".into(), 2001i64.into(), Value::Null],
        vec!["Developing".into(), "Peru".into(), 2001i64.into(), "n/a".into()],
    ];
    FlatTable::from_rows(vec!["Status", "Country", "Year", "Life_expectancy"], rows).unwrap()
}

// ===== Table =====

#[test]
fn test_table_rejects_bad_columns() {
    assert!(matches!(
        FlatTable::new(vec!["a", "a"]),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        FlatTable::new(vec!["a", ""]),
        Err(CoreError::Validation(_))
    ));
}

#[rstest]
fn test_table_rejects_short_row(mut table: FlatTable) {
    let err = table.push_row(vec![Value::from("Developing")]).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(table.len(), 6);
}

#[rstest]
fn test_column_lookup(table: FlatTable) {
    assert_eq!(table.column_index("Year").unwrap(), 2);
    assert_eq!(
        table.column_index("GDP").unwrap_err(),
        CoreError::MissingField("GDP".to_string())
    );
    assert_eq!(table.column("Country").unwrap()[1], &Value::from("Austria"));
}

#[test]
fn test_table_deserialization_checks_arity() {
    let ok: FlatTable =
        serde_json::from_str(r#"{"columns": ["a", "b"], "rows": [[1, "x"], [2, null]]}"#).unwrap();
    assert_eq!(ok.len(), 2);
    assert_eq!(ok.row(1).unwrap()[1], Value::Null);

    let bad = serde_json::from_str::<FlatTable>(r#"{"columns": ["a", "b"], "rows": [[1]]}"#);
    assert!(bad.is_err());
}

// ===== View =====

#[rstest]
fn test_view_groups_by_key_order(table: FlatTable) {
    let view = IndexedView::build(&table, &["Status", "Country"]).unwrap();

    let keys: Vec<Vec<Value>> = view.keys().map(|k| k.to_vec()).collect();
    assert_eq!(
        keys,
        vec![
            vec![Value::from("Developed"), Value::from("Austria")],
            vec![Value::from("Developing"), Value::from("Chad")],
            vec![Value::from("Developing"), Value::from("Peru")],
        ]
    );
    assert_eq!(view.len(), table.len());
    assert_eq!(view.fields().to_vec(), vec!["Status".to_string(), "Country".to_string()]);
}

#[rstest]
fn test_select_by_prefix(table: FlatTable) {
    let view = IndexedView::build(&table, &["Status", "Country"]).unwrap();

    let developing = view.select(&IndexKey::from("Developing")).unwrap();
    assert_eq!(developing.len(), 4);

    let chad = view
        .select(&IndexKey::new(vec!["Developing".into(), "Chad".into()]))
        .unwrap();
    assert_eq!(chad.len(), 2);
    assert!(chad.iter().all(|row| row[1] == Value::from("Chad")));

    assert!(view.select(&IndexKey::from("Unknown")).unwrap().is_empty());
}

#[rstest]
fn test_select_rejects_overlong_key(table: FlatTable) {
    let view = IndexedView::build(&table, &["Status"]).unwrap();
    let err = view
        .select(&IndexKey::new(vec!["Developing".into(), "Chad".into()]))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[rstest]
fn test_build_rejects_unknown_field(table: FlatTable) {
    let err = IndexedView::build(&table, &["Region"]).unwrap_err();
    assert_eq!(err, CoreError::MissingField("Region".to_string()));

    let no_fields: [&str; 0] = [];
    assert!(matches!(
        IndexedView::build(&table, &no_fields),
        Err(CoreError::Validation(_))
    ));
}

#[rstest]
fn test_sample_filters_time_value(table: FlatTable) {
    let view = IndexedView::build(&table, &["Status"]).unwrap();
    let sample = view
        .sample(
            &IndexKey::from("Developing"),
            "Year",
            &Value::Integer(2000),
            "Life_expectancy",
        )
        .unwrap();

    assert_eq!(sample, vec![50.1, 71.9]);
}

#[rstest]
fn test_sample_errors(table: FlatTable) {
    let view = IndexedView::build(&table, &["Status"]).unwrap();
    let developed = IndexKey::from("Developed");
    let developing = IndexKey::from("Developing");

    // null feature value
    let err = view
        .sample(&developed, "Year", &Value::Integer(2001), "Life_expectancy")
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // text feature value
    let err = view
        .sample(&developing, "Year", &Value::Integer(2001), "Life_expectancy")
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // no rows for that year
    let err = view
        .sample(&developed, "Year", &Value::Integer(1999), "Life_expectancy")
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientData(_)));

    // float year never matches integer years
    let err = view
        .sample(&developed, "Year", &Value::Float(2000.0), "Life_expectancy")
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientData(_)));

    let err = view
        .sample(&developed, "Period", &Value::Integer(2000), "Life_expectancy")
        .unwrap_err();
    assert_eq!(err, CoreError::MissingField("Period".to_string()));
}

proptest! {
    #[test]
    fn test_every_row_reachable_once(
        rows in prop::collection::vec((0i64..4, 0i64..3, -100.0f64..100.0), 0..40)
    ) {
        let table = FlatTable::from_rows(
            vec!["group", "year", "x"],
            rows.iter()
                .map(|(g, y, x)| vec![Value::Integer(*g), Value::Integer(*y), Value::Float(*x)])
                .collect(),
        )
        .unwrap();
        let view = IndexedView::build(&table, &["group", "year"]).unwrap();

        prop_assert_eq!(view.len(), rows.len());
        prop_assert_eq!(view.entries().count(), rows.len());

        let mut selected = 0;
        for g in 0i64..4 {
            let key = IndexKey::from(g);
            let picked = view.select(&key).unwrap();
            prop_assert!(picked.iter().all(|row| row[0] == Value::Integer(g)));
            selected += picked.len();
        }
        prop_assert_eq!(selected, rows.len());
    }
}
