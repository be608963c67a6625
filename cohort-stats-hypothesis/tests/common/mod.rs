#![allow(dead_code)]

use cohort_stats_core::{FlatTable, IndexKey, Value};

pub const FEATURE: &str = "value";
pub const TIME: &str = "Year";

/// Two cohorts (A, B) observed in 2000 and 2001, five records each.
///
/// 2000: A = 10..=14, B = 20..=24 (same spread, B shifted up by 10)
/// 2001: A is tightly clustered around 5, B spreads from 0 to 10
pub fn cohort_table() -> FlatTable {
    let mut table = FlatTable::new(vec!["Status", TIME, FEATURE]).unwrap();
    let records: [(&str, i64, [f64; 5]); 4] = [
        ("A", 2000, [10.0, 11.0, 12.0, 13.0, 14.0]),
        ("B", 2000, [20.0, 21.0, 22.0, 23.0, 24.0]),
        ("A", 2001, [4.9, 5.0, 5.0, 5.1, 5.0]),
        ("B", 2001, [0.0, 3.0, 5.0, 7.0, 10.0]),
    ];
    for (status, year, values) in records {
        for value in values {
            table
                .push_row(vec![Value::from(status), Value::from(year), Value::from(value)])
                .unwrap();
        }
    }
    table
}

/// Single cohort "C" in 2000 with `n` records
pub fn single_cohort(n: usize) -> FlatTable {
    let mut table = FlatTable::new(vec!["Status", TIME, FEATURE]).unwrap();
    for i in 0..n {
        table
            .push_row(vec![
                Value::from("C"),
                Value::from(2000i64),
                Value::from(i as f64 * 0.5),
            ])
            .unwrap();
    }
    table
}

pub fn key(name: &str) -> IndexKey {
    IndexKey::from(name)
}

pub fn year(y: i64) -> Value {
    Value::from(y)
}
