use std::collections::BTreeMap;

use super::table::FlatTable;
use super::value::{IndexKey, Value};
use crate::error::{CoreError, Result};

/// Read-only projection of a [`FlatTable`] keyed by one or more fields.
///
/// Rows are grouped under their composite key (the values of the index
/// fields, in field order) and iterated in ascending key order. Every row
/// of the table is reachable through exactly one composite key.
#[derive(Debug, Clone)]
pub struct IndexedView<'a> {
    table: &'a FlatTable,
    fields: Vec<String>,
    groups: BTreeMap<Vec<Value>, Vec<usize>>,
}

impl<'a> IndexedView<'a> {
    /// Re-key `table` by `fields`.
    ///
    /// Fails with `MissingField` if any field is not a column of the table.
    pub fn build<S: AsRef<str>>(table: &'a FlatTable, fields: &[S]) -> Result<Self> {
        if fields.is_empty() {
            return Err(CoreError::Validation(
                "an indexed view needs at least one index field".to_string(),
            ));
        }

        let positions = fields
            .iter()
            .map(|f| table.column_index(f.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
        for (row_index, row) in table.rows().iter().enumerate() {
            let key: Vec<Value> = positions.iter().map(|&p| row[p].clone()).collect();
            groups.entry(key).or_default().push(row_index);
        }

        tracing::debug!(
            fields = ?fields.iter().map(|f| f.as_ref()).collect::<Vec<_>>(),
            rows = table.len(),
            keys = groups.len(),
            "Built indexed view"
        );

        Ok(Self {
            table,
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            groups,
        })
    }

    pub fn table(&self) -> &'a FlatTable {
        self.table
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of records reachable through the view
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Distinct composite keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.groups.keys().map(|k| k.as_slice())
    }

    /// Every record paired with its composite key, in key order
    pub fn entries(&self) -> impl Iterator<Item = (&[Value], &'a [Value])> + '_ {
        let table = self.table;
        self.groups.iter().flat_map(move |(key, rows)| {
            rows.iter()
                .map(move |&i| (key.as_slice(), table.rows()[i].as_slice()))
        })
    }

    /// Records whose composite key starts with `key`, in key order
    pub fn select(&self, key: &IndexKey) -> Result<Vec<&'a [Value]>> {
        if key.is_empty() || key.len() > self.fields.len() {
            return Err(CoreError::Validation(format!(
                "key {} must have between 1 and {} values",
                key,
                self.fields.len()
            )));
        }

        let table = self.table;
        let rows = self
            .groups
            .range(key.values().to_vec()..)
            .take_while(|(composite, _)| key.matches(composite))
            .flat_map(|(_, rows)| rows.iter().map(move |&i| table.rows()[i].as_slice()))
            .collect();
        Ok(rows)
    }

    /// Numeric `feature` values of the records selected by `key` whose
    /// `time_column` equals `time_value`.
    ///
    /// Fails with `MissingField` for unknown columns and with
    /// `InsufficientData` when no record matches.
    pub fn sample(
        &self,
        key: &IndexKey,
        time_column: &str,
        time_value: &Value,
        feature: &str,
    ) -> Result<Vec<f64>> {
        let time_index = self.table.column_index(time_column)?;
        let feature_index = self.table.column_index(feature)?;

        let values = self
            .select(key)?
            .into_iter()
            .filter(|row| &row[time_index] == time_value)
            .map(|row| {
                row[feature_index].as_f64().ok_or_else(|| {
                    CoreError::Validation(format!(
                        "field '{}' holds non-numeric value '{}' for key {}",
                        feature, row[feature_index], key
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.is_empty() {
            return Err(CoreError::InsufficientData(format!(
                "no records for key {} with {} = {}",
                key, time_column, time_value
            )));
        }

        Ok(values)
    }
}
