//! Storage-level row representation.

use intake_model::{AttributedRecord, FieldValue};
use serde::Serialize;

/// A single column value as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<Option<&FieldValue>> for ColumnValue {
    fn from(value: Option<&FieldValue>) -> Self {
        match value {
            None => Self::Null,
            Some(FieldValue::Text(text) | FieldValue::Date(text)) => Self::Text(text.clone()),
            Some(FieldValue::Number(number)) => Self::Real(*number),
        }
    }
}

/// Ordered column/value pairs for one insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsertRow {
    columns: Vec<(&'static str, ColumnValue)>,
}

impl InsertRow {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: &'static str, value: ColumnValue) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &'static str, value: ColumnValue) {
        self.columns.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &ColumnValue> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<&AttributedRecord> for InsertRow {
    /// Schema fields in order, followed by the attribution column.
    fn from(attributed: &AttributedRecord) -> Self {
        let mut row = Self::new();
        for (spec, value) in attributed.record().fields() {
            row.push(spec.name, ColumnValue::from(value));
        }
        row.push(
            attributed.attribution_column(),
            ColumnValue::Integer(attributed.actor().get()),
        );
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::{ActorId, CARD_SCHEMA, CanonicalRecord};

    #[test]
    fn attributed_record_becomes_row_with_actor_last() {
        let mut record = CanonicalRecord::new(&CARD_SCHEMA);
        record.set("card_number", Some(FieldValue::Text("8600".into())));
        record.set("blocked_at", Some(FieldValue::Date("2024-01-01".into())));
        record.set("balance", Some(FieldValue::Number(12.5)));

        let row = InsertRow::from(&record.attribute(ActorId::new(3)));
        let names: Vec<_> = row.column_names().collect();
        assert_eq!(
            names,
            vec!["card_number", "blocked_at", "balance", "comment", "blocked_by"]
        );
        assert_eq!(row.get("balance"), Some(&ColumnValue::Real(12.5)));
        assert_eq!(row.get("comment"), Some(&ColumnValue::Null));
        assert_eq!(row.get("blocked_by"), Some(&ColumnValue::Integer(3)));
    }
}
