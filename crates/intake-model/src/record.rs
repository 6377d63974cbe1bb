//! Canonical records produced from source rows.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::ids::ActorId;
use crate::schema::{FieldSpec, Schema};

/// A coerced field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// ISO `YYYY-MM-DD`, or the raw prefix kept by lenient date coercion.
    Date(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Date(value) => Some(value),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) | Self::Date(value) => value.trim().is_empty(),
            Self::Number(value) => !value.is_finite(),
        }
    }
}

/// One row mapped onto a schema.
///
/// Values are stored parallel to [`Schema::fields`]. A record can be built
/// with required fields missing; [`CanonicalRecord::is_complete`] decides
/// whether it may be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    schema: &'static Schema,
    values: Vec<Option<FieldValue>>,
}

impl CanonicalRecord {
    /// Creates a record with every field null.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: vec![None; schema.fields.len()],
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Sets a field by canonical name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match self.schema.position(name) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let idx = self.schema.position(name)?;
        self.values[idx].as_ref()
    }

    /// Field specs paired with their values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldSpec, Option<&FieldValue>)> {
        self.schema
            .fields
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    /// Names of required fields that are null or blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.fields()
            .filter(|(spec, value)| spec.required && value.is_none_or(FieldValue::is_blank))
            .map(|(spec, _)| spec.name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Stamps the acting user onto the record.
    pub fn attribute(self, actor: ActorId) -> AttributedRecord {
        AttributedRecord {
            record: self,
            actor,
        }
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (spec, value) in self.fields() {
            map.serialize_entry(spec.name, &value)?;
        }
        map.end()
    }
}

/// A record ready for storage, carrying its audit attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedRecord {
    record: CanonicalRecord,
    actor: ActorId,
}

impl AttributedRecord {
    pub fn record(&self) -> &CanonicalRecord {
        &self.record
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn table(&self) -> &'static str {
        self.record.schema.table
    }

    pub fn attribution_column(&self) -> &'static str {
        self.record.schema.attribution_column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CARD_SCHEMA, CASE_SCHEMA};

    fn text(value: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(value.to_string()))
    }

    #[test]
    fn new_record_misses_all_required() {
        let record = CanonicalRecord::new(&CASE_SCHEMA);
        assert_eq!(
            record.missing_required(),
            vec!["applicant_name", "appeal_date"]
        );
        assert!(!record.is_complete());
    }

    #[test]
    fn blank_required_text_counts_as_missing() {
        let mut record = CanonicalRecord::new(&CARD_SCHEMA);
        record.set("card_number", text("   "));
        record.set("blocked_at", Some(FieldValue::Date("2024-01-02".into())));
        assert_eq!(record.missing_required(), vec!["card_number"]);
    }

    #[test]
    fn complete_record() {
        let mut record = CanonicalRecord::new(&CARD_SCHEMA);
        record.set("card_number", text("8600 **** 1234"));
        record.set("blocked_at", Some(FieldValue::Date("2024-01-02".into())));
        assert!(record.is_complete());
        assert_eq!(record.get("balance"), None);
    }

    #[test]
    fn set_unknown_field_is_rejected() {
        let mut record = CanonicalRecord::new(&CARD_SCHEMA);
        assert!(!record.set("applicant_name", text("x")));
    }

    #[test]
    fn attribution_carries_table_and_column() {
        let attributed = CanonicalRecord::new(&CASE_SCHEMA).attribute(ActorId::new(7));
        assert_eq!(attributed.table(), "appeals");
        assert_eq!(attributed.attribution_column(), "created_by");
        assert_eq!(attributed.actor(), ActorId::new(7));
    }
}
