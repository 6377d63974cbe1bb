//! Row-to-record mapping for a target schema.

use intake_model::{CanonicalRecord, FieldKind, FieldValue, Schema};

use crate::alias::{KeyMap, resolve_alias};
use crate::coerce::{DateMode, coerce_date, coerce_number, coerce_text};
use crate::detect::RawRow;

/// Maps raw rows onto one schema.
///
/// Mapping never fails. Fields whose aliases are absent or whose cells do not
/// coerce stay null; callers check [`CanonicalRecord::is_complete`].
#[derive(Debug, Clone, Copy)]
pub struct RecordMapper {
    schema: &'static Schema,
    date_mode: DateMode,
}

impl RecordMapper {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            date_mode: DateMode::default(),
        }
    }

    #[must_use]
    pub fn with_date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn map(&self, row: &RawRow) -> CanonicalRecord {
        let keys = KeyMap::from_row(row);
        let mut record = CanonicalRecord::new(self.schema);
        for field in self.schema.fields {
            let value =
                resolve_alias(&keys, field.aliases).and_then(|raw| self.coerce(field.kind, raw));
            record.set(field.name, value);
        }
        record
    }

    fn coerce(&self, kind: FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::Text => coerce_text(raw).map(FieldValue::Text),
            FieldKind::Date => coerce_date(raw, self.date_mode).map(FieldValue::Date),
            FieldKind::Number => coerce_number(raw).map(FieldValue::Number),
        }
    }
}
