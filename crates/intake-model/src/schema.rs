//! Target schemas and their alias tables.
//!
//! Each schema lists its canonical fields in storage order. A field carries
//! the ordered header spellings accepted for it; the first spelling present
//! in a row wins, so specific aliases must precede generic ones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which record family an import targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Complaint case ("appeal").
    Case,
    /// Blocked payment card ("drop card").
    Card,
}

impl EntityKind {
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Case => &CASE_SCHEMA,
            Self::Card => &CARD_SCHEMA,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value type a field is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// ISO `YYYY-MM-DD` date stored as text.
    Date,
    Number,
}

/// One canonical field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical name, also the storage column.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Rows without a value for this field are skipped.
    pub required: bool,
    /// Accepted header spellings, most specific first.
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    pub const fn required(
        name: &'static str,
        kind: FieldKind,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            required: true,
            aliases,
        }
    }

    pub const fn optional(
        name: &'static str,
        kind: FieldKind,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            required: false,
            aliases,
        }
    }
}

/// Schema descriptor for one record family.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub entity: EntityKind,
    /// Storage table receiving the records.
    pub table: &'static str,
    /// Column holding the acting user's id.
    pub attribution_column: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Index of a field within [`Schema::fields`].
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn aliases(&self, name: &str) -> Option<&'static [&'static str]> {
        self.field(name).map(|field| field.aliases)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }
}

const COMMENT_ALIASES: &[&str] = &["comment", "izoh", "note", "izohlar"];

/// Complaint cases, stored in `appeals`.
pub static CASE_SCHEMA: Schema = Schema {
    entity: EntityKind::Case,
    table: "appeals",
    attribution_column: "created_by",
    fields: &[
        FieldSpec::required(
            "applicant_name",
            FieldKind::Text,
            &[
                "applicant_name",
                "name",
                "applicant",
                "full_name",
                "fio",
                "murojaatchi",
                "murojaatchi_nomi",
            ],
        ),
        FieldSpec::optional("address", FieldKind::Text, &["address", "manzil"]),
        FieldSpec::optional(
            "phone",
            FieldKind::Text,
            &["phone", "tel", "telefon", "phone_number"],
        ),
        FieldSpec::optional(
            "source_org",
            FieldKind::Text,
            &["source_org", "org", "organization", "tashkilot"],
        ),
        FieldSpec::optional(
            "source_system",
            FieldKind::Text,
            &["source_system", "system", "tizim"],
        ),
        FieldSpec::optional("subject", FieldKind::Text, &["subject", "predmet"]),
        FieldSpec::optional(
            "direction",
            FieldKind::Text,
            &["direction", "yo'nalish", "yonalish", "yo\u{2019}nalish"],
        ),
        FieldSpec::optional(
            "client_code",
            FieldKind::Text,
            &["client_code", "clientid", "customer_code", "mijoz_kodi"],
        ),
        FieldSpec::optional(
            "card",
            FieldKind::Text,
            &["card", "card_number", "karta", "pan"],
        ),
        FieldSpec::required(
            "appeal_date",
            FieldKind::Date,
            &["appeal_date", "date", "sana"],
        ),
        FieldSpec::optional(
            "damage_amount",
            FieldKind::Number,
            &["damage_amount", "zarar", "amount", "summa"],
        ),
        FieldSpec::optional("comment", FieldKind::Text, COMMENT_ALIASES),
    ],
};

/// Blocked cards, stored in `drop_cards`.
pub static CARD_SCHEMA: Schema = Schema {
    entity: EntityKind::Card,
    table: "drop_cards",
    attribution_column: "blocked_by",
    fields: &[
        FieldSpec::required(
            "card_number",
            FieldKind::Text,
            &["card_number", "card", "karta", "pan", "card no", "cardno"],
        ),
        FieldSpec::required(
            "blocked_at",
            FieldKind::Date,
            &["blocked_at", "date", "sana", "blocked_date"],
        ),
        FieldSpec::optional(
            "balance",
            FieldKind::Number,
            &["balance", "qoldiq", "amount", "summa"],
        ),
        FieldSpec::optional("comment", FieldKind::Text, COMMENT_ALIASES),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_schema_requires_name_and_date() {
        let required: Vec<_> = CASE_SCHEMA.required_fields().map(|f| f.name).collect();
        assert_eq!(required, vec!["applicant_name", "appeal_date"]);
    }

    #[test]
    fn card_schema_requires_number_and_date() {
        let required: Vec<_> = CARD_SCHEMA.required_fields().map(|f| f.name).collect();
        assert_eq!(required, vec!["card_number", "blocked_at"]);
    }

    #[test]
    fn entity_selects_its_schema() {
        assert_eq!(EntityKind::Case.schema().table, "appeals");
        assert_eq!(EntityKind::Card.schema().attribution_column, "blocked_by");
        assert_eq!(EntityKind::Card.to_string(), "card");
    }

    #[test]
    fn field_lookup() {
        assert_eq!(CASE_SCHEMA.position("appeal_date"), Some(9));
        assert_eq!(
            CARD_SCHEMA.aliases("balance"),
            Some(&["balance", "qoldiq", "amount", "summa"][..])
        );
        assert!(CARD_SCHEMA.field("applicant_name").is_none());
    }
}
