//! Integration tests for upload parsing and mapping.

use intake_ingest::{
    DateMode, DelimiterPolicy, IngestError, IngestOptions, RecordMapper, coerce_date,
    coerce_number, read_table,
};
use intake_model::{CARD_SCHEMA, CASE_SCHEMA, FieldValue};

fn case_export(delimiter: char) -> String {
    let header = ["Murojaatchi", "Telefon", "Sana", "Summa"].join(&delimiter.to_string());
    let rows = [
        ["Aliyev Vali", "+998901234567", "05.03.2024", "1 200"],
        ["Karimova Lola", "", "2024-03-06", ""],
        ["", "+998907654321", "07.03.24", "300"],
    ];
    let mut content = header + "\n";
    for row in rows {
        content.push_str(&row.join(&delimiter.to_string()));
        content.push('\n');
    }
    content
}

#[test]
fn each_delimiter_parses_to_same_structure() {
    for delimiter in [',', ';', '\t'] {
        let table = read_table(case_export(delimiter).as_bytes(), &IngestOptions::default())
            .unwrap_or_else(|e| panic!("{delimiter:?}: {e}"));
        assert_eq!(char::from(table.delimiter()), delimiter);
        assert_eq!(table.headers(), ["Murojaatchi", "Telefon", "Sana", "Summa"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1].get("Sana"), Some("2024-03-06"));
    }
}

#[test]
fn mapped_rows_split_into_complete_and_incomplete() {
    let table = read_table(case_export(';').as_bytes(), &IngestOptions::default()).unwrap();
    let mapper = RecordMapper::new(&CASE_SCHEMA);
    let records: Vec<_> = table.rows().iter().map(|row| mapper.map(row)).collect();

    let complete = records.iter().filter(|r| r.is_complete()).count();
    assert_eq!(complete, 2);
    assert_eq!(records[2].missing_required(), vec!["applicant_name"]);
    assert_eq!(
        records[0].get("damage_amount"),
        Some(&FieldValue::Number(1200.0))
    );
    assert_eq!(records[1].get("phone"), None);
}

#[test]
fn utf16_spreadsheet_export_is_read() {
    let text = "Card No\tSana\tQoldiq\r\n8600123412341234\t01.02.2024\t10.5\r\n";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let table = read_table(&bytes, &IngestOptions::default()).unwrap();
    assert_eq!(table.delimiter(), b'\t');
    let record = RecordMapper::new(&CARD_SCHEMA).map(&table.rows()[0]);
    assert!(record.is_complete());
    assert_eq!(
        record.get("blocked_at"),
        Some(&FieldValue::Date("2024-02-01".into()))
    );
}

#[test]
fn row_cap_rejects_before_mapping() {
    let mut content = String::from("name,date\n");
    for i in 0..10_001 {
        content.push_str(&format!("person {i},2024-01-01\n"));
    }
    let err = read_table(content.as_bytes(), &IngestOptions::default()).unwrap_err();
    assert_eq!(
        err,
        IngestError::TooManyRows {
            rows: 10_001,
            max: 10_000
        }
    );

    content.truncate(content.rfind("person 10000").unwrap());
    let table = read_table(content.as_bytes(), &IngestOptions::default()).unwrap();
    assert_eq!(table.len(), 10_000);
}

#[test]
fn fail_closed_policy_rejects_single_column_upload() {
    let options = IngestOptions::default().with_delimiter_policy(DelimiterPolicy::FailClosed);
    let err = read_table(b"fio\nAliyev\n", &options).unwrap_err();
    assert_eq!(err, IngestError::DelimiterUndetectable);

    let table = read_table(b"fio\nAliyev\n", &IngestOptions::default()).unwrap();
    assert_eq!(table.headers(), ["fio"]);
}

#[test]
fn empty_upload_is_rejected() {
    assert_eq!(
        read_table(b"", &IngestOptions::default()),
        Err(IngestError::EmptyContent)
    );
    assert_eq!(
        read_table(b"\xEF\xBB\xBFname,date\r\n", &IngestOptions::default()),
        Err(IngestError::EmptyContent)
    );
}

#[test]
fn documented_coercion_examples() {
    assert_eq!(
        coerce_date("2024-03-05T08:00:00", DateMode::Lenient).as_deref(),
        Some("2024-03-05")
    );
    assert_eq!(
        coerce_date("05.03.2024", DateMode::Lenient).as_deref(),
        Some("2024-03-05")
    );
    assert_eq!(
        coerce_date("31.12.69", DateMode::Lenient).as_deref(),
        Some("2069-12-31")
    );
    assert_eq!(
        coerce_date("01.01.70", DateMode::Lenient).as_deref(),
        Some("1970-01-01")
    );
    assert_eq!(coerce_number("1 234.50"), Some(1234.5));
    assert_eq!(coerce_number(""), None);
    assert_eq!(coerce_number("abc"), None);
}
