//! The import pipeline.
//!
//! One call walks `Received → Parsed → Mapped → Committing → Done`, or stops
//! in `Failed`. Everything up to `Committing` happens in memory, so a refused
//! upload never reaches the store.

use std::fmt;

use intake_ingest::{IngestOptions, ParsedTable, RecordMapper, read_table};
use intake_model::{ActorId, ImportResult, Schema};
use intake_store::{InsertRow, RecordStore};
use tracing::{debug, info, info_span, trace, warn};

use crate::error::{ImportError, Result};
use crate::upload::{DEFAULT_MAX_UPLOAD_BYTES, Upload};

/// Pipeline stage, recorded on every log line of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Received,
    Parsed,
    Mapped,
    Committing,
    Done,
    Failed,
}

impl ImportStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Parsed => "parsed",
            Self::Mapped => "mapped",
            Self::Committing => "committing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows ready for the transaction plus the count of rows left out.
#[derive(Debug)]
struct InsertPlan {
    rows: Vec<InsertRow>,
    skipped: usize,
}

/// Runs uploads through parsing, mapping and one storage transaction.
pub struct Importer<S> {
    store: S,
    options: IngestOptions,
    max_upload_bytes: usize,
    log_row_values: bool,
}

impl<S: RecordStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            options: IngestOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_row_values: false,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    /// Include cell values of skipped rows in trace output. Cells hold
    /// personal data, so this is off unless explicitly requested.
    #[must_use]
    pub fn with_row_value_logging(mut self, enable: bool) -> Self {
        self.log_row_values = enable;
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Imports one upload into `schema`'s table on behalf of `actor`.
    ///
    /// Rows missing a required field are counted as skipped. All other rows
    /// are inserted in a single transaction; if any insert fails nothing is
    /// stored and the storage error is returned.
    pub fn import(
        &mut self,
        schema: &'static Schema,
        upload: Option<&Upload>,
        actor: ActorId,
    ) -> Result<ImportResult> {
        let span = info_span!("import", table = schema.table, actor = %actor);
        let _guard = span.enter();

        let outcome = prepare_upload(upload, &self.options, self.max_upload_bytes)
            .and_then(|table| self.commit(schema, &table, actor));
        log_outcome(&outcome);
        outcome
    }

    /// Imports a table already returned by [`prepare_upload`].
    ///
    /// Lets a caller refuse bad uploads before it opens storage or resolves
    /// the acting user.
    pub fn import_table(
        &mut self,
        schema: &'static Schema,
        table: &ParsedTable,
        actor: ActorId,
    ) -> Result<ImportResult> {
        let span = info_span!("import", table = schema.table, actor = %actor);
        let _guard = span.enter();

        let outcome = self.commit(schema, table, actor);
        log_outcome(&outcome);
        outcome
    }

    fn commit(
        &mut self,
        schema: &'static Schema,
        table: &ParsedTable,
        actor: ActorId,
    ) -> Result<ImportResult> {
        let plan = self.plan(schema, table, actor);
        info!(
            stage = %ImportStage::Mapped,
            queued = plan.rows.len(),
            skipped = plan.skipped,
            "Rows mapped"
        );

        debug!(stage = %ImportStage::Committing, "Starting transaction");
        let rows = &plan.rows;
        let inserted = self.store.run_in_transaction(|tx| {
            for row in rows {
                tx.insert(schema.table, row)?;
            }
            Ok(rows.len())
        })?;

        Ok(ImportResult {
            inserted,
            skipped: plan.skipped,
        })
    }

    fn plan(&self, schema: &'static Schema, table: &ParsedTable, actor: ActorId) -> InsertPlan {
        let mapper = RecordMapper::new(schema).with_date_mode(self.options.date_mode);
        let mut rows = Vec::with_capacity(table.len());
        let mut skipped = 0;

        for (index, raw) in table.rows().iter().enumerate() {
            let record = mapper.map(raw);
            let missing = record.missing_required();
            if missing.is_empty() {
                rows.push(InsertRow::from(&record.attribute(actor)));
            } else {
                // Data rows are numbered from 1, after the header line.
                if self.log_row_values {
                    let cells: Vec<_> = raw.cells().collect();
                    trace!(row = index + 1, ?missing, ?cells, "Skipping incomplete row");
                } else {
                    trace!(row = index + 1, ?missing, "Skipping incomplete row");
                }
                skipped += 1;
            }
        }

        InsertPlan { rows, skipped }
    }
}

/// Runs the admission checks and parses the upload.
///
/// Covers presence, content type, size, decoding, delimiter detection and the
/// row cap. Every error here is an input error and nothing touches storage.
pub fn prepare_upload(
    upload: Option<&Upload>,
    options: &IngestOptions,
    max_upload_bytes: usize,
) -> Result<ParsedTable> {
    let upload = upload.ok_or(ImportError::MissingFile)?;
    upload.check_content_type()?;
    upload.check_size(max_upload_bytes)?;
    info!(
        stage = %ImportStage::Received,
        bytes = upload.len(),
        content_type = upload.content_type().unwrap_or_default(),
        sha256 = %upload.fingerprint(),
        "Upload received"
    );

    let table = read_table(upload.content(), options)?;
    info!(
        stage = %ImportStage::Parsed,
        rows = table.len(),
        columns = table.headers().len(),
        delimiter = %char::from(table.delimiter()).escape_default(),
        "Upload parsed"
    );
    Ok(table)
}

/// Logs the final stage of an import.
pub fn log_outcome(outcome: &Result<ImportResult>) {
    match outcome {
        Ok(result) => info!(
            stage = %ImportStage::Done,
            inserted = result.inserted,
            skipped = result.skipped,
            "Import finished"
        ),
        Err(err) => warn!(
            stage = %ImportStage::Failed,
            status = err.status_code(),
            error = %err,
            "Import failed"
        ),
    }
}
