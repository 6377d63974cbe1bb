//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use intake_import::{
    ImportError, ImportResponse, Importer, Upload, log_outcome, prepare_upload,
};
use intake_ingest::ParsedTable;
use intake_model::{ActorId, CARD_SCHEMA, CASE_SCHEMA, EntityKind, ImportResult};
use intake_store::{MemoryStore, RecordStore, SqliteStore};
use tracing::{debug, info, info_span};

use crate::cli::{Cli, Command, ImportArgs, OutputArg};
use crate::config::{Settings, load_settings};
use crate::logging::{log_data_enabled, redact_value};
use crate::summary::{print_database_summary, print_import_summary};

pub const EXIT_SUCCESS: i32 = 0;
/// Settings, database and other failures unrelated to the uploaded file.
pub const EXIT_SETUP_FAILURE: i32 = 1;
/// The upload was refused; nothing was written.
pub const EXIT_INPUT_ERROR: i32 = 2;

/// Attribution used for dry runs started with `--actor NAME`. Nothing is
/// stored, so the name is not looked up.
const DRY_RUN_ACTOR: ActorId = ActorId::new(1);

/// Result of `intake import`.
#[derive(Debug)]
pub struct ImportReport {
    pub entity: EntityKind,
    pub file: PathBuf,
    pub dry_run: bool,
    pub outcome: std::result::Result<ImportResult, ImportError>,
}

impl ImportReport {
    pub fn response(&self) -> ImportResponse {
        ImportResponse::from(&self.outcome)
    }

    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            Ok(_) => EXIT_SUCCESS,
            Err(error) if error.is_input() => EXIT_INPUT_ERROR,
            Err(_) => EXIT_SETUP_FAILURE,
        }
    }
}

/// Result of `intake init-db`.
#[derive(Debug)]
pub struct DatabaseReport {
    pub path: PathBuf,
    pub counts: Vec<(&'static str, u64)>,
}

/// Loads settings, runs the subcommand and prints its result. Returns the
/// process exit code.
pub fn run(cli: &Cli) -> i32 {
    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings.with_database_override(cli.database.clone()),
        Err(error) => {
            eprintln!("error: {error:#}");
            return EXIT_SETUP_FAILURE;
        }
    };

    match &cli.command {
        Command::InitDb => match run_init_db(&settings) {
            Ok(report) => {
                print_database_summary(&report);
                EXIT_SUCCESS
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                EXIT_SETUP_FAILURE
            }
        },
        Command::Import(args) => match run_import(args, &settings) {
            Ok(report) => {
                match args.output {
                    OutputArg::Table => print_import_summary(&report),
                    OutputArg::Json => match report.response().to_json() {
                        Ok(json) => println!("{json}"),
                        Err(error) => eprintln!("error: {error}"),
                    },
                }
                report.exit_code()
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                EXIT_SETUP_FAILURE
            }
        },
    }
}

pub fn run_init_db(settings: &Settings) -> Result<DatabaseReport> {
    let path = settings.database_path.clone();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to initialize database {}", path.display()))?;
    store.migrate()?;

    let mut counts = Vec::new();
    for table in ["users", CASE_SCHEMA.table, CARD_SCHEMA.table] {
        counts.push((table, store.count(table)?));
    }
    info!(path = %path.display(), "Database ready");
    Ok(DatabaseReport { path, counts })
}

/// Runs one import.
///
/// The upload is checked and parsed before the database is opened or the
/// acting user resolved, so a refused upload leaves storage untouched.
/// Upload and storage problems end up in [`ImportReport::outcome`]; the
/// returned error is reserved for setup failures such as an unreadable file
/// or an unusable database.
pub fn run_import(args: &ImportArgs, settings: &Settings) -> Result<ImportReport> {
    let entity = EntityKind::from(args.entity);
    let report = |outcome| ImportReport {
        entity,
        file: args.file.clone(),
        dry_run: args.dry_run,
        outcome,
    };

    let table = {
        let span = info_span!("import", table = entity.schema().table);
        let _guard = span.enter();
        let max_bytes = settings.max_upload_bytes;
        let prepared = match read_upload(&args.file, &args.content_type, max_bytes)? {
            Ok(upload) => prepare_upload(upload.as_ref(), &settings.import, max_bytes),
            Err(refused) => Err(refused),
        };
        match prepared {
            Ok(table) => table,
            Err(refused) => {
                let outcome = Err(refused);
                log_outcome(&outcome);
                return Ok(report(outcome));
            }
        }
    };

    let outcome = if args.dry_run {
        let actor = args.actor_id.unwrap_or(DRY_RUN_ACTOR);
        import_with(MemoryStore::new(), entity, &table, actor, settings)
    } else {
        let store = SqliteStore::open(&settings.database_path).with_context(|| {
            format!("failed to open database {}", settings.database_path.display())
        })?;
        let actor = resolve_actor(&store, args)?;
        import_with(store, entity, &table, actor, settings)
    };
    Ok(report(outcome))
}

fn import_with<S: RecordStore>(
    store: S,
    entity: EntityKind,
    table: &ParsedTable,
    actor: ActorId,
    settings: &Settings,
) -> std::result::Result<ImportResult, ImportError> {
    Importer::new(store)
        .with_options(settings.import.clone())
        .with_row_value_logging(log_data_enabled())
        .import_table(entity.schema(), table, actor)
}

/// Reads the file as an upload. A missing file becomes `Ok(None)` so the
/// importer reports it; an oversized file is refused without reading it.
fn read_upload(
    path: &Path,
    content_type: &str,
    max_bytes: usize,
) -> Result<std::result::Result<Option<Upload>, ImportError>> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Upload file not found");
            return Ok(Ok(None));
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }

    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > max_bytes {
        return Ok(Err(ImportError::UploadTooLarge {
            size,
            max: max_bytes,
        }));
    }

    let content = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Ok(Some(Upload::new(content, content_type))))
}

fn resolve_actor(store: &SqliteStore, args: &ImportArgs) -> Result<ActorId> {
    if let Some(id) = args.actor_id {
        if !store.actor_exists(id)? {
            bail!("no user with id {id}; use --actor NAME to create one");
        }
        return Ok(id);
    }
    let Some(name) = args.actor.as_deref() else {
        bail!("either --actor-id or --actor is required");
    };
    let id = store.ensure_actor(name)?;
    debug!(actor = redact_value(name), id = %id, "Resolved acting user");
    Ok(id)
}
