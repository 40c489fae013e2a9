//! CLI command implementations
//!
//! Each command loads the configuration, opens a file-backed catalog under
//! `data_dir`, performs one dataset operation and prints one JSON response.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::codec::{charset_by_name, trim_padding, FieldCodec};
use crate::error::DatasetError;
use crate::handle::KeyedFile;
use crate::layout::{FieldEncoding, KeyArgument, Record, RecordLayout, SchemaLoader};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::store::{Catalog, EqualityMode, FileCatalog};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_records, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the dataset files (required)
    pub data_dir: String,

    /// Internal character set of text fields (default "ibm1047")
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Fsync every appended entry (default true)
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_charset() -> String {
    "ibm1047".to_string()
}

fn default_sync_writes() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from file, then apply the log level.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Logger::set_min_severity(config.min_severity()?);
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("charset", config.charset.as_str()), ("data_dir", config.data_dir.as_str())],
        );
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        self.codec()?;
        self.min_severity()?;
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// File-backed catalog rooted at `data_dir`
    pub fn catalog(&self) -> Arc<dyn Catalog> {
        Arc::new(FileCatalog::new(self.data_path(), self.sync_writes))
    }

    /// Field codec for the configured charset
    pub fn codec(&self) -> CliResult<FieldCodec> {
        charset_by_name(&self.charset)
            .map(|charset| FieldCodec::new(Arc::from(charset)))
            .ok_or_else(|| {
                CliError::config_error(format!(
                    "Invalid charset: '{}'. Must be 'ibm1047' or 'latin1'.",
                    self.charset
                ))
            })
    }

    /// Configured minimum log severity
    pub fn min_severity(&self) -> CliResult<Severity> {
        Severity::from_name(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            ))
        })
    }
}

/// Parse arguments and run the command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command against stdin and print its single JSON response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    match execute(&cmd, stdin.lock()) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run a command, reading record input from `input`, and return the
/// response data.
pub fn execute<R: BufRead>(cmd: &Command, input: R) -> CliResult<Value> {
    let config = Config::load(&cmd.target().config)?;
    let dataset = cmd.target().dataset.as_str();

    match cmd {
        Command::Create { schema, .. } => create(&config, dataset, schema),
        Command::Exists { .. } => Ok(exists(&config, dataset)),
        Command::Write { schema, .. } => write(&config, dataset, schema, input),
        Command::Find {
            schema, key, mode, ..
        } => find(&config, dataset, schema, key.as_deref(), (*mode).into()),
        Command::Scan { schema, limit, .. } => scan(&config, dataset, schema, *limit),
        Command::Update { schema, .. } => update(&config, dataset, schema, input),
        Command::Delete { schema, key, .. } => delete(&config, dataset, schema, key),
        Command::Dealloc { .. } => dealloc(&config, dataset),
    }
}

/// Allocate a new dataset sized to the schema
pub fn create(config: &Config, dataset: &str, schema: &Path) -> CliResult<Value> {
    let layout = load_layout(config, schema)?;
    let mut file = KeyedFile::create_new(config.catalog(), dataset, layout)?;
    let data = json!({
        "dataset": dataset,
        "record_length": file.record_length(),
        "key_length": file.key_length(),
        "key_offset": file.layout().key_offset(),
    });
    file.close()?;
    Ok(data)
}

/// Report whether a dataset can be opened
pub fn exists(config: &Config, dataset: &str) -> Value {
    let catalog = config.catalog();
    json!({
        "dataset": dataset,
        "exists": KeyedFile::exists(catalog.as_ref(), dataset),
    })
}

/// Insert every record read from `input`
pub fn write<R: BufRead>(config: &Config, dataset: &str, schema: &Path, input: R) -> CliResult<Value> {
    let mut file = open(config, dataset, schema)?;
    let mut written = 0usize;
    for record in read_records(input) {
        file.write(&record?)?;
        written += 1;
    }
    file.close()?;
    Ok(json!({ "written": written }))
}

/// Locate one record
pub fn find(
    config: &Config,
    dataset: &str,
    schema: &Path,
    key: Option<&str>,
    mode: EqualityMode,
) -> CliResult<Value> {
    let mut file = open(config, dataset, schema)?;
    let key = key.map(|k| key_argument(file.layout(), k));
    let record = file.find(key.as_ref(), mode)?;
    file.close()?;
    Ok(json!({
        "found": record.is_some(),
        "record": record.map(render).unwrap_or(Value::Null),
    }))
}

/// Read records in key order from the start
pub fn scan(config: &Config, dataset: &str, schema: &Path, limit: Option<usize>) -> CliResult<Value> {
    let mut file = open(config, dataset, schema)?;
    let mut records = Vec::new();
    while limit.map_or(true, |max| records.len() < max) {
        match file.read()? {
            Some(record) => records.push(render(record)),
            None => break,
        }
    }
    file.close()?;
    Ok(json!({ "count": records.len(), "records": records }))
}

/// Rewrite every record read from `input`, matched by its key field
pub fn update<R: BufRead>(config: &Config, dataset: &str, schema: &Path, input: R) -> CliResult<Value> {
    let mut file = open(config, dataset, schema)?;
    let key_field = file.layout().key_field().name.clone();
    let mut updated = 0usize;

    for record in read_records(input) {
        let record = record?;
        let key = record
            .get(&key_field)
            .and_then(Value::as_str)
            .ok_or_else(|| DatasetError::field_type(&key_field, "Missing key value"))?;
        let key = key_argument(file.layout(), key);

        if file.find(Some(&key), EqualityMode::Equal)?.is_none() {
            return Err(DatasetError::update_failed()
                .with_details(format!("no record with key {:?}", key))
                .into());
        }
        file.update(&record)?;
        updated += 1;
    }
    file.close()?;
    Ok(json!({ "updated": updated }))
}

/// Delete the record with the given key
pub fn delete(config: &Config, dataset: &str, schema: &Path, key: &str) -> CliResult<Value> {
    let mut file = open(config, dataset, schema)?;
    let key = key_argument(file.layout(), key);

    if file.find(Some(&key), EqualityMode::Equal)?.is_none() {
        return Err(DatasetError::delete_failed()
            .with_details(format!("no record with key {:?}", key))
            .into());
    }
    file.delete()?;
    file.close()?;
    Ok(json!({ "deleted": 1 }))
}

/// Remove a dataset
pub fn dealloc(config: &Config, dataset: &str) -> CliResult<Value> {
    config
        .catalog()
        .remove(dataset)
        .map_err(|e| DatasetError::deallocate_failed(dataset).with_source(e))?;
    log_event_with_fields(Event::DatasetDeallocated, &[("dataset", dataset)]);
    Ok(json!({ "dataset": dataset, "deallocated": true }))
}

fn load_layout(config: &Config, schema: &Path) -> CliResult<RecordLayout> {
    let layout = SchemaLoader::load_file(schema, config.codec()?)?;
    let fields = layout.fields().len().to_string();
    let record_length = layout.record_length().to_string();
    log_event_with_fields(
        Event::SchemaLoaded,
        &[("fields", fields.as_str()), ("record_length", record_length.as_str())],
    );
    Ok(layout)
}

fn open(config: &Config, dataset: &str, schema: &Path) -> CliResult<KeyedFile> {
    let layout = load_layout(config, schema)?;
    Ok(KeyedFile::open_existing(config.catalog(), dataset, layout)?)
}

/// Command-line keys are hex digits for a hexadecimal key field, text otherwise.
fn key_argument(layout: &RecordLayout, key: &str) -> KeyArgument {
    match layout.key_field().encoding {
        FieldEncoding::Hex => KeyArgument::hex(key),
        FieldEncoding::Text => KeyArgument::text(key),
    }
}

/// Strips text padding for display.
fn render(record: Record) -> Value {
    Value::Object(
        record
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(s) => (name, Value::String(trim_padding(&s).to_string())),
                other => (name, other),
            })
            .collect(),
    )
}
