//! Capture of allocation events into column tables.
//!
//! The core crate emits structured `tracing` events (`allocation`, `ledger`,
//! and `timing` from the timing harness). [`CaptureSubscriber`] turns every
//! info-level event into one row of the table named after its target; columns
//! appear the first time a field is seen.
//!
//! ```ignore
//! let mut rec = instrument::ScopedRecorder::new("data/timing", "serial_vs_parallel");
//! // ... run allocations ...
//! let ledger = &rec.get()["ledger"];
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// One typed column. Rows where the field was absent hold the type default.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::U64(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::F64(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fill_to(&mut self, rows: usize) {
        match self {
            Column::U64(v) => v.resize(rows, 0),
            Column::I64(v) => v.resize(rows, 0),
            Column::F64(v) => v.resize(rows, 0.0),
            Column::Bool(v) => v.resize(rows, false),
            Column::Str(v) => v.resize(rows, String::new()),
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<&[u64]> {
        match self {
            Column::U64(v) => Some(v),
            _ => None,
        }
    }
}

/// Rows recorded under one tracing target.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, Column>,
    pub rows: usize,
}

impl EventTable {
    /// Bring every column up to `self.rows` entries.
    fn align(&mut self) {
        let rows = self.rows;
        for column in self.columns.values_mut() {
            if column.len() < rows {
                column.fill_to(rows);
            }
        }
    }

    /// Get the column for `name`, creating it pre-filled for earlier rows.
    fn column(&mut self, name: &str, make: fn(usize) -> Column) -> &mut Column {
        let rows = self.rows;
        self.columns
            .entry(name.to_string())
            .or_insert_with(|| make(rows))
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                Column::U64(v) => polars::prelude::Column::new(name.into(), v),
                Column::I64(v) => polars::prelude::Column::new(name.into(), v),
                Column::F64(v) => polars::prelude::Column::new(name.into(), v),
                Column::Bool(v) => polars::prelude::Column::new(name.into(), v),
                Column::Str(v) => polars::prelude::Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

/// All tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    pub tables: HashMap<String, EventTable>,
}

impl Capture {
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static CAPTURE: RefCell<Capture> = RefCell::default();
}

struct RowVisitor<'a> {
    table: &'a mut EventTable,
}

impl RowVisitor<'_> {
    fn push_u64(&mut self, field: &Field, value: u64) {
        if let Column::U64(v) = self.table.column(field.name(), |n| Column::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn push_i64(&mut self, field: &Field, value: i64) {
        if let Column::I64(v) = self.table.column(field.name(), |n| Column::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn push_f64(&mut self, field: &Field, value: f64) {
        if let Column::F64(v) = self.table.column(field.name(), |n| Column::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn push_bool(&mut self, field: &Field, value: bool) {
        if let Column::Bool(v) = self
            .table
            .column(field.name(), |n| Column::Bool(vec![false; n]))
        {
            v.push(value);
        }
    }

    fn push_str(&mut self, field: &Field, value: String) {
        if let Column::Str(v) = self
            .table
            .column(field.name(), |n| Column::Str(vec![String::new(); n]))
        {
            v.push(value);
        }
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_u64(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_i64(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_f64(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_bool(field, value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push_str(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push_str(field, format!("{value:?}"));
    }
}

/// Subscriber that records info-level (and more severe) events, no spans.
///
/// Storage is thread-local: only events emitted on the thread that later
/// calls [`drain`] are visible to it.
pub struct CaptureSubscriber;

impl Subscriber for CaptureSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target();
        CAPTURE.with(|c| {
            let mut capture = c.borrow_mut();
            let table = capture.tables.entry(target.to_string()).or_default();
            table.align();
            event.record(&mut RowVisitor { table: &mut *table });
            table.rows += 1;
            table.align();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install [`CaptureSubscriber`] as the global default (no-op if one is set).
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(CaptureSubscriber);
}

/// Take everything captured on this thread.
pub fn drain() -> Capture {
    CAPTURE.with(|c| std::mem::take(&mut *c.borrow_mut()))
}

pub fn clear() {
    CAPTURE.with(|c| *c.borrow_mut() = Capture::default());
}

pub fn drain_to_dataframes() -> HashMap<String, DataFrame> {
    drain().to_dataframes()
}

/// Write each DataFrame to `{dir}/{name}.parquet`.
pub fn save_parquet(dfs: &mut HashMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    let io_err = |e: std::io::Error| PolarsError::IO {
        error: e.into(),
        msg: None,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    for (name, df) in dfs.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(io_err)?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(60)
        .collect()
}

/// Clears captured data on creation, writes parquet plus a `_ready` marker
/// on drop, under `{parent}/{unix_seconds}_{name}/`.
pub struct ScopedRecorder {
    run_dir: PathBuf,
    run_name: String,
    dfs: Option<HashMap<String, DataFrame>>,
}

impl ScopedRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str) -> Self {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let run_name = format!("{secs}_{}", sanitize(name));
        let run_dir = parent.into().join(&run_name);
        clear();
        install_subscriber();
        Self {
            run_dir,
            run_name,
            dfs: None,
        }
    }

    /// Drain on first call; later calls return the cached frames.
    pub fn get(&mut self) -> &HashMap<String, DataFrame> {
        self.dfs.get_or_insert_with(drain_to_dataframes)
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for ScopedRecorder {
    fn drop(&mut self) {
        let mut dfs = self.dfs.take().unwrap_or_else(drain_to_dataframes);
        if dfs.is_empty() {
            return;
        }
        if let Err(e) = save_parquet(&mut dfs, &self.run_dir) {
            eprintln!("ScopedRecorder({}): parquet write failed: {e}", self.run_name);
            return;
        }
        if let Err(e) = std::fs::File::create(self.run_dir.join("_ready")) {
            eprintln!("ScopedRecorder({}): _ready write failed: {e}", self.run_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    #[test]
    fn ledger_events_become_rows() {
        clear();
        with_default(CaptureSubscriber, || {
            tracing::info!(target: "ledger", agent = 0u64, net_payment = 36.875f64);
            tracing::info!(target: "ledger", agent = 1u64, net_payment = -56.875f64);
            tracing::debug!(target: "ledger", agent = 9u64, net_payment = 0.0f64);
        });

        let capture = drain();
        let table = &capture.tables["ledger"];
        assert_eq!(table.rows, 2, "debug events are not captured");
        assert_eq!(table.columns["agent"].as_u64(), Some(&[0u64, 1][..]));
        assert_eq!(
            table.columns["net_payment"].as_f64(),
            Some(&[36.875, -56.875][..])
        );
    }

    #[test]
    fn late_and_missing_fields_are_filled() {
        clear();
        with_default(CaptureSubscriber, || {
            tracing::info!(target: "allocation", agents = 4u64, surplus = 47.5f64);
            tracing::info!(target: "allocation", agents = 1u64, parallel = true);
            tracing::warn!(target: "allocation", agents = 2u64, error = "negative surplus");
        });

        let capture = drain();
        let table = &capture.tables["allocation"];
        assert_eq!(table.rows, 3);
        for column in table.columns.values() {
            assert_eq!(column.len(), 3);
        }
        assert_eq!(table.columns["surplus"].as_f64(), Some(&[47.5, 0.0, 0.0][..]));
        assert_eq!(
            table.columns["parallel"],
            Column::Bool(vec![false, true, false])
        );
        assert_eq!(
            table.columns["error"],
            Column::Str(vec![String::new(), String::new(), "negative surplus".into()])
        );
    }

    #[test]
    fn tables_convert_to_dataframes() {
        let mut table = EventTable::default();
        table.columns.insert("size".into(), Column::U64(vec![4, 10]));
        table.columns.insert("seconds".into(), Column::F64(vec![0.1, 0.2]));
        table.rows = 2;

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }
}
