//! Event capture for auction runs.
//!
//! A `tracing` subscriber files every event as one row of the table named
//! after the event's target. Rows keep whatever fields the event carried, so
//! tables need no schema up front; column types are settled only when a table
//! is turned into a polars `DataFrame`.
//!
//! # Usage
//!
//! ```ignore
//! // In auction code:
//! tracing::info!(target: "settlement", item = name, agent = id, price);
//!
//! // In a test:
//! let (result, recorder) = instrument::record(|| run_auction());
//! let sales = recorder.table("settlement").unwrap();
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

// === CELLS & TABLES ===

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::U64(v) => Some(*v as f64),
            Cell::I64(v) => Some(*v as f64),
            Cell::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::U64(v) => write!(f, "{v}"),
            Cell::I64(v) => write!(f, "{v}"),
            Cell::F64(v) => write!(f, "{v}"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Str(v) => f.write_str(v),
        }
    }
}

pub type Row = BTreeMap<String, Cell>;

/// Rows of one event target. Columns are listed in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn push(&mut self, row: Row) {
        for name in row.keys() {
            if !self.columns.contains(name) {
                self.columns.push(name.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Cells of one column; `None` where a row lacked the field.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Cell>> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Numeric cells of one column, skipping rows without it.
    pub fn f64s(&self, name: &str) -> Vec<f64> {
        self.column(name).flatten().filter_map(Cell::as_f64).collect()
    }

    pub fn strs(&self, name: &str) -> Vec<String> {
        self.column(name).flatten().map(|c| c.to_string()).collect()
    }
}

// === RECORDER ===

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: BTreeMap<String, Table>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&Table> {
        self.tables.get(target)
    }

    /// Row count of a target, zero when nothing was recorded for it.
    pub fn count(&self, target: &str) -> usize {
        self.table(target).map_or(0, Table::len)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

struct RowVisitor(Row);

impl RowVisitor {
    fn put(&mut self, field: &Field, cell: Cell) {
        self.0.insert(field.name().to_string(), cell);
    }
}

impl Visit for RowVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Cell::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Cell::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Cell::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Cell::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Cell::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Cell::Str(format!("{value:?}")));
    }
}

/// Subscriber that files INFO-and-above events into the thread-local recorder.
/// Spans are ignored.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = RowVisitor(Row::new());
        event.record(&mut visitor);
        let target = event.metadata().target().to_string();
        RECORDER.with(|r| r.borrow_mut().tables.entry(target).or_default().push(visitor.0));
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install `TableSubscriber` as the global default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with `TableSubscriber` as this thread's subscriber and return its
/// result with the events it emitted. Safe to use from parallel tests.
pub fn record<R>(f: impl FnOnce() -> R) -> (R, Recorder) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}

// === POLARS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Bool,
    U64,
    I64,
    F64,
    Str,
}

fn kind_of(cell: &Cell) -> Kind {
    match cell {
        Cell::Bool(_) => Kind::Bool,
        Cell::U64(_) => Kind::U64,
        Cell::I64(_) => Kind::I64,
        Cell::F64(_) => Kind::F64,
        Cell::Str(_) => Kind::Str,
    }
}

/// Narrowest type holding every cell: unsigned < signed < float; anything
/// mixing booleans or text with other kinds becomes text.
fn unify(a: Kind, b: Kind) -> Kind {
    match (a, b) {
        (a, b) if a == b => a,
        (Kind::Bool, _) | (_, Kind::Bool) | (Kind::Str, _) | (_, Kind::Str) => Kind::Str,
        (a, b) => a.max(b),
    }
}

impl Table {
    /// Missing cells become nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let cells: Vec<Option<&Cell>> = self.column(name).collect();
            let kind = cells
                .iter()
                .flatten()
                .map(|c| kind_of(c))
                .reduce(unify)
                .unwrap_or(Kind::Str);

            let column = match kind {
                Kind::Bool => Column::new(
                    name.into(),
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::Bool(b)) => Some(*b),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                ),
                Kind::U64 => Column::new(
                    name.into(),
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::U64(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                ),
                Kind::I64 => Column::new(
                    name.into(),
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::U64(v)) => i64::try_from(*v).ok(),
                            Some(Cell::I64(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                ),
                Kind::F64 => Column::new(
                    name.into(),
                    cells.iter().map(|c| c.and_then(Cell::as_f64)).collect::<Vec<_>>(),
                ),
                Kind::Str => Column::new(
                    name.into(),
                    cells.iter().map(|c| c.map(|c| c.to_string())).collect::<Vec<_>>(),
                ),
            };
            columns.push(column);
        }
        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Tables that fail to convert are skipped.
    pub fn to_dataframes(&self) -> BTreeMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

fn io_error(e: std::io::Error) -> PolarsError {
    PolarsError::IO {
        error: e.into(),
        msg: None,
    }
}

/// Write each frame to `{dir}/{target}.parquet`.
pub fn save_parquet(dfs: &mut BTreeMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(io_error)?;
    for (name, df) in dfs.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(io_error)?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

// === SCOPED RECORDER ===

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .take(48)
        .collect()
}

/// Records one auction run and saves it as parquet when dropped.
///
/// Files land in `{parent}/{unix_seconds}-{name}/`, followed by an empty
/// `_ready` marker once every table is written. `frames()` drains the
/// recording early for in-test analysis; the same frames are saved on drop.
///
/// ```ignore
/// let mut rec = instrument::ScopedRecorder::new("runs", "four teams seed 7");
/// setup.run(catalog)?;
/// let sales = &rec.frames()["settlement"];
/// ```
pub struct ScopedRecorder {
    run_dir: PathBuf,
    frames: Option<BTreeMap<String, DataFrame>>,
}

impl ScopedRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str) -> Self {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        clear();
        install_subscriber();
        Self {
            run_dir: parent.into().join(format!("{stamp}-{}", slug(name))),
            frames: None,
        }
    }

    pub fn frames(&mut self) -> &BTreeMap<String, DataFrame> {
        self.frames.get_or_insert_with(|| drain().to_dataframes())
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for ScopedRecorder {
    fn drop(&mut self) {
        let mut frames = self.frames.take().unwrap_or_else(|| drain().to_dataframes());
        if frames.is_empty() {
            return;
        }
        let written = save_parquet(&mut frames, &self.run_dir)
            .and_then(|_| std::fs::File::create(self.run_dir.join("_ready")).map_err(io_error));
        match written {
            Ok(_) => eprintln!("ScopedRecorder: {} tables in {}", frames.len(), self.run_dir.display()),
            Err(e) => eprintln!("ScopedRecorder: could not save {}: {e}", self.run_dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_become_rows_per_target() {
        let ((), rec) = record(|| {
            tracing::info!(target: "bid", item = "Opener", agent = 0u32, to = 1.2);
            tracing::info!(target: "bid", item = "Opener", agent = 2u32, to = 1.4);
            tracing::info!(target: "unsold", item = "Spinner", floor_price = 2.0);
            tracing::debug!(target: "bid", item = "ignored");
        });

        assert_eq!(rec.count("bid"), 2, "debug events are not recorded");
        assert_eq!(rec.count("unsold"), 1);
        assert_eq!(rec.count("settlement"), 0);

        let bids = rec.table("bid").unwrap();
        assert_eq!(bids.columns(), &["agent", "item", "to"]);
        assert_eq!(bids.f64s("to"), vec![1.2, 1.4]);
        assert_eq!(bids.strs("item"), vec!["Opener", "Opener"]);
    }

    #[test]
    fn sparse_rows_convert_with_nulls() {
        let mut table = Table::default();
        table.push(Row::from([("price".to_string(), Cell::F64(3.5))]));
        table.push(Row::from([
            ("price".to_string(), Cell::U64(4)),
            ("note".to_string(), Cell::Str("late".to_string())),
        ]));

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);

        let price = df.column("price").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(price.get(0), Some(3.5));
        assert_eq!(price.get(1), Some(4.0), "integers widen into a float column");

        let note = df.column("note").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(note.get(0), None, "missing field is null, not empty");
        assert_eq!(note.get(1), Some("late"));
    }

    #[test]
    fn kinds_unify_to_widest() {
        assert_eq!(unify(Kind::U64, Kind::I64), Kind::I64);
        assert_eq!(unify(Kind::I64, Kind::F64), Kind::F64);
        assert_eq!(unify(Kind::Bool, Kind::U64), Kind::Str);
        assert_eq!(unify(Kind::Str, Kind::F64), Kind::Str);
    }

    #[test]
    fn drain_empties_the_recorder() {
        let _ = record(|| tracing::info!(target: "settlement", price = 2.0));
        assert_eq!(drain().count("settlement"), 0);
    }
}
