//! SQLite-backed record store for receipt records.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::StoreError;
use crate::models::receipt::{NewReceipt, ReceiptRecord, ReceiptUpdate, ReviewStatus};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// CRUD over receipt records, keyed by `id`.
///
/// The connection sits behind a mutex so concurrent readers and
/// independent-key writers in one process cannot corrupt the table.
/// Reprocessing the same filename always inserts a new row; filename
/// uniqueness is deliberately not enforced.
pub struct ReceiptStore {
    conn: Mutex<Connection>,
}

impl ReceiptStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS receipts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_filename TEXT NOT NULL,
                venue TEXT,
                purchase_date TEXT,
                total_amount TEXT,
                raw_ocr_text TEXT NOT NULL,
                processed_at TEXT NOT NULL,
                review_status TEXT NOT NULL DEFAULT 'unreviewed'
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a candidate record, assigning `id` and `processed_at` and
    /// starting it unreviewed.
    pub fn insert(&self, new: NewReceipt) -> Result<ReceiptRecord, StoreError> {
        let now = Utc::now().naive_utc();
        // The column keeps microsecond precision, so drop the sub-micro
        // part up front; the returned record must equal what a later
        // read sees.
        let processed_at = now
            .with_nanosecond(now.nanosecond() / 1000 * 1000)
            .unwrap_or(now);
        self.insert_at(new, processed_at)
    }

    fn insert_at(
        &self,
        new: NewReceipt,
        processed_at: NaiveDateTime,
    ) -> Result<ReceiptRecord, StoreError> {
        let total_amount = match new.total_amount {
            Some(amount) if amount.is_sign_negative() => {
                return Err(StoreError::NegativeAmount(amount));
            }
            other => other.map(|a| a.round_dp(2)),
        };
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO receipts
             (source_filename, venue, purchase_date, total_amount, raw_ocr_text, processed_at, review_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.source_filename,
                new.venue,
                new.purchase_date.map(|d| d.to_string()),
                total_amount.map(|a| a.to_string()),
                new.raw_ocr_text,
                processed_at.format(TIMESTAMP_FORMAT).to_string(),
                ReviewStatus::Unreviewed.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted receipt {} ({})", id, new.source_filename);

        Ok(ReceiptRecord {
            id,
            source_filename: new.source_filename,
            venue: new.venue,
            purchase_date: new.purchase_date,
            total_amount,
            raw_ocr_text: new.raw_ocr_text,
            processed_at,
            review_status: ReviewStatus::Unreviewed,
        })
    }

    /// Fetch a single record.
    pub fn get(&self, id: i64) -> Result<ReceiptRecord, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_filename, venue, purchase_date, total_amount,
                    raw_ocr_text, processed_at, review_status
             FROM receipts WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![id], row_to_raw);
        match result {
            Ok(raw) => record_from_row(raw),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// List all records, most recently processed first. Ties on the
    /// timestamp break by ascending id so the dashboard order is
    /// deterministic.
    pub fn list(&self) -> Result<Vec<ReceiptRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_filename, venue, purchase_date, total_amount,
                    raw_ocr_text, processed_at, review_status
             FROM receipts ORDER BY processed_at DESC, id ASC",
        )?;

        let rows = stmt.query_map([], row_to_raw)?;
        let mut records = Vec::new();
        for raw in rows {
            records.push(record_from_row(raw?)?);
        }
        Ok(records)
    }

    /// Partially update the mutable fields of a record.
    ///
    /// Never touches `id`, `source_filename`, `raw_ocr_text`, or
    /// `processed_at`.
    pub fn update(&self, id: i64, update: ReceiptUpdate) -> Result<ReceiptRecord, StoreError> {
        if let Some(amount) = update.total_amount {
            if amount.is_sign_negative() {
                return Err(StoreError::NegativeAmount(amount));
            }
        }

        let current = self.get(id)?;

        let venue = update.venue.or(current.venue);
        let purchase_date = update.purchase_date.or(current.purchase_date);
        let total_amount = update
            .total_amount
            .map(|a| a.round_dp(2))
            .or(current.total_amount);
        let review_status = update.review_status.unwrap_or(current.review_status);

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE receipts
             SET venue = ?2, purchase_date = ?3, total_amount = ?4, review_status = ?5
             WHERE id = ?1",
            params![
                id,
                venue,
                purchase_date.map(|d| d.to_string()),
                total_amount.map(|a| a.to_string()),
                review_status.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(ReceiptRecord {
            id: current.id,
            source_filename: current.source_filename,
            venue,
            purchase_date,
            total_amount,
            raw_ocr_text: current.raw_ocr_text,
            processed_at: current.processed_at,
            review_status,
        })
    }

    /// Delete a record. Deleting an absent id fails with `NotFound`;
    /// callers retrying a delete must treat that as expected.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM receipts WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Deleted receipt {}", id);
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM receipts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

/// Raw row as stored, before type conversion.
struct ReceiptRow {
    id: i64,
    source_filename: String,
    venue: Option<String>,
    purchase_date: Option<String>,
    total_amount: Option<String>,
    raw_ocr_text: String,
    processed_at: String,
    review_status: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReceiptRow> {
    Ok(ReceiptRow {
        id: row.get(0)?,
        source_filename: row.get(1)?,
        venue: row.get(2)?,
        purchase_date: row.get(3)?,
        total_amount: row.get(4)?,
        raw_ocr_text: row.get(5)?,
        processed_at: row.get(6)?,
        review_status: row.get(7)?,
    })
}

fn record_from_row(raw: ReceiptRow) -> Result<ReceiptRecord, StoreError> {
    let purchase_date = match raw.purchase_date {
        Some(s) => Some(
            NaiveDate::from_str(&s)
                .map_err(|e| StoreError::Unavailable(format!("corrupt date column: {}", e)))?,
        ),
        None => None,
    };

    let total_amount = match raw.total_amount {
        Some(s) => Some(
            Decimal::from_str(&s)
                .map_err(|e| StoreError::Unavailable(format!("corrupt amount column: {}", e)))?,
        ),
        None => None,
    };

    let processed_at = NaiveDateTime::parse_from_str(&raw.processed_at, TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::Unavailable(format!("corrupt timestamp column: {}", e)))?;

    let review_status = ReviewStatus::parse(&raw.review_status)
        .ok_or_else(|| StoreError::Unavailable(format!("corrupt status: {}", raw.review_status)))?;

    Ok(ReceiptRecord {
        id: raw.id,
        source_filename: raw.source_filename,
        venue: raw.venue,
        purchase_date,
        total_amount,
        raw_ocr_text: raw.raw_ocr_text,
        processed_at,
        review_status,
    })
}
