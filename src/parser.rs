//! Tabular ingestion: bytes + filename in, a canonical, deduplicated,
//! time-sorted [`TransactionTable`] out.
//!
//! Three source formats (CSV, TSV, Excel) all funnel through the same
//! header-alias resolution and per-row coercion so the rest of the
//! pipeline never has to know which format a batch arrived in.

use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// One canonicalized, validated money transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender: String,
    pub receiver: String,
    pub amount: Decimal,
    pub timestamp: NaiveDateTime,
}

/// An ordered, deduplicated, time-sorted batch of [`Transaction`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionTable {
    pub rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.rows.iter()
    }
}

/// The five canonical fields every recognized header is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CanonicalField {
    TransactionId,
    Sender,
    Receiver,
    Amount,
    Timestamp,
}

impl CanonicalField {
    fn name(self) -> &'static str {
        match self {
            CanonicalField::TransactionId => "transaction_id",
            CanonicalField::Sender => "sender",
            CanonicalField::Receiver => "receiver",
            CanonicalField::Amount => "amount",
            CanonicalField::Timestamp => "timestamp",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::TransactionId => {
                &["transaction_id", "txn_id", "tx_id", "id", "transaction_number"]
            }
            CanonicalField::Sender => {
                &["sender_id", "from_account", "source_id", "sender", "from_id", "payer_id"]
            }
            CanonicalField::Receiver => &[
                "receiver_id",
                "to_account",
                "destination_id",
                "receiver",
                "to_id",
                "payee_id",
            ],
            CanonicalField::Amount => &["amount", "value", "transaction_amount", "sum"],
            CanonicalField::Timestamp => {
                &["timestamp", "date", "datetime", "transaction_date", "time", "created_at"]
            }
        }
    }

    fn all() -> [CanonicalField; 5] {
        [
            CanonicalField::TransactionId,
            CanonicalField::Sender,
            CanonicalField::Receiver,
            CanonicalField::Amount,
            CanonicalField::Timestamp,
        ]
    }
}

/// Datetime patterns tried in order. The first that parses wins; an
/// all-digits date (no time component) is treated as midnight.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_ONLY_FORMATS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse `file_bytes` (named `filename` for extension dispatch) into a
/// canonical [`TransactionTable`].
pub fn parse(file_bytes: &[u8], filename: &str) -> Result<TransactionTable, AnalysisError> {
    let lower = filename.to_lowercase();
    let rows = if lower.ends_with(".csv") {
        read_delimited(file_bytes, b',')?
    } else if lower.ends_with(".tsv") {
        read_delimited(file_bytes, b'\t')?
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        read_spreadsheet(file_bytes)?
    } else {
        return Err(AnalysisError::UnsupportedFileType(filename.to_string()));
    };

    let Some((header, data_rows)) = rows.split_first() else {
        return Err(AnalysisError::NoValidTransactions);
    };

    let columns = resolve_columns(header)?;
    let table = build_table(&columns, data_rows);

    if table.is_empty() {
        return Err(AnalysisError::NoValidTransactions);
    }

    Ok(table)
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<String>>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(bytes));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AnalysisError::ParseError(e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

fn read_spreadsheet(bytes: &[u8]) -> Result<Vec<Vec<String>>, AnalysisError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AnalysisError::ParseError(format!("could not open spreadsheet: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::ParseError("spreadsheet has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AnalysisError::ParseError(format!("could not read first sheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| if cell.is_empty() { String::new() } else { cell.to_string() })
                .collect()
        })
        .collect())
}

/// Maps each canonical field to the header index that satisfies it,
/// first matching column wins.
fn resolve_columns(header: &[String]) -> Result<[usize; 5], AnalysisError> {
    let normalized: Vec<String> =
        header.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut resolved = [usize::MAX; 5];
    let mut missing = Vec::new();

    for (slot, field) in CanonicalField::all().iter().enumerate() {
        let found = normalized
            .iter()
            .position(|h| field.aliases().contains(&h.as_str()));
        match found {
            Some(index) => resolved[slot] = index,
            None => missing.push(field.name().to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns(missing));
    }

    Ok(resolved)
}

fn build_table(columns: &[usize; 5], data_rows: &[Vec<String>]) -> TransactionTable {
    let [id_idx, sender_idx, receiver_idx, amount_idx, timestamp_idx] = *columns;

    let mut seen_ids = HashSet::new();
    let mut dropped = 0usize;
    let mut rows = Vec::with_capacity(data_rows.len());

    for row in data_rows {
        let cell = |idx: usize| row.get(idx).map(|s| s.trim());

        let (Some(transaction_id), Some(sender), Some(receiver), Some(amount_raw), Some(timestamp_raw)) = (
            cell(id_idx),
            cell(sender_idx),
            cell(receiver_idx),
            cell(amount_idx),
            cell(timestamp_idx),
        ) else {
            dropped += 1;
            continue;
        };

        if sender.is_empty() || receiver.is_empty() || sender == receiver {
            dropped += 1;
            continue;
        }

        let Ok(amount) = amount_raw.parse::<Decimal>() else {
            dropped += 1;
            continue;
        };
        if amount <= Decimal::ZERO {
            dropped += 1;
            continue;
        }

        let Some(timestamp) = parse_timestamp(timestamp_raw) else {
            dropped += 1;
            continue;
        };

        if !seen_ids.insert(transaction_id.to_string()) {
            // duplicate transaction_id: first occurrence already kept
            continue;
        }

        rows.push(Transaction {
            transaction_id: transaction_id.to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            timestamp,
        });
    }

    if dropped > 0 {
        tracing::debug!(dropped, "dropped rows failing row-level validation");
    }

    rows.sort_by_key(|t| t.timestamp);
    TransactionTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_bytes(body: &str) -> Vec<u8> {
        body.as_bytes().to_vec()
    }

    const HEADER: &str = "txn_id,from_account,to_account,amount,timestamp\n";

    #[test]
    fn parses_basic_csv() {
        let body = format!(
            "{HEADER}TX001,A,B,500,2025-01-01 09:00:00\nTX002,B,C,490,2025-01-01 10:00:00\n"
        );
        let table = parse(&csv_bytes(&body), "transactions.csv").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].transaction_id, "TX001");
        assert_eq!(table.rows[0].sender, "A");
        assert_eq!(table.rows[1].sender, "B");
    }

    #[test]
    fn parses_tsv_with_tab_delimiter() {
        let body = "txn_id\tfrom_account\tto_account\tamount\ttimestamp\n\
                     TX001\tA\tB\t500\t2025-01-01 09:00:00\n";
        let table = parse(body.as_bytes(), "transactions.tsv").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = parse(b"irrelevant", "transactions.json").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFileType(_)));
    }

    #[test]
    fn missing_canonical_column_is_reported() {
        let body = "from_account,to_account,amount,timestamp\nA,B,500,2025-01-01 09:00:00\n";
        let err = parse(body.as_bytes(), "transactions.csv").unwrap_err();
        match err {
            AnalysisError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["transaction_id".to_string()])
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn first_matching_alias_column_wins() {
        // `id` and `txn_id` both alias to transaction_id; `txn_id` appears first.
        let body = "txn_id,id,from_account,to_account,amount,timestamp\n\
                     TX001,OTHER,A,B,500,2025-01-01 09:00:00\n";
        let table = parse(body.as_bytes(), "transactions.csv").unwrap();
        assert_eq!(table.rows[0].transaction_id, "TX001");
    }

    #[test]
    fn drops_invalid_rows_without_failing() {
        let body = format!(
            "{HEADER}TX001,A,B,500,2025-01-01 09:00:00\n\
             TX002,C,D,-10,2025-01-01 10:00:00\n\
             TX003,E,F,100,not-a-date\n\
             TX004,G,G,100,2025-01-01 11:00:00\n"
        );
        let table = parse(&csv_bytes(&body), "transactions.csv").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].transaction_id, "TX001");
    }

    #[test]
    fn deduplicates_by_transaction_id_keeping_first() {
        let body = format!(
            "{HEADER}TX001,A,B,500,2025-01-01 09:00:00\nTX001,A,B,999,2025-01-02 09:00:00\n"
        );
        let table = parse(&csv_bytes(&body), "transactions.csv").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].amount, Decimal::new(500, 0));
    }

    #[test]
    fn sorts_ascending_by_timestamp() {
        let body = format!(
            "{HEADER}TX002,B,C,490,2025-01-02 10:00:00\nTX001,A,B,500,2025-01-01 09:00:00\n"
        );
        let table = parse(&csv_bytes(&body), "transactions.csv").unwrap();
        assert_eq!(table.rows[0].transaction_id, "TX001");
        assert_eq!(table.rows[1].transaction_id, "TX002");
    }

    #[test]
    fn empty_result_is_an_error() {
        let body = format!("{HEADER}TX001,A,A,500,2025-01-01 09:00:00\n");
        let err = parse(&csv_bytes(&body), "transactions.csv").unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidTransactions));
    }

    #[test]
    fn parses_date_only_and_alternate_separators() {
        let body = "txn_id,sender,receiver,value,date\n\
                     TX001,A,B,100,2025-01-05\n\
                     TX002,B,C,200,05/01/2025\n";
        let table = parse(body.as_bytes(), "transactions.csv").unwrap();
        assert_eq!(table.len(), 2);
    }
}
