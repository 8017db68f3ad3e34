use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt8Type,
};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{columns, CellValue, Listing, ListingDataset};
use crate::config::LoadOptions;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listing dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – the sheet named in `options`
/// * `.csv`     – header row followed by one listing per line
/// * `.parquet` – one listing per row
/// * `.json`    – `[{ "Region": "...", "Rent": 550, ... }, ...]`
///
/// Every format yields the same header + rows table, which is then checked
/// against the listing schema by [`build_dataset`].
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<ListingDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, options)?,
        "csv" => load_csv(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        "json" => load_json(path, options)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = build_dataset(table)?;
    match dataset.date_bounds {
        Some((first, last)) => log::info!(
            "Loaded {} listings from {} (listed {first} to {last})",
            dataset.len(),
            path.display()
        ),
        None => log::warn!("{} contains no listings", path.display()),
    }
    Ok(dataset)
}

/// Header names plus rows of cells, already restricted to the column range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Schema resolution and date normalization
// ---------------------------------------------------------------------------

/// Map a raw table onto [`Listing`]s.
///
/// Every required header must be present. Fully blank rows are skipped; any
/// other row whose Property Listing Date cannot be read as a date aborts the
/// load.
pub fn build_dataset(table: RawTable) -> Result<ListingDataset, LoadError> {
    let position = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let region = position(columns::REGION)?;
    let suburb = position(columns::SUBURB)?;
    let bedrooms = position(columns::BEDROOMS)?;
    let bathrooms = position(columns::BATHROOMS)?;
    let listed = position(columns::LISTING_DATE)?;
    let rent = position(columns::RENT)?;
    let days = position(columns::DAYS_ON_MARKET)?;
    let required = [region, suburb, bedrooms, bathrooms, listed, rent, days];

    let mut listings = Vec::with_capacity(table.rows.len());

    for (row_no, mut row) in table.rows.into_iter().enumerate() {
        if row.iter().all(CellValue::is_null) {
            continue;
        }
        row.resize(table.headers.len(), CellValue::Null);

        let listing_date =
            normalize_date(&row[listed]).ok_or_else(|| LoadError::InvalidDate {
                row: row_no,
                value: row[listed].to_string(),
            })?;

        let mut extra = BTreeMap::new();
        for (idx, header) in table.headers.iter().enumerate() {
            if !required.contains(&idx) {
                extra.insert(header.clone(), row[idx].clone());
            }
        }

        let mut take = |idx: usize| std::mem::replace(&mut row[idx], CellValue::Null);
        listings.push(Listing {
            region: take(region),
            suburb: take(suburb),
            bedrooms: take(bedrooms),
            bathrooms: take(bathrooms),
            listing_date,
            rent: take(rent),
            days_on_market: take(days),
            extra,
        });
    }

    Ok(ListingDataset::from_listings(listings, table.headers))
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

/// Read a cell as a calendar date. Only real dates and date text qualify.
pub fn normalize_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_date_text(s),
        _ => None,
    }
}

/// Parse ISO, slash-separated or NZ day-first dates, with or without a time.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the configured sheet. The first row of the sheet is the header row.
fn load_spreadsheet(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == &options.sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: options.sheet.clone(),
            available,
        });
    }
    let range = workbook.worksheet_range(&options.sheet)?;

    // The used range may not begin at column A.
    let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);
    let pick = |row: &[Data]| -> Vec<CellValue> {
        (options.columns.first()..=options.columns.last())
            .map(|abs| {
                abs.checked_sub(col_offset)
                    .and_then(|i| row.get(i))
                    .map(spreadsheet_cell)
                    .unwrap_or(CellValue::Null)
            })
            .collect()
    };

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::Empty)?;
    let headers = pick(header_row).iter().map(header_name).collect();

    let rows = rows
        .take(options.max_rows.unwrap_or(usize::MAX))
        .map(pick)
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::from_f64(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d.date()),
            None => CellValue::from_f64(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(d) => CellValue::Date(d),
            None => CellValue::String(s.clone()),
        },
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
        Data::Empty => CellValue::Null,
    }
}

fn header_name(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one listing per record.
/// The column range selects by position, as it would in the spreadsheet.
fn load_csv(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let range = options.columns;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .filter(|(i, _)| range.contains(*i))
        .map(|(_, h)| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut rows = Vec::new();
    for result in reader
        .records()
        .take(options.max_rows.unwrap_or(usize::MAX))
    {
        let record = result?;
        let row = (range.first()..range.first() + headers.len())
            .map(|i| record.get(i).map(guess_cell_type).unwrap_or(CellValue::Null))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::from_f64(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Region": "Auckland", "Suburb": "Ponsonby", "Rent": 650, ... },
///   ...
/// ]
/// ```
///
/// The listing date may be date text or an integer count of milliseconds
/// since the Unix epoch, which is what pandas writes by default.
/// Objects have no column order, so the column range does not apply.
fn load_json(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".into()))?;
    let records = &records[..records.len().min(options.max_rows.unwrap_or(usize::MAX))];

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| match obj.get(h) {
                    Some(val) if h == columns::LISTING_DATE => json_date_cell(val),
                    Some(val) => json_to_cell(val),
                    None => CellValue::Null,
                })
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

/// Epoch milliseconds become a date; anything else is read as a plain cell.
fn json_date_cell(val: &JsonValue) -> CellValue {
    val.as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| CellValue::Date(dt.date_naive()))
        .unwrap_or_else(|| json_to_cell(val))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.trim().is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::from_f64(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one listing per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); date columns may be stored as Date32,
/// Date64, Timestamp or text.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let range = options.columns;
    let selected: Vec<(usize, String)> = builder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| range.contains(*i))
        .map(|(i, f)| (i, f.name().clone()))
        .collect();
    if selected.is_empty() {
        return Err(LoadError::Empty);
    }

    let reader = builder.build()?;
    let mut remaining = options.max_rows.unwrap_or(usize::MAX);
    let mut rows = Vec::new();

    for batch_result in reader {
        if remaining == 0 {
            break;
        }
        let batch = batch_result?;
        let n_rows = batch.num_rows().min(remaining);
        for row in 0..n_rows {
            let cells = selected
                .iter()
                .map(|(col_idx, _)| extract_cell_value(batch.column(*col_idx), row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        remaining -= n_rows;
    }

    let headers = selected.into_iter().map(|(_, name)| name).collect();
    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, row: usize) -> Result<CellValue, LoadError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let date = |d: Option<NaiveDate>| d.map(CellValue::Date).unwrap_or(CellValue::Null);

    let value = match col.data_type() {
        DataType::Utf8 => text_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => text_cell(col.as_string::<i64>().value(row)),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => {
            CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::Float32 => {
            CellValue::from_f64(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => CellValue::from_f64(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => date(col.as_primitive::<Date32Type>().value_as_date(row)),
        DataType::Date64 => date(col.as_primitive::<Date64Type>().value_as_date(row)),
        DataType::Timestamp(unit, _) => date(match unit {
            TimeUnit::Second => col
                .as_primitive::<TimestampSecondType>()
                .value_as_date(row),
            TimeUnit::Millisecond => col
                .as_primitive::<TimestampMillisecondType>()
                .value_as_date(row),
            TimeUnit::Microsecond => col
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_date(row),
            TimeUnit::Nanosecond => col
                .as_primitive::<TimestampNanosecondType>()
                .value_as_date(row),
        }),
        _ => text_cell(&arrow::util::display::array_value_to_string(col, row)?),
    };
    Ok(value)
}

fn text_cell(s: &str) -> CellValue {
    if s.trim().is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}
