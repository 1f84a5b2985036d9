use std::io::{Cursor, Read, Seek};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

use crate::config::SourceConfig;

use super::error::LoadError;
use super::model::{CompsTable, Instrument, REQUIRED_COLUMNS};
use super::rating::MoodysGrade;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a comps table from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – workbook, read with the
///   same sheet layout as the remote source
/// * `.csv`     – header row with the seven column names
/// * `.json`    – `[{ "Issuer": ..., "DM": ... }, ...]`
/// * `.parquet` – flat columns with the seven names
pub fn load_file(path: &Path, layout: &SourceConfig) -> Result<CompsTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            let mut workbook = open_workbook_auto(path)?;
            read_sheet(&mut workbook, layout)
        }
        "csv" => load_csv(std::fs::File::open(path)?),
        "json" => load_json(&std::fs::read_to_string(path)?),
        "parquet" | "pq" => load_parquet(std::fs::File::open(path)?),
        other => Err(LoadError::UnsupportedFile(other.to_string())),
    }
}

/// Parse a downloaded workbook.
pub fn load_workbook_bytes(bytes: Vec<u8>, layout: &SourceConfig) -> Result<CompsTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_sheet(&mut workbook, layout)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    layout: &SourceConfig,
) -> Result<CompsTable, LoadError> {
    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == &layout.sheet) {
        return Err(LoadError::MissingSheet {
            sheet: layout.sheet.clone(),
            available,
        });
    }
    let range = workbook.worksheet_range(&layout.sheet)?;
    records_from_range(&range, layout)
}

/// Read the table region of a worksheet.
///
/// Layout: `skip_rows` rows are skipped, the next row holds the headers, and
/// at most `max_rows` data rows follow. Only columns in the letter span are
/// considered. Positions are absolute sheet coordinates, whatever the start
/// of the used range.
pub fn records_from_range(range: &Range<Data>, layout: &SourceConfig) -> Result<CompsTable, LoadError> {
    let (first_col, last_col) = layout.column_span()?;
    let header_row = layout.skip_rows;
    let columns = locate_columns(range, header_row, first_col, last_col)?;
    let last_row = range.end().map(|(row, _)| row).unwrap_or(header_row);

    let mut instruments = Vec::new();
    for offset in 0..layout.max_rows {
        let row = header_row + 1 + offset;
        if row > last_row {
            break;
        }
        let cells: Vec<Option<&Data>> = columns.iter().map(|&col| range.get_value((row, col))).collect();
        if cells.iter().all(|cell| cell_text(*cell).is_none()) {
            continue;
        }
        match parse_row(offset as usize, &cells) {
            Ok(inst) => instruments.push(inst),
            // Excel rows are 1-based.
            Err(reason) => log::warn!("Skipping sheet row {}: {reason}", row + 1),
        }
    }

    finish(instruments, &format!("sheet '{}'", layout.sheet))
}

/// Sheet column of each required header, in `REQUIRED_COLUMNS` order. The
/// first occurrence of a duplicated header wins.
fn locate_columns(
    range: &Range<Data>,
    header_row: u32,
    first_col: u32,
    last_col: u32,
) -> Result<[u32; 7], LoadError> {
    let mut found: [Option<u32>; 7] = [None; 7];
    for col in first_col..=last_col {
        let Some(name) = cell_text(range.get_value((header_row, col))) else {
            continue;
        };
        if let Some(idx) = REQUIRED_COLUMNS.iter().position(|h| *h == name) {
            found[idx].get_or_insert(col);
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .zip(found.iter())
        .filter(|(_, col)| col.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }
    Ok(found.map(|col| col.unwrap_or_default()))
}

fn parse_row(row_id: usize, cells: &[Option<&Data>]) -> Result<Instrument, String> {
    let text = |idx: usize| {
        cell_text(cells[idx]).ok_or_else(|| format!("empty {}", REQUIRED_COLUMNS[idx]))
    };
    let number = |idx: usize| {
        cell_f64(cells[idx]).ok_or_else(|| format!("{} is not a number", REQUIRED_COLUMNS[idx]))
    };
    Ok(Instrument {
        row_id,
        issuer: text(0)?,
        industry: text(1)?,
        segment: text(2)?,
        moodys: text(3)?,
        ytm: number(4)?,
        ask: number(5)?,
        dm: number(6)?,
    })
}

fn cell_text(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_f64(cell: Option<&Data>) -> Option<f64> {
    let value = match cell? {
        Data::Float(v) => *v,
        Data::Int(v) => *v as f64,
        Data::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with (at least) the seven column names; extra columns are
/// ignored. Records that fail to parse are skipped with a warning, as in the
/// workbook reader. Row ids follow record order.
pub fn load_csv<R: Read>(reader: R) -> Result<CompsTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    check_headers(headers.iter())?;
    let positions: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name))
        .collect();

    let mut instruments = Vec::new();
    for (row_id, record) in reader.records().enumerate() {
        let record = record?;
        let owned: Vec<Option<Data>> = positions
            .iter()
            .map(|&pos| {
                record
                    .get(pos)
                    .filter(|field| !field.is_empty())
                    .map(|field| Data::String(field.to_string()))
            })
            .collect();
        let cells: Vec<Option<&Data>> = owned.iter().map(Option::as_ref).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        match parse_row(row_id, &cells) {
            Ok(inst) => instruments.push(inst),
            // Header is line 1.
            Err(reason) => log::warn!("Skipping CSV line {}: {reason}", row_id + 2),
        }
    }
    finish(instruments, "CSV snapshot")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented array, e.g. `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Issuer": "Acme", "Industry": "Healthcare", "Segment": "Services",
///     "Moodys": "B2", "YTM": 9.1, "Ask": 96.5, "DM": 455.0 },
///   ...
/// ]
/// ```
pub fn load_json(text: &str) -> Result<CompsTable, LoadError> {
    let records: Vec<Instrument> = serde_json::from_str(text)?;
    let instruments = records
        .into_iter()
        .enumerate()
        .map(|(row_id, inst)| Instrument { row_id, ..inst })
        .collect();
    finish(instruments, "JSON snapshot")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat Parquet file with the seven named columns. Text columns may be any
/// Arrow type castable to Utf8, numeric columns anything castable to Float64.
/// Rows with a null in a required column are skipped.
pub fn load_parquet<T: ChunkReader + 'static>(reader: T) -> Result<CompsTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    check_headers(schema.fields().iter().map(|f| f.name().as_str()))?;

    let mut instruments = Vec::new();
    let mut row_id = 0;
    for batch_result in builder.build()? {
        let batch = batch_result?;
        let columns = batch_columns(&batch)?;
        let [issuer, industry, segment, moodys] = [0, 1, 2, 3].map(|i| columns[i].as_string::<i32>());
        let [ytm, ask, dm] = [4, 5, 6].map(|i| columns[i].as_primitive::<Float64Type>());

        for row in 0..batch.num_rows() {
            if columns.iter().any(|col| col.is_null(row)) {
                log::warn!("Skipping Parquet row {row_id}: null value");
            } else {
                instruments.push(Instrument {
                    row_id,
                    issuer: issuer.value(row).to_string(),
                    industry: industry.value(row).to_string(),
                    segment: segment.value(row).to_string(),
                    moodys: moodys.value(row).to_string(),
                    ytm: ytm.value(row),
                    ask: ask.value(row),
                    dm: dm.value(row),
                });
            }
            row_id += 1;
        }
    }
    finish(instruments, "Parquet snapshot")
}

/// The seven required columns of a batch, cast to Utf8 / Float64.
fn batch_columns(batch: &RecordBatch) -> Result<Vec<ArrayRef>, LoadError> {
    REQUIRED_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let col = batch
                .column_by_name(name)
                .ok_or_else(|| LoadError::MissingColumns {
                    missing: vec![name.to_string()],
                })?;
            let target = if idx < 4 { DataType::Utf8 } else { DataType::Float64 };
            Ok(cast(col, &target)?)
        })
        .collect()
}

// -- Shared helpers --

fn check_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: Vec<&str> = headers.collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns { missing })
    }
}

/// Drop rows that cannot take part in the numbers, warn on ratings outside
/// the ladder, and refuse an empty result.
fn finish(instruments: Vec<Instrument>, source: &str) -> Result<CompsTable, LoadError> {
    let total = instruments.len();
    let instruments: Vec<Instrument> = instruments
        .into_iter()
        .filter(|inst| {
            let ok = !inst.issuer.trim().is_empty()
                && inst.ytm.is_finite()
                && inst.ask.is_finite()
                && inst.dm.is_finite();
            if !ok {
                log::warn!("Skipping {source} row {}: missing issuer or non-finite value", inst.row_id);
            }
            ok
        })
        .collect();

    if instruments.is_empty() {
        return Err(LoadError::NoRows);
    }

    let table = CompsTable::from_instruments(instruments);
    for code in &table.ratings {
        if MoodysGrade::parse(code).is_none() {
            log::warn!("Rating '{code}' is not on the Moody's ladder; it will sort last");
        }
    }
    log::info!(
        "Loaded {} instruments from {source} ({} skipped), {} industries, {} segments, {} ratings",
        table.len(),
        total - table.len(),
        table.industries.len(),
        table.segments.len(),
        table.ratings.len()
    );
    Ok(table)
}
