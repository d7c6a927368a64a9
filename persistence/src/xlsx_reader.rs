// FILENAME: persistence/src/xlsx_reader.rs

use std::any::Any;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use engine::Table;
use serde::{Deserialize, Serialize};

use crate::column_builder::{
    default_date_time_formats, parse_date_time, unique_column_names, CellValue, ColumnBuilder,
};
use crate::error::PersistenceError;
use crate::reader::{downcast_options, MultiTableReader, ReadOptions, TableReader};
use crate::source::Source;

pub const XLSX_EXTENSION: &str = "xlsx";
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XlsxReadOptions {
    /// Sheet read by the single-table reader; the first sheet when unset.
    /// Ignored by `read_all`.
    pub sheet: Option<String>,
    /// Whether the first row of each sheet holds column names.
    pub header: bool,
}

impl Default for XlsxReadOptions {
    fn default() -> Self {
        XlsxReadOptions {
            sheet: None,
            header: true,
        }
    }
}

impl XlsxReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

impl ReadOptions for XlsxReadOptions {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads one worksheet as a table, or every worksheet as a list of tables.
#[derive(Debug, Clone, Default)]
pub struct XlsxReader {
    defaults: XlsxReadOptions,
}

impl XlsxReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: XlsxReadOptions) -> Self {
        XlsxReader { defaults }
    }
}

impl TableReader for XlsxReader {
    fn read(&self, source: &Source) -> Result<Table, PersistenceError> {
        read_xlsx_sheet(source, &self.defaults)
    }

    fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError> {
        read_xlsx_sheet(source, downcast_options::<XlsxReadOptions>(options)?)
    }
}

impl MultiTableReader for XlsxReader {
    fn read_all(&self, source: &Source) -> Result<Vec<Table>, PersistenceError> {
        read_xlsx_sheets(source, &self.defaults)
    }

    fn read_all_with(
        &self,
        source: &Source,
        options: &dyn ReadOptions,
    ) -> Result<Vec<Table>, PersistenceError> {
        read_xlsx_sheets(source, downcast_options::<XlsxReadOptions>(options)?)
    }
}

fn sheet_names<RS: std::io::Read + std::io::Seek>(
    workbook: &Xlsx<RS>,
) -> Result<Vec<String>, PersistenceError> {
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }
    Ok(names)
}

/// Reads the named sheet, or the first one.
pub fn read_xlsx_sheet(source: &Source, options: &XlsxReadOptions) -> Result<Table, PersistenceError> {
    let mut workbook = Xlsx::new(source.open()?)?;
    let names = sheet_names(&workbook)?;

    let sheet_name = match &options.sheet {
        Some(wanted) => names
            .iter()
            .find(|name| *name == wanted)
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(wanted.clone()))?,
        None => names[0].clone(),
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let table = range_to_table(sheet_name, &range, options.header)?;
    log::debug!(
        "read sheet '{}' from {}: {} rows, {} columns",
        table.name(),
        source.describe(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Reads every sheet, in workbook order, one table per sheet.
pub fn read_xlsx_sheets(source: &Source, options: &XlsxReadOptions) -> Result<Vec<Table>, PersistenceError> {
    let mut workbook = Xlsx::new(source.open()?)?;
    let names = sheet_names(&workbook)?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        tables.push(range_to_table(name, &range, options.header)?);
    }
    log::debug!("read {} sheets from {}", tables.len(), source.describe());
    Ok(tables)
}

fn range_to_table(name: String, range: &Range<Data>, header: bool) -> Result<Table, PersistenceError> {
    let width = range.width();
    let mut rows = range.rows().peekable();

    let names: Vec<String> = match rows.peek() {
        Some(first) if header => (0..width).map(|i| header_name(i, first.get(i))).collect(),
        Some(_) => (0..width).map(|i| format!("C{}", i)).collect(),
        None => Vec::new(),
    };
    if header {
        rows.next();
    }

    let formats = default_date_time_formats();
    let mut builders: Vec<ColumnBuilder> = unique_column_names(names)
        .into_iter()
        .map(ColumnBuilder::new)
        .collect();
    for row in rows {
        for (i, builder) in builders.iter_mut().enumerate() {
            let value = row.get(i).map_or(CellValue::Missing, |cell| cell_value(cell, &formats));
            builder.push(value);
        }
    }

    let mut table = Table::new(name);
    for builder in builders {
        table.add_column(builder.build()?)?;
    }
    Ok(table)
}

fn header_name(index: usize, cell: Option<&Data>) -> String {
    let text = cell.map(|c| c.to_string()).unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("C{}", index)
    } else {
        trimmed.to_string()
    }
}

fn cell_value(cell: &Data, formats: &[String]) -> CellValue {
    match cell {
        Data::Empty => CellValue::Missing,
        Data::Int(i) => CellValue::integer(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                CellValue::Integer(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::DateTime(dt) => match excel_serial_to_date_time(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_time(s, formats) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Converts an Excel serial date (days since 1899-12-30, fraction is time of
/// day) to a date-time, rounded to the millisecond.
pub fn excel_serial_to_date_time(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    // i64::MAX as f64 rounds up to 2^63, so this also rejects -2^63
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ColumnType;
    use rust_xlsxwriter::{Format, Workbook};

    // 2024-01-05 06:00
    const SERIAL: f64 = 45296.25;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        let trips = workbook.add_worksheet();
        trips.set_name("Trips").unwrap();
        trips.write_string(0, 0, "id").unwrap();
        trips.write_string(0, 1, "pickup").unwrap();
        trips.write_string(0, 2, "fare").unwrap();
        trips.write_number(1, 0, 1.0).unwrap();
        trips.write_number_with_format(1, 1, SERIAL, &date_format).unwrap();
        trips.write_number(1, 2, 12.5).unwrap();
        trips.write_number(2, 0, 2.0).unwrap();
        trips.write_number(2, 2, 3.0).unwrap();

        let zones = workbook.add_worksheet();
        zones.set_name("Zones").unwrap();
        zones.write_string(0, 0, "zone").unwrap();
        zones.write_string(1, 0, "north").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_first_sheet() {
        let table = XlsxReader::new().read(&Source::from_bytes(workbook_bytes())).unwrap();
        assert_eq!(table.name(), "Trips");
        assert_eq!(table.column_names(), vec!["id", "pickup", "fare"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("id").unwrap().column_type(), ColumnType::Number);
        assert_eq!(table.column("fare").unwrap().column_type(), ColumnType::Double);

        let pickup = table.date_time_column("pickup").unwrap();
        assert_eq!(
            pickup.get(0),
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(6, 0, 0).unwrap())
        );
        assert!(pickup.is_missing(1));
    }

    #[test]
    fn test_reads_named_sheet() {
        let options = XlsxReadOptions::new().with_sheet("Zones");
        let table = XlsxReader::new()
            .read_with(&Source::from_bytes(workbook_bytes()), &options)
            .unwrap();
        assert_eq!(table.name(), "Zones");
        assert_eq!(table.column("zone").unwrap().get_string(0), "north");
    }

    #[test]
    fn test_unknown_sheet() {
        let options = XlsxReadOptions::new().with_sheet("Nope");
        let err = XlsxReader::new()
            .read_with(&Source::from_bytes(workbook_bytes()), &options)
            .unwrap_err();
        assert!(matches!(err, PersistenceError::SheetNotFound(name) if name == "Nope"));
    }

    #[test]
    fn test_reads_all_sheets() {
        let tables = XlsxReader::new().read_all(&Source::from_bytes(workbook_bytes())).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Trips", "Zones"]);
    }

    #[test]
    fn test_without_header_first_row_is_data() {
        let options = XlsxReadOptions::new().with_sheet("Zones").with_header(false);
        let table = XlsxReader::new()
            .read_with(&Source::from_bytes(workbook_bytes()), &options)
            .unwrap();
        assert_eq!(table.column_names(), vec!["C0"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("C0").unwrap().get_string(0), "zone");
    }

    #[test]
    fn test_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.xlsx");
        std::fs::write(&path, workbook_bytes()).unwrap();
        let table = XlsxReader::new().read(&Source::from_path(&path)).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = XlsxReader::new()
            .read(&Source::from_bytes(b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::XlsxRead(_)));
    }

    #[test]
    fn test_excel_serial_conversion() {
        assert_eq!(
            excel_serial_to_date_time(1.5),
            Some(NaiveDate::from_ymd_opt(1899, 12, 31).unwrap().and_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(excel_serial_to_date_time(f64::NAN), None);
        let most_negative = i64::MIN as f64 / MILLIS_PER_DAY;
        assert_eq!(excel_serial_to_date_time(most_negative), None);
        assert_eq!(excel_serial_to_date_time(-most_negative), None);
    }
}
