//! Printable two-car comparison report.
//!
//! The report is an XLSX workbook built entirely in memory from the
//! comparator's rows: a title band, the report date, a table with fixed
//! column widths and alternating row shading, and a footer. Nothing reaches
//! the filesystem unless [`write_report`] is called, and that only renames a
//! fully written temporary file into place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{info, warn};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::car_record::CarRecord;
use crate::comparator::{compare, tally, ComparisonRow};
use crate::format;
use crate::value_policy::Winner;

const BAND_COLOR: u32 = 0x3B82F6;
const SHADE_COLOR: u32 = 0xF5F7FA;
const MUTED_COLOR: u32 = 0x646464;
const WINNER_COLOR: u32 = 0x15803D;

const LABEL_WIDTH: f64 = 24.0;
const VALUE_WIDTH: f64 = 34.0;

const TABLE_HEADER_ROW: u32 = 4;

/// Single error surfaced by the exporter; the caller may simply retry.
#[derive(Debug, Error)]
#[error("comparison export failed: {reason}")]
pub struct ExportFailedError {
    reason: String,
}

impl ExportFailedError {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<XlsxError> for ExportFailedError {
    fn from(err: XlsxError) -> Self {
        Self { reason: err.to_string() }
    }
}

impl From<std::io::Error> for ExportFailedError {
    fn from(err: std::io::Error) -> Self {
        Self { reason: err.to_string() }
    }
}

/// A finished report, ready to hand to a save or download dialog.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Builds the report dated today in local time.
pub fn export_comparison(
    car_a: &CarRecord,
    car_b: &CarRecord,
) -> Result<ComparisonReport, ExportFailedError> {
    export_comparison_on(car_a, car_b, Local::now().date_naive())
}

pub fn export_comparison_on(
    car_a: &CarRecord,
    car_b: &CarRecord,
    generated_on: NaiveDate,
) -> Result<ComparisonReport, ExportFailedError> {
    let rows = compare(car_a, car_b);
    let name_a = car_a.display_name();
    let name_b = car_b.display_name();

    let mut worksheet = Worksheet::new();
    worksheet.set_name("Comparison")?;
    worksheet.set_column_width(0, LABEL_WIDTH)?;
    worksheet.set_column_width(1, VALUE_WIDTH)?;
    worksheet.set_column_width(2, VALUE_WIDTH)?;

    write_title_block(&mut worksheet, &name_a, &name_b, generated_on)?;
    let last_row = write_table(&mut worksheet, &name_a, &name_b, &rows)?;
    write_footer(&mut worksheet, last_row + 2, &rows)?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(worksheet);
    let bytes = workbook.save_to_buffer()?;

    Ok(ComparisonReport {
        file_name: report_file_name(car_a, car_b),
        bytes,
    })
}

/// `comparison_<brandA>_<modelA>_vs_<brandB>_<modelB>.xlsx`
pub fn report_file_name(car_a: &CarRecord, car_b: &CarRecord) -> String {
    let part = |car: &CarRecord| {
        format!("{}_{}", car.brand, car.model)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace(['/', '\\'], "_")
    };
    format!("comparison_{}_vs_{}.xlsx", part(car_a), part(car_b))
}

/// Writes `report` into `dir` and returns the final path.
///
/// The bytes go to a temporary sibling first; on any failure the temporary
/// file is removed and no file is left under the report's name.
pub fn write_report(report: &ComparisonReport, dir: impl AsRef<Path>) -> Result<PathBuf, ExportFailedError> {
    let target = dir.as_ref().join(&report.file_name);
    let partial = dir.as_ref().join(format!("{}.partial", report.file_name));

    let written = fs::write(&partial, &report.bytes).and_then(|_| fs::rename(&partial, &target));

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&partial) {
            warn!("Could not remove {}: {cleanup}", partial.display());
        }
        return Err(e.into());
    }

    info!("Comparison report written to {}", target.display());
    Ok(target)
}

fn write_title_block(
    worksheet: &mut Worksheet,
    name_a: &str,
    name_b: &str,
    generated_on: NaiveDate,
) -> Result<(), XlsxError> {
    let title = Format::new()
        .set_bold()
        .set_font_size(16.0)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(BAND_COLOR))
        .set_align(FormatAlign::Center);
    let muted = Format::new()
        .set_font_size(10.0)
        .set_font_color(Color::RGB(MUTED_COLOR))
        .set_align(FormatAlign::Center);
    let versus = Format::new()
        .set_bold()
        .set_font_size(14.0)
        .set_align(FormatAlign::Center);

    worksheet.merge_range(0, 0, 0, 2, "Car Comparison Report", &title)?;
    worksheet.merge_range(
        1,
        0,
        1,
        2,
        &format!("Report date: {}", format::report_date(generated_on)),
        &muted,
    )?;
    worksheet.merge_range(2, 0, 2, 2, &format!("{name_a} vs {name_b}"), &versus)?;
    Ok(())
}

/// Returns the index of the last table row written.
fn write_table(
    worksheet: &mut Worksheet,
    name_a: &str,
    name_b: &str,
    rows: &[ComparisonRow],
) -> Result<u32, XlsxError> {
    let header = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(BAND_COLOR))
        .set_border(FormatBorder::Thin);

    worksheet.write_string_with_format(TABLE_HEADER_ROW, 0, "Attribute", &header)?;
    worksheet.write_string_with_format(TABLE_HEADER_ROW, 1, name_a, &header)?;
    worksheet.write_string_with_format(TABLE_HEADER_ROW, 2, name_b, &header)?;

    let mut row_index = TABLE_HEADER_ROW;
    for (i, row) in rows.iter().enumerate() {
        row_index = TABLE_HEADER_ROW + 1 + i as u32;
        let shaded = i % 2 == 1;

        worksheet.write_string_with_format(row_index, 0, &row.label, &cell_format(shaded, false).set_bold())?;
        worksheet.write_string_with_format(
            row_index,
            1,
            &row.value_a,
            &cell_format(shaded, row.winner == Winner::A),
        )?;
        worksheet.write_string_with_format(
            row_index,
            2,
            &row.value_b,
            &cell_format(shaded, row.winner == Winner::B),
        )?;
    }

    Ok(row_index)
}

fn cell_format(shaded: bool, winner: bool) -> Format {
    let mut format = Format::new().set_font_size(9.0).set_border(FormatBorder::Thin);
    if shaded {
        format = format.set_background_color(Color::RGB(SHADE_COLOR));
    }
    if winner {
        format = format.set_bold().set_font_color(Color::RGB(WINNER_COLOR));
    }
    format
}

fn write_footer(worksheet: &mut Worksheet, first_row: u32, rows: &[ComparisonRow]) -> Result<(), XlsxError> {
    let muted = Format::new()
        .set_font_size(8.0)
        .set_font_color(Color::RGB(MUTED_COLOR))
        .set_align(FormatAlign::Center);
    let (wins_a, wins_b) = tally(rows);

    worksheet.merge_range(
        first_row,
        0,
        first_row,
        2,
        &format!("Attributes won: {wins_a} - {wins_b}"),
        &muted,
    )?;
    worksheet.merge_range(
        first_row + 1,
        0,
        first_row + 1,
        2,
        "Values marked in bold are the better figure for that attribute.",
        &muted,
    )?;
    worksheet.set_footer("&CPage &P of &N");
    Ok(())
}
