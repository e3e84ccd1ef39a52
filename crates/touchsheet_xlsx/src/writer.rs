//! Sheet sink capability trait and the rust_xlsxwriter backend.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{
    N_BORDER_MEDIUM, N_BORDER_THICK, N_BORDER_THIN, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_WIDTH_EXCEL_COLUMN_MAX,
};
use crate::spec::{EnumCellValue, SpecCell, SpecCellFormat, SpecCellMerge, SpecSheetLayout, SpecXlsxReport};
use crate::util::{derive_merge_tracker, sanitize_sheet_name, validate_sheet_layout};

////////////////////////////////////////////////////////////////////////////////
// #region SheetSink

/// Capabilities a spreadsheet backend must offer to receive a layout.
///
/// Row/column indices are zero-based. Implementations buffer freely but must
/// not touch the output file before [`SheetSink::close`].
pub trait SheetSink {
    /// Start a new sheet and make it the write target. Returns the name used.
    fn add_sheet(&mut self, sheet_name: &str) -> Result<String, String>;
    /// Write one value with its format.
    fn write_cell(&mut self, row_idx: usize, col_idx: usize, cell: &SpecCell)
    -> Result<(), String>;
    /// Merge a range and write `cell` into it.
    fn merge_range(&mut self, merge: &SpecCellMerge, cell: &SpecCell) -> Result<(), String>;
    /// Set a column width in character units.
    fn set_column_width(&mut self, col_idx: usize, width: f64) -> Result<(), String>;
    /// Set a row height in points.
    fn set_row_height(&mut self, row_idx: usize, height: f64) -> Result<(), String>;
    /// Persist everything written so far. Idempotent.
    fn close(&mut self) -> Result<(), String>;
}

/// Replay a [`SpecSheetLayout`] into `sink` as one new sheet.
///
/// Cells covered by a merge (other than its anchor) are skipped; merges whose
/// anchor has no cell are written blank.
pub fn write_sheet_layout<S: SheetSink + ?Sized>(
    sink: &mut S,
    layout: &SpecSheetLayout,
) -> Result<SpecXlsxReport, String> {
    validate_sheet_layout(layout)?;

    let sheet_name = sink.add_sheet(&layout.sheet_name)?;
    let mut report = SpecXlsxReport {
        sheet_name: sheet_name.clone(),
        ..Default::default()
    };
    if sheet_name != layout.sheet_name {
        report.warn(format!(
            "Sheet name {:?} was stored as {sheet_name:?}.",
            layout.sheet_name
        ));
    }

    for (col_idx, width) in layout.widths_by_col.iter().enumerate() {
        sink.set_column_width(col_idx, *width)?;
    }

    let dict_merge_tracker = derive_merge_tracker(&layout.merges);
    for (row_idx, row) in layout.rows.iter().enumerate() {
        if let Some(height) = row.height {
            sink.set_row_height(row_idx, height)?;
        }

        for (col_idx, cell) in &row.cells {
            if dict_merge_tracker.contains_key(&(row_idx, *col_idx)) {
                if cell.value != EnumCellValue::None {
                    report.warn(format!(
                        "Cell ({row_idx}, {col_idx}) is covered by a merge and was not written."
                    ));
                }
                continue;
            }

            if let Some(merge) = layout.merge_anchored_at(row_idx, *col_idx) {
                sink.merge_range(merge, cell)?;
                report.cnt_merges += 1;
            } else {
                sink.write_cell(row_idx, *col_idx, cell)?;
            }
            report.cnt_cells += 1;
        }
    }

    for merge in &layout.merges {
        let if_has_anchor = layout
            .rows
            .get(merge.row_idx_start)
            .is_some_and(|row| row.cell(merge.col_idx_start).is_some());
        if !if_has_anchor {
            sink.merge_range(merge, &SpecCell::default())?;
            report.cnt_merges += 1;
            report.cnt_cells += 1;
        }
    }

    tracing::debug!(
        sheet = %report.sheet_name,
        cells = report.cnt_cells,
        merges = report.cnt_merges,
        "sheet layout written"
    );
    Ok(report)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region XlsxWriter

/// Stateful workbook writer backed by rust_xlsxwriter.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    worksheet_active: Option<Worksheet>,
    dict_formats_cache: HashMap<SpecCellFormat, Format>,
    set_sheet_names_existing: BTreeSet<String>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path.
    ///
    /// The workbook is buffered in memory until [`SheetSink::close`] is called.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            worksheet_active: None,
            dict_formats_cache: HashMap::new(),
            set_sheet_names_existing: BTreeSet::new(),
            if_closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), String> {
        if self.if_closed {
            return Err("Cannot write after close().".to_string());
        }
        Ok(())
    }

    /// `name`, or `name__N` truncated to the Excel limit when already taken.
    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        let c_stem: String = name
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(3).max(1))
            .collect();
        let c_unique = std::iter::once(name.to_string())
            .chain((2usize..).map(|n_idx| {
                format!("{c_stem}__{n_idx}")
                    .chars()
                    .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                    .collect()
            }))
            .find(|candidate| !self.set_sheet_names_existing.contains(candidate))
            .unwrap_or_else(|| name.to_string());
        self.set_sheet_names_existing.insert(c_unique.clone());
        c_unique
    }
}

impl SheetSink for XlsxWriter {
    fn add_sheet(&mut self, sheet_name: &str) -> Result<String, String> {
        self.ensure_open()?;
        let sheet_name_unique = self.derive_unique_sheet_name(&sanitize_sheet_name(sheet_name, "_"));

        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(derive_xlsx_error_text)?;
        if let Some(worksheet_done) = self.worksheet_active.replace(worksheet) {
            self.workbook.push_worksheet(worksheet_done);
        }
        Ok(sheet_name_unique)
    }

    fn write_cell(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        cell: &SpecCell,
    ) -> Result<(), String> {
        self.ensure_open()?;
        let format = self
            .dict_formats_cache
            .entry(cell.format.clone())
            .or_insert_with(|| derive_rust_xlsx_format(&cell.format));
        let worksheet = self
            .worksheet_active
            .as_mut()
            .ok_or_else(|| "No active sheet; call add_sheet() first.".to_string())?;
        write_cell_with_format(worksheet, row_idx, col_idx, &cell.value, format)
    }

    fn merge_range(&mut self, merge: &SpecCellMerge, cell: &SpecCell) -> Result<(), String> {
        self.ensure_open()?;
        let format = self
            .dict_formats_cache
            .entry(cell.format.clone())
            .or_insert_with(|| derive_rust_xlsx_format(&cell.format));
        let worksheet = self
            .worksheet_active
            .as_mut()
            .ok_or_else(|| "No active sheet; call add_sheet() first.".to_string())?;

        let c_text = match &cell.value {
            EnumCellValue::String(val) => val.as_str(),
            EnumCellValue::None | EnumCellValue::Number(_) => "",
        };
        worksheet
            .merge_range(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                cast_row_num(merge.row_idx_end)?,
                cast_col_num(merge.col_idx_end)?,
                c_text,
                format,
            )
            .map_err(derive_xlsx_error_text)?;

        if let EnumCellValue::Number(_) = cell.value {
            write_cell_with_format(
                worksheet,
                merge.row_idx_start,
                merge.col_idx_start,
                &cell.value,
                format,
            )?;
        }
        Ok(())
    }

    fn set_column_width(&mut self, col_idx: usize, width: f64) -> Result<(), String> {
        self.ensure_open()?;
        let worksheet = self
            .worksheet_active
            .as_mut()
            .ok_or_else(|| "No active sheet; call add_sheet() first.".to_string())?;
        worksheet
            .set_column_width(
                cast_col_num(col_idx)?,
                width.clamp(0.0, N_WIDTH_EXCEL_COLUMN_MAX),
            )
            .map_err(derive_xlsx_error_text)?;
        Ok(())
    }

    fn set_row_height(&mut self, row_idx: usize, height: f64) -> Result<(), String> {
        self.ensure_open()?;
        let worksheet = self
            .worksheet_active
            .as_mut()
            .ok_or_else(|| "No active sheet; call add_sheet() first.".to_string())?;
        worksheet
            .set_row_height(cast_row_num(row_idx)?, height)
            .map_err(derive_xlsx_error_text)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        if let Some(worksheet_done) = self.worksheet_active.take() {
            self.workbook.push_worksheet(worksheet_done);
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        tracing::debug!(path = %self.path_file_out.display(), "workbook saved");
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let (n_row, n_col) = (cast_row_num(row_idx)?, cast_col_num(col_idx)?);
    let result = match value {
        EnumCellValue::None => worksheet.write_blank(n_row, n_col, format),
        EnumCellValue::String(val) => worksheet.write_string_with_format(n_row, n_col, val, format),
        EnumCellValue::Number(val) => worksheet.write_number_with_format(n_row, n_col, *val, format),
    };
    result.map(|_| ()).map_err(derive_xlsx_error_text)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(font_name) = &spec.font_name {
        format = format.set_font_name(font_name.as_str());
    }
    if let Some(font_size) = spec.font_size {
        format = format.set_font_size(font_size as f64);
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if spec.italic == Some(true) {
        format = format.set_italic();
    }
    if spec.text_wrap == Some(true) {
        format = format.set_text_wrap();
    }
    if let Some(bg_color) = &spec.bg_color {
        format = format.set_background_color(bg_color.as_str());
    }

    for align in [&spec.align, &spec.valign]
        .into_iter()
        .flatten()
        .filter_map(|txt| derive_format_align(txt))
    {
        format = format.set_align(align);
    }

    type FnSetBorder = fn(Format, FormatBorder) -> Format;
    let l_sides: [(Option<i64>, FnSetBorder); 4] = [
        (spec.top, Format::set_border_top),
        (spec.bottom, Format::set_border_bottom),
        (spec.left, Format::set_border_left),
        (spec.right, Format::set_border_right),
    ];
    for (code, set_side) in l_sides {
        if let Some(code) = code {
            format = set_side(format, derive_format_border(code));
        }
    }

    format
}

fn derive_format_border(code: i64) -> FormatBorder {
    match code {
        N_BORDER_THIN => FormatBorder::Thin,
        N_BORDER_MEDIUM => FormatBorder::Medium,
        N_BORDER_THICK => FormatBorder::Thick,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        "bottom" => Some(FormatAlign::Bottom),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
