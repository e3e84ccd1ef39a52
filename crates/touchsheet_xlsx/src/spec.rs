//! Shared grid layout models.

use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Backend-neutral cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border code.
    pub top: Option<i64>,
    /// Bottom border code.
    pub bottom: Option<i64>,
    /// Left border code.
    pub left: Option<i64>,
    /// Right border code.
    pub right: Option<i64>,

    /// Background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellSpecification

/// Cell value as handed to a sheet sink.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Blank cell (format only).
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Text shown for this value, used for width estimates and assertions.
    pub fn to_display_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(val) => val.clone(),
            Self::Number(val) => {
                if val.fract() == 0.0 && val.is_finite() {
                    format!("{}", *val as i64)
                } else {
                    val.to_string()
                }
            }
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_text())
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<usize> for EnumCellValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for EnumCellValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// One styled cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCell {
    /// Cell content.
    pub value: EnumCellValue,
    /// Cell style.
    pub format: SpecCellFormat,
}

impl SpecCell {
    /// Build a cell from any value convertible to [`EnumCellValue`].
    pub fn new(value: impl Into<EnumCellValue>, format: SpecCellFormat) -> Self {
        Self {
            value: value.into(),
            format,
        }
    }

    /// Build a blank cell that only carries a format (borders, fill).
    pub fn blank(format: SpecCellFormat) -> Self {
        Self {
            value: EnumCellValue::None,
            format,
        }
    }
}

/// Rectangular merge; all bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecCellMerge {
    /// First row of the merged range.
    pub row_idx_start: usize,
    /// Last row of the merged range.
    pub row_idx_end: usize,
    /// First column of the merged range.
    pub col_idx_start: usize,
    /// Last column of the merged range.
    pub col_idx_end: usize,
}

impl SpecCellMerge {
    /// Single-row merge spanning `col_idx_start..=col_idx_end`.
    pub fn horizontal(row_idx: usize, col_idx_start: usize, col_idx_end: usize) -> Self {
        Self {
            row_idx_start: row_idx,
            row_idx_end: row_idx,
            col_idx_start,
            col_idx_end,
        }
    }

    /// Whether two ranges share at least one cell.
    pub fn overlaps(&self, other: &SpecCellMerge) -> bool {
        self.row_idx_start <= other.row_idx_end
            && other.row_idx_start <= self.row_idx_end
            && self.col_idx_start <= other.col_idx_end
            && other.col_idx_start <= self.col_idx_end
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// One row record: column index to styled cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetRow {
    /// Cells keyed by zero-based column index.
    pub cells: BTreeMap<usize, SpecCell>,
    /// Row height in points; backend default when `None`.
    pub height: Option<f64>,
}

impl SpecSheetRow {
    /// Cell at `col_idx`, if any.
    pub fn cell(&self, col_idx: usize) -> Option<&SpecCell> {
        self.cells.get(&col_idx)
    }

    /// Display text of the cell at `col_idx` (empty when absent).
    pub fn text(&self, col_idx: usize) -> String {
        self.cell(col_idx)
            .map(|cell| cell.value.to_display_text())
            .unwrap_or_default()
    }

    /// Set the cell at `col_idx`, replacing any previous one.
    pub fn set(&mut self, col_idx: usize, cell: SpecCell) {
        self.cells.insert(col_idx, cell);
    }
}

/// Complete in-memory sheet: rows, merges and column widths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetLayout {
    /// Requested sheet name (sanitized by the sink).
    pub sheet_name: String,
    /// Rows top-to-bottom; index is the zero-based sheet row.
    pub rows: Vec<SpecSheetRow>,
    /// Merge instructions.
    pub merges: Vec<SpecCellMerge>,
    /// Column widths in character units, by column index.
    pub widths_by_col: Vec<f64>,
}

impl SpecSheetLayout {
    /// Number of columns touched by any row, merge or width.
    pub fn width(&self) -> usize {
        let n_cols_rows = self
            .rows
            .iter()
            .filter_map(|row| row.cells.keys().next_back().map(|col_idx| col_idx + 1))
            .max()
            .unwrap_or(0);
        let n_cols_merges = self
            .merges
            .iter()
            .map(|merge| merge.col_idx_end + 1)
            .max()
            .unwrap_or(0);
        n_cols_rows.max(n_cols_merges).max(self.widths_by_col.len())
    }

    /// Merge whose anchor (top-left) is `(row_idx, col_idx)`.
    pub fn merge_anchored_at(&self, row_idx: usize, col_idx: usize) -> Option<&SpecCellMerge> {
        self.merges
            .iter()
            .find(|merge| merge.row_idx_start == row_idx && merge.col_idx_start == col_idx)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Actual sheet name used in the workbook.
    pub sheet_name: String,
    /// Number of cells written (merged ranges count once).
    pub cnt_cells: usize,
    /// Number of merged ranges written.
    pub cnt_merges: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
