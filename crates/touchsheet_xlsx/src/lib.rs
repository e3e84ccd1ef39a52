//! `touchsheet_xlsx` v1:
//! Grid layout model and XLSX rendering kernel.
//!
//! Modules:
//! - `conf`   : Excel limits, border codes and default presets
//! - `spec`   : cell/format/merge/layout models
//! - `util`   : pure helper functions
//! - `writer` : `SheetSink` capability trait and the rust_xlsxwriter backend
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_BORDER_MEDIUM, N_BORDER_THICK, N_BORDER_THIN, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    EnumCellValue, SpecCell, SpecCellFormat, SpecCellMerge, SpecSheetLayout, SpecSheetRow,
    SpecXlsxReport,
};
pub use util::{
    derive_contiguous_ranges, derive_merge_tracker, estimate_unicode_string_width,
    sanitize_sheet_name, validate_sheet_layout,
};
pub use writer::{SheetSink, XlsxWriter, write_sheet_layout};
