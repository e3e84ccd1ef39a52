//! XLSX constants and default preset factories.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Maximum column width accepted by Excel.
pub const N_WIDTH_EXCEL_COLUMN_MAX: f64 = 255.0;

/// Border code: thin line.
pub const N_BORDER_THIN: i64 = 1;
/// Border code: medium line.
pub const N_BORDER_MEDIUM: i64 = 2;
/// Border code: thick line.
pub const N_BORDER_THICK: i64 = 5;

/// Fallback sheet name when sanitizing leaves nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";

/// Build the base cell format every preset is layered on.
pub fn derive_default_cell_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("top".to_string()),
        ..Default::default()
    }
}
