//! Touch sheet constants and default preset factories.

use touchsheet_xlsx::conf::derive_default_cell_format;
use touchsheet_xlsx::{N_BORDER_MEDIUM, N_BORDER_THICK, N_BORDER_THIN, SpecCellFormat};

////////////////////////////////////////////////////////////////////////////////
// #region Ringing

/// Bell symbols in order; index is the zero-based bell.
pub const C_BELL_NAMES: &str = "1234567890ETABCD";
/// Number of bells analysed compositions are rung on (Major).
pub const N_STAGE: usize = 8;
/// Number of bells in a run.
pub const N_RUN_LENGTH: usize = 4;
/// Places made at a bob lead end.
pub const TUP_BOB_PLACES: [usize; 2] = [1, 4];
/// Places made at a single lead end.
pub const TUP_SINGLE_PLACES: [usize; 4] = [1, 2, 3, 4];
/// Calling position letters by tenor place after a bob.
pub const C_CALLING_POSITIONS_BOB: &str = "LIBFVMWH";
/// Calling position letters by tenor place after a single.
pub const C_CALLING_POSITIONS_SINGLE: &str = "LBTFVMWH";

/// Built-in method library: `(shorthand, name, place notation)`.
pub const TUP_DEFAULT_METHODS: [(char, &str, &str); 14] = [
    ('C', "Cambridge", "-38-14-1258-36-14-58-16-78,12"),
    ('Y', "Yorkshire", "-38-14-58-16-12-38-14-78,12"),
    ('S', "Superlative", "-36-14-58-36-14-58-36-78,12"),
    ('B', "Bristol", "-58-14.58-58.36.14-14.58-14-18,18"),
    ('E', "Lessness", "-38-14-56-16-12-58-14-58,12"),
    ('W', "Cornwall", "-56-14-56-38-14-58-14-58,18"),
    ('L', "London", "38-38.14-12-38.14-14.58.16-16.58,12"),
    ('N', "Double Norwich", "-14-36-58-18,18"),
    ('V', "Deva", "-58-14.58-58.36-14-58-36-18,18"),
    ('A', "Lancashire", "58-58.14-58-36-14-58.14-14.78,12"),
    ('T', "Ytterbium", "-38-14-1256-16-12-58.16-12.78,12"),
    ('D', "Double Coslany", "-14.58.36.14.58-18,18"),
    ('M', "Mareham", "-58-14.58-12.38-12-18.36.12-18,18"),
    ('G', "Glasgow", "36-56.14.58-58.36-14-38.16-16.38,18"),
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetLayout

/// Default sheet name.
pub const C_SHEET_NAME_DEFAULT: &str = "Touches";

/// Column holding position numbers.
pub const N_COL_POSITION: usize = 0;
/// Column holding ringer names.
pub const N_COL_RINGER: usize = 1;
/// Column holding the composition label and per-touch details.
pub const N_COL_DETAILS: usize = 2;
/// Column holding the analysed length.
pub const N_COL_LENGTH: usize = 3;
/// Column holding the analysed run count.
pub const N_COL_RUNS: usize = 4;
/// Number of columns in the layout.
pub const N_COLS_SHEET: usize = 5;

/// Fixed column widths, by column.
pub const TUP_WIDTHS_BY_COL: [f64; N_COLS_SHEET] = [5.0, 20.0, 32.0, 7.0, 6.0];
/// Caption row text and horizontal alignment, by column.
pub const TUP_CAPTIONS_BY_COL: [(&str, &str); N_COLS_SHEET] = [
    ("No.", "center"),
    ("Ringer", "center"),
    ("Calling (* for single, . for bob) / Notes", "center"),
    ("Length", "right"),
    ("Runs", "right"),
];
/// Upper bound for widths computed from content.
pub const N_WIDTH_FIT_MAX: f64 = 60.0;
/// Padding added to widths computed from content.
pub const N_WIDTH_FIT_PADDING: f64 = 2.0;
/// Width multiplier for monospace text.
pub const N_WIDTH_MONOSPACE_FACTOR: f64 = 1.3;

/// Positions per medium rule inside a block.
pub const N_POSITIONS_PER_RULE: usize = 5;

/// Base font family.
pub const C_FONT_FAMILY: &str = "EB Garamond";
/// Font family for callings.
pub const C_FONT_FAMILY_MONOSPACE: &str = "Fira Code";
/// Base font size in points.
pub const N_FONT_SIZE: i64 = 10;
/// Title font size multiplier.
pub const N_FONT_SIZE_TITLE_FACTOR: i64 = 4;
/// Header row fill.
pub const C_HEADER_FILL: &str = "#CCCCCC";

/// Title row height multiplier of the base font size.
pub const N_ROW_HEIGHT_TITLE_FACTOR: f64 = 6.0;
/// Header row height multiplier of the base font size.
pub const N_ROW_HEIGHT_HEADER_FACTOR: f64 = 1.7;
/// Body row height multiplier of the base font size.
pub const N_ROW_HEIGHT_BODY_FACTOR: f64 = 1.45;

/// Cell format presets used by the sheet builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTouchFormats {
    /// Plain body text.
    pub body: SpecCellFormat,
    /// Body text in the monospace font.
    pub monospace: SpecCellFormat,
    /// Touch header cells.
    pub header: SpecCellFormat,
    /// Sheet title.
    pub title: SpecCellFormat,
    /// Sheet footer.
    pub footer: SpecCellFormat,
}

/// Build the default format presets.
pub fn derive_default_touch_formats() -> SpecTouchFormats {
    let fmt_body = derive_default_cell_format().with_(SpecCellFormat {
        font_name: Some(C_FONT_FAMILY.to_string()),
        font_size: Some(N_FONT_SIZE),
        ..Default::default()
    });
    let fmt_box = SpecCellFormat {
        top: Some(N_BORDER_THICK),
        bottom: Some(N_BORDER_THICK),
        left: Some(N_BORDER_THICK),
        right: Some(N_BORDER_THICK),
        ..Default::default()
    };

    SpecTouchFormats {
        monospace: fmt_body.with_(SpecCellFormat {
            font_name: Some(C_FONT_FAMILY_MONOSPACE.to_string()),
            ..Default::default()
        }),
        header: fmt_body.with_(SpecCellFormat {
            bold: Some(true),
            bg_color: Some(C_HEADER_FILL.to_string()),
            valign: Some("vcenter".to_string()),
            top: Some(N_BORDER_THICK),
            bottom: Some(N_BORDER_THICK),
            ..Default::default()
        }),
        title: fmt_body.merge(&fmt_box).with_(SpecCellFormat {
            font_size: Some(N_FONT_SIZE * N_FONT_SIZE_TITLE_FACTOR),
            bold: Some(true),
            align: Some("center".to_string()),
            valign: Some("vcenter".to_string()),
            ..Default::default()
        }),
        footer: fmt_body.merge(&fmt_box).with_(SpecCellFormat {
            italic: Some(true),
            text_wrap: Some(true),
            ..Default::default()
        }),
        body: fmt_body,
    }
}

/// Bottom border for the `n_idx_position`-th (zero-based) of `n_positions` rows.
pub fn derive_position_bottom_border(n_idx_position: usize, n_positions: usize) -> i64 {
    if n_idx_position + 1 == n_positions {
        N_BORDER_THICK
    } else if n_idx_position % N_POSITIONS_PER_RULE == N_POSITIONS_PER_RULE - 1 {
        N_BORDER_MEDIUM
    } else {
        N_BORDER_THIN
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bottom_border_rules() {
        let l_borders: Vec<i64> = (0..7)
            .map(|n_idx| derive_position_bottom_border(n_idx, 7))
            .collect();
        assert_eq!(
            l_borders,
            vec![
                N_BORDER_THIN,
                N_BORDER_THIN,
                N_BORDER_THIN,
                N_BORDER_THIN,
                N_BORDER_MEDIUM,
                N_BORDER_THIN,
                N_BORDER_THICK
            ]
        );
    }

    #[test]
    fn test_default_formats_layer_on_body_font() {
        let formats = derive_default_touch_formats();
        assert_eq!(formats.body.font_name.as_deref(), Some(C_FONT_FAMILY));
        assert_eq!(formats.header.font_size, Some(N_FONT_SIZE));
        assert_eq!(formats.header.bold, Some(true));
        assert_eq!(
            formats.monospace.font_name.as_deref(),
            Some(C_FONT_FAMILY_MONOSPACE)
        );
        assert_eq!(formats.title.font_size, Some(40));
    }
}
