//! Sheet builder: touches in, styled grid layout out.

use std::collections::BTreeSet;

use touchsheet_xlsx::{
    N_BORDER_THICK, SpecCell, SpecCellFormat, SpecCellMerge, SpecSheetLayout, SpecSheetRow,
    derive_contiguous_ranges, estimate_unicode_string_width,
};

use crate::conf::{
    N_COL_DETAILS, N_COL_LENGTH, N_COL_POSITION, N_COL_RINGER, N_COL_RUNS, N_COLS_SHEET,
    N_FONT_SIZE, N_ROW_HEIGHT_BODY_FACTOR, N_ROW_HEIGHT_HEADER_FACTOR, N_ROW_HEIGHT_TITLE_FACTOR,
    N_WIDTH_FIT_MAX, N_WIDTH_FIT_PADDING, N_WIDTH_MONOSPACE_FACTOR, SpecTouchFormats,
    TUP_CAPTIONS_BY_COL, TUP_WIDTHS_BY_COL, derive_default_touch_formats, derive_position_bottom_border,
};
use crate::spec::{
    EnumColumnWidthRule, EnumTouchRowKind, SpecPosition, SpecTouch, SpecTouchEntry,
    SpecTouchSheetLayout, SpecTouchSheetOptions, TouchSheetError,
};

const C_DETAILS_JOIN: &str = "; ";

/// One line of the details column and whether it is set in the monospace font.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpecDetailLine {
    text: String,
    if_monospace: bool,
}

/// Check that positions are unique and run 1..=n; return them in ascending order.
pub fn validate_touch_positions(touch: &SpecTouch) -> Result<Vec<&SpecPosition>, TouchSheetError> {
    if touch.positions.is_empty() {
        return Err(TouchSheetError::Validation(format!(
            "Touch {:?} has no ringers.",
            touch.name
        )));
    }

    let mut l_positions: Vec<&SpecPosition> = touch.positions.iter().collect();
    l_positions.sort_by_key(|position| position.position);

    let mut set_seen = BTreeSet::new();
    let l_duplicates: BTreeSet<u32> = l_positions
        .iter()
        .filter(|position| !set_seen.insert(position.position))
        .map(|position| position.position)
        .collect();
    if !l_duplicates.is_empty() {
        return Err(TouchSheetError::Validation(format!(
            "Touch {:?} assigns position(s) {} more than once.",
            touch.name,
            l_duplicates
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    let l_numbers: Vec<usize> = l_positions
        .iter()
        .map(|position| position.position as usize)
        .collect();
    let l_ranges = derive_contiguous_ranges(&l_numbers);
    if l_ranges != [(1, l_positions.len())] {
        let c_ranges = l_ranges
            .iter()
            .map(|(n_start, n_end)| {
                if n_start == n_end {
                    n_start.to_string()
                } else {
                    format!("{n_start}-{n_end}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Err(TouchSheetError::Validation(format!(
            "Touch {:?} positions must run from 1 without gaps, got {c_ranges}.",
            touch.name
        )));
    }

    Ok(l_positions)
}

/// Lay out touches top-to-bottom: header, one row per position, separator.
///
/// A caption row naming the columns follows the optional title when any touch
/// carries an analysis.
pub fn build_touch_sheet_layout(
    entries: &[SpecTouchEntry],
    options: &SpecTouchSheetOptions,
) -> Result<SpecTouchSheetLayout, TouchSheetError> {
    if entries.is_empty() {
        return Err(TouchSheetError::EmptyInput);
    }

    let formats = derive_default_touch_formats();
    let n_font_size = N_FONT_SIZE as f64;
    let mut sheet = SpecTouchSheetLayout {
        layout: SpecSheetLayout {
            sheet_name: options.sheet_name.clone(),
            ..Default::default()
        },
        row_kinds: Vec::new(),
        warnings: Vec::new(),
    };

    if let Some(title) = &options.title {
        push_banner_row(
            &mut sheet,
            EnumTouchRowKind::Title,
            title,
            formats.title.clone(),
            n_font_size * N_ROW_HEIGHT_TITLE_FACTOR,
        );
    }

    if entries.iter().any(|entry| entry.analysis.is_some()) {
        push_caption_row(&mut sheet, &formats);
    }

    for entry in entries {
        let l_positions = validate_touch_positions(&entry.touch)?;
        push_touch_block(&mut sheet, entry, &l_positions, &formats);
    }

    if let Some(footer) = &options.footer {
        push_banner_row(
            &mut sheet,
            EnumTouchRowKind::Footer,
            footer,
            formats.footer.clone(),
            n_font_size * N_ROW_HEIGHT_BODY_FACTOR,
        );
    }

    sheet.layout.widths_by_col = derive_column_widths(entries, options.rule_column_width);
    tracing::debug!(
        rows = sheet.layout.rows.len(),
        merges = sheet.layout.merges.len(),
        touches = entries.len(),
        "touch sheet laid out"
    );
    Ok(sheet)
}

fn push_row(sheet: &mut SpecTouchSheetLayout, kind: EnumTouchRowKind, row: SpecSheetRow) -> usize {
    sheet.layout.rows.push(row);
    sheet.row_kinds.push(kind);
    sheet.layout.rows.len() - 1
}

fn push_banner_row(
    sheet: &mut SpecTouchSheetLayout,
    kind: EnumTouchRowKind,
    txt: &str,
    fmt: SpecCellFormat,
    n_height: f64,
) {
    let mut row = SpecSheetRow {
        height: Some(n_height),
        ..Default::default()
    };
    row.set(N_COL_POSITION, SpecCell::new(txt, fmt));
    let n_row_idx = push_row(sheet, kind, row);
    sheet.layout.merges.push(SpecCellMerge::horizontal(
        n_row_idx,
        N_COL_POSITION,
        N_COLS_SHEET - 1,
    ));
}

fn push_caption_row(sheet: &mut SpecTouchSheetLayout, formats: &SpecTouchFormats) {
    let mut row = SpecSheetRow {
        height: Some(N_FONT_SIZE as f64 * N_ROW_HEIGHT_HEADER_FACTOR),
        ..Default::default()
    };
    for (n_col, (txt, c_align)) in TUP_CAPTIONS_BY_COL.iter().enumerate() {
        let fmt = formats.header.merge(&SpecCellFormat {
            align: Some(c_align.to_string()),
            left: (n_col == N_COL_POSITION).then_some(N_BORDER_THICK),
            right: (n_col == N_COLS_SHEET - 1).then_some(N_BORDER_THICK),
            ..Default::default()
        });
        row.set(n_col, SpecCell::new(*txt, fmt));
    }
    push_row(sheet, EnumTouchRowKind::Caption, row);
}

fn push_touch_block(
    sheet: &mut SpecTouchSheetLayout,
    entry: &SpecTouchEntry,
    l_positions: &[&SpecPosition],
    formats: &SpecTouchFormats,
) {
    let n_font_size = N_FONT_SIZE as f64;
    let fmt_left = SpecCellFormat {
        left: Some(N_BORDER_THICK),
        ..Default::default()
    };
    let fmt_right = SpecCellFormat {
        right: Some(N_BORDER_THICK),
        ..Default::default()
    };

    // #region Header
    let mut row_header = SpecSheetRow {
        height: Some(n_font_size * N_ROW_HEIGHT_HEADER_FACTOR),
        ..Default::default()
    };
    row_header.set(
        N_COL_POSITION,
        SpecCell::new(entry.touch.name.as_str(), formats.header.merge(&fmt_left)),
    );
    row_header.set(
        N_COL_DETAILS,
        SpecCell::new(entry.composition_label.as_str(), formats.header.clone()),
    );
    match &entry.analysis {
        Some(analysis) => {
            row_header.set(N_COL_LENGTH, SpecCell::new(analysis.length, formats.header.clone()));
            row_header.set(
                N_COL_RUNS,
                SpecCell::new(analysis.runs, formats.header.merge(&fmt_right)),
            );
        }
        None => {
            row_header.set(N_COL_LENGTH, SpecCell::blank(formats.header.clone()));
            row_header.set(N_COL_RUNS, SpecCell::blank(formats.header.merge(&fmt_right)));
        }
    }
    let n_row_header = push_row(sheet, EnumTouchRowKind::Header, row_header);
    sheet.layout.merges.push(SpecCellMerge::horizontal(
        n_row_header,
        N_COL_POSITION,
        N_COL_RINGER,
    ));
    // #endregion

    // #region Positions
    let l_details = derive_detail_rows(entry, l_positions.len());
    let mut set_ringers = BTreeSet::new();
    for (n_idx, position) in l_positions.iter().enumerate() {
        if !set_ringers.insert(position.ringer.as_str()) {
            let msg = format!(
                "Touch {:?} lists ringer {:?} more than once.",
                entry.touch.name, position.ringer
            );
            tracing::warn!("{msg}");
            sheet.warnings.push(msg);
        }

        let fmt_bottom = SpecCellFormat {
            bottom: Some(derive_position_bottom_border(n_idx, l_positions.len())),
            ..Default::default()
        };
        let fmt_row = formats.body.merge(&fmt_bottom);

        let mut row = SpecSheetRow {
            height: Some(n_font_size * N_ROW_HEIGHT_BODY_FACTOR),
            ..Default::default()
        };
        row.set(
            N_COL_POSITION,
            SpecCell::new(position.position, fmt_row.merge(&fmt_left)),
        );
        row.set(
            N_COL_RINGER,
            SpecCell::new(position.ringer.as_str(), fmt_row.clone()),
        );
        match l_details.get(n_idx) {
            Some(line) => {
                let fmt_line = if line.if_monospace {
                    formats.monospace.merge(&fmt_bottom)
                } else {
                    fmt_row.clone()
                };
                row.set(N_COL_DETAILS, SpecCell::new(line.text.as_str(), fmt_line));
            }
            None => row.set(N_COL_DETAILS, SpecCell::blank(fmt_row.clone())),
        }
        row.set(N_COL_LENGTH, SpecCell::blank(fmt_row.clone()));
        row.set(N_COL_RUNS, SpecCell::blank(fmt_row.merge(&fmt_right)));
        push_row(sheet, EnumTouchRowKind::Position, row);
    }
    // #endregion

    push_row(
        sheet,
        EnumTouchRowKind::Separator,
        SpecSheetRow {
            height: Some(n_font_size * N_ROW_HEIGHT_BODY_FACTOR),
            ..Default::default()
        },
    );
}

/// Details column lines for a touch, folded to at most `n_rows` lines.
fn derive_detail_rows(entry: &SpecTouchEntry, n_rows: usize) -> Vec<SpecDetailLine> {
    let mut l_lines = Vec::new();
    let mut push_line = |txt: Option<&str>, if_monospace: bool| {
        if let Some(txt) = txt.map(str::trim).filter(|txt| !txt.is_empty()) {
            l_lines.push(SpecDetailLine {
                text: txt.to_string(),
                if_monospace,
            });
        }
    };
    push_line(entry.touch.calling.as_deref(), true);
    push_line(
        entry
            .analysis
            .as_ref()
            .map(|analysis| analysis.calling_positions.as_str()),
        true,
    );
    push_line(entry.method_summary.as_deref(), false);
    push_line(entry.touch.notes.as_deref(), false);

    if n_rows == 0 || l_lines.len() <= n_rows {
        return l_lines;
    }
    let l_overflow = l_lines.split_off(n_rows - 1);
    let if_monospace = l_overflow.iter().all(|line| line.if_monospace);
    l_lines.push(SpecDetailLine {
        text: l_overflow
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join(C_DETAILS_JOIN),
        if_monospace,
    });
    l_lines
}

fn derive_column_widths(entries: &[SpecTouchEntry], rule: EnumColumnWidthRule) -> Vec<f64> {
    let mut l_widths = TUP_WIDTHS_BY_COL.to_vec();
    if rule == EnumColumnWidthRule::Fixed {
        return l_widths;
    }

    let fit = |n_fixed: f64, n_content: f64| {
        n_fixed.max((n_content + N_WIDTH_FIT_PADDING).min(N_WIDTH_FIT_MAX))
    };
    let n_ringer = entries
        .iter()
        .flat_map(|entry| entry.touch.positions.iter())
        .map(|position| estimate_unicode_string_width(&position.ringer) as f64)
        .fold(0.0, f64::max);
    let n_details = entries
        .iter()
        .flat_map(|entry| {
            let n_rows = entry.touch.positions.len();
            let n_label = estimate_unicode_string_width(&entry.composition_label) as f64;
            derive_detail_rows(entry, n_rows)
                .into_iter()
                .map(|line| {
                    let n_width = estimate_unicode_string_width(&line.text) as f64;
                    if line.if_monospace {
                        n_width * N_WIDTH_MONOSPACE_FACTOR
                    } else {
                        n_width
                    }
                })
                .chain(std::iter::once(n_label))
                .collect::<Vec<_>>()
        })
        .fold(0.0, f64::max);

    l_widths[N_COL_RINGER] = fit(TUP_WIDTHS_BY_COL[N_COL_RINGER], n_ringer);
    l_widths[N_COL_DETAILS] = fit(TUP_WIDTHS_BY_COL[N_COL_DETAILS], n_details);
    l_widths
}
