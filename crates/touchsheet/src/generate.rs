//! End-to-end generation: load, analyse, lay out and write one sheet.

use std::path::Path;

use touchsheet_xlsx::{SheetSink, XlsxWriter, write_sheet_layout};

use crate::analysis::{resolve_touch_entries, sort_touch_entries};
use crate::builder::build_touch_sheet_layout;
use crate::input::load_touch_input;
use crate::method::derive_default_method_library;
use crate::report::{ReportTouchSheet, ReportTouchSheetBuilder};
use crate::spec::{SpecSheetSettings, SpecTouchEntry, SpecTouchSheetOptions, TouchSheetError};

/// Read `path_input`, build the touch sheet and save it to `path_output`.
///
/// `overrides` take precedence over the input's `[sheet]` section. Nothing is
/// written when loading, analysis or layout fails.
pub fn generate_touch_sheet(
    path_input: &Path,
    path_output: &Path,
    overrides: &SpecSheetSettings,
) -> Result<ReportTouchSheet, TouchSheetError> {
    let input = load_touch_input(path_input)?;
    if input.touches.is_empty() {
        return Err(TouchSheetError::EmptyInput);
    }

    let settings = overrides.clone().merge_missing(input.sheet);
    let options = SpecTouchSheetOptions::from_settings(&settings);
    let library = derive_default_method_library()?.with_definitions(&input.methods)?;

    let mut entries = resolve_touch_entries(input.touches, &library)?;
    if options.if_sort_by_length {
        sort_touch_entries(&mut entries);
    }

    let mut writer = XlsxWriter::new(path_output);
    let report = write_touch_sheet(&mut writer, &entries, &options)?;
    writer.close().map_err(|message| TouchSheetError::Io {
        path: path_output.to_path_buf(),
        message,
    })?;

    tracing::info!(
        input = %path_input.display(),
        output = %path_output.display(),
        touches = report.cnt_touches,
        rows = report.cnt_rows,
        "touch sheet written"
    );
    Ok(report)
}

/// Lay out `entries` and replay the layout into `sink` without closing it.
pub fn write_touch_sheet<S: SheetSink + ?Sized>(
    sink: &mut S,
    entries: &[SpecTouchEntry],
    options: &SpecTouchSheetOptions,
) -> Result<ReportTouchSheet, TouchSheetError> {
    let sheet = build_touch_sheet_layout(entries, options)?;
    let report_xlsx = write_sheet_layout(sink, &sheet.layout).map_err(TouchSheetError::Xlsx)?;

    let mut builder = ReportTouchSheetBuilder {
        sheet_name: report_xlsx.sheet_name,
        cnt_rows: sheet.layout.rows.len() as u64,
        cnt_merges: report_xlsx.cnt_merges as u64,
        ..Default::default()
    };
    for entry in entries {
        builder.add_touch(entry.touch.positions.len(), entry.analysis.is_some());
    }
    builder.add_warnings(sheet.warnings);
    for warning in &report_xlsx.warnings {
        tracing::warn!("{warning}");
    }
    builder.add_warnings(report_xlsx.warnings);

    Ok(builder.build())
}
