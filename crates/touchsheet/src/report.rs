//! Run report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and warnings for one sheet generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportTouchSheet {
    /// Sheet name used in the workbook.
    pub sheet_name: String,
    /// Touches laid out.
    pub cnt_touches: u64,
    /// Position rows written across all touches.
    pub cnt_positions: u64,
    /// Touches whose calling was analysed.
    pub cnt_analysed: u64,
    /// Rows in the sheet, title and footer included.
    pub cnt_rows: u64,
    /// Merged ranges written.
    pub cnt_merges: u64,
    /// Non-fatal warnings from layout and rendering.
    pub warnings: Vec<String>,
}

impl ReportTouchSheet {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_touches".to_string(), self.cnt_touches);
        dict_counts.insert("cnt_positions".to_string(), self.cnt_positions);
        dict_counts.insert("cnt_analysed".to_string(), self.cnt_analysed);
        dict_counts.insert("cnt_rows".to_string(), self.cnt_rows);
        dict_counts.insert("cnt_merges".to_string(), self.cnt_merges);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} sheet={:?} touches={} positions={} analysed={} rows={} merges={} warnings={}",
            self.sheet_name,
            dict_counts["cnt_touches"],
            dict_counts["cnt_positions"],
            dict_counts["cnt_analysed"],
            dict_counts["cnt_rows"],
            dict_counts["cnt_merges"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportTouchSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SHEET]"))
    }
}

/// Mutable accumulator for run statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportTouchSheetBuilder {
    /// See [`ReportTouchSheet::sheet_name`].
    pub sheet_name: String,
    /// See [`ReportTouchSheet::cnt_touches`].
    pub cnt_touches: u64,
    /// See [`ReportTouchSheet::cnt_positions`].
    pub cnt_positions: u64,
    /// See [`ReportTouchSheet::cnt_analysed`].
    pub cnt_analysed: u64,
    /// See [`ReportTouchSheet::cnt_rows`].
    pub cnt_rows: u64,
    /// See [`ReportTouchSheet::cnt_merges`].
    pub cnt_merges: u64,
    /// See [`ReportTouchSheet::warnings`].
    pub warnings: Vec<String>,
}

impl ReportTouchSheetBuilder {
    /// Count one touch with `n_positions` ringers.
    pub fn add_touch(&mut self, n_positions: usize, if_analysed: bool) {
        self.cnt_touches += 1;
        self.cnt_positions += n_positions as u64;
        if if_analysed {
            self.cnt_analysed += 1;
        }
    }

    /// Add warning messages.
    pub fn add_warnings<I>(&mut self, warnings: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.warnings.extend(warnings);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportTouchSheet {
        ReportTouchSheet {
            sheet_name: self.sheet_name,
            cnt_touches: self.cnt_touches,
            cnt_positions: self.cnt_positions,
            cnt_analysed: self.cnt_analysed,
            cnt_rows: self.cnt_rows,
            cnt_merges: self.cnt_merges,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReportTouchSheetBuilder;

    #[test]
    fn report_touch_sheet_counts_and_format() {
        let mut builder = ReportTouchSheetBuilder {
            sheet_name: "Touches".to_string(),
            cnt_rows: 12,
            cnt_merges: 2,
            ..Default::default()
        };
        builder.add_touch(5, false);
        builder.add_touch(3, true);
        builder.add_warnings(vec!["ringer listed twice".to_string()]);

        let report = builder.build();
        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_touches"], 2);
        assert_eq!(dict_counts["cnt_positions"], 8);
        assert_eq!(dict_counts["cnt_analysed"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);
        assert_eq!(
            report.to_string(),
            "[SHEET] sheet=\"Touches\" touches=2 positions=8 analysed=1 rows=12 merges=2 warnings=1"
        );
    }
}
