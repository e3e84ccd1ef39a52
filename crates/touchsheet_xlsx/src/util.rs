//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::BTreeMap;

use crate::conf::{
    C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{SpecCellMerge, SpecSheetLayout};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_FALLBACK.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Check that a layout fits Excel limits and that its merges are sound.
///
/// Merges must lie inside the sheet, have ordered bounds, span more than one
/// cell and not overlap each other.
pub fn validate_sheet_layout(layout: &SpecSheetLayout) -> Result<(), String> {
    if layout.rows.len() > N_NROWS_EXCEL_MAX {
        return Err(format!(
            "Layout has {} rows; Excel allows at most {N_NROWS_EXCEL_MAX}.",
            layout.rows.len()
        ));
    }
    if layout.width() > N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "Layout has {} columns; Excel allows at most {N_NCOLS_EXCEL_MAX}.",
            layout.width()
        ));
    }

    for merge in &layout.merges {
        if merge.row_idx_start > merge.row_idx_end || merge.col_idx_start > merge.col_idx_end {
            return Err(format!("Merge bounds out of order: {merge:?}"));
        }
        if merge.row_idx_start == merge.row_idx_end && merge.col_idx_start == merge.col_idx_end {
            return Err(format!("Merge covers a single cell: {merge:?}"));
        }
        if merge.row_idx_end >= layout.rows.len() {
            return Err(format!(
                "Merge ends at row {} but layout has {} rows.",
                merge.row_idx_end,
                layout.rows.len()
            ));
        }
    }

    for (n_idx, merge) in layout.merges.iter().enumerate() {
        if let Some(other) = layout.merges[n_idx + 1..]
            .iter()
            .find(|other| merge.overlaps(other))
        {
            return Err(format!("Overlapping merges: {merge:?} and {other:?}"));
        }
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeUtils

/// Convert sorted indices to contiguous inclusive ranges.
pub fn derive_contiguous_ranges(sorted_indices: &[usize]) -> Vec<(usize, usize)> {
    let Some((&n_idx_first, l_rest)) = sorted_indices.split_first() else {
        return vec![];
    };

    let mut l_contiguous_ranges = Vec::new();
    let mut n_idx_start = n_idx_first;
    let mut n_idx_end = n_idx_first;

    for idx in l_rest {
        if *idx == n_idx_end + 1 {
            n_idx_end = *idx;
        } else {
            l_contiguous_ranges.push((n_idx_start, n_idx_end));
            n_idx_start = *idx;
            n_idx_end = *idx;
        }
    }

    l_contiguous_ranges.push((n_idx_start, n_idx_end));
    l_contiguous_ranges
}

/// Build lookup map for cells covered by a merge (excluding the anchor).
///
/// Values are the index of the covering merge in `merges`.
pub fn derive_merge_tracker(merges: &[SpecCellMerge]) -> BTreeMap<(usize, usize), usize> {
    let mut dict_merged_cells_tracker = BTreeMap::new();

    for (n_idx_merge, merge) in merges.iter().enumerate() {
        for row_idx in merge.row_idx_start..=merge.row_idx_end {
            for col_idx in merge.col_idx_start..=merge.col_idx_end {
                if row_idx == merge.row_idx_start && col_idx == merge.col_idx_start {
                    continue;
                }
                dict_merged_cells_tracker.insert((row_idx, col_idx), n_idx_merge);
            }
        }
    }

    dict_merged_cells_tracker
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for a string; non-ASCII chars count wider.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
