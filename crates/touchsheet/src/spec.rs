//! Touch models, sheet options and top-level error types.

use std::path::PathBuf;

use serde::Deserialize;
use touchsheet_xlsx::SpecSheetLayout;

use crate::conf::C_SHEET_NAME_DEFAULT;

////////////////////////////////////////////////////////////////////////////////
// #region InputModels

/// One ringer assigned to one numbered position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecPosition {
    /// One-based bell number.
    pub position: u32,
    /// Who rings it.
    pub ringer: String,
}

/// One touch as described in the input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecTouch {
    /// Display name, e.g. `"Plain Bob Doubles"`.
    pub name: String,
    /// Composition label; derived from the calling when absent.
    #[serde(default, rename = "composition")]
    pub composition_label: Option<String>,
    /// Spliced calling such as `"CYS.B*LE"`.
    #[serde(default)]
    pub calling: Option<String>,
    /// Declared number of changes, checked against the calling.
    #[serde(default)]
    pub length: Option<usize>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Ringer assignment.
    #[serde(rename = "ringers")]
    pub positions: Vec<SpecPosition>,
}

impl SpecTouch {
    /// Plain touch with a label and `(position, ringer)` pairs.
    pub fn new<I, S>(name: &str, composition_label: &str, positions: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            composition_label: Some(composition_label.to_string()),
            calling: None,
            length: None,
            notes: None,
            positions: positions
                .into_iter()
                .map(|(position, ringer)| SpecPosition {
                    position,
                    ringer: ringer.into(),
                })
                .collect(),
        }
    }
}

/// Extra or replacement method for composition analysis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecMethodDefinition {
    /// Single-letter code used in callings.
    pub shorthand: char,
    /// Method name.
    pub name: String,
    /// Place notation, e.g. `"-38-14-1258-36-14-58-16-78,12"`.
    pub place_notation: String,
}

/// Sheet-level settings; every field is optional so sources can be layered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecSheetSettings {
    /// Worksheet name.
    pub sheet_name: Option<String>,
    /// Title row text.
    pub title: Option<String>,
    /// Footer row text.
    pub footer: Option<String>,
    /// Sort touches by length, then by runs descending.
    pub sort_by_length: Option<bool>,
    /// Widen columns to fit their content.
    pub fit_columns: Option<bool>,
}

impl SpecSheetSettings {
    /// Fill fields missing in `self` from `other` (left side wins).
    pub fn merge_missing(self, other: SpecSheetSettings) -> SpecSheetSettings {
        SpecSheetSettings {
            sheet_name: self.sheet_name.or(other.sheet_name),
            title: self.title.or(other.title),
            footer: self.footer.or(other.footer),
            sort_by_length: self.sort_by_length.or(other.sort_by_length),
            fit_columns: self.fit_columns.or(other.fit_columns),
        }
    }
}

/// Parsed input: one file, or several files concatenated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecTouchInput {
    /// Sheet settings.
    #[serde(default)]
    pub sheet: SpecSheetSettings,
    /// Method library additions.
    #[serde(default)]
    pub methods: Vec<SpecMethodDefinition>,
    /// Touches in input order.
    #[serde(default)]
    pub touches: Vec<SpecTouch>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ResolvedModels

/// Result of proving a calling against the method library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTouchAnalysis {
    /// Number of changes.
    pub length: usize,
    /// Four-bell runs at the front or back of rows.
    pub runs: usize,
    /// Compact calling-position string, e.g. `"2HsW"`.
    pub calling_positions: String,
    /// Leads per method `(shorthand, count)` in library order.
    pub method_counts: Vec<(char, usize)>,
}

/// A touch ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTouchEntry {
    /// Source touch.
    pub touch: SpecTouch,
    /// Label shown in the header row.
    pub composition_label: String,
    /// Analysis, when the touch has a calling.
    pub analysis: Option<SpecTouchAnalysis>,
    /// Leads per method, e.g. `"Cambridge ×7, Yorkshire ×6"`, when it differs from the label.
    pub method_summary: Option<String>,
}

impl From<SpecTouch> for SpecTouchEntry {
    fn from(touch: SpecTouch) -> Self {
        Self {
            composition_label: touch.composition_label.clone().unwrap_or_default(),
            touch,
            analysis: None,
            method_summary: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetOptions

/// Column width policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumColumnWidthRule {
    /// Use the constant widths (default).
    #[default]
    Fixed,
    /// Widen ringer/details columns to their longest text.
    FitContent,
}

/// Resolved options for one sheet build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTouchSheetOptions {
    /// Worksheet name.
    pub sheet_name: String,
    /// Optional title row.
    pub title: Option<String>,
    /// Optional footer row.
    pub footer: Option<String>,
    /// Sort touches by length, then runs descending.
    pub if_sort_by_length: bool,
    /// Column width policy.
    pub rule_column_width: EnumColumnWidthRule,
}

impl Default for SpecTouchSheetOptions {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            title: None,
            footer: None,
            if_sort_by_length: false,
            rule_column_width: EnumColumnWidthRule::Fixed,
        }
    }
}

impl SpecTouchSheetOptions {
    /// Resolve layered settings against defaults.
    pub fn from_settings(settings: &SpecSheetSettings) -> Self {
        let defaults = Self::default();
        Self {
            sheet_name: settings.sheet_name.clone().unwrap_or(defaults.sheet_name),
            title: settings.title.clone().filter(|txt| !txt.trim().is_empty()),
            footer: settings.footer.clone().filter(|txt| !txt.trim().is_empty()),
            if_sort_by_length: settings
                .sort_by_length
                .unwrap_or(defaults.if_sort_by_length),
            rule_column_width: if settings.fit_columns.unwrap_or(false) {
                EnumColumnWidthRule::FitContent
            } else {
                defaults.rule_column_width
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutModels

/// Role of a row in the touch sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumTouchRowKind {
    /// Sheet title.
    Title,
    /// Column captions, present when any touch was analysed.
    Caption,
    /// Touch header (name, label, length, runs).
    Header,
    /// One position and its ringer.
    Position,
    /// Blank row after each touch.
    Separator,
    /// Sheet footer.
    Footer,
}

/// Built sheet layout plus the role of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTouchSheetLayout {
    /// Generic layout handed to a sheet sink.
    pub layout: SpecSheetLayout,
    /// One entry per row of `layout.rows`.
    pub row_kinds: Vec<EnumTouchRowKind>,
    /// Non-fatal findings, e.g. a ringer listed twice in one touch.
    pub warnings: Vec<String>,
}

impl SpecTouchSheetLayout {
    /// Number of rows of `kind`.
    pub fn count_rows(&self, kind: EnumTouchRowKind) -> usize {
        self.row_kinds.iter().filter(|row_kind| **row_kind == kind).count()
    }

    /// Zero-based indices of rows of `kind`.
    pub fn row_indices(&self, kind: EnumTouchRowKind) -> Vec<usize> {
        self.row_kinds
            .iter()
            .enumerate()
            .filter_map(|(n_idx, row_kind)| (*row_kind == kind).then_some(n_idx))
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Top-level failures of a touch sheet run.
#[derive(Debug, thiserror::Error)]
pub enum TouchSheetError {
    /// Input description could not be parsed.
    #[error("Cannot parse {}: {message}", .path.display())]
    InputParse {
        /// Offending file or directory.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A touch, method or calling broke an invariant.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The input described no touches.
    #[error("Input contains no touches")]
    EmptyInput,

    /// Reading input or writing output failed.
    #[error("I/O error on {}: {message}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// The spreadsheet backend rejected the layout.
    #[error("Spreadsheet error: {0}")]
    Xlsx(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_merge_missing_keeps_left_values() {
        let cli = SpecSheetSettings {
            title: Some("Tuesday practice".to_string()),
            fit_columns: Some(true),
            ..Default::default()
        };
        let file = SpecSheetSettings {
            sheet_name: Some("Lincoln".to_string()),
            title: Some("From file".to_string()),
            ..Default::default()
        };

        let merged = cli.merge_missing(file);
        assert_eq!(merged.sheet_name.as_deref(), Some("Lincoln"));
        assert_eq!(merged.title.as_deref(), Some("Tuesday practice"));
        assert_eq!(merged.fit_columns, Some(true));
        assert_eq!(merged.sort_by_length, None);
    }

    #[test]
    fn test_options_from_settings_applies_defaults() {
        let options = SpecTouchSheetOptions::from_settings(&SpecSheetSettings {
            title: Some("   ".to_string()),
            fit_columns: Some(true),
            ..Default::default()
        });
        assert_eq!(options.sheet_name, C_SHEET_NAME_DEFAULT);
        assert_eq!(options.title, None);
        assert_eq!(options.rule_column_width, EnumColumnWidthRule::FitContent);
        assert!(!options.if_sort_by_length);
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = TouchSheetError::InputParse {
            path: PathBuf::from("touches.toml"),
            message: "expected `=`".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot parse touches.toml: expected `=`");
        assert_eq!(
            TouchSheetError::EmptyInput.to_string(),
            "Input contains no touches"
        );
    }
}
