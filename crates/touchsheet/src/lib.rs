//! `touchsheet` v1:
//! Practice-night touch sheets rendered to XLSX.
//!
//! Modules:
//! - `conf`     : ringing constants, sheet layout constants and format presets
//! - `spec`     : input/resolved/layout models and errors
//! - `method`   : rows, place notation and the method library
//! - `analysis` : calling analysis, header labels and sorting
//! - `input`    : TOML file/directory loading
//! - `builder`  : touch sheet layout
//! - `report`   : run-time report model
//! - `generate` : end-to-end orchestration

pub mod analysis;
pub mod builder;
pub mod conf;
pub mod generate;
pub mod input;
pub mod method;
pub mod report;
pub mod spec;

pub use analysis::{
    CallingParser, analyze_calling, derive_composition_label, resolve_touch_entries,
    sort_touch_entries,
};
pub use builder::{build_touch_sheet_layout, validate_touch_positions};
pub use generate::{generate_touch_sheet, write_touch_sheet};
pub use input::{load_touch_input, parse_touch_input};
pub use method::{SpecMethod, SpecMethodLibrary, SpecRow, derive_default_method_library};
pub use report::{ReportTouchSheet, ReportTouchSheetBuilder};
pub use spec::{
    EnumColumnWidthRule, EnumTouchRowKind, SpecMethodDefinition, SpecPosition, SpecSheetSettings,
    SpecTouch, SpecTouchAnalysis, SpecTouchEntry, SpecTouchInput, SpecTouchSheetLayout,
    SpecTouchSheetOptions, TouchSheetError,
};
