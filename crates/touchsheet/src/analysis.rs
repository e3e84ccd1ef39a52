//! Composition analysis: prove a spliced calling against the method library.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use regex::Regex;

use crate::conf::{C_CALLING_POSITIONS_BOB, C_CALLING_POSITIONS_SINGLE, N_RUN_LENGTH, N_STAGE};
use crate::method::{SpecMethodLibrary, SpecRow};
use crate::spec::{SpecTouch, SpecTouchAnalysis, SpecTouchEntry, TouchSheetError};

const C_LEAD_PATTERN: &str = r"(?P<method>[a-zA-Z])(?P<call>[*.])?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumCall {
    Plain,
    Bob,
    Single,
}

impl EnumCall {
    fn symbol(self) -> char {
        match self {
            Self::Plain => ' ',
            Self::Bob => '-',
            Self::Single => 's',
        }
    }
}

/// Calling tokenizer shared across touches.
#[derive(Debug, Clone)]
pub struct CallingParser {
    re_lead: Regex,
}

impl CallingParser {
    /// Compile the lead pattern.
    pub fn new() -> Result<Self, TouchSheetError> {
        let re_lead = Regex::new(C_LEAD_PATTERN)
            .map_err(|err| TouchSheetError::Validation(format!("Bad lead pattern: {err}")))?;
        Ok(Self { re_lead })
    }

    fn parse_leads(&self, calling: &str) -> Vec<(char, EnumCall)> {
        self.re_lead
            .captures_iter(calling)
            .filter_map(|caps| {
                let shorthand = caps.name("method")?.as_str().chars().next()?;
                let call = match caps.name("call").map(|m| m.as_str()) {
                    Some(".") => EnumCall::Bob,
                    Some("*") => EnumCall::Single,
                    _ => EnumCall::Plain,
                };
                Some((shorthand, call))
            })
            .collect()
    }
}

/// Generate the rows of `calling`, then count runs, calls and method leads.
///
/// A snap finish (rounds before the last lead end) truncates the touch;
/// otherwise the last lead head must be rounds. When the final lead is less
/// than half rung its method loses one lead from the count, but never drops
/// below one.
pub fn analyze_calling(
    calling: &str,
    library: &SpecMethodLibrary,
    parser: &CallingParser,
) -> Result<SpecTouchAnalysis, TouchSheetError> {
    let l_leads = parser.parse_leads(calling);
    let Some(&(shorthand_last, _)) = l_leads.last() else {
        return Err(TouchSheetError::Validation(format!(
            "Calling {calling:?} contains no leads."
        )));
    };

    let rounds = SpecRow::rounds(N_STAGE);
    let mut l_rows: Vec<SpecRow> = Vec::new();
    let mut l_calls: Vec<(EnumCall, char)> = Vec::new();
    let mut lead_head = rounds.clone();
    let mut n_last_lead_len: isize = 0;

    for (shorthand, call) in &l_leads {
        let method = library.get(*shorthand).ok_or_else(|| {
            TouchSheetError::Validation(format!(
                "Calling {calling:?} uses unknown method {shorthand:?}."
            ))
        })?;

        for row in &method.lead_rows {
            l_rows.push(lead_head.transpose_by_row(row).map_err(TouchSheetError::Validation)?);
        }

        let lead_head_next = match call {
            EnumCall::Plain => &method.lead_head_plain,
            EnumCall::Bob => &method.lead_head_bob,
            EnumCall::Single => &method.lead_head_single,
        };
        lead_head = lead_head
            .transpose_by_row(lead_head_next)
            .map_err(TouchSheetError::Validation)?;
        if *call != EnumCall::Plain {
            l_calls.push((*call, derive_calling_position(&lead_head, *call)?));
        }
        n_last_lead_len = method.lead_length() as isize;
    }

    if let Some(n_idx_rounds) = l_rows.iter().skip(1).position(|row| *row == rounds) {
        let n_idx_rounds = n_idx_rounds + 1;
        n_last_lead_len -= (l_rows.len() - n_idx_rounds) as isize;
        l_rows.truncate(n_idx_rounds);
    } else if lead_head != rounds {
        return Err(TouchSheetError::Validation(format!(
            "Calling {calling:?} does not come round (ends at {lead_head})."
        )));
    }

    let mut dict_counts: BTreeMap<usize, (char, usize)> = BTreeMap::new();
    for (shorthand, _) in &l_leads {
        let n_idx_library = library.index_of(*shorthand).unwrap_or(usize::MAX);
        dict_counts.entry(n_idx_library).or_insert((*shorthand, 0)).1 += 1;
    }
    let n_last_method_len = library
        .get(shorthand_last)
        .map(|method| method.lead_length() as isize)
        .unwrap_or_default();
    if 2 * n_last_lead_len < n_last_method_len
        && let Some(n_idx_library) = library.index_of(shorthand_last)
        && let Some((_, n_count)) = dict_counts.get_mut(&n_idx_library)
    {
        *n_count = usize::max(1, *n_count - 1);
    }

    Ok(SpecTouchAnalysis {
        length: l_rows.len(),
        runs: l_rows.iter().map(|row| row.count_runs(N_RUN_LENGTH)).sum(),
        calling_positions: derive_calling_position_string(&l_calls),
        method_counts: dict_counts.into_values().collect(),
    })
}

fn derive_calling_position(lead_head: &SpecRow, call: EnumCall) -> Result<char, TouchSheetError> {
    let c_positions = if call == EnumCall::Single {
        C_CALLING_POSITIONS_SINGLE
    } else {
        C_CALLING_POSITIONS_BOB
    };
    let n_tenor = (N_STAGE - 1) as u8;
    lead_head
        .place_of(n_tenor)
        .and_then(|n_place| c_positions.chars().nth(n_place))
        .ok_or_else(|| {
            TouchSheetError::Validation(format!("No calling position for lead head {lead_head}."))
        })
}

/// Compress calls into a calling-position string.
///
/// Runs of calls at one position collapse: all bobs give `<count><pos>`
/// (count omitted for one), anything else lists the call symbols first.
fn derive_calling_position_string(l_calls: &[(EnumCall, char)]) -> String {
    let mut c_out = String::new();
    for l_group in l_calls.chunk_by(|a, b| a.1 == b.1) {
        let Some(&(_, position)) = l_group.first() else {
            continue;
        };
        if l_group.iter().all(|(call, _)| *call == EnumCall::Bob) {
            if l_group.len() > 1 {
                c_out.push_str(&l_group.len().to_string());
            }
        } else {
            c_out.extend(l_group.iter().map(|(call, _)| call.symbol()));
        }
        c_out.push(position);
    }
    c_out
}

/// Label listing the methods rung, in library order, e.g. `"Cambridge ×2, Yorkshire"`.
pub fn derive_composition_label(analysis: &SpecTouchAnalysis, library: &SpecMethodLibrary) -> String {
    analysis
        .method_counts
        .iter()
        .map(|(shorthand, n_count)| {
            let c_name = library
                .get(*shorthand)
                .map_or_else(|| shorthand.to_string(), |method| method.name.clone());
            if *n_count > 1 {
                format!("{c_name} ×{n_count}")
            } else {
                c_name
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Analyse callings, check declared lengths and resolve header labels.
pub fn resolve_touch_entries(
    touches: Vec<SpecTouch>,
    library: &SpecMethodLibrary,
) -> Result<Vec<SpecTouchEntry>, TouchSheetError> {
    let parser = CallingParser::new()?;
    let mut l_entries = Vec::with_capacity(touches.len());

    for touch in touches {
        let analysis = match touch.calling.as_deref().map(str::trim) {
            Some(calling) if !calling.is_empty() => {
                let analysis = analyze_calling(calling, library, &parser).map_err(|err| {
                    TouchSheetError::Validation(format!("Touch {:?}: {err}", touch.name))
                })?;
                if let Some(n_length_declared) = touch.length
                    && n_length_declared != analysis.length
                {
                    return Err(TouchSheetError::Validation(format!(
                        "Touch {:?}: calling {calling:?} is given length {n_length_declared} but has {} rows.",
                        touch.name, analysis.length
                    )));
                }
                tracing::debug!(
                    touch = %touch.name,
                    length = analysis.length,
                    runs = analysis.runs,
                    calls = %analysis.calling_positions,
                    "calling analysed"
                );
                Some(analysis)
            }
            _ => None,
        };

        let composition_label = match (&touch.composition_label, &analysis) {
            (Some(label), _) => label.clone(),
            (None, Some(analysis)) => derive_composition_label(analysis, library),
            (None, None) => {
                return Err(TouchSheetError::Validation(format!(
                    "Touch {:?} has neither a composition label nor a calling.",
                    touch.name
                )));
            }
        };

        let method_summary = analysis
            .as_ref()
            .map(|analysis| derive_composition_label(analysis, library))
            .filter(|summary| *summary != composition_label);

        l_entries.push(SpecTouchEntry {
            touch,
            composition_label,
            analysis,
            method_summary,
        });
    }

    Ok(l_entries)
}

/// Stable sort: analysed touches by length then runs descending, others last.
pub fn sort_touch_entries(entries: &mut [SpecTouchEntry]) {
    entries.sort_by_key(|entry| match &entry.analysis {
        Some(analysis) => (false, analysis.length, Reverse(analysis.runs)),
        None => (true, 0, Reverse(0)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::derive_default_method_library;
    use crate::spec::SpecMethodDefinition;

    fn analyze(calling: &str) -> Result<SpecTouchAnalysis, TouchSheetError> {
        let library = derive_default_method_library().expect("library");
        let parser = CallingParser::new().expect("parser");
        analyze_calling(calling, &library, &parser)
    }

    fn touch_with_calling(name: &str, calling: &str, length: Option<usize>) -> SpecTouch {
        SpecTouch {
            name: name.to_string(),
            composition_label: None,
            calling: Some(calling.to_string()),
            length,
            notes: None,
            positions: vec![],
        }
    }

    #[test]
    fn test_plain_course_of_cambridge() {
        let analysis = analyze("CCCCCCC").expect("plain course");
        assert_eq!(analysis.length, 224);
        assert_eq!(analysis.calling_positions, "");
        assert_eq!(analysis.method_counts, vec![('C', 7)]);
        assert_eq!(analysis.runs, 15);
    }

    #[test]
    fn test_bob_course_calling_positions() {
        // Seven bobs bring Cambridge round with the tenor in a new place each lead.
        let analysis = analyze("C.C.C.C.C.C.C.").expect("bob course");
        assert_eq!(analysis.length, 224);
        assert_eq!(analysis.calling_positions, "VBIMWFH");
        assert_eq!(analysis.method_counts, vec![('C', 7)]);
    }

    #[test]
    fn test_snap_finish_truncates_and_drops_partial_lead() {
        let library = derive_default_method_library()
            .expect("library")
            .with_definitions(&[SpecMethodDefinition {
                shorthand: 'X',
                name: "Cross".to_string(),
                place_notation: "x.x".to_string(),
            }])
            .expect("overlay");
        let parser = CallingParser::new().expect("parser");

        let analysis = analyze_calling("XX", &library, &parser).expect("snap");
        assert_eq!(analysis.length, 2);
        assert_eq!(analysis.runs, 2);
        assert_eq!(analysis.method_counts, vec![('X', 1)]);
    }

    #[test]
    fn test_false_ending_is_rejected() {
        let err = analyze("CC.").expect_err("does not come round");
        assert!(err.to_string().contains("does not come round"));
    }

    #[test]
    fn test_unknown_method_and_empty_calling() {
        assert!(analyze("Q.Q.Q.").is_err());
        assert!(analyze("...").is_err());
    }

    #[test]
    fn test_calling_position_string_grouping() {
        let l_calls = vec![
            (EnumCall::Bob, 'H'),
            (EnumCall::Bob, 'H'),
            (EnumCall::Single, 'W'),
            (EnumCall::Bob, 'M'),
            (EnumCall::Bob, 'W'),
            (EnumCall::Single, 'W'),
        ];
        assert_eq!(derive_calling_position_string(&l_calls), "2HsWM-sW");
    }

    #[test]
    fn test_composition_label_from_counts() {
        let library = derive_default_method_library().expect("library");
        let analysis = SpecTouchAnalysis {
            length: 0,
            runs: 0,
            calling_positions: String::new(),
            method_counts: vec![('C', 2), ('Y', 1)],
        };
        assert_eq!(
            derive_composition_label(&analysis, &library),
            "Cambridge ×2, Yorkshire"
        );
    }

    #[test]
    fn test_resolve_checks_declared_length_and_label() {
        let library = derive_default_method_library().expect("library");

        let entries = resolve_touch_entries(
            vec![touch_with_calling("Course", "CCCCCCC", Some(224))],
            &library,
        )
        .expect("resolve");
        assert_eq!(entries[0].composition_label, "Cambridge ×7");
        assert_eq!(entries[0].analysis.as_ref().map(|a| a.length), Some(224));
        assert_eq!(entries[0].method_summary, None);

        let err = resolve_touch_entries(
            vec![touch_with_calling("Course", "CCCCCCC", Some(100))],
            &library,
        )
        .expect_err("length mismatch");
        assert!(err.to_string().contains("given length 100"));

        let mut bare = touch_with_calling("Bare", "", None);
        bare.calling = None;
        assert!(resolve_touch_entries(vec![bare], &library).is_err());
    }

    #[test]
    fn test_resolve_keeps_method_counts_beside_a_given_label() {
        let library = derive_default_method_library().expect("library");
        let mut touch = touch_with_calling("Spliced", "CYCYCYCYCYCYCY", Some(224));
        touch.composition_label = Some("Two-method spliced".to_string());

        let entries = resolve_touch_entries(vec![touch], &library).expect("resolve");
        assert_eq!(entries[0].composition_label, "Two-method spliced");
        assert_eq!(
            entries[0].analysis.as_ref().map(|a| a.method_counts.clone()),
            Some(vec![('C', 7), ('Y', 6)])
        );
        assert_eq!(
            entries[0].method_summary.as_deref(),
            Some("Cambridge ×7, Yorkshire ×6")
        );

        let mut touch = touch_with_calling("Course", "CCCCCCC", None);
        touch.composition_label = Some("Cambridge ×7".to_string());
        let entries = resolve_touch_entries(vec![touch], &library).expect("resolve");
        assert_eq!(entries[0].method_summary, None);
    }

    #[test]
    fn test_sort_by_length_then_runs() {
        let entry = |name: &str, analysis: Option<(usize, usize)>| SpecTouchEntry {
            touch: SpecTouch::new(name, "x", [(1, "A")]),
            composition_label: "x".to_string(),
            analysis: analysis.map(|(length, runs)| SpecTouchAnalysis {
                length,
                runs,
                calling_positions: String::new(),
                method_counts: vec![],
            }),
            method_summary: None,
        };
        let mut entries = vec![
            entry("plain", None),
            entry("long", Some((448, 10))),
            entry("short-few", Some((96, 2))),
            entry("short-many", Some((96, 9))),
        ];
        sort_touch_entries(&mut entries);
        let l_names: Vec<&str> = entries.iter().map(|e| e.touch.name.as_str()).collect();
        assert_eq!(l_names, vec!["short-many", "short-few", "long", "plain"]);
    }
}
