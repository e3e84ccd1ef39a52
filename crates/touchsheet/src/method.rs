//! Rows, place notation and the method library.

use std::fmt;

use crate::conf::{C_BELL_NAMES, N_STAGE, TUP_BOB_PLACES, TUP_DEFAULT_METHODS, TUP_SINGLE_PLACES};
use crate::spec::{SpecMethodDefinition, TouchSheetError};

////////////////////////////////////////////////////////////////////////////////
// #region Rows

/// One row: zero-based bell indices in ringing order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecRow(Vec<u8>);

impl SpecRow {
    /// Rounds on `n_stage` bells.
    pub fn rounds(n_stage: usize) -> Self {
        Self((0..n_stage as u8).collect())
    }

    /// Parse bell symbols, e.g. `"13254768"`.
    pub fn parse(txt: &str) -> Result<Self, String> {
        txt.chars()
            .map(derive_bell_index)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Number of bells.
    pub fn stage(&self) -> usize {
        self.0.len()
    }

    /// Zero-based place of `bell`, if present.
    pub fn place_of(&self, bell: u8) -> Option<usize> {
        self.0.iter().position(|b| *b == bell)
    }

    /// Permute `self` by `rhs`: bell `i` of the result is `self[rhs[i]]`.
    pub fn transpose_by_row(&self, rhs: &SpecRow) -> Result<SpecRow, String> {
        if rhs.stage() != self.stage() {
            return Err(format!(
                "Cannot transpose a {}-bell row by a {}-bell row.",
                self.stage(),
                rhs.stage()
            ));
        }
        rhs.0
            .iter()
            .map(|bell| {
                self.0
                    .get(*bell as usize)
                    .copied()
                    .ok_or_else(|| format!("Row {rhs} is not a permutation of {self}."))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SpecRow)
    }

    /// Apply one change; `places` are one-based places that stay put.
    pub fn transpose_by_places(&self, places: &[usize]) -> Result<SpecRow, String> {
        let n_stage = self.stage();
        let mut l_bells = Vec::with_capacity(n_stage);
        let mut n_idx = 0;
        while n_idx < n_stage {
            let n_place = n_idx + 1;
            if places.contains(&n_place) {
                l_bells.push(self.0[n_idx]);
                n_idx += 1;
                continue;
            }
            if n_idx + 1 >= n_stage || places.contains(&(n_place + 1)) {
                return Err(format!(
                    "Places {} cannot be made on {n_stage} bells.",
                    derive_places_text(places)
                ));
            }
            l_bells.push(self.0[n_idx + 1]);
            l_bells.push(self.0[n_idx]);
            n_idx += 2;
        }
        Ok(SpecRow(l_bells))
    }

    /// Count the row ends (front, back) whose `n_len` bells step by one in one direction.
    pub fn count_runs(&self, n_len: usize) -> usize {
        if n_len < 2 || self.stage() < n_len {
            return 0;
        }
        let is_run = |window: &[u8]| {
            window.windows(2).all(|pair| pair[1] == pair[0] + 1)
                || window.windows(2).all(|pair| pair[0] == pair[1] + 1)
        };
        let n_front = usize::from(is_run(&self.0[..n_len]));
        let n_back = usize::from(is_run(&self.0[self.stage() - n_len..]));
        n_front + n_back
    }
}

impl fmt::Display for SpecRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bell in &self.0 {
            let chr = C_BELL_NAMES.as_bytes()[*bell as usize] as char;
            write!(f, "{chr}")?;
        }
        Ok(())
    }
}

fn derive_bell_index(chr: char) -> Result<u8, String> {
    C_BELL_NAMES
        .find(chr.to_ascii_uppercase())
        .map(|n_idx| n_idx as u8)
        .ok_or_else(|| format!("'{chr}' is not a known bell symbol."))
}

fn derive_places_text(places: &[usize]) -> String {
    if places.is_empty() {
        return "-".to_string();
    }
    places
        .iter()
        .map(|place| C_BELL_NAMES.as_bytes()[place - 1] as char)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PlaceNotation

/// Parse place notation into one-based places per change (`[]` is a cross).
///
/// `,` splits symmetric blocks; otherwise a leading `&` marks a symmetric
/// block and `+` an asymmetric one.
pub fn parse_place_notation(pn: &str) -> Result<Vec<Vec<usize>>, String> {
    parse_place_notation_block(pn, false)
}

fn parse_place_notation_block(
    pn: &str,
    if_expect_symmetric: bool,
) -> Result<Vec<Vec<usize>>, String> {
    if pn.contains(',') {
        let mut l_changes = Vec::new();
        for part in pn.split(',') {
            l_changes.extend(parse_place_notation_block(part, true)?);
        }
        return Ok(l_changes);
    }

    let c_trimmed = pn.trim();
    let if_symmetric = if if_expect_symmetric {
        !c_trimmed.starts_with('+')
    } else {
        c_trimmed.starts_with('&')
    };

    let mut l_changes: Vec<Vec<usize>> = Vec::new();
    let mut l_places_current: Vec<usize> = Vec::new();
    for chr in c_trimmed.trim_matches(|c| matches!(c, '.' | '&' | '+' | ' ')).chars() {
        match chr {
            '-' | 'x' | 'X' => {
                if !l_places_current.is_empty() {
                    l_changes.push(std::mem::take(&mut l_places_current));
                }
                l_changes.push(vec![]);
            }
            '.' | ' ' => {
                if !l_places_current.is_empty() {
                    l_changes.push(std::mem::take(&mut l_places_current));
                }
            }
            _ => {
                let n_bell = derive_bell_index(chr)
                    .map_err(|msg| format!("Bad place notation {pn:?}: {msg}"))?;
                l_places_current.push(usize::from(n_bell) + 1);
            }
        }
    }
    if !l_places_current.is_empty() {
        l_changes.push(l_places_current);
    }

    if if_symmetric && !l_changes.is_empty() {
        let l_mirror: Vec<Vec<usize>> = l_changes[..l_changes.len() - 1]
            .iter()
            .rev()
            .cloned()
            .collect();
        l_changes.extend(l_mirror);
    }
    Ok(l_changes)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Methods

/// A method's plain lead and its three possible lead heads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMethod {
    /// Single-letter code used in callings.
    pub shorthand: char,
    /// Method name.
    pub name: String,
    /// Rows of the plain lead, starting from rounds.
    pub lead_rows: Vec<SpecRow>,
    /// Lead head after a plain lead.
    pub lead_head_plain: SpecRow,
    /// Lead head after a bob.
    pub lead_head_bob: SpecRow,
    /// Lead head after a single.
    pub lead_head_single: SpecRow,
}

impl SpecMethod {
    /// Build a Major method from its place notation.
    pub fn new(shorthand: char, name: &str, place_notation: &str) -> Result<Self, String> {
        let l_changes = parse_place_notation(place_notation)?;

        let mut row_current = SpecRow::rounds(N_STAGE);
        let mut lead_rows = Vec::with_capacity(l_changes.len());
        for places in &l_changes {
            let row_next = row_current.transpose_by_places(places)?;
            lead_rows.push(row_current);
            row_current = row_next;
        }
        let Some(row_lead_end) = lead_rows.last() else {
            return Err(format!("Method {name:?} has empty place notation."));
        };

        Ok(Self {
            shorthand,
            name: name.to_string(),
            lead_head_bob: row_lead_end.transpose_by_places(&TUP_BOB_PLACES)?,
            lead_head_single: row_lead_end.transpose_by_places(&TUP_SINGLE_PLACES)?,
            lead_head_plain: row_current,
            lead_rows,
        })
    }

    /// Number of rows in one lead.
    pub fn lead_length(&self) -> usize {
        self.lead_rows.len()
    }
}

/// Ordered method library keyed by shorthand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMethodLibrary {
    methods: Vec<SpecMethod>,
}

impl SpecMethodLibrary {
    /// Insert `method`, replacing one with the same shorthand in place.
    pub fn insert(&mut self, method: SpecMethod) {
        match self
            .methods
            .iter_mut()
            .find(|existing| existing.shorthand == method.shorthand)
        {
            Some(existing) => *existing = method,
            None => self.methods.push(method),
        }
    }

    /// Overlay input definitions onto the library.
    pub fn with_definitions(
        mut self,
        definitions: &[SpecMethodDefinition],
    ) -> Result<Self, TouchSheetError> {
        for definition in definitions {
            if !definition.shorthand.is_ascii_alphabetic() {
                return Err(TouchSheetError::Validation(format!(
                    "Method {:?} needs a letter shorthand, got {:?}.",
                    definition.name, definition.shorthand
                )));
            }
            let method = SpecMethod::new(
                definition.shorthand,
                &definition.name,
                &definition.place_notation,
            )
            .map_err(TouchSheetError::Validation)?;
            self.insert(method);
        }
        Ok(self)
    }

    /// Method for `shorthand`, if known.
    pub fn get(&self, shorthand: char) -> Option<&SpecMethod> {
        self.methods.iter().find(|method| method.shorthand == shorthand)
    }

    /// Library position of `shorthand`.
    pub fn index_of(&self, shorthand: char) -> Option<usize> {
        self.methods
            .iter()
            .position(|method| method.shorthand == shorthand)
    }

    /// Methods in library order.
    pub fn methods(&self) -> &[SpecMethod] {
        &self.methods
    }
}

/// Build the built-in method library.
pub fn derive_default_method_library() -> Result<SpecMethodLibrary, TouchSheetError> {
    let mut library = SpecMethodLibrary::default();
    for (shorthand, name, place_notation) in TUP_DEFAULT_METHODS {
        let method =
            SpecMethod::new(shorthand, name, place_notation).map_err(TouchSheetError::Validation)?;
        library.insert(method);
    }
    Ok(library)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn row(txt: &str) -> SpecRow {
        SpecRow::parse(txt).expect("parse row")
    }

    #[test]
    fn test_parse_place_notation_symmetric_blocks() {
        let l_changes = parse_place_notation("-38-14-1258-36-14-58-16-78,12").expect("parse");
        assert_eq!(l_changes.len(), 32);
        assert_eq!(l_changes[0], Vec::<usize>::new());
        assert_eq!(l_changes[1], vec![3, 8]);
        assert_eq!(l_changes[15], vec![7, 8]);
        assert_eq!(l_changes[16], Vec::<usize>::new());
        assert_eq!(l_changes[30], Vec::<usize>::new());
        assert_eq!(l_changes[31], vec![1, 2]);
    }

    #[test]
    fn test_parse_place_notation_dots_and_crosses() {
        assert_eq!(
            parse_place_notation("x14x16.58").expect("parse"),
            vec![vec![], vec![1, 4], vec![], vec![1, 6], vec![5, 8]]
        );
        assert_eq!(
            parse_place_notation("&-14-").expect("parse"),
            vec![vec![], vec![1, 4], vec![], vec![1, 4], vec![]]
        );
        assert!(parse_place_notation("-1Z-").is_err());
    }

    #[test]
    fn test_transpose_by_places() {
        let rounds = SpecRow::rounds(8);
        assert_eq!(rounds.transpose_by_places(&[]).expect("x").to_string(), "21436587");
        assert_eq!(
            rounds.transpose_by_places(&[3, 8]).expect("38").to_string(),
            "21354768"
        );
        assert!(rounds.transpose_by_places(&[1]).is_err());
        assert!(rounds.transpose_by_places(&[3, 4]).is_ok());
        assert!(rounds.transpose_by_places(&[2, 3]).is_err());
    }

    #[test]
    fn test_transpose_by_row() {
        let lhs = row("21436587");
        let rhs = row("13527486");
        assert_eq!(lhs.transpose_by_row(&rhs).expect("t").to_string(), "24618375");
        assert!(lhs.transpose_by_row(&row("123")).is_err());
    }

    #[test]
    fn test_count_runs_front_and_back() {
        assert_eq!(row("12345678").count_runs(4), 2);
        assert_eq!(row("43217856").count_runs(4), 1);
        assert_eq!(row("13572468").count_runs(4), 0);
        assert_eq!(row("21435678").count_runs(4), 1);
        assert_eq!(row("87654321").count_runs(4), 2);
    }

    #[test]
    fn test_cambridge_lead_heads() {
        let method =
            SpecMethod::new('C', "Cambridge", "-38-14-1258-36-14-58-16-78,12").expect("method");
        assert_eq!(method.lead_length(), 32);
        assert_eq!(method.lead_rows[0], SpecRow::rounds(8));
        assert_eq!(method.lead_head_plain.to_string(), "15738264");
        assert_eq!(method.lead_head_bob.to_string(), "13578264");
        assert_eq!(method.lead_head_single.to_string(), "15378264");
    }

    #[test]
    fn test_default_library_and_overlay() {
        let library = derive_default_method_library().expect("library");
        assert_eq!(library.methods().len(), 14);
        assert_eq!(library.index_of('C'), Some(0));
        assert_eq!(library.get('N').map(|m| m.name.as_str()), Some("Double Norwich"));
        assert_eq!(library.get('N').map(SpecMethod::lead_length), Some(16));

        let library = library
            .with_definitions(&[SpecMethodDefinition {
                shorthand: 'C',
                name: "Cambridge Major".to_string(),
                place_notation: "-38-14-1258-36-14-58-16-78,12".to_string(),
            }])
            .expect("overlay");
        assert_eq!(library.methods().len(), 14);
        assert_eq!(library.get('C').map(|m| m.name.as_str()), Some("Cambridge Major"));

        let err = library
            .with_definitions(&[SpecMethodDefinition {
                shorthand: '1',
                name: "Bad".to_string(),
                place_notation: "-".to_string(),
            }])
            .expect_err("digit shorthand");
        assert!(matches!(err, TouchSheetError::Validation(_)));
    }
}
