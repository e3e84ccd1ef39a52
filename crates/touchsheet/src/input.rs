//! Input loading: one TOML file, or a directory of TOML files.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::spec::{SpecTouchInput, TouchSheetError};

const C_INPUT_GLOB: &str = "*.toml";

/// Load touches, methods and settings from `path_input`.
///
/// A directory is read as its `*.toml` files (extension in any case) in
/// file-name order: touches and methods are concatenated, and the first file
/// to set a sheet field wins.
pub fn load_touch_input(path_input: &Path) -> Result<SpecTouchInput, TouchSheetError> {
    let meta = std::fs::metadata(path_input).map_err(|err| TouchSheetError::Io {
        path: path_input.to_path_buf(),
        message: err.to_string(),
    })?;
    if !meta.is_dir() {
        return read_touch_file(path_input);
    }

    let l_paths = derive_input_files(path_input)?;
    if l_paths.is_empty() {
        return Err(TouchSheetError::InputParse {
            path: path_input.to_path_buf(),
            message: format!("directory has no {C_INPUT_GLOB} files"),
        });
    }

    let mut input_merged = SpecTouchInput::default();
    for path_file in &l_paths {
        let input = read_touch_file(path_file)?;
        tracing::debug!(
            path = %path_file.display(),
            touches = input.touches.len(),
            methods = input.methods.len(),
            "input file loaded"
        );
        input_merged.sheet = input_merged.sheet.merge_missing(input.sheet);
        input_merged.methods.extend(input.methods);
        input_merged.touches.extend(input.touches);
    }
    Ok(input_merged)
}

/// Parse one TOML document.
pub fn parse_touch_input(txt: &str, path: &Path) -> Result<SpecTouchInput, TouchSheetError> {
    toml::from_str(txt).map_err(|err| TouchSheetError::InputParse {
        path: path.to_path_buf(),
        message: err.to_string().trim_end().to_string(),
    })
}

fn read_touch_file(path_file: &Path) -> Result<SpecTouchInput, TouchSheetError> {
    let txt = std::fs::read_to_string(path_file).map_err(|err| TouchSheetError::Io {
        path: path_file.to_path_buf(),
        message: err.to_string(),
    })?;
    parse_touch_input(&txt, path_file)
}

fn derive_input_files(path_dir: &Path) -> Result<Vec<PathBuf>, TouchSheetError> {
    let matcher: GlobMatcher = GlobBuilder::new(C_INPUT_GLOB)
        .case_insensitive(true)
        .build()
        .map_err(|err| TouchSheetError::InputParse {
            path: path_dir.to_path_buf(),
            message: format!("Invalid input pattern: {err}"),
        })?
        .compile_matcher();
    let err_io = |err: std::io::Error| TouchSheetError::Io {
        path: path_dir.to_path_buf(),
        message: err.to_string(),
    };

    let mut l_paths = Vec::new();
    for entry in std::fs::read_dir(path_dir).map_err(err_io)? {
        let entry = entry.map_err(err_io)?;
        if !entry.file_type().map_err(err_io)?.is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            l_paths.push(entry.path());
        }
    }
    l_paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(l_paths)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("touchsheet_input_test_{n}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    fn write_text(path: &Path, txt: &str) {
        std::fs::write(path, txt).expect("write text");
    }

    const C_TOUCH_BOB: &str = r#"
[sheet]
title = "Practice night"

[[touches]]
name = "Plain Bob Doubles"
composition = "120 Plain Bob Doubles"
ringers = [
  { position = 1, ringer = "Alice" },
  { position = 2, ringer = "Bob" },
]
"#;

    const C_TOUCH_GRANDSIRE: &str = r#"
[sheet]
title = "Ignored"
sheet_name = "Lincoln"

[[methods]]
shorthand = "P"
name = "Pudsey"
place_notation = "-58-16-12-38-14-58-16-78,12"

[[touches]]
name = "Grandsire Triples"
composition = "Half course"
notes = "Ring up first"
ringers = [{ position = 1, ringer = "Carol" }]
"#;

    #[test]
    fn test_parse_single_file() {
        let input = parse_touch_input(C_TOUCH_BOB, Path::new("a.toml")).expect("parse");
        assert_eq!(input.sheet.title.as_deref(), Some("Practice night"));
        assert_eq!(input.touches.len(), 1);
        assert_eq!(input.touches[0].positions[1].ringer, "Bob");
        assert_eq!(
            input.touches[0].composition_label.as_deref(),
            Some("120 Plain Bob Doubles")
        );
    }

    #[test]
    fn test_parse_rejects_unknown_fields_and_bad_syntax() {
        let err = parse_touch_input("[[touches]]\nname = \"x\"\nbells = 3\n", Path::new("a.toml"))
            .expect_err("unknown field");
        assert!(matches!(err, TouchSheetError::InputParse { .. }));
        assert!(parse_touch_input("touches = [", Path::new("a.toml")).is_err());
    }

    #[test]
    fn test_load_directory_in_file_name_order() {
        let tmp = TestDir::new();
        write_text(&tmp.path().join("02_grandsire.toml"), C_TOUCH_GRANDSIRE);
        write_text(&tmp.path().join("01_bob.toml"), C_TOUCH_BOB);
        write_text(&tmp.path().join("notes.txt"), "not toml");

        let input = load_touch_input(tmp.path()).expect("load dir");
        let l_names: Vec<&str> = input.touches.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(l_names, vec!["Plain Bob Doubles", "Grandsire Triples"]);
        assert_eq!(input.sheet.title.as_deref(), Some("Practice night"));
        assert_eq!(input.sheet.sheet_name.as_deref(), Some("Lincoln"));
        assert_eq!(input.methods.len(), 1);
    }

    #[test]
    fn test_load_directory_matches_extension_case_insensitively() {
        let tmp = TestDir::new();
        write_text(&tmp.path().join("01_bob.TOML"), C_TOUCH_BOB);
        write_text(&tmp.path().join("02_grandsire.Toml"), C_TOUCH_GRANDSIRE);

        let input = load_touch_input(tmp.path()).expect("load dir");
        assert_eq!(input.touches.len(), 2);
        assert_eq!(input.touches[0].name, "Plain Bob Doubles");
    }

    #[test]
    fn test_load_errors() {
        let tmp = TestDir::new();
        let err = load_touch_input(&tmp.path().join("missing.toml")).expect_err("missing");
        assert!(matches!(err, TouchSheetError::Io { .. }));

        let err = load_touch_input(tmp.path()).expect_err("no toml files");
        assert!(matches!(err, TouchSheetError::InputParse { .. }));
    }
}
