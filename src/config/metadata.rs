// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Comment-marker metadata parsing and script discovery.
//!
//! A script declares its interface with comments anywhere in its body, on
//! their own line or trailing code:
//!
//! ```text
//! # ORCHESTRATOR.REQUIRES: df_initial, rates
//! # ORCHESTRATOR.PRODUCE: df_grouped
//! ```
//!
//! `PRODUCES` is accepted as an alias of `PRODUCE`, and `//` works as the
//! comment prefix for languages that use it. Markers may repeat; their lists
//! are merged. The first `"""` docstring in the body becomes the unit
//! description.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::descriptor::{is_valid_variable_name, UnitDescriptor, UnitLocation};
use crate::errors::{ConfigError, MalformedMetadataError, MetadataIssue};

const MARKER_PREFIX: &str = "ORCHESTRATOR.";
const COMMENT_PREFIXES: [&str; 2] = ["#", "//"];
const DOCSTRING_DELIMITER: &str = "\"\"\"";

/// One script file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    /// Unit name, the file stem
    pub name: String,
    pub path: PathBuf,
    pub body: String,
}

/// Result of scanning a set of sources.
///
/// Malformed units are reported in `errors` and left out of `descriptors`;
/// one bad script never hides the others.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub descriptors: Vec<UnitDescriptor>,
    pub errors: Vec<MalformedMetadataError>,
}

/// Requirements, products and description declared in one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredMetadata {
    pub requires: Vec<String>,
    pub produces: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Requires,
    Produces,
}

/// Parse the markers in `body`. `unit` is only used for error reporting.
pub fn parse_markers(unit: &str, body: &str) -> Result<DeclaredMetadata, MalformedMetadataError> {
    let mut declared = DeclaredMetadata {
        description: extract_docstring(body),
        ..Default::default()
    };

    for (index, line) in body.lines().enumerate() {
        let line_number = index + 1;
        let Some(directive) = marker_directive(line) else {
            continue;
        };

        let (key, list) = match directive.split_once(':') {
            Some((key, list)) => (key.trim(), Some(list)),
            None => (directive.trim(), None),
        };

        let kind = match key {
            "REQUIRES" => MarkerKind::Requires,
            "PRODUCE" | "PRODUCES" => MarkerKind::Produces,
            other => {
                return Err(MalformedMetadataError::new(
                    unit,
                    MetadataIssue::UnknownMarker {
                        marker: other.to_string(),
                    },
                )
                .at_line(line_number))
            }
        };

        let names = parse_list(key, list).map_err(|issue| {
            MalformedMetadataError::new(unit, issue).at_line(line_number)
        })?;

        match kind {
            MarkerKind::Requires => declared.requires.extend(names),
            MarkerKind::Produces => declared.produces.extend(names),
        }
    }

    Ok(declared)
}

/// Turn one script into a descriptor located at its path.
pub fn parse_script(source: &ScriptSource) -> Result<UnitDescriptor, MalformedMetadataError> {
    let declared = parse_markers(&source.name, &source.body)?;

    let descriptor = UnitDescriptor::new(
        source.name.clone(),
        declared.requires,
        declared.produces,
        UnitLocation::Script {
            path: source.path.clone(),
        },
    )?;

    Ok(match declared.description {
        Some(description) => descriptor.with_description(description),
        None => descriptor,
    })
}

/// Parse every source, collecting malformed units instead of stopping.
pub fn scan(sources: &[ScriptSource]) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for source in sources {
        match parse_script(source) {
            Ok(descriptor) => outcome.descriptors.push(descriptor),
            Err(error) => outcome.errors.push(error),
        }
    }
    outcome
}

/// Walk `directory` recursively for files ending in `.{extension}`.
///
/// Files come back sorted by path so discovery order, and with it the
/// declaration order of the units, is stable across runs. Files that cannot
/// be read are returned as `Unreadable` errors next to the sources.
pub fn discover_scripts(
    directory: &Path,
    extension: &str,
) -> Result<(Vec<ScriptSource>, Vec<MalformedMetadataError>), ConfigError> {
    if !directory.is_dir() {
        return Err(ConfigError::Read {
            path: directory.display().to_string(),
            message: "scripts directory does not exist".to_string(),
        });
    }

    let mut sources = Vec::new();
    let mut errors = Vec::new();

    let walker = WalkDir::new(directory).sort_by_file_name().follow_links(true);
    for entry in walker {
        let entry = entry.map_err(|e| ConfigError::Read {
            path: directory.display().to_string(),
            message: e.to_string(),
        })?;

        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(extension)
        {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        match fs::read_to_string(path) {
            Ok(body) => sources.push(ScriptSource {
                name,
                path: path.to_path_buf(),
                body,
            }),
            Err(e) => errors.push(MalformedMetadataError::new(
                name,
                MetadataIssue::Unreadable {
                    message: format!("{}: {}", path.display(), e),
                },
            )),
        }
    }

    Ok((sources, errors))
}

/// The text after `ORCHESTRATOR.` when the line has a marker comment.
///
/// The comment may start the line or trail code. Marker text inside a string
/// literal is not told apart from a real comment.
fn marker_directive(line: &str) -> Option<&str> {
    COMMENT_PREFIXES
        .iter()
        .flat_map(|prefix| line.match_indices(*prefix).map(move |(at, _)| at + prefix.len()))
        .filter_map(|start| {
            line[start..]
                .trim_start()
                .strip_prefix(MARKER_PREFIX)
                .map(|directive| (start, directive))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, directive)| directive)
}

fn parse_list(marker: &str, list: Option<&str>) -> Result<Vec<String>, MetadataIssue> {
    let empty = || MetadataIssue::EmptyVariableName {
        marker: marker.to_string(),
    };

    let list = list.map(str::trim).unwrap_or_default();
    if list.is_empty() {
        return Err(empty());
    }

    list.split(',')
        .map(str::trim)
        .map(|name| {
            if name.is_empty() {
                Err(empty())
            } else if !is_valid_variable_name(name) {
                Err(MetadataIssue::InvalidVariableName {
                    marker: marker.to_string(),
                    name: name.to_string(),
                })
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn extract_docstring(body: &str) -> Option<String> {
    let start = body.find(DOCSTRING_DELIMITER)? + DOCSTRING_DELIMITER.len();
    let end = body[start..].find(DOCSTRING_DELIMITER)? + start;
    let text = body[start..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn source(name: &str, body: &str) -> ScriptSource {
        ScriptSource {
            name: name.to_string(),
            path: PathBuf::from(format!("scripts/{}.py", name)),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_parse_markers_merges_repeated_markers() {
        let body = r#""""
Load the raw sales table.
"""
import pandas as pd

# ORCHESTRATOR.REQUIRES: rates
df_initial = load()
# ORCHESTRATOR.PRODUCE: df_initial
#ORCHESTRATOR.PRODUCES: df_final, df_initial
"#;

        let declared = parse_markers("script_a", body).unwrap();

        assert_eq!(declared.requires, vec!["rates"]);
        assert_eq!(declared.produces, vec!["df_initial", "df_final", "df_initial"]);
        assert_eq!(declared.description.as_deref(), Some("Load the raw sales table."));
    }

    #[test]
    fn test_parse_markers_accepts_double_slash_comments() {
        let body = "// ORCHESTRATOR.REQUIRES: a,b\n  // ORCHESTRATOR.PRODUCE: c\n";
        let declared = parse_markers("js", body).unwrap();

        assert_eq!(declared.requires, vec!["a", "b"]);
        assert_eq!(declared.produces, vec!["c"]);
    }

    #[test]
    fn test_parse_markers_reads_trailing_comments() {
        let body = "df_initial = build()  # ORCHESTRATOR.PRODUCE: df_initial\n\
                    rates = fetch() // ORCHESTRATOR.REQUIRES: region\n";
        let declared = parse_markers("script_a", body).unwrap();

        assert_eq!(declared.produces, vec!["df_initial"]);
        assert_eq!(declared.requires, vec!["region"]);
    }

    #[test]
    fn test_parse_markers_ignores_text_without_comment_marker() {
        let body = "total = 0  # ORCHESTRATOR runs this first\n\
                    print('ORCHESTRATOR.REQUIRES: z')\n\
                    url = 'http://example.com/ORCHESTRATOR.PRODUCE'\n";
        let declared = parse_markers("s", body).unwrap();

        assert!(declared.requires.is_empty());
        assert!(declared.produces.is_empty());
    }

    #[test]
    fn test_parse_markers_malformed_cases() {
        struct TestCase {
            name: &'static str,
            body: &'static str,
            expected_line: usize,
            expected_issue: MetadataIssue,
        }

        let test_cases = vec![
            TestCase {
                name: "marker without list",
                body: "# ORCHESTRATOR.PRODUCE:\n",
                expected_line: 1,
                expected_issue: MetadataIssue::EmptyVariableName {
                    marker: "PRODUCE".to_string(),
                },
            },
            TestCase {
                name: "marker without colon",
                body: "\n# ORCHESTRATOR.REQUIRES\n",
                expected_line: 2,
                expected_issue: MetadataIssue::EmptyVariableName {
                    marker: "REQUIRES".to_string(),
                },
            },
            TestCase {
                name: "empty item",
                body: "# ORCHESTRATOR.REQUIRES: a,,b\n",
                expected_line: 1,
                expected_issue: MetadataIssue::EmptyVariableName {
                    marker: "REQUIRES".to_string(),
                },
            },
            TestCase {
                name: "trailing comma",
                body: "# ORCHESTRATOR.PRODUCE: a,\n",
                expected_line: 1,
                expected_issue: MetadataIssue::EmptyVariableName {
                    marker: "PRODUCE".to_string(),
                },
            },
            TestCase {
                name: "invalid identifier",
                body: "# ORCHESTRATOR.PRODUCE: total-sales\n",
                expected_line: 1,
                expected_issue: MetadataIssue::InvalidVariableName {
                    marker: "PRODUCE".to_string(),
                    name: "total-sales".to_string(),
                },
            },
            TestCase {
                name: "unknown marker",
                body: "# ORCHESTRATOR.CONSUMES: x\n",
                expected_line: 1,
                expected_issue: MetadataIssue::UnknownMarker {
                    marker: "CONSUMES".to_string(),
                },
            },
        ];

        for test_case in test_cases {
            let err = parse_markers("unit", test_case.body).unwrap_err();
            assert_eq!(err.unit, "unit", "Test case '{}'", test_case.name);
            assert_eq!(
                err.line,
                Some(test_case.expected_line),
                "Test case '{}'",
                test_case.name
            );
            assert_eq!(err.issue, test_case.expected_issue, "Test case '{}'", test_case.name);
        }
    }

    #[test]
    fn test_scan_excludes_malformed_units() {
        let sources = vec![
            source("a", "# ORCHESTRATOR.PRODUCE: x\n"),
            source("bad", "# ORCHESTRATOR.REQUIRES: x\n# ORCHESTRATOR.PRODUCE: x\n"),
            source("b", "# ORCHESTRATOR.REQUIRES: x\n# ORCHESTRATOR.PRODUCE: y\n"),
        ];

        let outcome = scan(&sources);

        let names: Vec<_> = outcome.descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].unit, "bad");
        assert!(matches!(
            outcome.errors[0].issue,
            MetadataIssue::ConflictingDeclaration { .. }
        ));
        assert_eq!(
            outcome.descriptors[1].requires,
            BTreeSet::from(["x".to_string()])
        );
        assert_eq!(
            outcome.descriptors[0].location,
            UnitLocation::Script {
                path: PathBuf::from("scripts/a.py")
            }
        );
    }

    #[test]
    fn test_discover_scripts_is_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("b.py"), "# ORCHESTRATOR.PRODUCE: y\n").unwrap();
        fs::write(temp.path().join("a.py"), "# ORCHESTRATOR.PRODUCE: x\n").unwrap();
        fs::write(temp.path().join("nested").join("c.py"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let (sources, errors) = discover_scripts(temp.path(), "py").unwrap();

        assert!(errors.is_empty());
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(sources[0].body, "# ORCHESTRATOR.PRODUCE: x\n");
    }

    #[test]
    fn test_discover_scripts_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = discover_scripts(&temp.path().join("absent"), "py");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
