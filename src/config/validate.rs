//! Configuration validation with unknown field detection.

use serde_json::{Map, Value};
use std::collections::HashSet;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["runtime", "dependencies", "app", "launcher", "logging"];

/// Known fields for each section.
const KNOWN_RUNTIME: &[&str] = &["command", "download_url"];
const KNOWN_DEPENDENCIES: &[&str] = &["packages", "upgrade_installer", "skip_if_importable"];
const KNOWN_APP: &[&str] = &["entry_point", "host", "port", "working_dir", "check_port"];
const KNOWN_LAUNCHER: &[&str] = &["pause", "shutdown_grace_secs"];
const KNOWN_LOGGING: &[&str] = &["format", "level", "file"];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        prev = row;
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

/// Report keys of `obj` not in `known`. Returns true if any were found.
fn check_keys(
    obj: &Map<String, Value>,
    prefix: &str,
    known: &[&str],
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let known_set: HashSet<&str> = known.iter().copied().collect();
    let mut has_unknown = false;
    for key in obj.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        has_unknown = true;
        let message = match suggest_field(key, known) {
            Some(s) => format!("Unknown field '{}' ({})", key, s),
            None => format!("Unknown field '{}'", key),
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path,
            message,
        });
    }
    has_unknown
}

/// Validate a raw JSON config value against known field names and values.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: String::new(),
                message: "Config must be a JSON object".to_string(),
            });
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Ok,
        path: String::new(),
        message: "Valid JSON".to_string(),
    });

    let mut has_unknown = check_keys(obj, "", KNOWN_TOP_LEVEL, &mut diagnostics);
    let sections: [(&str, &[&str]); 5] = [
        ("runtime", KNOWN_RUNTIME),
        ("dependencies", KNOWN_DEPENDENCIES),
        ("app", KNOWN_APP),
        ("launcher", KNOWN_LAUNCHER),
        ("logging", KNOWN_LOGGING),
    ];
    for (section, known) in sections {
        if let Some(inner) = obj.get(section).and_then(|v| v.as_object()) {
            has_unknown |= check_keys(inner, section, known, &mut diagnostics);
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Ok,
            path: String::new(),
            message: "All fields recognized".to_string(),
        });
    }

    check_values(obj, &mut diagnostics);

    diagnostics
}

/// Value-level checks that do not depend on successful deserialization.
fn check_values(obj: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(app) = obj.get("app").and_then(|v| v.as_object()) {
        if let Some(port) = app.get("port") {
            match port.as_u64() {
                Some(p) if (1..=u64::from(u16::MAX)).contains(&p) => {}
                _ => diagnostics.push(Diagnostic {
                    level: DiagnosticLevel::Error,
                    path: "app.port".to_string(),
                    message: format!("Must be an integer between 1 and 65535, got {}", port),
                }),
            }
        }
        if let Some(host) = app.get("host").and_then(|v| v.as_str()) {
            if !matches!(host, "localhost" | "127.0.0.1" | "::1") {
                diagnostics.push(Diagnostic {
                    level: DiagnosticLevel::Warn,
                    path: "app.host".to_string(),
                    message: format!(
                        "'{}' is not a loopback address; the dashboard has no authentication",
                        host
                    ),
                });
            }
        }
        if let Some(entry) = app.get("entry_point").and_then(|v| v.as_str()) {
            if entry.trim().is_empty() {
                diagnostics.push(Diagnostic {
                    level: DiagnosticLevel::Error,
                    path: "app.entry_point".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }
    }

    if let Some(deps) = obj.get("dependencies").and_then(|v| v.as_object()) {
        if let Some(packages) = deps.get("packages").and_then(|v| v.as_array()) {
            if packages.is_empty() {
                diagnostics.push(Diagnostic {
                    level: DiagnosticLevel::Warn,
                    path: "dependencies.packages".to_string(),
                    message: "Empty, nothing will be installed".to_string(),
                });
            }
            for (i, p) in packages.iter().enumerate() {
                if p.as_str().map(|s| s.trim().is_empty()).unwrap_or(true) {
                    diagnostics.push(Diagnostic {
                        level: DiagnosticLevel::Error,
                        path: format!("dependencies.packages[{}]", i),
                        message: "Must be a non-empty string".to_string(),
                    });
                }
            }
        }
    }
}
