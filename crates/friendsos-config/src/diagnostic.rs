// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error rendered through miette.
///
/// Variants that can be traced back to a file carry the source text and a
/// span so the report points at the offending line.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section declares, usually a typo.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(friendsos::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The key as written.
        key: String,
        /// Nearest valid key, when one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        /// Where the key sits in the file.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// File the key was read from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, e.g. a string where minutes are expected.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(friendsos::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key, e.g. `checkin.persist_retries`.
        key: String,
        /// What was found and what was expected.
        detail: String,
        /// The expected type alone, for the help line.
        expected: String,
        /// Where the key sits in the file.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// File the key was read from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key with no default was not set anywhere.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(friendsos::config::missing_key),
        help("add `{key} = <value>` to friendsos.toml")
    )]
    MissingKey {
        /// Name of the absent key.
        key: String,
    },

    /// A value parsed but is not acceptable.
    #[error("validation error: {message}")]
    #[diagnostic(code(friendsos::config::validation))]
    Validation {
        /// Which key failed and why.
        message: String,
    },

    /// Any other figment error, passed through as text.
    #[error("configuration error: {0}")]
    #[diagnostic(code(friendsos::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs file paths with their contents so unknown keys can be
/// pointed at in the source.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate_key(&error, &error.path, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => {
                let (span, src) = match error.path.split_last() {
                    Some((field, section)) => locate_key(&error, section, field, toml_sources),
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: dotted_path(&error.path),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.clone(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn dotted_path(path: &[String]) -> String {
    path.join(".")
}

/// Resolve the file an error came from and the byte span of `field`
/// within `section`.
fn locate_key(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings carry no file path; fall back to the only source given.
    let found = match origin {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    let Some((path, content)) = found else {
        return (None, None);
    };
    match find_key_offset(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` as a key under the section named by `path[0]`.
///
/// Array-of-table headers (`[[contacts]]`) are matched as well as plain ones.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => {
            let plain = format!("[{section}]");
            let array = format!("[[{section}]]");
            content
                .find(&array)
                .map(|pos| pos + array.len())
                .or_else(|| content.find(&plain).map(|pos| pos + plain.len()))?
        }
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        if let Some(after) = rest.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Closest valid key to `unknown` by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = &["default_max_notifications", "persist_retries", "poll_interval_secs"];
        assert_eq!(
            suggest_key("persist_retires", valid),
            Some("persist_retries".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level", "user_id"]), None);
    }

    #[test]
    fn finds_key_inside_section() {
        let content = "[app]\nname = \"x\"\n\n[checkin]\npersist_retires = 2\n";
        let path = vec!["checkin".to_string()];
        let offset = find_key_offset(content, &path, "persist_retires").unwrap();
        assert_eq!(&content[offset..offset + 15], "persist_retires");
    }

    #[test]
    fn invalid_type_points_at_the_key() {
        let content = "[checkin]\npersist_retries = \"twice\"\n";
        let err = crate::loader::load_config_from_str(content).unwrap_err();
        let errors = figment_to_config_errors(err, &[("friendsos.toml".into(), content.into())]);

        let Some(ConfigError::InvalidType { key, span, src, .. }) = errors.first() else {
            panic!("expected an invalid type error, got {errors:?}");
        };
        assert_eq!(key, "checkin.persist_retries");
        let span = span.as_ref().expect("span located");
        assert_eq!(&content[span.offset()..span.offset() + span.len()], "persist_retries");
        assert!(src.is_some());
    }

    #[test]
    fn finds_key_inside_array_table() {
        let content = "[[contacts]]\nid = \"a\"\nnmae = \"A\"\n";
        let path = vec!["contacts".to_string()];
        let offset = find_key_offset(content, &path, "nmae").unwrap();
        assert_eq!(&content[offset..offset + 4], "nmae");
    }
}
