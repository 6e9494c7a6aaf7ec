//! Node-name convention: `Key_Key_BaseName`, plus the identifier grammars
//! generated names must satisfy.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator between type keys and the trailing base name.
pub const SEPARATOR: char = '_';

static NAME_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new("^[A-Za-z][A-Za-z0-9_]*$"));
static FIELD_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$"));

fn pattern_matches(pattern: &LazyLock<Result<Regex, regex::Error>>, text: &str) -> bool {
    pattern
        .as_ref()
        .is_ok_and(|regex| regex.is_match(text))
}

/// Whether `name` is a valid namespace or class name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    pattern_matches(&NAME_PATTERN, name)
}

/// Whether `name` is a valid field name.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    pattern_matches(&FIELD_PATTERN, name)
}

/// Which suffix a generated field name carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNameRule {
    /// Append the type key as written in the node name.
    #[default]
    ByTypeKey,
    /// Append the resolved component type name.
    ByTypeName,
}

impl FieldNameRule {
    /// Maps the persisted boolean flag onto a rule.
    #[must_use]
    pub const fn from_by_type(by_type: bool) -> Self {
        if by_type {
            Self::ByTypeName
        } else {
            Self::ByTypeKey
        }
    }

    /// Inverse of [`FieldNameRule::from_by_type`].
    #[must_use]
    pub const fn is_by_type(self) -> bool {
        matches!(self, Self::ByTypeName)
    }
}

/// Naming inputs for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    /// Segment separator; fixed by convention.
    pub separator: char,
    /// Prefix prepended to every field name.
    pub field_prefix: String,
    /// Suffix rule.
    pub rule: FieldNameRule,
}

impl NamingConfig {
    /// Creates a config using the conventional separator.
    #[must_use]
    pub fn new(field_prefix: impl Into<String>, rule: FieldNameRule) -> Self {
        Self {
            separator: SEPARATOR,
            field_prefix: field_prefix.into(),
            rule,
        }
    }

    /// Builds the field name for a base name and its type suffix.
    ///
    /// The base name's first character is upper-cased when a prefix is
    /// configured and lower-cased otherwise.
    #[must_use]
    pub fn field_name(&self, base: &str, type_key: &str, type_name: &str) -> String {
        let cased = if self.field_prefix.is_empty() {
            lower_first(base)
        } else {
            upper_first(base)
        };
        let suffix = match self.rule {
            FieldNameRule::ByTypeKey => type_key,
            FieldNameRule::ByTypeName => type_name,
        };
        format!("{}{cased}{suffix}", self.field_prefix)
    }
}

/// A node name split into type keys and its base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName<'a> {
    name: &'a str,
    separator: char,
    base: &'a str,
}

impl<'a> ParsedName<'a> {
    /// Type-key segments, left to right.
    pub fn type_keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        let keys_len = self.name.len() - self.base.len() - self.separator.len_utf8();
        self.name
            .get(..keys_len)
            .unwrap_or_default()
            .split(self.separator)
    }

    /// Trailing human-readable segment.
    #[must_use]
    pub const fn base(&self) -> &'a str {
        self.base
    }
}

/// Splits `name` on `separator`; names with a single segment are ineligible.
#[must_use]
pub fn parse(name: &str, separator: char) -> Option<ParsedName<'_>> {
    let (_, base) = name.rsplit_once(separator)?;
    Some(ParsedName {
        name,
        separator,
        base,
    })
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
