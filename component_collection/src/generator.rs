//! Token-substitution code generation.
//!
//! Templates are plain text containing well-known tokens. Rendering replaces
//! each token literally; there are no conditionals, loops or nesting. The
//! creation timestamp is an input so that rendering is a pure function of
//! its arguments.

use std::fmt;

use chrono::{DateTime, Local};
use indexmap::IndexMap;

/// Token replaced with the creation timestamp.
pub const CREATE_TIME_TOKEN: &str = "__CREATE_TIME__";
/// Token replaced with the namespace.
pub const NAMESPACE_TOKEN: &str = "__NAME_SPACE__";
/// Token replaced with the class name.
pub const CLASS_NAME_TOKEN: &str = "__CLASS_NAME__";
/// Token replaced with the field declaration block.
pub const FIELD_TOKEN: &str = "__FIELD__";
/// Token replaced with the field accessor block.
pub const GET_FIELD_TOKEN: &str = "__GET_FIELD__";
/// Token replaced with the type-wide accessor functions.
pub const GET_COMPONENT_TOKEN: &str = "__GET_COMPONENT__";

/// Creation time stamped into generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current local time formatted as `yyyy-MM-dd HH:mm:ss.ff`.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Formats `time` as `yyyy-MM-dd HH:mm:ss.ff`.
    #[must_use]
    pub fn from_datetime(time: &DateTime<Local>) -> Self {
        let mut stamp = time.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        stamp.pop();
        Self(stamp)
    }

    /// Uses `value` verbatim.
    #[must_use]
    pub fn fixed(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The formatted stamp.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field name to component type name, in user-significant insertion order.
///
/// A field's accessor index is its position in this map.
pub type FieldTypeMap = IndexMap<String, String>;

/// Inputs for the Components artifact.
#[derive(Debug, Clone, Copy)]
pub struct ComponentsRequest<'a> {
    /// Template text.
    pub template: &'a str,
    /// Target namespace.
    pub namespace: &'a str,
    /// Target class name.
    pub class_name: &'a str,
    /// Fields to declare and bind.
    pub fields: &'a FieldTypeMap,
    /// Creation stamp.
    pub created_at: &'a Timestamp,
}

/// Inputs for the Behaviour artifact.
#[derive(Debug, Clone, Copy)]
pub struct BehaviourRequest<'a> {
    /// Template text.
    pub template: &'a str,
    /// Target namespace.
    pub namespace: &'a str,
    /// Target class name.
    pub class_name: &'a str,
    /// Creation stamp.
    pub created_at: &'a Timestamp,
}

/// Inputs for the type-wide Extension artifact.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionRequest<'a> {
    /// Template text.
    pub template: &'a str,
    /// Target namespace.
    pub namespace: &'a str,
    /// Distinct component type names to wrap.
    pub type_names: &'a [&'a str],
    /// Creation stamp.
    pub created_at: &'a Timestamp,
}

/// A strategy that renders templates into source text.
pub trait Generator {
    /// Renders field declarations and index-based accessors.
    fn render_components(&self, request: &ComponentsRequest<'_>) -> String;

    /// Renders the behaviour scaffold.
    fn render_behaviour(&self, request: &BehaviourRequest<'_>) -> String;

    /// Renders one accessor wrapper per component type.
    fn render_extension(&self, request: &ExtensionRequest<'_>) -> String;
}

/// The stock generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGenerator;

impl Generator for DefaultGenerator {
    fn render_components(&self, request: &ComponentsRequest<'_>) -> String {
        let (fields, accessors) = field_blocks(request.fields);
        substitute(
            request.template,
            &[
                (CREATE_TIME_TOKEN, request.created_at.as_str()),
                (NAMESPACE_TOKEN, request.namespace),
                (CLASS_NAME_TOKEN, request.class_name),
                (FIELD_TOKEN, &fields),
                (GET_FIELD_TOKEN, &accessors),
            ],
        )
    }

    fn render_behaviour(&self, request: &BehaviourRequest<'_>) -> String {
        substitute(
            request.template,
            &[
                (CREATE_TIME_TOKEN, request.created_at.as_str()),
                (NAMESPACE_TOKEN, request.namespace),
                (CLASS_NAME_TOKEN, request.class_name),
            ],
        )
    }

    fn render_extension(&self, request: &ExtensionRequest<'_>) -> String {
        let functions = extension_block(request.type_names);
        substitute(
            request.template,
            &[
                (CREATE_TIME_TOKEN, request.created_at.as_str()),
                (NAMESPACE_TOKEN, request.namespace),
                (GET_COMPONENT_TOKEN, &functions),
            ],
        )
    }
}

/// Replaces each token with its value, in the order given.
#[must_use]
pub fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_owned(), |text, &(token, value)| {
            text.replace(token, value)
        })
}

fn field_blocks(fields: &FieldTypeMap) -> (String, String) {
    let declarations = fields
        .iter()
        .map(|(name, type_name)| format!("        private {type_name} {name};"))
        .collect::<Vec<_>>()
        .join("\n");
    let accessors = fields
        .iter()
        .enumerate()
        .map(|(index, (name, type_name))| {
            format!("            {name} = collection.GetComponent<{type_name}>({index});")
        })
        .collect::<Vec<_>>()
        .join("\n");
    (
        declarations.trim_end().to_owned(),
        accessors.trim_end().to_owned(),
    )
}

fn extension_block(type_names: &[&str]) -> String {
    let functions = type_names
        .iter()
        .map(|type_name| {
            format!(
                "        public static {type_name} Get{type_name}(this ComponentCollection componentCollection, int index)\n        {{\n            return componentCollection.GetComponent<{type_name}>(index);\n        }}"
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    functions.trim_end().to_owned()
}
