//! The normalized, language-agnostic API model.
//!
//! This is the sole contract between the extraction pipeline and downstream
//! emitters (Sphinx, TypeScript, SDK generators, ...). Emitters consume the
//! serialized form of [`ApiModel`] and never re-parse Django source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete extracted model for one Django project.
///
/// Built once per invocation and immutable afterwards. Apps are ordered by
/// directory name, serializers and endpoints within an app in source
/// declaration order, so repeated runs on unchanged input serialize
/// byte-identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiModel {
    /// Project name used for documentation headers
    pub project: String,
    /// Project version
    pub version: String,
    /// All discovered Django apps
    pub apps: Vec<App>,
}

/// One Django application: a name, its directory, and the serializers and
/// endpoints declared inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    /// App name (directory name)
    pub name: String,
    /// App root directory, relative to the project root where possible
    pub path: String,
    /// Serializers declared in this app, in declaration order
    pub serializers: Vec<Serializer>,
    /// Endpoints routed through this app, in declaration order
    pub endpoints: Vec<Endpoint>,
}

/// A declared data-shape definition with its inheritance-flattened field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serializer {
    /// Class name, unique within the app
    pub name: String,
    /// File the class is declared in
    pub file: String,
    /// Class docstring, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Base class names as written in source, in order
    pub bases: Vec<String>,
    /// Flattened field list; names are unique, base-class positions preserved
    pub fields: Vec<Field>,
    /// Advisory variant classification inferred from the class-name suffix.
    /// A naming convention only, never a framework guarantee.
    pub variant: SerializerVariant,
    /// Names of custom validation-hook methods (`validate`, `validate_<field>`)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub validator_hooks: Vec<String>,
}

/// Best-effort serializer variant, inferred from the class-name suffix
/// (`...ListSerializer`, `...CreateSerializer`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerVariant {
    /// Compact representation for list endpoints
    List,
    /// Full representation for detail endpoints
    Detail,
    /// Write-side representation (create/update)
    Write,
    /// No recognizable suffix
    Default,
}

impl SerializerVariant {
    /// Infer the advisory variant from a class name suffix.
    pub fn from_class_name(name: &str) -> Self {
        let stem = name.strip_suffix("Serializer").unwrap_or(name);
        if stem.ends_with("List") {
            SerializerVariant::List
        } else if stem.ends_with("Detail") {
            SerializerVariant::Detail
        } else if stem.ends_with("Create") || stem.ends_with("Update") || stem.ends_with("Write") {
            SerializerVariant::Write
        } else {
            SerializerVariant::Default
        }
    }
}

/// One named, typed attribute of a serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Raw framework type token as written in source (e.g. "CharField")
    pub raw_type: String,
    /// Normalized language-agnostic kind
    pub kind: FieldKind,
    /// Whether the field must be supplied on input
    pub required: bool,
    /// Read-only fields never appear in request bodies
    pub read_only: bool,
    /// Write-only fields never appear in response bodies
    pub write_only: bool,
    /// Whether null is an accepted value
    pub nullable: bool,
    /// Literal default value, when one was declared literally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Declared (value, label) choice pairs, captured only when literal
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub choices: Vec<Choice>,
    /// Help text from the field declaration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Maximum length constraint, when literal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Name of the referenced serializer or model. Set only for
    /// `kind == Reference`, or for `kind == Array` when the element type is
    /// itself a reference. A name-based pointer, resolved lazily against the
    /// finished model, so cyclic serializer graphs stay representable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

/// One declared choice: a literal value and its human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: serde_json::Value,
    pub label: String,
}

/// The normalized primitive kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    DateTime,
    Object,
    Array,
    /// Points at another serializer or model by name (see [`Field::references`])
    Reference,
    /// Token absent from the lookup table; emitters render an any-equivalent
    Unknown,
}

/// One HTTP-routable operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method
    pub method: HttpMethod,
    /// URL path template with canonical `{name}` placeholders
    pub path: String,
    /// Human-readable description
    pub description: String,
    /// View class or function the endpoint routes to
    pub view: String,
    /// Referenced serializer name; always resolvable against the model or None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
    /// Grouping tags (the owning app name, at minimum)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// Free-form permission/authentication hints, not interpreted
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub permissions: Vec<String>,
}

/// HTTP methods the mapper emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parse a handler/method name (`"get"`, `"post"`, ...), case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    /// Uppercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A unit (file, class) was skipped entirely
    Error,
    /// A resolution gap was papered over with a degraded-but-valid fallback
    Warning,
    /// Advisory only (e.g. enrichment unavailable)
    Note,
}

/// One diagnostic record collected during extraction.
///
/// Diagnostics are returned alongside the model in collection order; they
/// never abort an otherwise-successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The app name or file path the diagnostic concerns
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            source: source.into(),
            message: message.into(),
        }
    }

    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            source: source.into(),
            message: message.into(),
        }
    }

    pub fn note(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            source: source.into(),
            message: message.into(),
        }
    }
}

/// The two-part result of a successful run: the best-effort model plus the
/// ordered diagnostics collected while building it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub model: ApiModel,
    pub diagnostics: Vec<Diagnostic>,
}
