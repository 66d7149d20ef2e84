//! Type normalizer for serializer field declarations.
//!
//! Maps a parsed field constructor call (`serializers.CharField(...)`) to a
//! normalized `Field`. The mapping is a fixed table plus kwarg
//! interpretation; it reads only the call expression it is given, so the
//! same call always normalizes to the same field.

use crate::model::{Choice, Field, FieldKind};
use crate::parser::{CallExpr, PyExpr};

/// Normalizes one field declaration.
///
/// `name` is the attribute name the field was assigned to inside the
/// serializer class body.
pub fn normalize_field(name: &str, call: &CallExpr) -> Field {
    let token = call.callee_token();

    let mut field = Field {
        name: name.to_string(),
        raw_type: call.callee.clone(),
        kind: kind_for_token(token),
        required: true,
        read_only: false,
        write_only: false,
        nullable: false,
        default: None,
        choices: Vec::new(),
        help_text: None,
        max_length: None,
        references: None,
    };

    if is_nested_serializer(token) {
        field.kind = FieldKind::Reference;
        field.references = Some(token.to_string());
    }

    apply_kwargs(&mut field, call);

    // A method field has no writable representation
    if token == "SerializerMethodField" {
        field.read_only = true;
    }

    // many=True wraps the element type in an array; the reference (if any)
    // describes the element
    if call.kwarg("many").and_then(PyExpr::as_bool) == Some(true)
        || token == "ListField"
        || token == "ManyRelatedField"
    {
        field.kind = FieldKind::Array;
        if field.references.is_none() {
            if let Some(PyExpr::Call(child)) = call.kwarg("child") {
                let child_token = child.callee_token();
                if is_nested_serializer(child_token) {
                    field.references = Some(child_token.to_string());
                }
            }
        }
    }

    if !field.choices.is_empty() {
        field.kind = choice_kind(&field.choices);
    }

    // read_only and write_only are mutually exclusive; a field marked both
    // is treated as read-only
    if field.read_only {
        field.required = false;
        field.write_only = false;
    }

    field
}

/// Fixed mapping from a DRF field-class token to a normalized kind.
fn kind_for_token(token: &str) -> FieldKind {
    match token {
        "CharField" | "TextField" | "SlugField" | "EmailField" | "URLField" | "UUIDField"
        | "IPAddressField" | "RegexField" | "FilePathField" | "FileField" | "ImageField"
        | "ChoiceField" | "MultipleChoiceField" | "StringRelatedField" | "TimeField"
        | "DurationField" => FieldKind::String,
        "IntegerField" => FieldKind::Integer,
        "FloatField" | "DecimalField" => FieldKind::Number,
        "BooleanField" | "NullBooleanField" => FieldKind::Boolean,
        "DateField" => FieldKind::Date,
        "DateTimeField" => FieldKind::DateTime,
        "DictField" | "JSONField" | "HStoreField" => FieldKind::Object,
        "ListField" | "ManyRelatedField" => FieldKind::Array,
        "PrimaryKeyRelatedField" | "SlugRelatedField" | "HyperlinkedRelatedField"
        | "HyperlinkedIdentityField" => FieldKind::Reference,
        _ => FieldKind::Unknown,
    }
}

/// A field class named like another serializer is a nested declaration.
fn is_nested_serializer(token: &str) -> bool {
    token.ends_with("Serializer") && token != "Serializer" && token != "ModelSerializer"
}

fn apply_kwargs(field: &mut Field, call: &CallExpr) {
    if let Some(required) = call.kwarg("required").and_then(PyExpr::as_bool) {
        field.required = required;
    }
    if let Some(read_only) = call.kwarg("read_only").and_then(PyExpr::as_bool) {
        field.read_only = read_only;
    }
    if let Some(write_only) = call.kwarg("write_only").and_then(PyExpr::as_bool) {
        field.write_only = write_only;
    }
    if let Some(nullable) = call.kwarg("allow_null").and_then(PyExpr::as_bool) {
        field.nullable = nullable;
    }
    if let Some(default) = call.kwarg("default") {
        // A default also makes the field optional
        field.default = default.to_json();
        field.required = false;
    }
    if let Some(help_text) = call.kwarg("help_text").and_then(PyExpr::as_str) {
        field.help_text = Some(help_text.to_string());
    }
    if let Some(max_length) = call.kwarg("max_length").and_then(PyExpr::as_i64) {
        if max_length >= 0 {
            field.max_length = Some(max_length as u64);
        }
    }
    if let Some(choices) = call.kwarg("choices") {
        field.choices = literal_choices(choices);
    }
    if field.references.is_none() {
        if let Some(PyExpr::Name(queryset)) = call.kwarg("queryset") {
            field.references = queryset_model(queryset);
        } else if let Some(PyExpr::Call(qs_call)) = call.kwarg("queryset") {
            field.references = queryset_model(&qs_call.callee);
        }
    }
}

/// Extracts the model name from a queryset expression such as
/// `Product.objects.all` or `Product.objects.filter(...)`.
fn queryset_model(dotted: &str) -> Option<String> {
    let head = dotted.split('.').next()?;
    if head.is_empty() {
        return None;
    }
    Some(head.to_string())
}

/// Interprets a fully literal choices list. Named constants and computed
/// expressions yield no choices at all rather than a partial list.
fn literal_choices(expr: &PyExpr) -> Vec<Choice> {
    let items = match expr {
        PyExpr::List(items) | PyExpr::Tuple(items) => items,
        _ => return Vec::new(),
    };

    let mut choices = Vec::new();
    for item in items {
        let choice = match item {
            PyExpr::Tuple(pair) | PyExpr::List(pair) if pair.len() == 2 => {
                match (pair[0].to_json(), pair[1].as_str()) {
                    (Some(value), Some(label)) => Choice {
                        value,
                        label: label.to_string(),
                    },
                    _ => return Vec::new(),
                }
            }
            scalar => match scalar.to_json() {
                Some(value) => {
                    let label = match scalar.as_str() {
                        Some(s) => s.to_string(),
                        None => value.to_string(),
                    };
                    Choice { value, label }
                }
                None => return Vec::new(),
            },
        };
        choices.push(choice);
    }
    choices
}

/// A choice field is integral only when every value is an integer.
fn choice_kind(choices: &[Choice]) -> FieldKind {
    if choices.iter().all(|c| c.value.is_i64() || c.value.is_u64()) {
        FieldKind::Integer
    } else {
        FieldKind::String
    }
}
