//! Serializer resolver.
//!
//! Takes the parsed files of one app and produces its serializer set:
//!
//! 1. Index every class declaration by name, across all of the app's files.
//! 2. Keep the classes whose base chain terminates, transitively, in a
//!    recognized framework serializer base.
//! 3. Flatten each inheritance chain into one field list, base fields first,
//!    with subclass redeclarations overriding in place.
//! 4. Normalize each field constructor call through the type normalizer.
//!
//! Bases that cannot be found in the index (external packages, dynamically
//! computed expressions) make the class a leaf with no inherited fields
//! rather than an error.

use crate::detector::FrameworkDetector;
use crate::model::{Diagnostic, FieldKind, Serializer, SerializerVariant};
use crate::normalizer::normalize_field;
use crate::parser::{Assign, ClassDecl, ParsedFile, PyExpr};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Resolves serializer declarations within one app.
pub struct SerializerResolver<'a> {
    detector: &'a FrameworkDetector<'a>,
}

/// Serializers of one app plus the diagnostics produced along the way.
#[derive(Debug, Default)]
pub struct ResolvedSerializers {
    /// In declaration order (file order, then position within file)
    pub serializers: Vec<Serializer>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One class declaration paired with the file it came from.
struct IndexedClass<'f> {
    class: &'f ClassDecl,
    file: &'f ParsedFile,
}

impl<'a> SerializerResolver<'a> {
    pub fn new(detector: &'a FrameworkDetector<'a>) -> Self {
        Self { detector }
    }

    /// Resolves every serializer declared in `files`.
    pub fn resolve(&self, files: &[ParsedFile]) -> ResolvedSerializers {
        let mut result = ResolvedSerializers::default();

        // Cross-file index; the first declaration of a name wins
        let mut index: HashMap<&str, IndexedClass> = HashMap::new();
        for file in files {
            for class in &file.classes {
                index
                    .entry(class.name.as_str())
                    .or_insert(IndexedClass { class, file });
            }
        }

        for file in files {
            for class in &file.classes {
                if !self.is_serializer(class, file, &index, &mut HashSet::new()) {
                    continue;
                }
                debug!("Resolving serializer: {}", class.name);
                let serializer =
                    self.build_serializer(class, file, &index, &mut result.diagnostics);
                result.serializers.push(serializer);
            }
        }

        result
    }

    /// True when the class's base chain reaches a recognized serializer
    /// base, following locally indexed classes transitively.
    fn is_serializer<'f>(
        &self,
        class: &ClassDecl,
        file: &ParsedFile,
        index: &HashMap<&str, IndexedClass<'f>>,
        visiting: &mut HashSet<String>,
    ) -> bool {
        if !visiting.insert(class.name.clone()) {
            return false;
        }
        if self.detector.is_serializer_class(file, class) {
            return true;
        }
        class.bases.iter().any(|base| {
            index
                .get(base.as_str())
                .map(|parent| self.is_serializer(parent.class, parent.file, index, visiting))
                .unwrap_or(false)
        })
    }

    fn build_serializer<'f>(
        &self,
        class: &ClassDecl,
        file: &ParsedFile,
        index: &HashMap<&str, IndexedClass<'f>>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Serializer {
        let mut assigns: Vec<Assign> = Vec::new();
        let mut visiting = HashSet::new();
        self.flatten_assigns(class, file, index, &mut assigns, &mut visiting, diagnostics);

        let mut fields = Vec::new();
        for assign in &assigns {
            let PyExpr::Call(call) = &assign.value else {
                // Plain class attributes (Meta options, constants) are not fields
                continue;
            };
            if !looks_like_field(call.callee_token()) {
                continue;
            }
            let field = normalize_field(&assign.target, call);
            if field.kind == FieldKind::Unknown && call.callee_token() != "SerializerMethodField" {
                diagnostics.push(Diagnostic::note(
                    file.path.display().to_string(),
                    format!(
                        "Unrecognized field type '{}' on {}.{}; kind set to unknown",
                        call.callee, class.name, assign.target
                    ),
                ));
            }
            fields.push(field);
        }

        Serializer {
            name: class.name.clone(),
            file: file.path.display().to_string(),
            docstring: class.docstring.clone(),
            bases: class.bases.clone(),
            fields,
            variant: SerializerVariant::from_class_name(&class.name),
            validator_hooks: validator_hooks(class),
        }
    }

    /// Walks the inheritance chain most-base-first and merges field
    /// assignments. A redeclared name keeps the position of its first
    /// occurrence but takes the later declaration's value.
    fn flatten_assigns<'f>(
        &self,
        class: &ClassDecl,
        file: &ParsedFile,
        index: &HashMap<&str, IndexedClass<'f>>,
        merged: &mut Vec<Assign>,
        visiting: &mut HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !visiting.insert(class.name.clone()) {
            diagnostics.push(Diagnostic::warning(
                file.path.display().to_string(),
                format!(
                    "Inheritance cycle detected at class {}; chain truncated",
                    class.name
                ),
            ));
            return;
        }

        for base in &class.bases {
            match index.get(base.as_str()) {
                Some(parent) => {
                    self.flatten_assigns(
                        parent.class,
                        parent.file,
                        index,
                        merged,
                        visiting,
                        diagnostics,
                    );
                }
                None => {
                    let resolved = self.detector.resolve_name(file, base);
                    if !self.is_framework_base(&resolved) {
                        diagnostics.push(Diagnostic::note(
                            file.path.display().to_string(),
                            format!(
                                "Base class '{}' of {} not found locally; treated as leaf",
                                base, class.name
                            ),
                        ));
                    }
                }
            }
        }

        for assign in &class.assigns {
            match merged.iter_mut().find(|a| a.target == assign.target) {
                Some(existing) => existing.value = assign.value.clone(),
                None => merged.push(assign.clone()),
            }
        }
    }

    fn is_framework_base(&self, resolved: &str) -> bool {
        resolved.starts_with("rest_framework") || {
            let token = resolved.rsplit('.').next().unwrap_or(resolved);
            token.ends_with("Serializer")
        }
    }
}

/// Field declarations are calls whose callee looks like a field or
/// serializer class. `CharField(...)`, `ProductSerializer(...)`.
fn looks_like_field(token: &str) -> bool {
    token.ends_with("Field") || token.ends_with("Serializer")
}

/// Validation hook names declared on the class, in declaration order:
/// `validate` plus any `validate_<field>` method.
fn validator_hooks(class: &ClassDecl) -> Vec<String> {
    class
        .methods
        .iter()
        .filter(|m| m.name == "validate" || m.name.starts_with("validate_"))
        .map(|m| m.name.clone())
        .collect()
}
