//! View declaration extraction.
//!
//! Classifies each view class by its resolved base token and derives the
//! method set it serves: generic views carry a fixed method table, viewsets
//! expand to standard CRUD actions plus `@action`-decorated custom ones,
//! and plain `APIView` subclasses (or `@api_view` functions) expose exactly
//! the handlers they define.

use crate::detector::FrameworkDetector;
use crate::extractor::{ViewDecl, ViewOps, ViewSetAction};
use crate::model::{Diagnostic, HttpMethod};
use crate::parser::{ClassDecl, FunctionDecl, ParsedFile, PyExpr};
use log::debug;

/// Standard viewset actions in expansion order.
const STANDARD_ACTIONS: &[(&str, HttpMethod, bool)] = &[
    ("list", HttpMethod::Get, false),
    ("create", HttpMethod::Post, false),
    ("retrieve", HttpMethod::Get, true),
    ("update", HttpMethod::Put, true),
    ("partial_update", HttpMethod::Patch, true),
    ("destroy", HttpMethod::Delete, true),
];

/// Read-only viewsets expose only these standard actions.
const READ_ONLY_ACTIONS: &[&str] = &["list", "retrieve"];

/// Extracts view declarations from an app's parsed files.
pub struct ViewExtractor<'a> {
    detector: &'a FrameworkDetector<'a>,
}

#[derive(Debug, Default)]
pub struct ExtractedViews {
    pub views: Vec<ViewDecl>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ViewExtractor<'a> {
    pub fn new(detector: &'a FrameworkDetector<'a>) -> Self {
        Self { detector }
    }

    pub fn extract(&self, files: &[ParsedFile]) -> ExtractedViews {
        let mut result = ExtractedViews::default();

        for file in files {
            for class in &file.classes {
                if !self.detector.is_view_class(file, class) {
                    continue;
                }
                debug!("Extracting view class: {}", class.name);
                let view = self.extract_class(class, file);
                if view.serializer.is_none() && has_dynamic_serializer(class) {
                    result.diagnostics.push(Diagnostic::note(
                        file.path.display().to_string(),
                        format!(
                            "serializer_class on {} is not a plain name; left unresolved",
                            class.name
                        ),
                    ));
                }
                if matches!(view.ops, ViewOps::Handlers(_))
                    && !class
                        .methods
                        .iter()
                        .any(|m| HttpMethod::from_name(&m.name).is_some())
                {
                    result.diagnostics.push(Diagnostic::note(
                        file.path.display().to_string(),
                        format!("{} declares no handler methods; assumed GET", class.name),
                    ));
                }
                result.views.push(view);
            }
            for function in &file.functions {
                if let Some(view) = extract_api_view_function(function, file) {
                    debug!("Extracting view function: {}", function.name);
                    result.views.push(view);
                }
            }
        }

        result
    }

    fn extract_class(&self, class: &ClassDecl, file: &ParsedFile) -> ViewDecl {
        let base_token = class
            .bases
            .iter()
            .map(|b| {
                let resolved = self.detector.resolve_name(file, b);
                resolved
                    .rsplit('.')
                    .next()
                    .unwrap_or(&resolved)
                    .to_string()
            })
            .find(|token| classify_base(token).is_some())
            .unwrap_or_default();

        let style = classify_base(&base_token).unwrap_or(ViewStyle::Plain);
        let ops = match style {
            ViewStyle::Plain => ViewOps::Handlers(handler_methods(class)),
            ViewStyle::Generic(methods) => ViewOps::Generic(methods),
            ViewStyle::ViewSet { read_only, plain } => {
                ViewOps::ViewSet(viewset_actions(class, read_only, plain))
            }
        };

        ViewDecl {
            name: class.name.clone(),
            file: file.path.clone(),
            docstring: class.docstring.clone(),
            serializer: class_attr_name(class, "serializer_class"),
            model: queryset_model(class),
            permissions: permission_names(class),
            ops,
        }
    }
}

enum ViewStyle {
    Plain,
    Generic(Vec<HttpMethod>),
    ViewSet { read_only: bool, plain: bool },
}

fn classify_base(token: &str) -> Option<ViewStyle> {
    use HttpMethod::*;
    let style = match token {
        "APIView" | "GenericAPIView" | "View" => ViewStyle::Plain,
        "ListAPIView" => ViewStyle::Generic(vec![Get]),
        "CreateAPIView" => ViewStyle::Generic(vec![Post]),
        "ListCreateAPIView" => ViewStyle::Generic(vec![Get, Post]),
        "RetrieveAPIView" => ViewStyle::Generic(vec![Get]),
        "UpdateAPIView" => ViewStyle::Generic(vec![Put, Patch]),
        "DestroyAPIView" => ViewStyle::Generic(vec![Delete]),
        "RetrieveUpdateAPIView" => ViewStyle::Generic(vec![Get, Put, Patch]),
        "RetrieveDestroyAPIView" => ViewStyle::Generic(vec![Get, Delete]),
        "RetrieveUpdateDestroyAPIView" => ViewStyle::Generic(vec![Get, Put, Patch, Delete]),
        "ModelViewSet" => ViewStyle::ViewSet {
            read_only: false,
            plain: false,
        },
        "ReadOnlyModelViewSet" => ViewStyle::ViewSet {
            read_only: true,
            plain: false,
        },
        "ViewSet" | "GenericViewSet" => ViewStyle::ViewSet {
            read_only: false,
            plain: true,
        },
        _ => return None,
    };
    Some(style)
}

/// Handler methods explicitly defined on the class, falling back to GET
/// when none are declared.
fn handler_methods(class: &ClassDecl) -> Vec<HttpMethod> {
    let methods: Vec<HttpMethod> = class
        .methods
        .iter()
        .filter_map(|m| HttpMethod::from_name(&m.name))
        .collect();
    if methods.is_empty() {
        vec![HttpMethod::Get]
    } else {
        methods
    }
}

/// Standard actions served by the viewset, then custom `@action` methods
/// in declaration order.
fn viewset_actions(class: &ClassDecl, read_only: bool, plain: bool) -> Vec<ViewSetAction> {
    let mut actions = Vec::new();

    for (name, method, detail) in STANDARD_ACTIONS {
        if read_only && !READ_ONLY_ACTIONS.contains(name) {
            continue;
        }
        // A bare ViewSet serves only the standard actions it defines
        if plain && !class.methods.iter().any(|m| m.name == *name) {
            continue;
        }
        actions.push(ViewSetAction {
            name: name.to_string(),
            methods: vec![*method],
            detail: *detail,
            url_path: None,
            docstring: None,
        });
    }

    for method in &class.methods {
        if let Some(action) = custom_action(method) {
            actions.push(action);
        }
    }

    actions
}

/// Interprets an `@action(...)` decorator on a viewset method.
fn custom_action(method: &FunctionDecl) -> Option<ViewSetAction> {
    let call = method.decorators.iter().find_map(|d| match d {
        PyExpr::Call(call) if call.callee_token() == "action" => Some(call),
        _ => None,
    })?;

    let detail = call.kwarg("detail").and_then(PyExpr::as_bool).unwrap_or(false);

    let mut methods: Vec<HttpMethod> = Vec::new();
    if let Some(PyExpr::List(items) | PyExpr::Tuple(items)) = call.kwarg("methods") {
        for item in items {
            if let Some(m) = item.as_str().and_then(HttpMethod::from_name) {
                methods.push(m);
            }
        }
    }
    if methods.is_empty() {
        methods.push(HttpMethod::Get);
    }

    let url_path = call
        .kwarg("url_path")
        .and_then(PyExpr::as_str)
        .unwrap_or(&method.name)
        .to_string();

    Some(ViewSetAction {
        name: method.name.clone(),
        methods,
        detail,
        url_path: Some(url_path),
        docstring: method.docstring.clone(),
    })
}

/// A function decorated with `@api_view([...])` is a plain view.
fn extract_api_view_function(function: &FunctionDecl, file: &ParsedFile) -> Option<ViewDecl> {
    let call = function.decorators.iter().find_map(|d| match d {
        PyExpr::Call(call) if call.callee_token() == "api_view" => Some(call),
        _ => None,
    })?;

    let mut methods: Vec<HttpMethod> = Vec::new();
    if let Some(PyExpr::List(items) | PyExpr::Tuple(items)) = call.args.first() {
        for item in items {
            if let Some(m) = item.as_str().and_then(HttpMethod::from_name) {
                methods.push(m);
            }
        }
    }
    if methods.is_empty() {
        methods.push(HttpMethod::Get);
    }

    Some(ViewDecl {
        name: function.name.clone(),
        file: file.path.clone(),
        docstring: function.docstring.clone(),
        serializer: None,
        model: None,
        permissions: Vec::new(),
        ops: ViewOps::Handlers(methods),
    })
}

/// True when `serializer_class` is assigned something other than a name
/// (a call, a conditional expression, ...).
fn has_dynamic_serializer(class: &ClassDecl) -> bool {
    class
        .assigns
        .iter()
        .any(|a| a.target == "serializer_class" && !matches!(a.value, PyExpr::Name(_)))
}

fn class_attr_name(class: &ClassDecl, attr: &str) -> Option<String> {
    class.assigns.iter().find(|a| a.target == attr).and_then(|a| {
        match &a.value {
            PyExpr::Name(name) => Some(name.clone()),
            _ => None,
        }
    })
}

/// Model name from `queryset = Model.objects.all()` or similar.
fn queryset_model(class: &ClassDecl) -> Option<String> {
    let assign = class.assigns.iter().find(|a| a.target == "queryset")?;
    let dotted = match &assign.value {
        PyExpr::Call(call) => call.callee.as_str(),
        PyExpr::Name(name) => name.as_str(),
        _ => return None,
    };
    let head = dotted.split('.').next()?;
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// Permission and authentication class names, kept as free-form hints.
fn permission_names(class: &ClassDecl) -> Vec<String> {
    let mut names = Vec::new();
    for attr in ["permission_classes", "authentication_classes"] {
        let Some(assign) = class.assigns.iter().find(|a| a.target == attr) else {
            continue;
        };
        let (PyExpr::List(items) | PyExpr::Tuple(items)) = &assign.value else {
            continue;
        };
        names.extend(
            items
                .iter()
                .filter_map(|item| match item {
                    PyExpr::Name(name) => Some(name.as_str()),
                    PyExpr::Call(call) => Some(call.callee.as_str()),
                    _ => None,
                })
                .map(|name| name.rsplit('.').next().unwrap_or(name).to_string()),
        );
    }
    names
}
