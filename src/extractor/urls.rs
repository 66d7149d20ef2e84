//! URL declaration extraction.
//!
//! Reads `urlpatterns` lists and router registrations out of a parsed urls
//! module. Path templates are normalized into one canonical placeholder
//! form: both `<int:id>` converter syntax and `(?P<id>...)` regex groups
//! become `{id}`, and every path gains a leading slash.

use crate::extractor::UrlDecl;
use crate::model::Diagnostic;
use crate::parser::{CallExpr, ParsedFile, PyExpr};
use log::debug;

/// Extracts URL declarations from an app's parsed url files.
pub struct UrlExtractor;

#[derive(Debug, Default)]
pub struct ExtractedUrls {
    /// In declaration order: urlpatterns entries first, then router
    /// registrations, per file
    pub urls: Vec<UrlDecl>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UrlExtractor {
    pub fn extract(files: &[ParsedFile]) -> ExtractedUrls {
        let mut result = ExtractedUrls::default();

        for file in files {
            for assign in &file.assigns {
                if assign.target != "urlpatterns" {
                    continue;
                }
                let (PyExpr::List(entries) | PyExpr::Tuple(entries)) = &assign.value else {
                    // `urlpatterns += router.urls` is already covered by the
                    // router's own register() calls
                    if !is_router_urls(&assign.value) {
                        result.diagnostics.push(Diagnostic::note(
                            file.path.display().to_string(),
                            "urlpatterns is not a literal list; entries skipped".to_string(),
                        ));
                    }
                    continue;
                };
                for entry in entries {
                    extract_pattern(entry, file, &mut result);
                }
            }

            for call in &file.calls {
                if call.callee_token() == "register" && call.callee.contains('.') {
                    extract_registration(call, file, &mut result);
                }
            }
        }

        debug!("Extracted {} URL declaration(s)", result.urls.len());
        result
    }
}

/// Interprets one urlpatterns entry: `path(...)`, `re_path(...)`, `url(...)`.
fn extract_pattern(entry: &PyExpr, file: &ParsedFile, result: &mut ExtractedUrls) {
    let PyExpr::Call(call) = entry else {
        return;
    };
    if !matches!(call.callee_token(), "path" | "re_path" | "url") {
        return;
    }

    let Some(raw_path) = call.args.first().and_then(PyExpr::as_str) else {
        result.diagnostics.push(Diagnostic::note(
            file.path.display().to_string(),
            format!("Skipped {} entry with non-literal path", call.callee_token()),
        ));
        return;
    };

    let Some(view) = view_reference(call.args.get(1)) else {
        // include() entries route to another urls module that is scanned
        // on its own; anything else is unrecognizable
        if !is_include(call.args.get(1)) {
            result.diagnostics.push(Diagnostic::note(
                file.path.display().to_string(),
                format!("Skipped URL pattern '{}' with unrecognized view reference", raw_path),
            ));
        }
        return;
    };

    result.urls.push(UrlDecl::Pattern {
        path: normalize_path(raw_path),
        view,
        name: call.kwarg("name").and_then(PyExpr::as_str).map(String::from),
    });
}

/// Interprets a `router.register(prefix, ViewSet, ...)` call.
fn extract_registration(call: &CallExpr, file: &ParsedFile, result: &mut ExtractedUrls) {
    let Some(prefix) = call.args.first().and_then(PyExpr::as_str) else {
        result.diagnostics.push(Diagnostic::note(
            file.path.display().to_string(),
            "Skipped router registration with non-literal prefix".to_string(),
        ));
        return;
    };
    let Some(view) = call.args.get(1).and_then(|arg| match arg {
        PyExpr::Name(name) => Some(last_segment(name)),
        _ => None,
    }) else {
        result.diagnostics.push(Diagnostic::note(
            file.path.display().to_string(),
            format!("Skipped router registration '{}' with unrecognized viewset", prefix),
        ));
        return;
    };

    let prefix = normalize_path(prefix).trim_end_matches('/').to_string();
    result.urls.push(UrlDecl::Router {
        prefix,
        view,
        basename: call
            .kwarg("basename")
            .and_then(PyExpr::as_str)
            .map(String::from),
    });
}

/// Resolves the view argument of a URL entry to a view name.
fn view_reference(arg: Option<&PyExpr>) -> Option<String> {
    match arg? {
        // ProductView.as_view() / views.ProductView.as_view()
        PyExpr::Call(call) => {
            let class_path = call.callee.strip_suffix(".as_view")?;
            Some(last_segment(class_path))
        }
        // A plain function view, possibly module-qualified
        PyExpr::Name(name) => Some(last_segment(name)),
        _ => None,
    }
}

fn is_include(arg: Option<&PyExpr>) -> bool {
    matches!(arg, Some(PyExpr::Call(call)) if call.callee_token() == "include")
}

/// `router.urls` and friends, appended to urlpatterns.
fn is_router_urls(value: &PyExpr) -> bool {
    matches!(value, PyExpr::Name(name) if name.ends_with(".urls"))
}

fn last_segment(dotted: &str) -> String {
    dotted.rsplit('.').next().unwrap_or(dotted).to_string()
}

/// Normalizes a raw URL pattern into the canonical template form.
///
/// `products/<int:id>/`, `^products/(?P<id>[0-9]+)/$` and
/// `products/<id>/` all become `/products/{id}/`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_start_matches('^')
        .trim_end_matches('$');

    let mut out = String::with_capacity(trimmed.len() + 1);
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // Converter syntax: <int:id>, <slug:title>, <pk>
            '<' => {
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == '>' {
                        break;
                    }
                    inner.push(c);
                }
                let name = inner.rsplit(':').next().unwrap_or(&inner);
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            // Regex named group: (?P<id>...)
            '(' => {
                let rest: String = chars.clone().collect();
                if let Some(group) = rest.strip_prefix("?P<") {
                    if let Some(end) = group.find('>') {
                        let name = &group[..end];
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                        // Skip past the group's closing parenthesis
                        let mut depth = 1;
                        for c in chars.by_ref() {
                            match c {
                                '(' => depth += 1,
                                ')' => {
                                    depth -= 1;
                                    if depth == 0 {
                                        break;
                                    }
                                }
                                _ => {}
                            }
                        }
                        continue;
                    }
                }
                out.push('(');
            }
            // Regex escapes outside groups: keep the escaped character
            '\\' => {
                if let Some(&next) = chars.peek() {
                    if next == '.' || next == '/' {
                        out.push(next);
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    if !out.starts_with('/') {
        out.insert(0, '/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PyParser;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn extract(code: &str) -> ExtractedUrls {
        let file = PyParser::parse_source(code, Path::new("urls.py")).unwrap();
        UrlExtractor::extract(&[file])
    }

    #[test]
    fn test_path_entries() {
        let result = extract(
            r#"
from django.urls import path
from . import views

urlpatterns = [
    path('products/', views.ProductListView.as_view(), name='product-list'),
    path('products/<int:id>/', views.ProductDetailView.as_view()),
]
"#,
        );
        assert_eq!(result.urls.len(), 2);
        let UrlDecl::Pattern { path, view, name } = &result.urls[0] else {
            panic!("Expected pattern");
        };
        assert_eq!(path, "/products/");
        assert_eq!(view, "ProductListView");
        assert_eq!(name.as_deref(), Some("product-list"));

        let UrlDecl::Pattern { path, view, .. } = &result.urls[1] else {
            panic!("Expected pattern");
        };
        assert_eq!(path, "/products/{id}/");
        assert_eq!(view, "ProductDetailView");
    }

    #[test]
    fn test_augmented_urlpatterns_entries() {
        let result = extract(
            r#"
from django.urls import path
from . import views

urlpatterns = [
    path('products/', views.ProductListView.as_view()),
]
urlpatterns += [
    path('ping/', views.ping),
]
urlpatterns += router.urls
urlpatterns += other_patterns
"#,
        );
        assert_eq!(result.urls.len(), 2);
        let UrlDecl::Pattern { path, .. } = &result.urls[1] else {
            panic!("Expected pattern");
        };
        assert_eq!(path, "/ping/");

        // router.urls is silent; the opaque extension gets a note
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0]
            .message
            .contains("not a literal list"));
    }

    #[test]
    fn test_function_view_reference() {
        let result = extract(
            r#"
from django.urls import path
from . import views

urlpatterns = [
    path('ping/', views.ping),
]
"#,
        );
        let UrlDecl::Pattern { view, .. } = &result.urls[0] else {
            panic!("Expected pattern");
        };
        assert_eq!(view, "ping");
    }

    #[test]
    fn test_router_registration() {
        let result = extract(
            r#"
from rest_framework.routers import DefaultRouter
from .views import ProductViewSet

router = DefaultRouter()
router.register(r'products', ProductViewSet, basename='product')
"#,
        );
        let UrlDecl::Router { prefix, view, basename } = &result.urls[0] else {
            panic!("Expected router registration");
        };
        assert_eq!(prefix, "/products");
        assert_eq!(view, "ProductViewSet");
        assert_eq!(basename.as_deref(), Some("product"));
    }

    #[test]
    fn test_include_entries_are_silently_skipped() {
        let result = extract(
            r#"
from django.urls import path, include

urlpatterns = [
    path('api/', include('products.urls')),
]
"#,
        );
        assert!(result.urls.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_non_literal_path_is_noted() {
        let result = extract(
            r#"
from django.urls import path

urlpatterns = [
    path(PREFIX + 'x/', SomeView.as_view()),
]
"#,
        );
        assert!(result.urls.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_placeholder_syntaxes_normalize_identically() {
        assert_eq!(normalize_path("products/<int:id>/"), "/products/{id}/");
        assert_eq!(
            normalize_path(r"^products/(?P<id>[0-9]+)/$"),
            "/products/{id}/"
        );
        assert_eq!(normalize_path("products/<id>/"), "/products/{id}/");
    }

    #[test]
    fn test_normalize_converter_types() {
        assert_eq!(normalize_path("u/<uuid:token>/"), "/u/{token}/");
        assert_eq!(normalize_path("p/<slug:slug>/x/"), "/p/{slug}/x/");
        assert_eq!(normalize_path("a/<str:name>"), "/a/{name}");
    }

    #[test]
    fn test_normalize_regex_with_nested_groups() {
        assert_eq!(
            normalize_path(r"^files/(?P<path>(x|y)+)/raw/$"),
            "/files/{path}/raw/"
        );
    }

    #[test]
    fn test_normalize_keeps_leading_slash_paths() {
        assert_eq!(normalize_path("/already/rooted/"), "/already/rooted/");
        assert_eq!(normalize_path(""), "/");
    }
}
