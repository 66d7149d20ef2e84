//! View and URL extraction.
//!
//! Two extractors work on the parser output of one app:
//!
//! - [`views::ViewExtractor`] turns class and function declarations into
//!   [`ViewDecl`] records describing what each view can serve.
//! - [`urls::UrlExtractor`] turns `urlpatterns` lists and router
//!   registrations into [`UrlDecl`] records with normalized path templates.
//!
//! The mapper correlates the two sets into endpoints.

pub mod urls;
pub mod views;

use crate::model::HttpMethod;
use std::path::PathBuf;

/// A view declaration and its routable capabilities.
#[derive(Debug, Clone)]
pub struct ViewDecl {
    /// Class or function name
    pub name: String,
    pub file: PathBuf,
    pub docstring: Option<String>,
    /// Serializer class referenced by `serializer_class = ...`
    pub serializer: Option<String>,
    /// Model name extracted from `queryset = Model.objects...`
    pub model: Option<String>,
    /// Permission class names from `permission_classes = [...]`
    pub permissions: Vec<String>,
    /// What the view can serve
    pub ops: ViewOps,
}

/// The routable surface of a view, by view style.
#[derive(Debug, Clone)]
pub enum ViewOps {
    /// Plain view (APIView subclass or `@api_view` function): one endpoint
    /// per handler method at the registered path
    Handlers(Vec<HttpMethod>),
    /// Generic view: a fixed method set determined by the base class
    Generic(Vec<HttpMethod>),
    /// ViewSet: actions expanded against a router prefix
    ViewSet(Vec<ViewSetAction>),
}

/// One viewset action, standard or custom.
#[derive(Debug, Clone)]
pub struct ViewSetAction {
    /// Action name (`list`, `create`, ... or a custom method name)
    pub name: String,
    pub methods: Vec<HttpMethod>,
    /// Detail actions route under the instance sub-path
    pub detail: bool,
    /// Custom URL segment from `@action(url_path=...)`, defaulting to the
    /// method name for custom actions and nothing for standard ones
    pub url_path: Option<String>,
    /// Docstring of the action method, custom actions only
    pub docstring: Option<String>,
}

impl ViewDecl {
    /// Resource name used in generated endpoint descriptions: the queryset
    /// model if known, else the serializer name without its suffixes, else
    /// the view name without common view suffixes.
    pub fn resource_name(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        if let Some(serializer) = &self.serializer {
            let trimmed = strip_variant_stem(serializer.trim_end_matches("Serializer"));
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        let mut name = self.name.as_str();
        for suffix in ["ViewSet", "APIView", "View"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                if !stripped.is_empty() {
                    name = stripped;
                    break;
                }
            }
        }
        strip_variant_stem(name).to_string()
    }
}

/// Drops a trailing naming-convention stem (`ProductList` -> `Product`) so
/// descriptions speak of the resource, not the variant.
fn strip_variant_stem(name: &str) -> &str {
    for stem in ["List", "Detail", "Create", "Update", "Write"] {
        if let Some(stripped) = name.strip_suffix(stem) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    name
}

/// One URL declaration found in a urls module.
#[derive(Debug, Clone)]
pub enum UrlDecl {
    /// A `path()` / `re_path()` / `url()` entry
    Pattern {
        /// Normalized path template, `{param}` placeholders, leading slash
        path: String,
        /// Referenced view name (`ProductListView`, `product_detail`)
        view: String,
        /// Route name from `name=...`, if declared
        name: Option<String>,
    },
    /// A `router.register(prefix, ViewSet)` call
    Router {
        /// Normalized prefix, leading slash, no trailing slash
        prefix: String,
        view: String,
        basename: Option<String>,
    },
}
