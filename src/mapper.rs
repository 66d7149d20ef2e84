//! View/URL mapper.
//!
//! Correlates the URL declarations of one app with its view declarations
//! and produces endpoints. Router registrations expand into one endpoint
//! per viewset action; plain patterns expand into one endpoint per handler
//! method. A pattern whose view cannot be found still yields a single GET
//! endpoint plus a diagnostic, so one dangling reference never drops the
//! route from the model.

use crate::extractor::{UrlDecl, ViewDecl, ViewOps, ViewSetAction};
use crate::model::{Diagnostic, Endpoint, HttpMethod};
use log::debug;

pub struct EndpointMapper;

#[derive(Debug, Default)]
pub struct MappedEndpoints {
    /// In URL declaration order
    pub endpoints: Vec<Endpoint>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EndpointMapper {
    pub fn map(app_name: &str, urls: &[UrlDecl], views: &[ViewDecl]) -> MappedEndpoints {
        let mut result = MappedEndpoints::default();

        for url in urls {
            match url {
                UrlDecl::Pattern { path, view, name } => {
                    map_pattern(app_name, path, view, name.as_deref(), views, &mut result);
                }
                UrlDecl::Router { prefix, view, .. } => {
                    map_router(app_name, prefix, view, views, &mut result);
                }
            }
        }

        debug!("Mapped {} endpoint(s) for app {}", result.endpoints.len(), app_name);
        result
    }
}

fn map_pattern(
    app_name: &str,
    path: &str,
    view_name: &str,
    route_name: Option<&str>,
    views: &[ViewDecl],
    result: &mut MappedEndpoints,
) {
    let Some(view) = views.iter().find(|v| v.name == view_name) else {
        result.diagnostics.push(Diagnostic::warning(
            app_name,
            format!(
                "View '{}' for pattern '{}' could not be resolved; emitted a single GET endpoint",
                view_name, path
            ),
        ));
        result.endpoints.push(Endpoint {
            method: HttpMethod::Get,
            path: path.to_string(),
            description: route_name
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("GET {}", path)),
            view: view_name.to_string(),
            serializer: None,
            tags: vec![app_name.to_string()],
            permissions: Vec::new(),
        });
        return;
    };

    let detail = path.contains('{');
    let resource = view.resource_name();

    match &view.ops {
        ViewOps::Handlers(methods) => {
            for method in methods {
                result.endpoints.push(endpoint_for(
                    app_name,
                    view,
                    *method,
                    path.to_string(),
                    view.docstring
                        .as_deref()
                        .and_then(first_line)
                        .unwrap_or_else(|| method_description(*method, detail, &resource)),
                ));
            }
        }
        ViewOps::Generic(methods) => {
            for method in methods {
                result.endpoints.push(endpoint_for(
                    app_name,
                    view,
                    *method,
                    path.to_string(),
                    method_description(*method, detail, &resource),
                ));
            }
        }
        // A viewset bound directly to a pattern serves the actions whose
        // detail-ness matches the pattern's shape
        ViewOps::ViewSet(actions) => {
            for action in actions.iter().filter(|a| a.detail == detail && a.url_path.is_none()) {
                for method in &action.methods {
                    result.endpoints.push(endpoint_for(
                        app_name,
                        view,
                        *method,
                        path.to_string(),
                        action_description(action, &resource),
                    ));
                }
            }
        }
    }
}

fn map_router(
    app_name: &str,
    prefix: &str,
    view_name: &str,
    views: &[ViewDecl],
    result: &mut MappedEndpoints,
) {
    let Some(view) = views.iter().find(|v| v.name == view_name) else {
        let path = format!("{}/", prefix);
        result.diagnostics.push(Diagnostic::warning(
            app_name,
            format!(
                "ViewSet '{}' registered at '{}' could not be resolved; emitted a single GET endpoint",
                view_name, path
            ),
        ));
        result.endpoints.push(Endpoint {
            method: HttpMethod::Get,
            path,
            description: format!("List {}", view_name),
            view: view_name.to_string(),
            serializer: None,
            tags: vec![app_name.to_string()],
            permissions: Vec::new(),
        });
        return;
    };

    let ViewOps::ViewSet(actions) = &view.ops else {
        result.diagnostics.push(Diagnostic::warning(
            app_name,
            format!(
                "'{}' registered on a router at '{}' is not a viewset; emitted a single GET endpoint",
                view_name, prefix
            ),
        ));
        result.endpoints.push(endpoint_for(
            app_name,
            view,
            HttpMethod::Get,
            format!("{}/", prefix),
            format!("List all {} instances", view.resource_name()),
        ));
        return;
    };

    let resource = view.resource_name();
    for action in actions {
        let path = action_path(prefix, action);
        for method in &action.methods {
            result.endpoints.push(endpoint_for(
                app_name,
                view,
                *method,
                path.clone(),
                action_description(action, &resource),
            ));
        }
    }
}

/// Route for one viewset action under a router prefix.
fn action_path(prefix: &str, action: &ViewSetAction) -> String {
    let base = if action.detail {
        format!("{}/{{id}}", prefix)
    } else {
        prefix.to_string()
    };
    match &action.url_path {
        Some(segment) => format!("{}/{}/", base, segment),
        None => format!("{}/", base),
    }
}

fn endpoint_for(
    app_name: &str,
    view: &ViewDecl,
    method: HttpMethod,
    path: String,
    description: String,
) -> Endpoint {
    Endpoint {
        method,
        path,
        description,
        view: view.name.clone(),
        serializer: view.serializer.clone(),
        tags: vec![app_name.to_string()],
        permissions: view.permissions.clone(),
    }
}

fn action_description(action: &ViewSetAction, resource: &str) -> String {
    if let Some(line) = action.docstring.as_deref().and_then(first_line) {
        return line;
    }
    match action.name.as_str() {
        "list" => format!("List all {} instances", resource),
        "create" => format!("Create a new {} instance", resource),
        "retrieve" => format!("Retrieve a {} instance", resource),
        "update" => format!("Update a {} instance", resource),
        "partial_update" => format!("Partially update a {} instance", resource),
        "destroy" => format!("Delete a {} instance", resource),
        name => format!("Perform the '{}' action on {}", name, resource),
    }
}

fn method_description(method: HttpMethod, detail: bool, resource: &str) -> String {
    match (method, detail) {
        (HttpMethod::Get, false) => format!("List all {} instances", resource),
        (HttpMethod::Get, true) => format!("Retrieve a {} instance", resource),
        (HttpMethod::Post, _) => format!("Create a new {} instance", resource),
        (HttpMethod::Put, _) => format!("Update a {} instance", resource),
        (HttpMethod::Patch, _) => format!("Partially update a {} instance", resource),
        (HttpMethod::Delete, _) => format!("Delete a {} instance", resource),
    }
}

fn first_line(text: &str) -> Option<String> {
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
