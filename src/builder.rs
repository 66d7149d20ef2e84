//! Intermediate model builder.
//!
//! Orchestrates the full extraction pipeline:
//!
//! 1. Scan the project root for app directories.
//! 2. Parse each app's Python files, downgrading per-file failures to
//!    diagnostics.
//! 3. Resolve serializers, extract views and URLs, map endpoints.
//! 4. Validate cross-app serializer references and assemble the model.
//!
//! Only two conditions fail the whole run: an invalid project root and a
//! project with no app directories at all. Everything else degrades to a
//! diagnostic on a valid partial model.

use crate::config::ProjectConfig;
use crate::detector::FrameworkDetector;
use crate::enrich::{apply_enrichment, Enricher};
use crate::error::{Error, Result};
use crate::extractor::urls::UrlExtractor;
use crate::extractor::views::ViewExtractor;
use crate::mapper::EndpointMapper;
use crate::model::{ApiModel, App, Diagnostic, Extraction};
use crate::parser::{ParsedFile, PyParser};
use crate::resolver::SerializerResolver;
use crate::scanner::{AppDir, SourceScanner};
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Builds the intermediate model for one project.
pub struct ModelBuilder {
    config: ProjectConfig,
}

impl ModelBuilder {
    pub fn new(config: ProjectConfig) -> Self {
        Self { config }
    }

    /// Runs the full extraction over `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidProjectRoot` when `root` is not a directory
    /// and `Error::NoAppsDiscovered` when the scan finds no app at all.
    pub fn build(&self, root: &Path, enricher: Option<&dyn Enricher>) -> Result<Extraction> {
        let scanner = SourceScanner::new(self.config.clone());
        let scan = scanner.scan(root)?;

        if scan.apps.is_empty() {
            return Err(Error::NoAppsDiscovered(root.to_path_buf()));
        }

        let mut diagnostics = scan.warnings;
        let mut apps = Vec::with_capacity(scan.apps.len());
        for app_dir in &scan.apps {
            apps.push(self.build_app(root, app_dir, &mut diagnostics));
        }

        resolve_serializer_references(&mut apps, &mut diagnostics);

        let mut model = ApiModel {
            project: self.config.project_name.clone(),
            version: self.config.version.clone(),
            apps,
        };

        if let Some(enricher) = enricher {
            info!("Applying description enrichment");
            apply_enrichment(enricher, &mut model, &mut diagnostics);
        }

        info!(
            "Built model: {} app(s), {} diagnostic(s)",
            model.apps.len(),
            diagnostics.len()
        );
        Ok(Extraction { model, diagnostics })
    }

    /// Extracts one app: parse, resolve, extract, map.
    fn build_app(&self, root: &Path, app_dir: &AppDir, diagnostics: &mut Vec<Diagnostic>) -> App {
        info!("Extracting app: {}", app_dir.name);

        let mut paths: Vec<PathBuf> = Vec::new();
        paths.extend(app_dir.serializer_files.iter().cloned());
        paths.extend(app_dir.view_files.iter().cloned());
        paths.extend(app_dir.url_files.iter().cloned());
        paths.extend(app_dir.other_files.iter().cloned());

        let mut parsed: Vec<ParsedFile> = Vec::new();
        for result in PyParser::parse_files(&paths) {
            match result {
                Ok(file) => parsed.push(file),
                Err(e) => {
                    diagnostics.push(Diagnostic::error(app_dir.name.clone(), e.to_string()));
                }
            }
        }

        let detector = FrameworkDetector::new(&self.config);

        if !parsed.is_empty() && !parsed.iter().any(|file| detector.uses_framework(file)) {
            diagnostics.push(Diagnostic::note(
                app_dir.name.clone(),
                "no REST framework or Django URL imports found; app likely has no API surface",
            ));
        }

        let resolved = SerializerResolver::new(&detector).resolve(&parsed);
        diagnostics.extend(resolved.diagnostics);

        let views = ViewExtractor::new(&detector).extract(&parsed);
        diagnostics.extend(views.diagnostics);

        let urls = UrlExtractor::extract(&parsed);
        diagnostics.extend(urls.diagnostics);

        let mapped = EndpointMapper::map(&app_dir.name, &urls.urls, &views.views);
        diagnostics.extend(mapped.diagnostics);

        debug!(
            "App {}: {} serializer(s), {} endpoint(s)",
            app_dir.name,
            resolved.serializers.len(),
            mapped.endpoints.len()
        );

        App {
            name: app_dir.name.clone(),
            path: app_path(root, &app_dir.path),
            serializers: resolved.serializers,
            endpoints: mapped.endpoints,
        }
    }
}

/// Clears endpoint serializer references that resolve nowhere in the
/// project, so a reference is either valid (cross-app allowed) or absent.
fn resolve_serializer_references(apps: &mut [App], diagnostics: &mut Vec<Diagnostic>) {
    let known: HashSet<String> = apps
        .iter()
        .flat_map(|app| app.serializers.iter().map(|s| s.name.clone()))
        .collect();

    for app in apps.iter_mut() {
        let app_name = app.name.clone();
        for endpoint in &mut app.endpoints {
            let Some(reference) = &endpoint.serializer else {
                continue;
            };
            if !known.contains(reference) {
                diagnostics.push(Diagnostic::warning(
                    app_name.clone(),
                    format!(
                        "Serializer '{}' referenced by {} {} is not declared anywhere; reference cleared",
                        reference, endpoint.method, endpoint.path
                    ),
                ));
                endpoint.serializer = None;
            }
        }
    }
}

/// App path relative to the project root where possible.
fn app_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn write_app(root: &Path, name: &str, files: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
        for (file, content) in files {
            fs::write(dir.join(file), content).unwrap();
        }
    }

    fn build(root: &Path) -> Result<Extraction> {
        ModelBuilder::new(ProjectConfig::default()).build(root, None)
    }

    #[test]
    fn test_no_apps_is_a_top_level_failure() {
        let temp = TempDir::new().unwrap();
        let result = build(temp.path());
        assert!(matches!(result, Err(Error::NoAppsDiscovered(_))));
    }

    #[test]
    fn test_invalid_root_is_a_top_level_failure() {
        let result = build(Path::new("/no/such/root"));
        assert!(matches!(result, Err(Error::InvalidProjectRoot(_))));
    }

    #[test]
    fn test_app_without_framework_imports_gets_a_note() {
        let temp = TempDir::new().unwrap();
        write_app(
            temp.path(),
            "internal",
            &[("models.py", "import os\n\nFLAG = True\n")],
        );

        let extraction = build(temp.path()).unwrap();
        assert!(extraction.model.apps[0].endpoints.is_empty());
        assert!(extraction
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Note
                && d.message.contains("no REST framework or Django URL imports")));
    }

    #[test]
    fn test_syntax_error_degrades_to_diagnostic() {
        let temp = TempDir::new().unwrap();
        write_app(
            temp.path(),
            "products",
            &[
                ("views.py", "def broken(:\n  pass"),
                (
                    "serializers.py",
                    r#"
from rest_framework import serializers

class ProductSerializer(serializers.Serializer):
    name = serializers.CharField()
"#,
                ),
            ],
        );

        let extraction = build(temp.path()).unwrap();
        assert_eq!(extraction.model.apps[0].serializers.len(), 1);
        assert!(extraction
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("views.py")));
    }

    #[test]
    fn test_dangling_serializer_reference_is_cleared() {
        let temp = TempDir::new().unwrap();
        write_app(
            temp.path(),
            "products",
            &[
                (
                    "views.py",
                    r#"
from rest_framework import generics

class ProductList(generics.ListAPIView):
    serializer_class = MissingSerializer
"#,
                ),
                (
                    "urls.py",
                    r#"
from django.urls import path
from .views import ProductList

urlpatterns = [
    path('products/', ProductList.as_view()),
]
"#,
                ),
            ],
        );

        let extraction = build(temp.path()).unwrap();
        let endpoint = &extraction.model.apps[0].endpoints[0];
        assert!(endpoint.serializer.is_none());
        assert!(extraction
            .diagnostics
            .iter()
            .any(|d| d.message.contains("MissingSerializer")));
    }

    #[test]
    fn test_cross_app_serializer_reference_survives() {
        let temp = TempDir::new().unwrap();
        write_app(
            temp.path(),
            "shared",
            &[(
                "serializers.py",
                r#"
from rest_framework import serializers

class SharedSerializer(serializers.Serializer):
    id = serializers.IntegerField()
"#,
            )],
        );
        write_app(
            temp.path(),
            "products",
            &[
                (
                    "views.py",
                    r#"
from rest_framework import generics
from shared.serializers import SharedSerializer

class ProductList(generics.ListAPIView):
    serializer_class = SharedSerializer
"#,
                ),
                (
                    "urls.py",
                    r#"
from django.urls import path
from .views import ProductList

urlpatterns = [
    path('products/', ProductList.as_view()),
]
"#,
                ),
            ],
        );

        let extraction = build(temp.path()).unwrap();
        let products = extraction
            .model
            .apps
            .iter()
            .find(|a| a.name == "products")
            .unwrap();
        assert_eq!(
            products.endpoints[0].serializer.as_deref(),
            Some("SharedSerializer")
        );
    }

    #[test]
    fn test_apps_sorted_and_path_relative() {
        let temp = TempDir::new().unwrap();
        write_app(temp.path(), "zebra", &[("views.py", "")]);
        write_app(temp.path(), "alpha", &[("views.py", "")]);

        let extraction = build(temp.path()).unwrap();
        let names: Vec<_> = extraction.model.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zebra"]);
        assert_eq!(extraction.model.apps[0].path, "alpha");
    }
}
