//! Source locator for Django project trees.
//!
//! Walks a project root and discovers application directories. A directory
//! qualifies as an app when it contains `__init__.py` plus at least one of
//! the conventional Django module files (`models.py`, `views.py`,
//! `serializers.py`, `urls.py`, `admin.py`, `apps.py`, `viewsets.py`).
//! The project settings package and configured exclusions are skipped.

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::model::Diagnostic;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files whose presence marks a directory as a Django app.
const APP_MARKERS: &[&str] = &[
    "models.py",
    "views.py",
    "serializers.py",
    "urls.py",
    "admin.py",
    "apps.py",
    "viewsets.py",
];

/// Scans a project root for Django application directories.
pub struct SourceScanner {
    config: ProjectConfig,
}

/// Result of scanning a project root.
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered apps, sorted by name
    pub apps: Vec<AppDir>,
    /// Non-fatal findings produced during the walk
    pub warnings: Vec<Diagnostic>,
}

/// A discovered application directory with its Python files categorized.
#[derive(Debug, Clone)]
pub struct AppDir {
    /// App name (the directory name)
    pub name: String,
    /// Absolute or root-relative path of the app directory
    pub path: PathBuf,
    /// Files likely to declare serializers
    pub serializer_files: Vec<PathBuf>,
    /// Files likely to declare views or viewsets
    pub view_files: Vec<PathBuf>,
    /// Files likely to declare URL patterns
    pub url_files: Vec<PathBuf>,
    /// Every other Python file in the app
    pub other_files: Vec<PathBuf>,
}

impl SourceScanner {
    pub fn new(config: ProjectConfig) -> Self {
        Self { config }
    }

    /// Walks `root` and returns the qualifying app directories.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidProjectRoot` if `root` does not exist or is
    /// not a directory. An empty project is not an error here; the caller
    /// decides whether zero apps is fatal.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        if !root.is_dir() {
            return Err(Error::InvalidProjectRoot(root.to_path_buf()));
        }

        info!("Scanning project root: {}", root.display());

        let mut apps = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.is_skipped_dir(e.path())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    warnings.push(Diagnostic::warning(
                        "scanner",
                        format!("Skipped unreadable directory entry: {}", e),
                    ));
                    continue;
                }
            };

            if !entry.file_type().is_dir() || entry.depth() == 0 {
                continue;
            }

            let dir = entry.path();
            if !is_app_dir(dir) {
                continue;
            }

            let name = match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            if is_settings_package(dir) {
                debug!("Skipping settings package: {}", dir.display());
                continue;
            }

            if !self.config.should_include_app(&name) {
                debug!("App excluded by configuration: {}", name);
                continue;
            }

            debug!("Discovered app: {} at {}", name, dir.display());
            apps.push(self.collect_app(&name, dir));
        }

        // Nested qualifying directories would otherwise show up twice:
        // keep only apps that are not inside another discovered app.
        apps.sort_by(|a, b| a.path.cmp(&b.path));
        let mut kept: Vec<AppDir> = Vec::new();
        for app in apps {
            if kept.iter().any(|k| app.path.starts_with(&k.path)) {
                debug!("Skipping nested app directory: {}", app.path.display());
                continue;
            }
            kept.push(app);
        }
        let mut apps = kept;

        apps.sort_by(|a, b| a.name.cmp(&b.name));

        if apps.is_empty() {
            warn!("No Django apps found under {}", root.display());
            warnings.push(Diagnostic::warning(
                "scanner",
                format!("No Django app directories found under {}", root.display()),
            ));
        } else {
            info!("Found {} app(s)", apps.len());
        }

        Ok(ScanResult { apps, warnings })
    }

    /// Collects and categorizes the Python files of one app directory.
    fn collect_app(&self, name: &str, dir: &Path) -> AppDir {
        let mut app = AppDir {
            name: name.to_string(),
            path: dir.to_path_buf(),
            serializer_files: Vec::new(),
            view_files: Vec::new(),
            url_files: Vec::new(),
            other_files: Vec::new(),
        };

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !e.file_type().is_dir() || !self.is_skipped_dir(e.path()));

        for entry in walker.flatten() {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("py")
            {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            match stem {
                "serializers" => app.serializer_files.push(path.to_path_buf()),
                "views" | "viewsets" => app.view_files.push(path.to_path_buf()),
                "urls" => app.url_files.push(path.to_path_buf()),
                "__init__" => {}
                _ => app.other_files.push(path.to_path_buf()),
            }
        }

        app.serializer_files.sort();
        app.view_files.sort();
        app.url_files.sort();
        app.other_files.sort();
        app
    }

    fn is_skipped_dir(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.config.is_excluded_dir(name))
            .unwrap_or(false)
    }
}

/// True when the directory is a Python package with at least one
/// conventional Django module file.
fn is_app_dir(dir: &Path) -> bool {
    dir.join("__init__.py").is_file() && APP_MARKERS.iter().any(|m| dir.join(m).is_file())
}

/// True for the Django project package (the one holding `settings.py`).
fn is_settings_package(dir: &Path) -> bool {
    dir.join("settings.py").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_app(root: &Path, name: &str, files: &[&str]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
        for file in files {
            fs::write(dir.join(file), "# test").unwrap();
        }
    }

    fn scan(root: &Path) -> ScanResult {
        SourceScanner::new(ProjectConfig::default())
            .scan(root)
            .expect("scan failed")
    }

    #[test]
    fn test_discovers_apps_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        make_app(temp.path(), "zoo", &["views.py"]);
        make_app(temp.path(), "accounts", &["serializers.py", "views.py"]);
        make_app(temp.path(), "products", &["models.py"]);

        let result = scan(temp.path());
        let names: Vec<_> = result.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["accounts", "products", "zoo"]);
    }

    #[test]
    fn test_requires_init_and_marker_file() {
        let temp = TempDir::new().unwrap();

        // Marker file but no __init__.py
        let not_pkg = temp.path().join("scripts");
        fs::create_dir_all(&not_pkg).unwrap();
        fs::write(not_pkg.join("views.py"), "").unwrap();

        // Package but no marker file
        let bare_pkg = temp.path().join("helpers");
        fs::create_dir_all(&bare_pkg).unwrap();
        fs::write(bare_pkg.join("__init__.py"), "").unwrap();
        fs::write(bare_pkg.join("util.py"), "").unwrap();

        let result = scan(temp.path());
        assert!(result.apps.is_empty());
    }

    #[test]
    fn test_skips_settings_package() {
        let temp = TempDir::new().unwrap();
        make_app(temp.path(), "config", &["urls.py", "settings.py"]);
        make_app(temp.path(), "products", &["views.py"]);

        let result = scan(temp.path());
        let names: Vec<_> = result.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["products"]);
    }

    #[test]
    fn test_skips_excluded_directories() {
        let temp = TempDir::new().unwrap();
        make_app(temp.path(), "products", &["views.py"]);
        make_app(&temp.path().join("venv/lib"), "fakeapp", &["views.py"]);
        make_app(temp.path(), ".hidden", &["views.py"]);

        let result = scan(temp.path());
        let names: Vec<_> = result.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["products"]);
    }

    #[test]
    fn test_categorizes_python_files() {
        let temp = TempDir::new().unwrap();
        make_app(
            temp.path(),
            "products",
            &["views.py", "serializers.py", "urls.py", "models.py"],
        );

        let result = scan(temp.path());
        let app = &result.apps[0];
        assert_eq!(app.serializer_files.len(), 1);
        assert_eq!(app.view_files.len(), 1);
        assert_eq!(app.url_files.len(), 1);
        // models.py goes to other_files, __init__.py is dropped
        assert_eq!(app.other_files.len(), 1);
    }

    #[test]
    fn test_ignores_migrations() {
        let temp = TempDir::new().unwrap();
        make_app(temp.path(), "products", &["views.py"]);
        let migrations = temp.path().join("products/migrations");
        fs::create_dir_all(&migrations).unwrap();
        fs::write(migrations.join("__init__.py"), "").unwrap();
        fs::write(migrations.join("0001_initial.py"), "").unwrap();

        let result = scan(temp.path());
        assert!(result.apps[0].other_files.is_empty());
    }

    #[test]
    fn test_empty_project_is_warning_not_error() {
        let temp = TempDir::new().unwrap();
        let result = scan(temp.path());
        assert!(result.apps.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let result = SourceScanner::new(ProjectConfig::default())
            .scan(Path::new("/definitely/not/a/real/path"));
        assert!(matches!(result, Err(Error::InvalidProjectRoot(_))));
    }

    #[test]
    fn test_include_filter() {
        let temp = TempDir::new().unwrap();
        make_app(temp.path(), "products", &["views.py"]);
        make_app(temp.path(), "orders", &["views.py"]);

        let config = ProjectConfig {
            include_apps: Some(vec!["orders".to_string()]),
            ..ProjectConfig::default()
        };
        let result = SourceScanner::new(config).scan(temp.path()).unwrap();
        let names: Vec<_> = result.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["orders"]);
    }
}
