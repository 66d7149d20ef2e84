//! Project-level configuration threaded through every pipeline component.
//!
//! No component reads ambient/global settings; each receives a
//! [`ProjectConfig`] reference, so the pipeline can run repeatedly with
//! different configurations in one process without cross-contamination.

use serde::{Deserialize, Serialize};

/// Configuration for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name used in the emitted model
    pub project_name: String,
    /// Project version used in the emitted model
    pub version: String,
    /// If set, only these apps are analyzed
    pub include_apps: Option<Vec<String>>,
    /// Apps to skip even when discovered
    pub exclude_apps: Vec<String>,
    /// Directory names never descended into or treated as apps
    pub exclude_dirs: Vec<String>,
    /// Base-class name tokens that mark a class as a serializer.
    /// Matching is a first-class, swappable policy (not hard-coded strings)
    /// because framework detection by base name is fragile under aliasing.
    pub serializer_bases: Vec<String>,
    /// Base-class name tokens that mark a class as a class-based view
    pub view_bases: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_name: "Django API".to_string(),
            version: "1.0.0".to_string(),
            include_apps: None,
            exclude_apps: Vec::new(),
            exclude_dirs: vec![
                "__pycache__".to_string(),
                "migrations".to_string(),
                "static".to_string(),
                "media".to_string(),
                "templates".to_string(),
                "venv".to_string(),
                ".venv".to_string(),
                "node_modules".to_string(),
            ],
            serializer_bases: vec![
                "Serializer".to_string(),
                "ModelSerializer".to_string(),
                "HyperlinkedModelSerializer".to_string(),
                "ListSerializer".to_string(),
            ],
            view_bases: vec![
                "APIView".to_string(),
                "GenericAPIView".to_string(),
                "CreateAPIView".to_string(),
                "ListAPIView".to_string(),
                "RetrieveAPIView".to_string(),
                "UpdateAPIView".to_string(),
                "DestroyAPIView".to_string(),
                "ListCreateAPIView".to_string(),
                "RetrieveUpdateAPIView".to_string(),
                "RetrieveDestroyAPIView".to_string(),
                "RetrieveUpdateDestroyAPIView".to_string(),
                "ViewSet".to_string(),
                "GenericViewSet".to_string(),
                "ModelViewSet".to_string(),
                "ReadOnlyModelViewSet".to_string(),
            ],
        }
    }
}

impl ProjectConfig {
    /// Whether an app discovered by the scanner should be analyzed.
    pub fn should_include_app(&self, app_name: &str) -> bool {
        if let Some(ref include) = self.include_apps {
            if !include.iter().any(|a| a == app_name) {
                return false;
            }
        }
        !self.exclude_apps.iter().any(|a| a == app_name)
    }

    /// Whether a directory name is excluded from scanning.
    pub fn is_excluded_dir(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.')
            || dir_name.starts_with('_')
            || self.exclude_dirs.iter().any(|d| d == dir_name)
    }

    /// Whether a base-class token (last path segment of the base expression)
    /// identifies a serializer base.
    pub fn is_serializer_base(&self, base: &str) -> bool {
        let last = base.rsplit('.').next().unwrap_or(base);
        self.serializer_bases.iter().any(|b| b == last)
    }

    /// Whether a base-class token identifies a class-based view or viewset.
    pub fn is_view_base(&self, base: &str) -> bool {
        let last = base.rsplit('.').next().unwrap_or(base);
        self.view_bases.iter().any(|b| b == last)
    }
}
