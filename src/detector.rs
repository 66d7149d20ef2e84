//! Framework usage detection.
//!
//! Decides whether a parsed file participates in a Django REST Framework
//! API surface, and classifies class declarations as serializers or views.
//! Classification is token-based on the resolved base-class name, so both
//! `serializers.ModelSerializer` and an aliased `drf.ModelSerializer`
//! are recognized.

use crate::config::ProjectConfig;
use crate::parser::{ClassDecl, ParsedFile};
use log::debug;

/// Import prefixes that mark a file as REST-framework-aware.
const FRAMEWORK_PREFIXES: &[&str] = &["rest_framework", "django.urls", "django.conf.urls"];

/// Classifies parsed files and class declarations.
pub struct FrameworkDetector<'a> {
    config: &'a ProjectConfig,
}

impl<'a> FrameworkDetector<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// True when the file imports REST framework or Django URL machinery.
    pub fn uses_framework(&self, file: &ParsedFile) -> bool {
        let detected = file.imports.values().any(|origin| {
            FRAMEWORK_PREFIXES
                .iter()
                .any(|prefix| origin == prefix || origin.starts_with(&format!("{}.", prefix)))
        });
        if detected {
            debug!("Framework imports found in {}", file.path.display());
        }
        detected
    }

    /// Resolves a name through the file's import aliases.
    ///
    /// `drf.ModelSerializer` with `import rest_framework.serializers as drf`
    /// resolves to `rest_framework.serializers.ModelSerializer`. Names with
    /// no matching alias are returned unchanged.
    pub fn resolve_name(&self, file: &ParsedFile, name: &str) -> String {
        if let Some(origin) = file.imports.get(name) {
            return origin.clone();
        }
        if let Some((head, rest)) = name.split_once('.') {
            if let Some(origin) = file.imports.get(head) {
                return format!("{}.{}", origin, rest);
            }
        }
        name.to_string()
    }

    /// True when any base of the class is a known serializer base.
    pub fn is_serializer_class(&self, file: &ParsedFile, class: &ClassDecl) -> bool {
        class
            .bases
            .iter()
            .any(|base| self.config.is_serializer_base(&self.resolve_name(file, base)))
    }

    /// True when any base of the class is a known view or viewset base.
    pub fn is_view_class(&self, file: &ParsedFile, class: &ClassDecl) -> bool {
        class
            .bases
            .iter()
            .any(|base| self.config.is_view_base(&self.resolve_name(file, base)))
    }
}
