//! Optional description enrichment.
//!
//! An [`Enricher`] rewrites a statically derived description into a better
//! one (typically via an external language-model service living outside
//! this crate). Enrichment is strictly best-effort: any failure leaves the
//! static text in place and records a low-severity diagnostic.

use crate::model::{ApiModel, Diagnostic};
use anyhow::Result;
use log::debug;

/// A collaborator that improves a description given its static context.
pub trait Enricher {
    /// Returns enhanced text for `context`, or an error when the
    /// collaborator is unavailable.
    fn enrich(&self, context: &str) -> Result<String>;
}

/// The do-nothing enricher: every description keeps its static text.
pub struct NoEnrichment;

impl Enricher for NoEnrichment {
    fn enrich(&self, context: &str) -> Result<String> {
        Ok(context.to_string())
    }
}

/// Applies an enricher to every serializer docstring and endpoint
/// description in the model. Failures never propagate; each one becomes a
/// note diagnostic and the static text is kept.
pub fn apply_enrichment(
    enricher: &dyn Enricher,
    model: &mut ApiModel,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for app in &mut model.apps {
        for serializer in &mut app.serializers {
            let Some(docstring) = &serializer.docstring else {
                continue;
            };
            match enricher.enrich(docstring) {
                Ok(text) if !text.trim().is_empty() => {
                    serializer.docstring = Some(text);
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Enrichment failed for serializer {}: {}", serializer.name, e);
                    diagnostics.push(Diagnostic::note(
                        app.name.clone(),
                        format!("No enrichment for serializer '{}': {}", serializer.name, e),
                    ));
                }
            }
        }

        for endpoint in &mut app.endpoints {
            match enricher.enrich(&endpoint.description) {
                Ok(text) if !text.trim().is_empty() => {
                    endpoint.description = text;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(
                        "Enrichment failed for {} {}: {}",
                        endpoint.method, endpoint.path, e
                    );
                    diagnostics.push(Diagnostic::note(
                        app.name.clone(),
                        format!(
                            "No enrichment for endpoint {} {}: {}",
                            endpoint.method, endpoint.path, e
                        ),
                    ));
                }
            }
        }
    }
}
