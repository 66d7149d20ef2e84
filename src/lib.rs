//! apimodel-from-source - Normalized API models from Django REST Framework source.
//!
//! This library extracts a language-agnostic API model from a Django + DRF
//! project using static source analysis only: no file is imported or
//! executed, no database is touched. The result is a per-project model of
//! apps, serializers (with normalized field descriptors) and endpoints,
//! returned together with an ordered diagnostics list.
//!
//! # Architecture
//!
//! The library is organized into modules that form one pipeline:
//!
//! 1. [`scanner`] - Walks the project root and discovers Django app directories
//! 2. [`parser`] - Parses Python files into raw class/function declarations
//! 3. [`detector`] - Classifies declarations by framework base tokens
//! 4. [`resolver`] - Flattens serializer inheritance into ordered field sets
//! 5. [`normalizer`] - Maps field constructor calls to normalized descriptors
//! 6. [`extractor`] - Extracts view capabilities and URL declarations
//! 7. [`mapper`] - Correlates URLs with views into endpoints
//! 8. [`builder`] - Orchestrates everything into the final model
//! 9. [`serializer`] - Serializes the result to YAML or JSON
//!
//! Cross-cutting pieces: [`config`] carries the extraction policy
//! (app filters, recognized base tokens), [`enrich`] is the optional
//! description-enrichment seam, and [`error`] holds the top-level failure
//! taxonomy (only an invalid root or an app-less project fail a run;
//! everything else degrades to diagnostics).
//!
//! # Example Usage
//!
//! ```no_run
//! use apimodel_from_source::{
//!     builder::ModelBuilder,
//!     config::ProjectConfig,
//!     serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let builder = ModelBuilder::new(ProjectConfig::default());
//! let extraction = builder.build(Path::new("./my-django-project"), None).unwrap();
//!
//! for diagnostic in &extraction.diagnostics {
//!     eprintln!("{:?}: [{}] {}", diagnostic.severity, diagnostic.source, diagnostic.message);
//! }
//!
//! let yaml = serialize_yaml(&extraction).unwrap();
//! println!("{}", yaml);
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod detector;
pub mod enrich;
pub mod error;
pub mod extractor;
pub mod mapper;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod serializer;
