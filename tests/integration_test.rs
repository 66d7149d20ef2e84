use apimodel_from_source::{
    builder::ModelBuilder,
    config::ProjectConfig,
    model::{Extraction, FieldKind, HttpMethod, SerializerVariant, Severity},
    serializer::{serialize_json, serialize_yaml},
};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn products_project() -> TempDir {
    create_test_project(vec![
        ("products/__init__.py", ""),
        ("products/models.py", include_str!("fixtures/products_models.py")),
        (
            "products/serializers.py",
            include_str!("fixtures/products_serializers.py"),
        ),
        ("products/views.py", include_str!("fixtures/products_views.py")),
        ("products/urls.py", include_str!("fixtures/products_urls.py")),
    ])
}

fn extract(temp_dir: &TempDir) -> Extraction {
    ModelBuilder::new(ProjectConfig::default())
        .build(temp_dir.path(), None)
        .expect("Extraction failed")
}

#[test]
fn test_products_end_to_end() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);

    assert_eq!(extraction.model.apps.len(), 1);
    let app = &extraction.model.apps[0];
    assert_eq!(app.name, "products");
    assert_eq!(app.path, "products");

    // Serializers in declaration order
    let names: Vec<_> = app.serializers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["ProductSerializer", "ProductListSerializer", "EmptySerializer"]
    );

    let product = &app.serializers[0];
    assert_eq!(
        product.docstring.as_deref(),
        Some("Serialized representation of a product.")
    );
    assert_eq!(product.validator_hooks, vec!["validate_price"]);

    let field_names: Vec<_> = product.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        field_names,
        vec!["name", "price", "status", "category", "created_at"]
    );

    let name = &product.fields[0];
    assert_eq!(name.kind, FieldKind::String);
    assert!(name.required);
    assert_eq!(name.max_length, Some(100));
    assert_eq!(name.help_text.as_deref(), Some("Product name"));

    let price = &product.fields[1];
    assert_eq!(price.kind, FieldKind::Number);
    assert!(price.required);

    let status = &product.fields[2];
    assert_eq!(status.choices.len(), 2);
    assert_eq!(status.kind, FieldKind::String);
    assert!(!status.required, "a declared default makes the field optional");
    assert_eq!(status.default, Some(serde_json::Value::String("a".into())));

    let category = &product.fields[3];
    assert_eq!(category.kind, FieldKind::Reference);
    assert_eq!(category.references.as_deref(), Some("Category"));
    assert!(category.nullable);

    let created = &product.fields[4];
    assert!(created.read_only);
    assert!(!created.required);
}

#[test]
fn test_subclass_override_keeps_base_position() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);
    let app = &extraction.model.apps[0];

    let listing = app
        .serializers
        .iter()
        .find(|s| s.name == "ProductListSerializer")
        .unwrap();
    assert_eq!(listing.variant, SerializerVariant::List);

    // Same order as the base; `name` carries the subclass's max_length
    let field_names: Vec<_> = listing.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        field_names,
        vec!["name", "price", "status", "category", "created_at"]
    );
    assert_eq!(listing.fields[0].max_length, Some(60));
}

#[test]
fn test_zero_field_serializer_is_kept() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);
    let app = &extraction.model.apps[0];

    let empty = app
        .serializers
        .iter()
        .find(|s| s.name == "EmptySerializer")
        .unwrap();
    assert!(empty.fields.is_empty());
}

#[test]
fn test_endpoints_from_patterns_and_router() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);
    let app = &extraction.model.apps[0];

    let routes: Vec<(HttpMethod, &str)> = app
        .endpoints
        .iter()
        .map(|e| (e.method, e.path.as_str()))
        .collect();
    assert_eq!(
        routes,
        vec![
            (HttpMethod::Get, "/api/products/"),
            (HttpMethod::Get, "/legacy/"),
            (HttpMethod::Get, "/products/"),
            (HttpMethod::Post, "/products/"),
            (HttpMethod::Get, "/products/{id}/"),
            (HttpMethod::Put, "/products/{id}/"),
            (HttpMethod::Patch, "/products/{id}/"),
            (HttpMethod::Delete, "/products/{id}/"),
            (HttpMethod::Post, "/products/{id}/archive/"),
        ]
    );

    let list = &app.endpoints[0];
    assert_eq!(list.description, "List all Product instances");
    assert_eq!(list.serializer.as_deref(), Some("ProductListSerializer"));
    assert_eq!(list.tags, vec!["products"]);

    let create = &app.endpoints[3];
    assert_eq!(create.description, "Create a new Product instance");
    assert_eq!(create.serializer.as_deref(), Some("ProductSerializer"));
    assert_eq!(create.permissions, vec!["IsAuthenticated"]);

    let archive = app.endpoints.last().unwrap();
    assert_eq!(archive.description, "Archive a product.");
}

#[test]
fn test_unresolved_view_yields_get_endpoint_and_diagnostic() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);
    let app = &extraction.model.apps[0];

    let legacy = app
        .endpoints
        .iter()
        .find(|e| e.path == "/legacy/")
        .expect("Unresolved view must still produce an endpoint");
    assert_eq!(legacy.method, HttpMethod::Get);
    assert!(legacy.serializer.is_none());

    assert!(extraction
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning && d.message.contains("LegacyView")));
}

#[test]
fn test_extraction_is_idempotent() {
    let temp_dir = products_project();

    let first = serialize_yaml(&extract(&temp_dir)).unwrap();
    let second = serialize_yaml(&extract(&temp_dir)).unwrap();
    assert_eq!(first, second, "Repeated runs must be byte-identical");
}

#[test]
fn test_yaml_and_json_outputs_are_well_formed() {
    let temp_dir = products_project();
    let extraction = extract(&temp_dir);

    let yaml = serialize_yaml(&extraction).unwrap();
    assert!(yaml.contains("name: products"));
    assert!(yaml.contains("ProductSerializer"));

    let json = serialize_json(&extraction).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["model"]["apps"][0]["name"], "products");
    assert_eq!(
        value["model"]["apps"][0]["serializers"][0]["fields"][0]["kind"],
        "string"
    );
    assert_eq!(value["model"]["apps"][0]["endpoints"][0]["method"], "GET");
}

#[test]
fn test_include_apps_filter() {
    let temp_dir = create_test_project(vec![
        ("products/__init__.py", ""),
        ("products/views.py", "from rest_framework.views import APIView\n"),
        ("orders/__init__.py", ""),
        ("orders/views.py", "from rest_framework.views import APIView\n"),
    ]);

    let config = ProjectConfig {
        include_apps: Some(vec!["orders".to_string()]),
        ..ProjectConfig::default()
    };
    let extraction = ModelBuilder::new(config)
        .build(temp_dir.path(), None)
        .unwrap();

    let names: Vec<_> = extraction.model.apps.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["orders"]);
}

#[test]
fn test_project_without_apps_fails() {
    let temp_dir = create_test_project(vec![("README.md", "nothing to see")]);
    let result = ModelBuilder::new(ProjectConfig::default()).build(temp_dir.path(), None);
    assert!(result.is_err());
}
