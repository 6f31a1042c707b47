//! End-to-end integration test for the document pipeline
//!
//! Exercises the complete flow: documents on disk -> catalog -> resolve ->
//! configuration document -> header.

use std::fs;
use std::path::Path;

use cppkeys_core::document::{self, DocumentFormat};
use cppkeys_core::{
    Catalog, Configuration, Diagnostic, FlagId, HeaderOptions, Provenance, RegistryDocument,
    ResolveError, RuleId, RuleTableDocument, SelectionDocument, render_header,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Registry and rules in separate files of different formats.
fn setup_documents() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("registry.yaml"),
        r#"
flags:
  - id: BIOLOGY
    tag: applications
  - id: BIO_MODEL_A
    tag: biology
  - id: BIO_MODEL_B
    tag: biology
groups:
  - name: biology-model
    members: [BIO_MODEL_A, BIO_MODEL_B]
"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("rules.json"),
        r#"{
  "rules": [
    { "id": "biology-model", "when": "BIOLOGY", "then": ["BIO_MODEL_A"], "strength": "default" }
  ]
}"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("selection.toml"),
        "name = \"scenario\"\n\n[selection]\nBIOLOGY = true\n",
    )
    .unwrap();
    temp
}

fn load<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let format = DocumentFormat::from_path(path).unwrap();
    document::parse(&fs::read_to_string(path).unwrap(), format).unwrap()
}

fn load_catalog(dir: &Path) -> Catalog {
    let registry: RegistryDocument = load(&dir.join("registry.yaml"));
    let rules: RuleTableDocument = load(&dir.join("rules.json"));
    Catalog::from_documents(&registry, &rules).unwrap()
}

#[test]
fn test_documents_to_configuration() {
    let temp = setup_documents();
    let catalog = load_catalog(temp.path());
    let selection: SelectionDocument = load(&temp.path().join("selection.toml"));

    let config = catalog.resolve(&selection.selection).unwrap();

    let biology = config.get("BIOLOGY").unwrap();
    assert!(biology.value);
    assert_eq!(biology.provenance, Provenance::Explicit);

    let model_a = config.get("BIO_MODEL_A").unwrap();
    assert!(model_a.value);
    assert_eq!(
        model_a.provenance,
        Provenance::Forced {
            rule: RuleId::new("biology-model")
        }
    );

    let model_b = config.get("BIO_MODEL_B").unwrap();
    assert!(!model_b.value);
    assert_eq!(model_b.provenance, Provenance::Default);
}

#[test]
fn test_second_model_violates_group() {
    let temp = setup_documents();
    let catalog = load_catalog(temp.path());
    let mut selection: SelectionDocument = load(&temp.path().join("selection.toml"));
    selection
        .selection
        .set(FlagId::new("BIO_MODEL_B").unwrap(), true);

    let err = catalog.resolve(&selection.selection).unwrap_err();
    let ResolveError::Failed(report) = err else {
        panic!("expected a failed resolution, got {err:?}");
    };
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::MutualExclusivityViolation {
            group: "biology-model".into(),
            members: vec![
                FlagId::new("BIO_MODEL_A").unwrap(),
                FlagId::new("BIO_MODEL_B").unwrap()
            ],
        }]
    );
}

#[test]
fn test_configuration_document_survives_each_format() {
    let temp = setup_documents();
    let catalog = load_catalog(temp.path());
    let selection: SelectionDocument = load(&temp.path().join("selection.toml"));
    let config = catalog.resolve(&selection.selection).unwrap();

    for (file, format) in [
        ("config.toml", DocumentFormat::Toml),
        ("config.json", DocumentFormat::Json),
        ("config.yaml", DocumentFormat::Yaml),
    ] {
        let path = temp.path().join(file);
        fs::write(&path, document::render(&config, format).unwrap()).unwrap();
        let back: Configuration = load(&path);
        assert_eq!(back, config, "{file}");
        assert_eq!(back.fingerprint(), config.fingerprint(), "{file}");
    }
}

#[test]
fn test_header_from_documents() {
    let temp = setup_documents();
    let catalog = load_catalog(temp.path());
    let selection: SelectionDocument = load(&temp.path().join("selection.toml"));
    let config = catalog.resolve(&selection.selection).unwrap();

    let options = HeaderOptions {
        banner: false,
        provenance_comments: true,
    };
    let header = render_header(catalog.registry(), &config, &options);
    assert_eq!(
        header,
        "/* applications */\n\
         # define BIOLOGY /* explicit */\n\
         \n\
         /* biology */\n\
         # define BIO_MODEL_A /* forced by biology-model */\n\
         # undef  BIO_MODEL_B\n"
    );
}

#[test]
fn test_rules_referencing_undeclared_flags_do_not_load() {
    let temp = setup_documents();
    fs::write(
        temp.path().join("rules.json"),
        r#"{ "rules": [ { "when": "BIOLOGY", "then": ["BIO_MODEL_C"] } ] }"#,
    )
    .unwrap();

    let registry: RegistryDocument = load(&temp.path().join("registry.yaml"));
    let rules: RuleTableDocument = load(&temp.path().join("rules.json"));
    let err = Catalog::from_documents(&registry, &rules).unwrap_err();
    assert!(matches!(err, cppkeys_core::Error::UnknownFlag { ref id, .. } if id == "BIO_MODEL_C"));
}
