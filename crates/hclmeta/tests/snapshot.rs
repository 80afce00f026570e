//! Snapshot tests
//!
//! Converts each *.tf file in /tests/ individually, annotated with the schema in /tests/schema.json, and compares
//! if the resulting document changes.

use hclmeta::schema::SchemaIndex;
use hclmeta::source_files::SourceFiles;
use std::path::{Path, PathBuf};

const SCHEMA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/schema.json");

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLMETA_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let schema = SchemaIndex::load_file(Path::new(SCHEMA), None).expect("schema must load");

    insta::glob!("*.tf", |path| {
        let source = std::fs::read_to_string(path).unwrap();
        // file name only, ranges must not depend on the checkout location
        let filename = PathBuf::from(path.file_name().unwrap());

        let mut files = SourceFiles::default();
        files.insert(source, Some(filename)).expect("must be valid hcl");

        let (document, errors) = hclmeta::converter::convert(&files, Some(&schema));
        assert!(errors.is_empty(), "{errors}");

        insta::assert_json_snapshot!(document);
    });
}
