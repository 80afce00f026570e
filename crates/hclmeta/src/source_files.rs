//! collection of parsed configuration files
//!
//! Conversion needs both the parsed [Body] and the text it was parsed from (expressions are rendered from their
//! source). [SourceFiles] keeps the two together, along with the path the text was read from.
use hcl_edit::structure::Body;
use std::path::{Path, PathBuf};

/// Extension of the files picked up by [SourceFiles::load_directory]
pub const TERRAFORM_EXTENSION: &str = "tf";

#[derive(Debug)]
pub struct SourceFile {
    path: Option<PathBuf>,
    source: String,
    body: Body,
}

impl SourceFile {
    pub fn parse(source: String, path: Option<PathBuf>) -> Result<Self, LoadError> {
        let body = hcl_edit::parser::parse_body(&source)?;
        Ok(Self { path, source, body })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name used in ranges, empty when the file was not read from disk
    pub fn filename(&self) -> String {
        self.path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

#[derive(Default, Debug)]
pub struct SourceFiles {
    files: Vec<SourceFile>,
}

impl SourceFiles {
    /// Parses and adds a configuration text
    pub fn insert(
        &mut self,
        source: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Result<(), LoadError> {
        self.files.push(SourceFile::parse(source.into(), path)?);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceFiles {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        tracing::info!(path=%file_path.display(), "loading file");

        let source = std::fs::read_to_string(file_path)?;
        self.insert(source, Some(file_path.to_path_buf()))
    }

    /// Loads every `*.tf` file of a directory (not recursive), in file name order
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        for dir_entry in std::fs::read_dir(dir_path)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            if file_path.extension().and_then(|ext| ext.to_str()) != Some(TERRAFORM_EXTENSION) {
                continue;
            }

            file_paths.push(file_path);
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_path_buf()));
        }

        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a SourceFiles {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No .tf files found in directory {}", .0.display())]
    NoFilesFound(PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
}

/// Utility macro to create [SourceFiles]
///
/// Create from a single document
/// ```
/// # use hclmeta::source_files;
/// let files = source_files!(r#"variable "region" {}"#);
/// assert_eq!(files.len(), 1);
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use hclmeta::source_files;
/// source_files! {
///   "main.tf" => r#"resource "null_resource" "a" {}"#,
///   "variables.tf" => r#"variable "region" {}"#
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use hclmeta::source_files;
/// source_files!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! source_files {
    // single document without path
    { $expr:expr } => {{
        let mut files = $crate::source_files::SourceFiles::default();
        files.insert($expr, None).expect("body must parse");
        files
    }};
    // multi document with paths
    { $($path:expr => $expr:expr),+ } => {{
        let mut files = $crate::source_files::SourceFiles::default();
        $(
            files
                .insert($expr, Some(std::path::PathBuf::from($path)))
                .expect("body must parse");
        )+

        files
    }};
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn files_keep_their_source_and_path() {
        let files = source_files! {
            "main.tf" => "resource \"a\" \"b\" {}\n",
            "vars.tf" => "variable \"c\" {}\n"
        };

        let names: Vec<_> = files.iter().map(|file| file.filename()).collect();
        assert_eq!(names, ["main.tf", "vars.tf"]);

        let first = files.iter().next().unwrap();
        assert_eq!(first.source(), "resource \"a\" \"b\" {}\n");
        assert_eq!(first.body().blocks().count(), 1);
    }

    #[test]
    fn documents_without_path_have_an_empty_filename() {
        let files = source_files!("a = 1");

        assert_eq!(files.iter().next().unwrap().filename(), "");
        assert_eq!(files.iter().next().unwrap().path(), None);
    }

    #[test]
    fn invalid_documents_are_rejected() {
        let mut files = super::SourceFiles::default();

        let result = files.insert("resource {", None);

        assert!(matches!(result, Err(super::LoadError::HclParseFailed(_))));
        assert!(files.is_empty());
    }
}
