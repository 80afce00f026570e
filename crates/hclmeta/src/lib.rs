//! # hclmeta - terraform configuration as annotated json
//!
//! `hclmeta` reads Terraform configuration and writes it back out as a JSON (or YAML) document. Each attribute is
//! enriched with the metadata a provider schema declares for it, and attributes the schema knows about but the
//! configuration does not set are added as empty placeholders.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclmeta` works internally.
//!
//! ### HCL Terms
//!
//! In hcl terms...
//! - a file gets parsed as a `body`
//! - ...which is just a list of `structures`
//! - ...where there are two kinds:
//!   - `attribute`: a "key = value" pair
//!   - or `block`:
//!     - 1 `identifier`
//!     - followed by 0 or more `labels`
//!     - and a `body` enclosed in `{` and `}`
//!
//! ```hcl
//! resource "azurerm_resource_group" "main" {
//!   name     = "rg-main"
//!   location = var.location
//!
//!   timeouts {
//!     create = "5m"
//!   }
//! }
//! ```
//!
//! ### Loading files
//!
//! Every file is parsed as a `body` ([hcl_edit::structure::Body]) and kept in [source_files::SourceFiles] together
//! with its text and path. The text is needed later on: most expressions are not evaluated but copied from the
//! source, and ranges point back into the file.
//!
//! A provider schema document (`terraform providers schema -json`) is loaded into a [schema::SchemaIndex], which maps
//! resource and data source type names to their [schema::SchemaNode].
//!
//! ### Conversion
//!
//! see [converter::Converter]
//!
//! For each top-level block:
//!
//! - `resource` and `data` blocks look up their schema by their first label
//! - [block::BlockConverter] converts attributes and nested blocks. Nested blocks find their schema among the
//!   `block_types` of the parent schema.
//! - attribute values are converted by [expression::ExpressionConverter]
//! - schema attributes not present in the source are back-filled
//! - the result is handed to [document::DocumentAggregator] which groups it by block type
//!
//! **Values**
//!
//! | **expression**              | **value**                      |
//! |-----------------------------|--------------------------------|
//! | `"text"`, `42`, `true`      | the literal                    |
//! | `[1, 2]`, `{ a = 1 }`       | array / object                 |
//! | `var.location`              | `"var.location"`               |
//! | `lookup(var.tags, "env")`   | `"lookup(var.tags, env)"`      |
//! | `"${var.prefix}-rg"`        | `"var.prefix-rg"`              |
//! | `var.a[*].id`, `a + b`      | source text, unchanged         |
//!
//! See [expression] for the full list.
//!
//! ### Errors
//!
//! Conversion does not stop at the first problem. Issues are collected in [error::ConversionErrors], the affected
//! attribute becomes `null` (or the affected block is skipped) and the document is still produced.
//!
//! ### Output
//!
//! [document::Document] and everything inside of it serializes via [serde].
//!
pub mod block;
pub mod converter;
pub mod document;
pub mod error;
pub mod expression;
pub mod range;
pub mod schema;
pub mod source_files;
pub mod value;
