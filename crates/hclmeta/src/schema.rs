//! provider schema index
//!
//! A provider schema document (as printed by `terraform providers schema -json`) is parsed into a typed tree once.
//! Afterwards the [SchemaIndex] is read-only and handed out by reference to every conversion.
//!
//! ```json
//! {
//!   "provider_schemas": {
//!     "registry.terraform.io/hashicorp/azurerm": {
//!       "resource_schemas": {
//!         "azurerm_resource_group": {
//!           "block": {
//!             "attributes": { "name": { "type": "string", "required": true } },
//!             "block_types": { "timeouts": { "nesting_mode": "single", "block": {} } }
//!           }
//!         }
//!       },
//!       "data_source_schemas": {}
//!     }
//!   }
//! }
//! ```
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata of a single attribute
///
/// Serialized as-is into the `schema` field of converted attributes. Fields that are not modelled explicitly are
/// kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_type: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl AttributeSchema {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive.unwrap_or(false)
    }
}

/// Schema of a block: its attributes and the types of blocks nested inside of it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaNode {
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeSchema>,
    #[serde(default)]
    pub block_types: IndexMap<String, NestedBlockSchema>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: Option<bool>,
}

impl SchemaNode {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    pub fn nested_block(&self, type_name: &str) -> Option<&SchemaNode> {
        self.block_types.get(type_name).map(|nested| &nested.block)
    }

    /// Depth-first search through nested block types
    ///
    /// At every level the direct children are checked before descending into them. The first match in document
    /// order wins.
    fn find_nested_block(&self, type_name: &str) -> Option<&SchemaNode> {
        self.nested_block(type_name).or_else(|| {
            self.block_types
                .values()
                .find_map(|nested| nested.block.find_nested_block(type_name))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NestedBlockSchema {
    #[serde(default)]
    pub nesting_mode: Option<String>,
    pub block: SchemaNode,
    #[serde(default)]
    pub min_items: Option<u64>,
    #[serde(default)]
    pub max_items: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    provider_schemas: IndexMap<String, ProviderSchema>,
}

#[derive(Debug, Deserialize)]
struct ProviderSchema {
    #[serde(default)]
    resource_schemas: IndexMap<String, ResourceSchema>,
    #[serde(default)]
    data_source_schemas: IndexMap<String, ResourceSchema>,
}

#[derive(Debug, Deserialize)]
struct ResourceSchema {
    block: SchemaNode,
}

/// Resource and data source schemas of one or more providers
#[derive(Debug, Default)]
pub struct SchemaIndex {
    resources: IndexMap<String, SchemaNode>,
    data_sources: IndexMap<String, SchemaNode>,
}

impl SchemaIndex {
    pub fn load_file(path: &Path, provider: Option<&str>) -> Result<Self, SchemaLoadError> {
        tracing::info!(path=%path.display(), ?provider, "loading schema");

        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes, provider)
    }

    /// Parse a schema document
    ///
    /// With `provider` set only that provider is indexed; it matches the full registry address
    /// (`registry.terraform.io/hashicorp/azurerm`) or its last segment (`azurerm`).
    /// Without it all providers are merged, and for duplicate type names the provider listed first wins.
    pub fn from_slice(bytes: &[u8], provider: Option<&str>) -> Result<Self, SchemaLoadError> {
        let document: SchemaDocument = serde_json::from_slice(bytes)?;

        let mut index = SchemaIndex::default();
        let mut found_provider = false;

        for (address, provider_schema) in document.provider_schemas {
            if let Some(wanted) = provider {
                if !provider_matches(&address, wanted) {
                    tracing::debug!(%address, "skipping provider");
                    continue;
                }
            }
            found_provider = true;

            tracing::debug!(
                %address,
                resources = provider_schema.resource_schemas.len(),
                data_sources = provider_schema.data_source_schemas.len(),
                "indexing provider"
            );
            merge(&mut index.resources, provider_schema.resource_schemas);
            merge(&mut index.data_sources, provider_schema.data_source_schemas);
        }

        if let (Some(wanted), false) = (provider, found_provider) {
            return Err(SchemaLoadError::ProviderNotFound(wanted.to_string()));
        }

        Ok(index)
    }

    /// Find the schema of a resource type
    ///
    /// An exact top-level match always wins. Otherwise nested block types of all resources are searched
    /// depth-first and the first match in document order is returned.
    pub fn resolve_resource_schema(&self, type_name: &str) -> Option<&SchemaNode> {
        find_block_by_name(&self.resources, type_name)
    }

    /// Same as [SchemaIndex::resolve_resource_schema] for data sources
    pub fn resolve_data_source_schema(&self, type_name: &str) -> Option<&SchemaNode> {
        find_block_by_name(&self.data_sources, type_name)
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

fn provider_matches(address: &str, wanted: &str) -> bool {
    address == wanted || address.rsplit('/').next() == Some(wanted)
}

fn merge(target: &mut IndexMap<String, SchemaNode>, schemas: IndexMap<String, ResourceSchema>) {
    for (type_name, schema) in schemas {
        if target.contains_key(&type_name) {
            tracing::debug!(%type_name, "type already defined by an earlier provider");
            continue;
        }
        target.insert(type_name, schema.block);
    }
}

fn find_block_by_name<'s>(
    schemas: &'s IndexMap<String, SchemaNode>,
    name: &str,
) -> Option<&'s SchemaNode> {
    if let Some(schema) = schemas.get(name) {
        return Some(schema);
    }

    let found = schemas
        .values()
        .find_map(|schema| schema.find_nested_block(name));
    if found.is_some() {
        tracing::trace!(name, "resolved through a nested block type");
    }
    found
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaLoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Schema document does not have the expected shape")]
    InvalidDocument(#[from] serde_json::Error),
    #[error("Provider {0} not found in schema document")]
    ProviderNotFound(String),
}
