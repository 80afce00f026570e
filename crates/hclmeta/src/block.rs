//! block conversion and schema merging
//!
//! A [ConvertedBlock] carries every attribute found in the source plus a placeholder for every attribute its
//! schema declares but the source does not set (back-fill). Schema metadata is borrowed from the
//! [crate::schema::SchemaIndex], never copied.
use crate::error::{ConversionError, ConversionErrors};
use crate::expression::ExpressionConverter;
use crate::range::{RangeMapper, SourceRange};
use crate::schema::{AttributeSchema, SchemaNode};
use crate::value::Value;
use hcl_edit::structure::{Attribute, Block};
use hcl_edit::Span;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConvertedAttribute<'s> {
    pub key: String,
    /// `None` for attributes back-filled from the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'s AttributeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
}

impl<'s> ConvertedAttribute<'s> {
    fn back_filled(key: &str, schema: &'s AttributeSchema) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            schema: Some(schema),
            range: None,
        }
    }

    pub fn is_back_filled(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedBlock<'s> {
    pub block_type: String,
    pub labels: Vec<String>,
    /// range of the block type identifier
    pub range: SourceRange,
    /// source attributes in source order, followed by back-filled attributes in schema order
    pub attributes: IndexMap<String, ConvertedAttribute<'s>>,
    pub blocks: Vec<ConvertedBlock<'s>>,
}

impl ConvertedBlock<'_> {
    /// Type and labels joined by `.`, e.g. `resource.aws_instance.web`
    pub fn address(&self) -> String {
        address(&self.block_type, self.labels.iter().map(String::as_str))
    }
}

/// Flat object: `type`, `labels`, `range`, one entry per attribute and `blocks` (if any)
///
/// An attribute named `type`, `labels` or `range` replaces the block's own entry. Nested blocks replace an
/// attribute named `blocks`.
impl Serialize for ConvertedBlock<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let shadowed = |key: &str| self.attributes.contains_key(key);

        let mut map = serializer.serialize_map(None)?;
        if !shadowed("type") {
            map.serialize_entry("type", &self.block_type)?;
        }
        if !shadowed("labels") {
            map.serialize_entry("labels", &self.labels)?;
        }
        if !shadowed("range") {
            map.serialize_entry("range", &self.range)?;
        }

        for (key, attribute) in &self.attributes {
            if key == "blocks" && !self.blocks.is_empty() {
                continue;
            }
            map.serialize_entry(key, attribute)?;
        }

        if !self.blocks.is_empty() {
            map.serialize_entry("blocks", &self.blocks)?;
        }
        map.end()
    }
}

/// Converts blocks of a single source text
#[derive(Debug)]
pub struct BlockConverter<'a> {
    ranges: &'a RangeMapper<'a>,
    expressions: ExpressionConverter<'a>,
}

impl<'a> BlockConverter<'a> {
    pub fn new(ranges: &'a RangeMapper<'a>) -> Self {
        Self {
            ranges,
            expressions: ExpressionConverter::new(ranges),
        }
    }

    /// Convert a block and all blocks nested inside of it
    ///
    /// Errors of attributes and nested blocks are logged to `errors` and do not fail the block. Only a block
    /// that cannot be located in the source fails.
    #[tracing::instrument(level = "trace", skip_all, fields(block = %block.ident.value().as_str()))]
    pub fn convert<'s>(
        &self,
        block: &Block,
        schema: Option<&'s SchemaNode>,
        errors: &mut ConversionErrors,
    ) -> Result<ConvertedBlock<'s>, ConversionError> {
        let block_type = block.ident.value().as_str().to_string();
        let labels: Vec<String> = block
            .labels
            .iter()
            .map(|label| label.as_str().to_string())
            .collect();
        let address = address(&block_type, labels.iter().map(String::as_str));

        let range = block
            .ident
            .span()
            .ok_or(ConversionError::MissingSpan { what: "block" })
            .and_then(|span| self.ranges.range(&span))
            .map_err(|error| error.in_block(&address))?;

        let mut attributes = IndexMap::new();
        for attribute in block.body.attributes() {
            let converted = self.convert_attribute(&address, attribute, schema, errors);
            attributes.insert(converted.key.clone(), converted);
        }

        if let Some(schema) = schema {
            for (key, attribute_schema) in &schema.attributes {
                if attributes.contains_key(key) {
                    continue;
                }
                tracing::trace!(%address, %key, "back-filling attribute from schema");
                attributes.insert(
                    key.clone(),
                    ConvertedAttribute::back_filled(key, attribute_schema),
                );
            }
        }

        let mut blocks = vec![];
        for nested in block.body.blocks() {
            let nested_schema =
                schema.and_then(|schema| schema.nested_block(nested.ident.value().as_str()));

            match self.convert(nested, nested_schema, errors) {
                Ok(converted) => blocks.push(converted),
                Err(error) => errors.log(error.in_block(&address)),
            }
        }

        Ok(ConvertedBlock {
            block_type,
            labels,
            range,
            attributes,
            blocks,
        })
    }

    fn convert_attribute<'s>(
        &self,
        address: &str,
        attribute: &Attribute,
        schema: Option<&'s SchemaNode>,
        errors: &mut ConversionErrors,
    ) -> ConvertedAttribute<'s> {
        let key = attribute.key.value().as_str();

        let value = self
            .expressions
            .convert(&attribute.value)
            .unwrap_or_else(|error| {
                errors.log(error.in_attribute(address, key));
                Value::Null
            });

        let range = attribute
            .span()
            .and_then(|span| match self.ranges.range(&span) {
                Ok(range) => Some(range),
                Err(error) => {
                    errors.log(error.in_attribute(address, key));
                    None
                }
            });

        ConvertedAttribute {
            key: key.to_string(),
            value: Some(value),
            schema: schema.and_then(|schema| schema.attribute(key)),
            range,
        }
    }
}

fn address<'l>(block_type: &'l str, labels: impl Iterator<Item = &'l str>) -> String {
    std::iter::once(block_type)
        .chain(labels)
        .collect::<Vec<_>>()
        .join(".")
}
