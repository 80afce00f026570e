//! conversion of whole configurations
//!
//! [Converter] walks the top-level blocks of every added file, looks up the schema of `resource` and `data`
//! blocks and collects the results into a single [Document]. Failures are collected, never fatal: a block that
//! cannot be converted is skipped and the rest of the configuration still makes it into the output.
use crate::block::BlockConverter;
use crate::document::{BlockType, Document, DocumentAggregator};
use crate::error::ConversionErrors;
use crate::range::RangeMapper;
use crate::schema::{SchemaIndex, SchemaNode};
use crate::source_files::{SourceFile, SourceFiles};
use hcl_edit::structure::Block;

#[derive(Debug, Default)]
pub struct Converter<'s> {
    schema: Option<&'s SchemaIndex>,
    aggregator: DocumentAggregator<'s>,
    errors: ConversionErrors,
}

impl<'s> Converter<'s> {
    pub fn new(schema: Option<&'s SchemaIndex>) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Annotate blocks added from now on with metadata from `schema`
    pub fn attach_schema(&mut self, schema: &'s SchemaIndex) {
        self.schema = Some(schema);
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.filename()))]
    pub fn add_file(&mut self, file: &SourceFile) {
        let ranges = RangeMapper::new(file.filename(), file.source());
        let blocks = BlockConverter::new(&ranges);

        for attribute in file.body().attributes() {
            tracing::debug!(key = %attribute.key.value().as_str(), "ignoring top-level attribute");
        }

        for block in file.body().blocks() {
            let block_type = block.ident.value().as_str();
            let schema = self.block_schema(block);

            match blocks.convert(block, schema, &mut self.errors) {
                Ok(converted) => {
                    self.aggregator.add_block(block_type, converted);
                }
                Err(error) => self.errors.log(error),
            }
        }
    }

    pub fn add_files(&mut self, files: &SourceFiles) {
        for file in files {
            self.add_file(file);
        }
    }

    pub fn finish(self) -> (Document<'s>, ConversionErrors) {
        (self.aggregator.into_document(), self.errors)
    }

    fn block_schema(&self, block: &Block) -> Option<&'s SchemaNode> {
        let index = self.schema?;

        let block_type = BlockType::from_ident(block.ident.value().as_str())?;
        if !matches!(block_type, BlockType::Resource | BlockType::Data) {
            return None;
        }

        let Some(type_name) = block.labels.first() else {
            tracing::debug!(?block_type, "block has no type label, skipping schema lookup");
            return None;
        };
        let type_name = type_name.as_str();

        let schema = match block_type {
            BlockType::Data => index.resolve_data_source_schema(type_name),
            _ => index.resolve_resource_schema(type_name),
        };
        if schema.is_none() {
            tracing::debug!(type_name, "no schema found");
        }
        schema
    }
}

/// Convert all files with an optional schema
pub fn convert<'s>(
    files: &SourceFiles,
    schema: Option<&'s SchemaIndex>,
) -> (Document<'s>, ConversionErrors) {
    let mut converter = Converter::new(schema);
    converter.add_files(files);
    converter.finish()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::test::schema_index;
    use crate::source_files;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn blocks_land_in_their_group() {
        let files = source_files!(
            r#"resource "azurerm_resource_group" "main" {
  name = "rg"
}

variable "location" {
  type = string
}
"#
        );

        let (document, errors) = convert(&files, None);

        assert!(errors.is_empty());
        assert_eq!(document.resources.len(), 1);
        assert_eq!(document.variables.len(), 1);
        assert!(document.providers.is_empty());
        assert!(document.outputs.is_empty());
        assert!(document.modules.is_empty());
        assert!(document.data_sources.is_empty());
        assert!(document.locals.is_empty());
        assert!(document.terraform.is_empty());

        let variable = &document.variables[0];
        assert_eq!(
            variable.attributes["type"].value,
            Some(Value::String("string".into()))
        );
    }

    #[test]
    fn resources_and_data_sources_are_annotated() {
        let files = source_files!(
            r#"resource "azurerm_resource_group" "main" {
  name = "rg"
}

data "azurerm_client_config" "current" {}
"#
        );
        let index = schema_index();

        let (document, _) = convert(&files, Some(&index));

        let group = &document.resources[0];
        assert!(group.attributes["name"].schema.unwrap().is_required());
        assert!(group.attributes["location"].is_back_filled());

        let client = &document.data_sources[0];
        assert!(client.attributes["tenant_id"].is_back_filled());
    }

    #[test]
    fn only_resources_and_data_sources_are_looked_up() {
        // a variable named like a resource type must not pick up the resource schema
        let files = source_files!(
            r#"variable "azurerm_resource_group" {}
resource "aws_instance" "a" {}
"#
        );
        let index = schema_index();

        let (document, errors) = convert(&files, Some(&index));

        assert!(errors.is_empty());
        assert!(document.variables[0].attributes.is_empty());
        assert!(document.resources[0].attributes.is_empty());
    }

    #[test]
    fn ranges_name_their_file() {
        let files = source_files! {
            "main.tf" => "resource \"a\" \"b\" {}\n",
            "outputs.tf" => "\noutput \"c\" {\n  value = 1\n}\n"
        };

        let (document, _) = convert(&files, None);

        assert_eq!(document.resources[0].range.filename, "main.tf");

        let output = &document.outputs[0];
        assert_eq!(output.range.filename, "outputs.tf");
        assert_eq!(output.range.start.line, 2);
        let value = output.attributes["value"].range.as_ref().unwrap();
        assert_eq!((value.start.line, value.start.column), (3, 3));
    }

    #[test]
    fn top_level_attributes_and_unknown_blocks_are_dropped() {
        let files = source_files!(
            r#"region = "eu"
moved {
  from = a.b
  to = a.c
}
locals {
  x = 1
}
"#
        );

        let (document, errors) = convert(&files, None);

        assert!(errors.is_empty());
        assert_eq!(document.locals.len(), 1);
        assert_eq!(
            serde_json::to_value(&document).unwrap()["locals"][0]["x"]["value"],
            serde_json::json!(1)
        );
    }

    #[test]
    fn schema_can_be_attached_later() {
        let files = source_files!(
            r#"resource "azurerm_resource_group" "main" {}
"#
        );
        let index = schema_index();

        let mut converter = Converter::default();
        converter.add_files(&files);
        converter.attach_schema(&index);
        converter.add_files(&files);
        let (document, _) = converter.finish();

        assert!(document.resources[0].attributes.is_empty());
        assert_eq!(document.resources[1].attributes.len(), 4);
    }
}
