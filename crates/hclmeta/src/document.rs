//! output document
//!
//! Top-level blocks are grouped by their type. Block types outside of the eight known ones are dropped.
use crate::block::ConvertedBlock;
use serde::Serialize;

/// Known top-level block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Provider,
    Resource,
    Variable,
    Output,
    Module,
    Data,
    Locals,
    Terraform,
}

impl BlockType {
    pub fn from_ident(ident: &str) -> Option<Self> {
        let block_type = match ident {
            "provider" => BlockType::Provider,
            "resource" => BlockType::Resource,
            "variable" => BlockType::Variable,
            "output" => BlockType::Output,
            "module" => BlockType::Module,
            "data" => BlockType::Data,
            "locals" => BlockType::Locals,
            "terraform" => BlockType::Terraform,
            _ => return None,
        };
        Some(block_type)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<'s> {
    pub providers: Vec<ConvertedBlock<'s>>,
    pub resources: Vec<ConvertedBlock<'s>>,
    pub variables: Vec<ConvertedBlock<'s>>,
    pub outputs: Vec<ConvertedBlock<'s>>,
    pub modules: Vec<ConvertedBlock<'s>>,
    pub data_sources: Vec<ConvertedBlock<'s>>,
    pub locals: Vec<ConvertedBlock<'s>>,
    pub terraform: Vec<ConvertedBlock<'s>>,
}

impl<'s> Document<'s> {
    pub fn blocks(&self, block_type: BlockType) -> &[ConvertedBlock<'s>] {
        match block_type {
            BlockType::Provider => &self.providers,
            BlockType::Resource => &self.resources,
            BlockType::Variable => &self.variables,
            BlockType::Output => &self.outputs,
            BlockType::Module => &self.modules,
            BlockType::Data => &self.data_sources,
            BlockType::Locals => &self.locals,
            BlockType::Terraform => &self.terraform,
        }
    }

    fn blocks_mut(&mut self, block_type: BlockType) -> &mut Vec<ConvertedBlock<'s>> {
        match block_type {
            BlockType::Provider => &mut self.providers,
            BlockType::Resource => &mut self.resources,
            BlockType::Variable => &mut self.variables,
            BlockType::Output => &mut self.outputs,
            BlockType::Module => &mut self.modules,
            BlockType::Data => &mut self.data_sources,
            BlockType::Locals => &mut self.locals,
            BlockType::Terraform => &mut self.terraform,
        }
    }
}

#[derive(derive_new::new, Debug, Default)]
pub struct DocumentAggregator<'s> {
    #[new(default)]
    document: Document<'s>,
}

impl<'s> DocumentAggregator<'s> {
    /// Append a block to the group of its type
    ///
    /// Returns `false` when the block type is unknown and the block was dropped.
    pub fn add_block(&mut self, block_type: &str, block: ConvertedBlock<'s>) -> bool {
        let Some(known) = BlockType::from_ident(block_type) else {
            tracing::debug!(
                block_type,
                address = %block.address(),
                "dropping block of unknown type"
            );
            return false;
        };

        self.document.blocks_mut(known).push(block);
        true
    }

    pub fn into_document(self) -> Document<'s> {
        self.document
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::range::{Position, SourceRange};
    use pretty_assertions::assert_eq;

    fn block(block_type: &str, labels: &[&str]) -> ConvertedBlock<'static> {
        let position = Position {
            byte: 0,
            line: 1,
            column: 1,
        };
        ConvertedBlock {
            block_type: block_type.to_string(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
            range: SourceRange {
                filename: "main.tf".to_string(),
                start: position,
                end: position,
            },
            attributes: Default::default(),
            blocks: vec![],
        }
    }

    #[test]
    fn blocks_are_grouped_by_type() {
        let mut aggregator = DocumentAggregator::new();
        assert!(aggregator.add_block("resource", block("resource", &["aws_instance", "a"])));
        assert!(aggregator.add_block("data", block("data", &["aws_ami", "ubuntu"])));
        assert!(aggregator.add_block("resource", block("resource", &["aws_instance", "b"])));
        assert!(aggregator.add_block("locals", block("locals", &[])));

        let document = aggregator.into_document();

        let resources: Vec<_> = document
            .blocks(BlockType::Resource)
            .iter()
            .map(ConvertedBlock::address)
            .collect();
        assert_eq!(
            resources,
            ["resource.aws_instance.a", "resource.aws_instance.b"]
        );
        assert_eq!(document.blocks(BlockType::Data).len(), 1);
        assert_eq!(document.locals.len(), 1);
        assert!(document.providers.is_empty());
    }

    #[test]
    fn unknown_block_types_are_dropped() {
        let mut aggregator = DocumentAggregator::new();

        assert!(!aggregator.add_block("moved", block("moved", &[])));
        assert!(!aggregator.add_block("check", block("check", &["health"])));

        assert_eq!(aggregator.into_document(), Document::default());
    }

    #[test]
    fn serializes_eight_groups() {
        let json = serde_json::to_value(Document::default()).unwrap();

        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "dataSources",
                "locals",
                "modules",
                "outputs",
                "providers",
                "resources",
                "terraform",
                "variables",
            ]
        );
    }
}
