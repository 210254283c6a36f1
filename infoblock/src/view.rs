use infoblock_base::Result;
use infoblock_heap::RecordBlock;
use infoblock_schema::{Schema, Value};

/// A built block read through its schema, by field name.
#[derive(Clone, Copy, Debug)]
pub struct InfoView<'a> {
    schema: &'a Schema,
    block: &'a RecordBlock,
}

impl<'a> InfoView<'a> {
    pub fn new(schema: &'a Schema, block: &'a RecordBlock) -> Self {
        InfoView { schema, block }
    }

    pub fn block(&self) -> &'a RecordBlock {
        self.block
    }

    /// `None` when `name` is not a subscribed field.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        match self.schema.handle(name) {
            Some(h) => Ok(Some(self.block.get(h)?)),
            None => Ok(None),
        }
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.schema
            .handle(name)
            .is_some_and(|h| self.block.is_present(h))
    }

    /// Every subscribed field in schema order, with its value.
    pub fn fields(&self) -> Result<Vec<(&'a str, Value)>> {
        self.schema
            .entries()
            .iter()
            .map(|e| Ok((e.descriptor.name.as_str(), self.block.get(&e.handle)?)))
            .collect()
    }

    /// Re-encodes the stored fields as an INFO column, in schema order.
    /// Empty fields and unset flags are left out; nothing at all gives `.`.
    pub fn to_info_text(&self) -> Result<String> {
        let entries: Vec<String> = self
            .fields()?
            .into_iter()
            .filter_map(|(name, v)| v.to_info_entry(name))
            .collect();
        if entries.is_empty() {
            Ok(infoblock_schema::MISSING_TEXT.to_string())
        } else {
            Ok(entries.join(";"))
        }
    }
}
