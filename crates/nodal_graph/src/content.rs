//! Node content payloads
//!
//! The body of a node is application territory. The graph only needs to
//! store it and round-trip it through documents, so content is a trait
//! object that converts to and from a JSON value.

use core::fmt;
use serde_json::Value;

use crate::error::Result;

/// Opaque per-node payload
pub trait NodeContent: fmt::Debug {
    /// Convert to a JSON-compatible value for documents
    fn to_value(&self) -> Value;

    /// Restore from a value previously produced by [`NodeContent::to_value`]
    fn restore(&mut self, data: &Value) -> Result<()>;
}

/// Builds the content object for a new node, given the node title.
pub type ContentFactory = Box<dyn Fn(&str) -> Box<dyn NodeContent>>;

/// Default content: keeps whatever value it is given, verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpaqueContent {
    data: Value,
}

impl OpaqueContent {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl NodeContent for OpaqueContent {
    fn to_value(&self) -> Value {
        self.data.clone()
    }

    fn restore(&mut self, data: &Value) -> Result<()> {
        self.data = data.clone();
        Ok(())
    }
}

/// Factory producing [`OpaqueContent`] for every node
pub fn opaque_content_factory() -> ContentFactory {
    Box::new(|_title| Box::new(OpaqueContent::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opaque_content_roundtrip() {
        let mut content = OpaqueContent::default();
        assert_eq!(content.to_value(), Value::Null);

        let data = json!({"text": "hello", "n": [1, 2, 3]});
        content.restore(&data).unwrap();
        assert_eq!(content.to_value(), data);
    }
}
