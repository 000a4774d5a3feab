use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::{Result, RetrievalError};

/// Free-form document properties stored alongside a document record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata {
    properties: BTreeMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(|v| v.as_str())
    }

    pub fn page_count(&self) -> Option<u64> {
        self.get("page_count").and_then(|v| v.as_u64())
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.properties)
            .map_err(|e| RetrievalError::storage(format!("cannot encode metadata: {}", e)))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| RetrievalError::storage(format!("cannot decode metadata: {}", e)))?;
        Self::try_from(value)
    }
}

impl TryFrom<serde_json::Value> for DocumentMetadata {
    type Error = RetrievalError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                properties: map.into_iter().collect(),
            }),
            _ => Err(RetrievalError::invalid_argument(
                "document metadata must be a JSON object",
            )),
        }
    }
}
