//! Raw analysis output, as handed over by an analysis adapter.
//!
//! Adapters translate whatever their service returns into these types; the
//! normalizer only ever sees this closed model.

use serde::{Deserialize, Serialize};

/// Everything an analysis run produced for one document file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Structured documents recognised by the model, in service order.
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
    /// Generic key-value pairs, in service order.
    #[serde(default)]
    pub key_value_pairs: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Labelled fields in source order. Labels are not unique across documents.
    #[serde(default)]
    pub fields: Vec<(String, RawField)>,
}

impl AnalyzedDocument {
    pub fn new(fields: Vec<(String, RawField)>) -> Self {
        Self {
            doc_type: None,
            fields,
        }
    }
}

/// One labelled field of a structured document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    /// Text span the value was read from, if the service reported one.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub value: FieldValue,
    /// Confidence in the 0..=1 range.
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl RawField {
    pub fn new(value: FieldValue) -> Self {
        Self {
            content: None,
            value,
            confidence: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Typed value of a field. A field carries at most one typed representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    None,
    Text(String),
    Number(f64),
    Date(String),
    Currency(CurrencyValue),
    Address(AddressValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub amount: Option<f64>,
    pub symbol: Option<String>,
    pub code: Option<String>,
}

impl CurrencyValue {
    /// `symbol + amount` when both are known, otherwise amount and code
    /// separated by a space.
    pub fn display(&self) -> String {
        match (self.symbol.as_deref(), self.amount) {
            (Some(symbol), Some(amount)) if !symbol.is_empty() => {
                format!("{}{}", symbol, format_number(amount))
            }
            _ => {
                let mut parts = Vec::new();
                if let Some(amount) = self.amount {
                    parts.push(format_number(amount));
                }
                if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
                    parts.push(code.to_string());
                }
                parts.join(" ")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressValue {
    /// Pre-formatted address, when the service supplies one.
    pub formatted: Option<String>,
    /// Address parts in reading order.
    #[serde(default)]
    pub components: Vec<String>,
}

impl AddressValue {
    pub fn display(&self) -> String {
        match self.formatted.as_deref().map(str::trim) {
            Some(formatted) if !formatted.is_empty() => formatted.to_string(),
            _ => self
                .components
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A generic key-value pair. `key` and `value` hold the element text as the
/// service reported it; an absent value element is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
    pub confidence: Option<f64>,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Shortest decimal form: `100.0` prints as `100`, `1234.5` as `1234.5`.
pub fn format_number(value: f64) -> String {
    value.to_string()
}
