use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::canonical::CanonicalFields;
use super::value::{format_number, AnalysisResult, FieldValue, RawField};

/// Value reported for a canonical field the analysis did not produce.
pub const NOT_FOUND: &str = "(not found)";
/// Value reported for a key-value pair whose value text is blank.
pub const EMPTY: &str = "(empty)";

/// One named value in a file's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub field_name: String,
    /// Never empty; placeholders stand in for missing values.
    pub field_value: String,
    /// Percentage in 0..=100 rounded to two decimals.
    pub confidence: Option<f64>,
}

impl FieldRecord {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            field_name: name.into(),
            field_value: NOT_FOUND.to_string(),
            confidence: None,
        }
    }
}

/// Maps raw analysis output onto the canonical field list.
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    canonical: CanonicalFields,
}

impl FieldNormalizer {
    pub fn new(canonical: CanonicalFields) -> Self {
        Self { canonical }
    }

    pub fn canonical(&self) -> &CanonicalFields {
        &self.canonical
    }

    /// Produces exactly one record per canonical name, followed by any other
    /// labels the analysis surfaced, in the order they were discovered.
    pub fn normalize(&self, result: &AnalysisResult) -> Vec<FieldRecord> {
        let mut records = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for document in &result.documents {
            for (label, field) in &document.fields {
                let name = self.resolve_name(label);
                let Some(value) = display_value(field) else {
                    debug!("Field '{}' has no extractable value", label);
                    continue;
                };
                if !seen.insert(name.clone()) {
                    continue;
                }
                records.push(FieldRecord {
                    field_name: name,
                    field_value: value,
                    confidence: field.confidence.map(to_percentage),
                });
            }
        }

        for pair in &result.key_value_pairs {
            let key = pair.key.trim();
            if key.is_empty() {
                continue;
            }
            let name = self.resolve_name(key);
            if !seen.insert(name.clone()) {
                continue;
            }
            let value = pair.value.trim();
            records.push(FieldRecord {
                field_name: name,
                field_value: if value.is_empty() { EMPTY } else { value }.to_string(),
                confidence: pair.confidence.map(to_percentage),
            });
        }

        for name in self.canonical.names() {
            if !seen.contains(name) {
                records.push(FieldRecord::not_found(name.as_str()));
            }
        }

        records.sort_by_key(|record| {
            self.canonical
                .position(&record.field_name)
                .unwrap_or(usize::MAX)
        });
        records
    }

    fn resolve_name(&self, label: &str) -> String {
        self.canonical
            .match_label(label)
            .unwrap_or(label)
            .to_string()
    }
}

/// First available representation of a field, or `None` when it is blank.
fn display_value(field: &RawField) -> Option<String> {
    let text = match field.content.as_deref() {
        Some(content) if !content.is_empty() => content.trim().to_string(),
        _ => match &field.value {
            FieldValue::None => return None,
            FieldValue::Text(text) => text.trim().to_string(),
            FieldValue::Number(number) => format_number(*number),
            FieldValue::Date(date) => date.clone(),
            FieldValue::Currency(currency) => currency.display(),
            FieldValue::Address(address) => address.display(),
        },
    };
    (!text.is_empty()).then_some(text)
}

fn to_percentage(confidence: f64) -> f64 {
    (confidence * 100.0 * 100.0).round() / 100.0
}
