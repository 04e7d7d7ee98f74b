//! JSON shapes of the Document Intelligence REST API and their mapping onto
//! [`AnalysisResult`].

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::fields::{
    AddressValue, AnalysisResult, AnalyzedDocument, CurrencyValue, FieldValue, KeyValuePair,
    RawField,
};

/// Body of `GET {Operation-Location}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<WireAnalyzeResult>,
    #[serde(default)]
    pub error: Option<WireError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnalyzeResult {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    #[serde(default)]
    pub key_value_pairs: Vec<WireKeyValuePair>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Kept as raw JSON so labels stay in service order.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireField {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub value_string: Option<String>,
    #[serde(default)]
    pub value_selection_mark: Option<String>,
    #[serde(default)]
    pub value_phone_number: Option<String>,
    #[serde(default)]
    pub value_country_region: Option<String>,
    #[serde(default)]
    pub value_number: Option<f64>,
    #[serde(default)]
    pub value_integer: Option<i64>,
    #[serde(default)]
    pub value_date: Option<String>,
    #[serde(default)]
    pub value_time: Option<String>,
    #[serde(default)]
    pub value_currency: Option<WireCurrency>,
    #[serde(default)]
    pub value_address: Option<WireAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCurrency {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    #[serde(default)]
    pub formatted: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireKeyValuePair {
    #[serde(default)]
    pub key: Option<WireElement>,
    #[serde(default)]
    pub value: Option<WireElement>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireElement {
    #[serde(default)]
    pub content: Option<String>,
}

impl From<WireAnalyzeResult> for AnalysisResult {
    fn from(wire: WireAnalyzeResult) -> Self {
        AnalysisResult {
            documents: wire.documents.into_iter().map(AnalyzedDocument::from).collect(),
            key_value_pairs: wire
                .key_value_pairs
                .into_iter()
                .map(KeyValuePair::from)
                .collect(),
        }
    }
}

impl From<WireDocument> for AnalyzedDocument {
    fn from(wire: WireDocument) -> Self {
        let fields = wire
            .fields
            .into_iter()
            .map(|(label, value)| {
                let field = match serde_json::from_value::<WireField>(value) {
                    Ok(field) => RawField::from(field),
                    Err(e) => {
                        warn!("Unreadable field '{}' in analysis result: {}", label, e);
                        RawField::default()
                    }
                };
                (label, field)
            })
            .collect();

        AnalyzedDocument {
            doc_type: wire.doc_type,
            fields,
        }
    }
}

impl From<WireField> for RawField {
    fn from(wire: WireField) -> Self {
        let value = if let Some(text) = wire
            .value_string
            .or(wire.value_selection_mark)
            .or(wire.value_phone_number)
            .or(wire.value_country_region)
        {
            FieldValue::Text(text)
        } else if let Some(number) = wire.value_number {
            FieldValue::Number(number)
        } else if let Some(integer) = wire.value_integer {
            FieldValue::Number(integer as f64)
        } else if let Some(date) = wire.value_date.or(wire.value_time) {
            FieldValue::Date(date)
        } else if let Some(currency) = wire.value_currency {
            FieldValue::Currency(CurrencyValue {
                amount: currency.amount,
                symbol: currency.currency_symbol,
                code: currency.currency_code,
            })
        } else if let Some(address) = wire.value_address {
            FieldValue::Address(AddressValue::from(address))
        } else {
            FieldValue::None
        };

        RawField {
            content: wire.content,
            value,
            confidence: wire.confidence,
        }
    }
}

impl From<WireAddress> for AddressValue {
    fn from(wire: WireAddress) -> Self {
        let street = wire.street_address.or_else(|| {
            let parts: Vec<String> = [wire.house_number, wire.road].into_iter().flatten().collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        let components = [
            wire.unit,
            street,
            wire.city,
            wire.state,
            wire.postal_code,
            wire.country_region,
        ]
        .into_iter()
        .flatten()
        .collect();

        AddressValue {
            formatted: wire.formatted,
            components,
        }
    }
}

impl From<WireKeyValuePair> for KeyValuePair {
    fn from(wire: WireKeyValuePair) -> Self {
        KeyValuePair {
            key: wire.key.and_then(|k| k.content).unwrap_or_default(),
            value: wire.value.and_then(|v| v.content).unwrap_or_default(),
            confidence: wire.confidence,
        }
    }
}
