//! Field normalization: raw analysis output in, canonical field records out.

pub mod canonical;
pub mod normalizer;
pub mod value;

pub use canonical::{comparison_key, CanonicalFields, DEFAULT_EXPECTED_FIELDS};
pub use normalizer::{FieldNormalizer, FieldRecord, EMPTY, NOT_FOUND};
pub use value::{
    AddressValue, AnalysisResult, AnalyzedDocument, CurrencyValue, FieldValue, KeyValuePair,
    RawField,
};
