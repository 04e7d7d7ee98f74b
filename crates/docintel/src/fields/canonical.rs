use std::collections::HashMap;

use crate::error::ConfigError;

/// Field names reported for every file unless configured otherwise.
pub const DEFAULT_EXPECTED_FIELDS: &[&str] = &[
    "SupplyAddress1",
    "SupplyAddress2",
    "ConsumptionPeriod",
    "AccountNo",
    "FixedEnergyPriceRate",
    "TotalPayWithAllCharges",
    "TotalEnergyCharge",
];

/// Key used to decide whether two labels name the same field: spaces,
/// underscores and hyphens removed, then lower-cased.
pub fn comparison_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Ordered list of expected field names with precomputed comparison keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFields {
    names: Vec<String>,
    by_key: HashMap<String, usize>,
}

impl CanonicalFields {
    /// Builds the list, rejecting an empty list, blank names, and names that
    /// collapse to the same comparison key.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::InvalidExpectedFields {
                reason: "at least one field name is required".to_string(),
            });
        }

        let mut by_key = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let key = comparison_key(name);
            if key.is_empty() {
                return Err(ConfigError::InvalidExpectedFields {
                    reason: format!("field name at position {} is empty", index + 1),
                });
            }
            if let Some(existing) = by_key.insert(key, index) {
                return Err(ConfigError::InvalidExpectedFields {
                    reason: format!(
                        "'{}' and '{}' would match the same labels",
                        names[existing], name
                    ),
                });
            }
        }

        Ok(Self { names, by_key })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical name a label resolves to, if any.
    pub fn match_label(&self, label: &str) -> Option<&str> {
        self.by_key
            .get(&comparison_key(label))
            .map(|&index| self.names[index].as_str())
    }

    /// Position of an exact canonical name in the list.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_key
            .get(&comparison_key(name))
            .copied()
            .filter(|&index| self.names[index] == name)
    }
}

impl Default for CanonicalFields {
    fn default() -> Self {
        let names: Vec<String> = DEFAULT_EXPECTED_FIELDS.iter().map(|s| s.to_string()).collect();
        let by_key = names
            .iter()
            .enumerate()
            .map(|(index, name)| (comparison_key(name), index))
            .collect();
        Self { names, by_key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_key() {
        assert_eq!(comparison_key("Account No"), "accountno");
        assert_eq!(comparison_key("account_no"), "accountno");
        assert_eq!(comparison_key("ACCOUNT-NO"), "accountno");
        assert_eq!(comparison_key("Account.No"), "account.no");
        assert_eq!(comparison_key(" _- "), "");
    }

    #[test]
    fn test_match_label() {
        let canonical = CanonicalFields::default();
        assert_eq!(canonical.match_label("account no"), Some("AccountNo"));
        assert_eq!(canonical.match_label("Supply_Address_1"), Some("SupplyAddress1"));
        assert_eq!(canonical.match_label("Customer Account No"), None);
    }

    #[test]
    fn test_position_requires_exact_name() {
        let canonical = CanonicalFields::default();
        assert_eq!(canonical.position("SupplyAddress1"), Some(0));
        assert_eq!(canonical.position("TotalEnergyCharge"), Some(6));
        assert_eq!(canonical.position("account no"), None);
        assert_eq!(canonical.position("MeterSerial"), None);
    }

    #[test]
    fn test_rejects_empty_list() {
        let result = CanonicalFields::new(Vec::<String>::new());
        assert!(matches!(result, Err(ConfigError::InvalidExpectedFields { .. })));
    }

    #[test]
    fn test_rejects_blank_name() {
        let result = CanonicalFields::new(["AccountNo", " - "]);
        assert!(matches!(result, Err(ConfigError::InvalidExpectedFields { .. })));
    }

    #[test]
    fn test_rejects_colliding_names() {
        let err = CanonicalFields::new(["AccountNo", "account_no"]).unwrap_err();
        assert!(err.to_string().contains("'AccountNo' and 'account_no'"));
    }

    #[test]
    fn test_default_matches_constant() {
        let canonical = CanonicalFields::default();
        assert_eq!(canonical.len(), DEFAULT_EXPECTED_FIELDS.len());
        assert_eq!(canonical, CanonicalFields::new(DEFAULT_EXPECTED_FIELDS.iter().copied()).unwrap());
    }
}
