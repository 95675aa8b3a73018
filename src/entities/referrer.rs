// 💼 Referrer Entity - party earning commission
//
// Identity is a generated string id that never changes. The balance is the
// only mutable field and only ever grows, credited by click accrual.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

// ============================================================================
// REFERRER ENTITY
// ============================================================================

/// Party earning commission, identified by a percentage rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referrer {
    /// Stable identity - never changes
    pub id: String,

    /// Display name
    pub name: String,

    /// Commission rate as a fraction in [0, 1]
    /// Accepted as given - out-of-range values are not rejected
    pub referral_percentage: f64,

    /// Accumulated commission, only ever increased by click accrual
    pub balance: f64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Referrer {
    /// Create a new referrer with a zero balance
    pub fn new(id: String, name: String, referral_percentage: f64) -> Self {
        Referrer {
            id,
            name,
            referral_percentage,
            balance: 0.0,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// REFERRER REGISTRY
// ============================================================================

/// Registry of all referrers, keyed by id.
///
/// Holds entities behind a shared map so the registry clones cheaply into
/// server state. Lookups return cloned snapshots.
#[derive(Clone)]
pub struct ReferrerRegistry {
    entries: Arc<RwLock<HashMap<String, Referrer>>>,
}

impl ReferrerRegistry {
    pub fn new() -> Self {
        ReferrerRegistry {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a referrer (id is assumed fresh)
    pub fn insert(&self, referrer: Referrer) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(referrer.id.clone(), referrer);
    }

    /// Get a cloned snapshot by id
    pub fn get(&self, id: &str) -> Option<Referrer> {
        let entries = self.entries.read().unwrap();
        entries.get(id).cloned()
    }

    /// Check whether a referrer exists
    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries.contains_key(id)
    }

    /// Credit commission to a referrer's balance, returning the new balance
    pub fn credit(&self, id: &str, amount: f64) -> Result<f64> {
        let mut entries = self.entries.write().unwrap();
        let referrer = entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("referrer {}", id)))?;

        referrer.balance += amount;
        Ok(referrer.balance)
    }

    /// Count registered referrers
    pub fn count(&self) -> usize {
        let entries = self.entries.read().unwrap();
        entries.len()
    }

    /// All referrers (cloned), in no particular order
    pub fn all(&self) -> Vec<Referrer> {
        let entries = self.entries.read().unwrap();
        entries.values().cloned().collect()
    }
}

impl Default for ReferrerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referrer_creation() {
        let referrer = Referrer::new("r-1".to_string(), "Company 1".to_string(), 0.1);

        assert_eq!(referrer.id, "r-1");
        assert_eq!(referrer.name, "Company 1");
        assert_eq!(referrer.referral_percentage, 0.1);
        assert_eq!(referrer.balance, 0.0);
    }

    #[test]
    fn test_registry_insert_and_get() {
        let registry = ReferrerRegistry::new();
        registry.insert(Referrer::new("r-1".to_string(), "Company 1".to_string(), 0.1));

        assert!(registry.contains("r-1"));
        assert!(!registry.contains("r-2"));
        assert_eq!(registry.count(), 1);

        let found = registry.get("r-1").unwrap();
        assert_eq!(found.name, "Company 1");

        assert!(registry.get("r-2").is_none());
    }

    #[test]
    fn test_credit_accumulates() {
        let registry = ReferrerRegistry::new();
        registry.insert(Referrer::new("r-1".to_string(), "Company 1".to_string(), 0.1));

        let balance = registry.credit("r-1", 100.0).unwrap();
        assert_eq!(balance, 100.0);

        let balance = registry.credit("r-1", 50.0).unwrap();
        assert_eq!(balance, 150.0);

        assert_eq!(registry.get("r-1").unwrap().balance, 150.0);
    }

    #[test]
    fn test_credit_unknown_referrer_fails() {
        let registry = ReferrerRegistry::new();

        let result = registry.credit("missing", 10.0);
        assert!(result.is_err());
        assert!(result.unwrap_err().is_not_found());
    }
}
