// 📦 Product Entity - sellable item with a price
//
// The price is the base amount for commission math. Products are immutable
// after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ============================================================================
// PRODUCT ENTITY
// ============================================================================

/// Sellable item; its price is the default base amount for commission math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Stable identity - never changes
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in currency units
    /// Accepted as given - negative values are not rejected
    pub price: f64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: String, name: String, price: f64) -> Self {
        Product {
            id,
            name,
            price,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// PRODUCT REGISTRY
// ============================================================================

/// Registry of all products, keyed by id.
#[derive(Clone)]
pub struct ProductRegistry {
    entries: Arc<RwLock<HashMap<String, Product>>>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        ProductRegistry {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a product (id is assumed fresh)
    pub fn insert(&self, product: Product) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(product.id.clone(), product);
    }

    /// Get a cloned snapshot by id
    pub fn get(&self, id: &str) -> Option<Product> {
        let entries = self.entries.read().unwrap();
        entries.get(id).cloned()
    }

    /// Check whether a product exists
    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries.contains_key(id)
    }

    /// Count registered products
    pub fn count(&self) -> usize {
        let entries = self.entries.read().unwrap();
        entries.len()
    }

    /// All products (cloned), in no particular order
    pub fn all(&self) -> Vec<Product> {
        let entries = self.entries.read().unwrap();
        entries.values().cloned().collect()
    }
}

impl Default for ProductRegistry {
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
    fn test_product_creation() {
        let product = Product::new("p-1".to_string(), "Bank Product".to_string(), 1000.0);

        assert_eq!(product.id, "p-1");
        assert_eq!(product.name, "Bank Product");
        assert_eq!(product.price, 1000.0);
    }

    #[test]
    fn test_registry_insert_and_get() {
        let registry = ProductRegistry::new();
        registry.insert(Product::new("p-1".to_string(), "Bank Product".to_string(), 1000.0));

        assert!(registry.contains("p-1"));
        assert!(!registry.contains("p-2"));
        assert_eq!(registry.count(), 1);

        let found = registry.get("p-1").unwrap();
        assert_eq!(found.price, 1000.0);

        assert!(registry.get("p-2").is_none());
    }
}
