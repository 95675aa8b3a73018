// 🔗 Referral Link Entity - node binding a referrer to a product
//
// Links form a tree through child entries held by id. A child entry is
// either a single link or a group of links; the two shapes propagate
// commission amounts differently (see the commission engine).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

// ============================================================================
// CHILD ENTRY
// ============================================================================

/// One entry in a link's ordered child sequence.
///
/// The two shapes are not interchangeable: a single child is evaluated at
/// the parent's own base amount, while every member of a group is evaluated
/// at the amount pre-scaled by the parent's percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChildEntry {
    /// Direct child link, evaluated at the parent's base amount
    Single(String),

    /// Grouped child links, evaluated at the parent-scaled amount
    Group(Vec<String>),
}

// ============================================================================
// REFERRAL LINK ENTITY
// ============================================================================

/// Node binding a referrer to a product within a referral tree.
///
/// Children reference previously created links by id, so a tree can only be
/// assembled forward (no self-reference, no cycles through this path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralLink {
    /// Stable identity - never changes
    pub id: String,

    /// Owning referrer (credited on clicks)
    pub referrer_id: String,

    /// Product whose price is the default commission base
    pub product_id: String,

    /// Depth in the referral tree - informational only, never used in
    /// commission math
    pub level: u32,

    /// Ordered child entries
    pub children: Vec<ChildEntry>,

    /// Inactive links reject commission queries and clicks
    pub is_active: bool,

    /// Number of clicks handled on this link
    pub clicks: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ReferralLink {
    /// Create a new active link with no children and zero clicks
    pub fn new(id: String, referrer_id: String, product_id: String, level: u32) -> Self {
        ReferralLink {
            id,
            referrer_id,
            product_id,
            level,
            children: Vec::new(),
            is_active: true,
            clicks: 0,
            created_at: Utc::now(),
        }
    }

    /// Append a single child link
    pub fn add_child(&mut self, child_id: String) {
        self.children.push(ChildEntry::Single(child_id));
    }

    /// Append a group of child links as one entry
    pub fn add_child_group(&mut self, child_ids: Vec<String>) {
        self.children.push(ChildEntry::Group(child_ids));
    }

    /// All child link ids flattened across singles and group members,
    /// in sequence order
    pub fn child_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for entry in &self.children {
            match entry {
                ChildEntry::Single(id) => ids.push(id.clone()),
                ChildEntry::Group(members) => ids.extend(members.iter().cloned()),
            }
        }
        ids
    }
}

// ============================================================================
// LINK REGISTRY
// ============================================================================

/// Registry of all referral links, keyed by id.
///
/// Mutations are per-link read-modify-writes behind the registry lock;
/// mutators on missing ids report `NotFound`.
#[derive(Clone)]
pub struct LinkRegistry {
    entries: Arc<RwLock<HashMap<String, ReferralLink>>>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        LinkRegistry {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a link (id is assumed fresh)
    pub fn insert(&self, link: ReferralLink) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(link.id.clone(), link);
    }

    /// Get a cloned snapshot by id
    pub fn get(&self, id: &str) -> Option<ReferralLink> {
        let entries = self.entries.read().unwrap();
        entries.get(id).cloned()
    }

    /// Check whether a link exists
    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries.contains_key(id)
    }

    /// Set the active flag (idempotent in both directions)
    pub fn set_active(&self, id: &str, is_active: bool) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let link = entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", id)))?;

        link.is_active = is_active;
        Ok(())
    }

    /// Increment the click counter, returning the new count
    pub fn record_click(&self, id: &str) -> Result<u64> {
        let mut entries = self.entries.write().unwrap();
        let link = entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", id)))?;

        link.clicks += 1;
        Ok(link.clicks)
    }

    /// Append a single child entry to a link
    pub fn add_child(&self, id: &str, child_id: String) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let link = entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", id)))?;

        link.add_child(child_id);
        Ok(())
    }

    /// Append a group child entry to a link
    pub fn add_child_group(&self, id: &str, child_ids: Vec<String>) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let link = entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", id)))?;

        link.add_child_group(child_ids);
        Ok(())
    }

    /// Count registered links
    pub fn count(&self) -> usize {
        let entries = self.entries.read().unwrap();
        entries.len()
    }

    /// All links (cloned), in no particular order
    pub fn all(&self) -> Vec<ReferralLink> {
        let entries = self.entries.read().unwrap();
        entries.values().cloned().collect()
    }
}

impl Default for LinkRegistry {
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

    fn sample_link(id: &str) -> ReferralLink {
        ReferralLink::new(id.to_string(), "r-1".to_string(), "p-1".to_string(), 0)
    }

    #[test]
    fn test_link_creation_defaults() {
        let link = sample_link("l-1");

        assert_eq!(link.id, "l-1");
        assert_eq!(link.referrer_id, "r-1");
        assert_eq!(link.product_id, "p-1");
        assert_eq!(link.level, 0);
        assert!(link.children.is_empty());
        assert!(link.is_active);
        assert_eq!(link.clicks, 0);
    }

    #[test]
    fn test_add_children_preserves_order() {
        let mut link = sample_link("l-1");

        link.add_child("l-2".to_string());
        link.add_child_group(vec!["l-3".to_string(), "l-4".to_string()]);
        link.add_child("l-5".to_string());

        assert_eq!(link.children.len(), 3);
        assert_eq!(link.children[0], ChildEntry::Single("l-2".to_string()));
        assert_eq!(
            link.children[1],
            ChildEntry::Group(vec!["l-3".to_string(), "l-4".to_string()])
        );
        assert_eq!(link.children[2], ChildEntry::Single("l-5".to_string()));
    }

    #[test]
    fn test_child_ids_flattens_in_order() {
        let mut link = sample_link("l-1");

        link.add_child("l-2".to_string());
        link.add_child_group(vec!["l-3".to_string(), "l-4".to_string()]);

        assert_eq!(link.child_ids(), vec!["l-2", "l-3", "l-4"]);
    }

    #[test]
    fn test_registry_set_active_is_idempotent() {
        let registry = LinkRegistry::new();
        registry.insert(sample_link("l-1"));

        registry.set_active("l-1", false).unwrap();
        assert!(!registry.get("l-1").unwrap().is_active);

        // Deactivating twice is fine
        registry.set_active("l-1", false).unwrap();
        assert!(!registry.get("l-1").unwrap().is_active);

        registry.set_active("l-1", true).unwrap();
        assert!(registry.get("l-1").unwrap().is_active);
    }

    #[test]
    fn test_registry_record_click_increments() {
        let registry = LinkRegistry::new();
        registry.insert(sample_link("l-1"));

        assert_eq!(registry.record_click("l-1").unwrap(), 1);
        assert_eq!(registry.record_click("l-1").unwrap(), 2);
        assert_eq!(registry.get("l-1").unwrap().clicks, 2);
    }

    #[test]
    fn test_registry_mutators_on_unknown_id_fail() {
        let registry = LinkRegistry::new();

        assert!(registry.set_active("missing", true).unwrap_err().is_not_found());
        assert!(registry.record_click("missing").unwrap_err().is_not_found());
        assert!(registry
            .add_child("missing", "l-2".to_string())
            .unwrap_err()
            .is_not_found());
    }
}
