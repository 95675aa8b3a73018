// Referral Service - operation layer over the registries
//
// Owns the three stores and the id source. Every logical operation goes
// through here; each one either fully succeeds or makes no mutation.

use serde::{Deserialize, Serialize};

use crate::commission::CommissionEngine;
use crate::entities::{
    LinkRegistry, Product, ProductRegistry, ReferralLink, Referrer, ReferrerRegistry,
};
use crate::error::{Error, Result};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::render::TreeRenderer;

// ============================================================================
// VIEWS
// ============================================================================

/// Flattened projection of a referral link for external callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkView {
    pub id: String,
    pub referrer_id: String,
    pub product_id: String,
    pub level: u32,
    /// Child ids flattened across singles and group members, in order
    pub children_ids: Vec<String>,
    pub is_active: bool,
    pub clicks: u64,
}

impl From<&ReferralLink> for LinkView {
    fn from(link: &ReferralLink) -> Self {
        LinkView {
            id: link.id.clone(),
            referrer_id: link.referrer_id.clone(),
            product_id: link.product_id.clone(),
            level: link.level,
            children_ids: link.child_ids(),
            is_active: link.is_active,
            clicks: link.clicks,
        }
    }
}

/// Result of a successful click on an active link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickOutcome {
    /// Click count on the link after this click
    pub clicks: u64,

    /// Balance of the link's own referrer after crediting the commission
    pub referrer_balance: f64,
}

// ============================================================================
// REFERRAL SERVICE
// ============================================================================

/// Facade over the referral program's stores and operations.
///
/// Entities are created once and live for the process lifetime; there are no
/// delete operations. Clicks credit the whole subtree's commission to the
/// clicked link's own referrer - descendant referrers' balances are untouched.
pub struct ReferralService {
    referrers: ReferrerRegistry,
    products: ProductRegistry,
    links: LinkRegistry,
    ids: Box<dyn IdGenerator>,
}

impl ReferralService {
    /// Create a service with random UUID ids
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UuidGenerator))
    }

    /// Create a service with a custom id source (deterministic ids in tests)
    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        ReferralService {
            referrers: ReferrerRegistry::new(),
            products: ProductRegistry::new(),
            links: LinkRegistry::new(),
            ids,
        }
    }

    // ========================================================================
    // CREATION
    // ========================================================================

    /// Create a referrer with a fresh id; always succeeds
    pub fn create_referrer(&self, name: &str, referral_percentage: f64) -> Referrer {
        let referrer = Referrer::new(self.ids.next_id(), name.to_string(), referral_percentage);
        self.referrers.insert(referrer.clone());
        referrer
    }

    /// Create a product with a fresh id; always succeeds
    pub fn create_product(&self, name: &str, price: f64) -> Product {
        let product = Product::new(self.ids.next_id(), name.to_string(), price);
        self.products.insert(product.clone());
        product
    }

    /// Create a referral link referencing an existing referrer and product.
    ///
    /// `children_ids` become single child entries in order. Every referenced
    /// id is validated before anything is inserted, so a failure leaves the
    /// store unchanged.
    pub fn create_referral_link(
        &self,
        referrer_id: &str,
        product_id: &str,
        level: u32,
        children_ids: &[String],
    ) -> Result<LinkView> {
        if !self.referrers.contains(referrer_id) {
            return Err(Error::NotFound(format!("referrer {}", referrer_id)));
        }
        if !self.products.contains(product_id) {
            return Err(Error::NotFound(format!("product {}", product_id)));
        }
        for child_id in children_ids {
            if !self.links.contains(child_id) {
                return Err(Error::NotFound(format!("referral link {}", child_id)));
            }
        }

        let mut link = ReferralLink::new(
            self.ids.next_id(),
            referrer_id.to_string(),
            product_id.to_string(),
            level,
        );
        for child_id in children_ids {
            link.add_child(child_id.clone());
        }

        let view = LinkView::from(&link);
        self.links.insert(link);
        Ok(view)
    }

    // ========================================================================
    // TREE ASSEMBLY
    // ========================================================================

    /// Append an existing link as a single child of another link
    pub fn attach_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        if !self.links.contains(child_id) {
            return Err(Error::NotFound(format!("referral link {}", child_id)));
        }
        self.links.add_child(parent_id, child_id.to_string())
    }

    /// Append existing links as one group entry of another link.
    ///
    /// All members are validated first; an unknown member leaves the parent
    /// unchanged.
    pub fn attach_child_group(&self, parent_id: &str, child_ids: &[String]) -> Result<()> {
        for child_id in child_ids {
            if !self.links.contains(child_id) {
                return Err(Error::NotFound(format!("referral link {}", child_id)));
            }
        }
        self.links.add_child_group(parent_id, child_ids.to_vec())
    }

    // ========================================================================
    // ACTIVATION
    // ========================================================================

    /// Mark a link active (idempotent)
    pub fn activate_link(&self, link_id: &str) -> Result<()> {
        self.links.set_active(link_id, true)
    }

    /// Mark a link inactive (idempotent)
    pub fn deactivate_link(&self, link_id: &str) -> Result<()> {
        self.links.set_active(link_id, false)
    }

    // ========================================================================
    // COMMISSION & CLICKS
    // ========================================================================

    /// Commission for an active link's subtree at its own product price
    pub fn get_commission(&self, link_id: &str) -> Result<f64> {
        let link = self.require_active(link_id)?;
        self.engine().calculate(&link.id, None)
    }

    /// Handle a click on an active link.
    ///
    /// The commission is computed first, then the click counter and the
    /// balance credit are applied, so a computation failure mutates nothing.
    /// The whole subtree's commission lands on the clicked link's own
    /// referrer.
    pub fn handle_click(&self, link_id: &str) -> Result<ClickOutcome> {
        let link = self.require_active(link_id)?;
        let commission = self.engine().calculate(&link.id, None)?;

        let clicks = self.links.record_click(&link.id)?;
        let referrer_balance = self.referrers.credit(&link.referrer_id, commission)?;

        Ok(ClickOutcome {
            clicks,
            referrer_balance,
        })
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    /// Flattened view of a link
    pub fn link_view(&self, link_id: &str) -> Result<LinkView> {
        let link = self
            .links
            .get(link_id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", link_id)))?;
        Ok(LinkView::from(&link))
    }

    /// Cloned snapshot of a referrer
    pub fn referrer(&self, id: &str) -> Option<Referrer> {
        self.referrers.get(id)
    }

    /// Cloned snapshot of a product
    pub fn product(&self, id: &str) -> Option<Product> {
        self.products.get(id)
    }

    /// All referrers (cloned)
    pub fn all_referrers(&self) -> Vec<Referrer> {
        self.referrers.all()
    }

    /// All products (cloned)
    pub fn all_products(&self) -> Vec<Product> {
        self.products.all()
    }

    /// All links as flattened views
    pub fn all_links(&self) -> Vec<LinkView> {
        self.links.all().iter().map(LinkView::from).collect()
    }

    /// Indented plain-text rendering of the subtree rooted at a link
    pub fn render_tree(&self, link_id: &str) -> Result<String> {
        TreeRenderer::new(&self.referrers, &self.products, &self.links).render(link_id)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn engine(&self) -> CommissionEngine<'_> {
        CommissionEngine::new(&self.referrers, &self.products, &self.links)
    }

    fn require_active(&self, link_id: &str) -> Result<ReferralLink> {
        let link = self
            .links
            .get(link_id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", link_id)))?;

        if !link.is_active {
            return Err(Error::Forbidden(format!(
                "referral link {} is not active",
                link_id
            )));
        }

        Ok(link)
    }
}

impl Default for ReferralService {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
