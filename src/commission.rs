// 💰 Commission Engine - recursive propagation over a referral tree
//
// Amount propagation is deliberately asymmetric:
// - a Single child is evaluated at the SAME base amount as its parent
// - every member of a Group entry is evaluated at amount * parent percentage
// The asymmetry mirrors the program's commercial terms; preserve it exactly.

use crate::entities::{ChildEntry, LinkRegistry, ProductRegistry, ReferralLink, ReferrerRegistry};
use crate::error::{Error, Result};

// ============================================================================
// COMMISSION ENGINE
// ============================================================================

/// Walks the subtree rooted at a link and accumulates commission.
///
/// The engine resolves ids through the registries on every step and never
/// consults `is_active`: activity gates the operation entry points, not the
/// math. Recursion has no depth limit and no cycle detection - children can
/// only reference links that already existed when the parent was assembled,
/// so acyclicity is an assumed invariant, not a runtime check.
pub struct CommissionEngine<'a> {
    referrers: &'a ReferrerRegistry,
    products: &'a ProductRegistry,
    links: &'a LinkRegistry,
}

impl<'a> CommissionEngine<'a> {
    pub fn new(
        referrers: &'a ReferrerRegistry,
        products: &'a ProductRegistry,
        links: &'a LinkRegistry,
    ) -> Self {
        CommissionEngine {
            referrers,
            products,
            links,
        }
    }

    /// Total commission for the subtree rooted at `link_id`.
    ///
    /// A `None` amount defaults to the root link's own product price. Every
    /// node contributes `amount * referral_percentage` plus its children:
    /// single children at the unchanged amount, group members at the amount
    /// pre-scaled by the node's own percentage.
    pub fn calculate(&self, link_id: &str, amount: Option<f64>) -> Result<f64> {
        let link = self.resolve(link_id)?;

        let amount = match amount {
            Some(amount) => amount,
            None => {
                let product = self.products.get(&link.product_id).ok_or_else(|| {
                    Error::NotFound(format!("product {}", link.product_id))
                })?;
                product.price
            }
        };

        self.calculate_subtree(&link, amount)
    }

    fn calculate_subtree(&self, link: &ReferralLink, amount: f64) -> Result<f64> {
        let referrer = self.referrers.get(&link.referrer_id).ok_or_else(|| {
            Error::NotFound(format!("referrer {}", link.referrer_id))
        })?;

        let mut commission = amount * referrer.referral_percentage;

        for entry in &link.children {
            match entry {
                ChildEntry::Single(child_id) => {
                    // Same-level pass-through: the child sees the parent's
                    // amount unchanged
                    let child = self.resolve(child_id)?;
                    commission += self.calculate_subtree(&child, amount)?;
                }
                ChildEntry::Group(members) => {
                    // Grouped children see the amount pre-scaled by the
                    // parent's own percentage
                    let scaled = amount * referrer.referral_percentage;
                    for member_id in members {
                        let member = self.resolve(member_id)?;
                        commission += self.calculate_subtree(&member, scaled)?;
                    }
                }
            }
        }

        Ok(commission)
    }

    fn resolve(&self, link_id: &str) -> Result<ReferralLink> {
        self.links
            .get(link_id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", link_id)))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Product, Referrer};

    struct Fixture {
        referrers: ReferrerRegistry,
        products: ProductRegistry,
        links: LinkRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                referrers: ReferrerRegistry::new(),
                products: ProductRegistry::new(),
                links: LinkRegistry::new(),
            }
        }

        fn referrer(&self, id: &str, percentage: f64) {
            self.referrers.insert(Referrer::new(
                id.to_string(),
                format!("Referrer {}", id),
                percentage,
            ));
        }

        fn product(&self, id: &str, price: f64) {
            self.products.insert(Product::new(
                id.to_string(),
                format!("Product {}", id),
                price,
            ));
        }

        fn link(&self, id: &str, referrer_id: &str, product_id: &str) {
            self.links.insert(ReferralLink::new(
                id.to_string(),
                referrer_id.to_string(),
                product_id.to_string(),
                0,
            ));
        }

        fn engine(&self) -> CommissionEngine<'_> {
            CommissionEngine::new(&self.referrers, &self.products, &self.links)
        }
    }

    #[test]
    fn test_leaf_link_pays_base_contribution() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");

        // No children: exactly amount * percentage
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 100.0);
    }

    #[test]
    fn test_explicit_amount_overrides_product_price() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");

        let commission = fx.engine().calculate("l1", Some(500.0)).unwrap();
        assert_eq!(commission, 50.0);
    }

    #[test]
    fn test_single_child_inherits_amount_unchanged() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.links.add_child("l1", "l2".to_string()).unwrap();

        // 1000*0.1 + 1000*0.05
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 150.0);
    }

    #[test]
    fn test_group_child_inherits_scaled_amount() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.links
            .add_child_group("l1", vec!["l2".to_string()])
            .unwrap();

        // 1000*0.1 + (1000*0.1)*0.05
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 105.0);
    }

    #[test]
    fn test_group_members_all_see_the_same_scaled_amount() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.referrer("c", 0.02);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.link("l3", "c", "x");
        fx.links
            .add_child_group("l1", vec!["l2".to_string(), "l3".to_string()])
            .unwrap();

        // 100 + 100*0.05 + 100*0.02
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert!((commission - 107.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_children_accumulate_in_order() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.referrer("c", 0.02);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.link("l3", "c", "x");
        fx.links.add_child("l1", "l2".to_string()).unwrap();
        fx.links
            .add_child_group("l1", vec!["l3".to_string()])
            .unwrap();

        // 100 + 50 + 100*0.02
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert!((commission - 152.0).abs() < 1e-9);
    }

    #[test]
    fn test_nested_groups_compound_the_scaling() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.referrer("c", 0.02);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.link("l3", "c", "x");
        // l3 grouped under l2, l2 grouped under l1
        fx.links
            .add_child_group("l2", vec!["l3".to_string()])
            .unwrap();
        fx.links
            .add_child_group("l1", vec!["l2".to_string()])
            .unwrap();

        // l1: 1000*0.1 = 100
        // l2 at 1000*0.1: 100*0.05 = 5
        // l3 at 100*0.05: 5*0.02 = 0.1
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert!((commission - 105.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_percentage_still_descends_into_children() {
        let fx = Fixture::new();
        fx.referrer("a", 0.0);
        fx.referrer("b", 0.05);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.links.add_child("l1", "l2".to_string()).unwrap();

        // Parent contributes 0 but the single child still sees 1000
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 50.0);
    }

    #[test]
    fn test_zero_percentage_zeroes_grouped_children() {
        let fx = Fixture::new();
        fx.referrer("a", 0.0);
        fx.referrer("b", 0.05);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.links
            .add_child_group("l1", vec!["l2".to_string()])
            .unwrap();

        // Grouped child sees 1000*0.0 = 0
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 0.0);
    }

    #[test]
    fn test_inactive_links_are_still_counted_by_the_engine() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.referrer("b", 0.05);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.link("l2", "b", "x");
        fx.links.add_child("l1", "l2".to_string()).unwrap();
        fx.links.set_active("l2", false).unwrap();

        // Activity gates the entry points, not the recursion
        let commission = fx.engine().calculate("l1", None).unwrap();
        assert_eq!(commission, 150.0);
    }

    #[test]
    fn test_unknown_root_fails_with_not_found() {
        let fx = Fixture::new();

        let result = fx.engine().calculate("missing", None);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_dangling_child_fails_with_not_found() {
        let fx = Fixture::new();
        fx.referrer("a", 0.1);
        fx.product("x", 1000.0);
        fx.link("l1", "a", "x");
        fx.links.add_child("l1", "ghost".to_string()).unwrap();

        let result = fx.engine().calculate("l1", None);
        assert!(result.unwrap_err().is_not_found());
    }
}
