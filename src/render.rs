// Tree Rendering - indented plain-text view of a referral subtree
//
// One line per node in depth-first order: referrer name, product name, and
// the node's commission at its own product price. Group members render at
// the same indent step as single children.

use crate::commission::CommissionEngine;
use crate::entities::{ChildEntry, LinkRegistry, ProductRegistry, ReferrerRegistry};
use crate::error::{Error, Result};

const INDENT_STEP: usize = 4;

/// Renders referral subtrees for console reporting.
pub struct TreeRenderer<'a> {
    referrers: &'a ReferrerRegistry,
    products: &'a ProductRegistry,
    links: &'a LinkRegistry,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(
        referrers: &'a ReferrerRegistry,
        products: &'a ProductRegistry,
        links: &'a LinkRegistry,
    ) -> Self {
        TreeRenderer {
            referrers,
            products,
            links,
        }
    }

    /// Render the subtree rooted at `link_id`, one indented line per node
    pub fn render(&self, link_id: &str) -> Result<String> {
        let mut out = String::new();
        self.render_node(link_id, 0, &mut out)?;
        Ok(out)
    }

    fn render_node(&self, link_id: &str, indent: usize, out: &mut String) -> Result<()> {
        let link = self
            .links
            .get(link_id)
            .ok_or_else(|| Error::NotFound(format!("referral link {}", link_id)))?;
        let referrer = self
            .referrers
            .get(&link.referrer_id)
            .ok_or_else(|| Error::NotFound(format!("referrer {}", link.referrer_id)))?;
        let product = self
            .products
            .get(&link.product_id)
            .ok_or_else(|| Error::NotFound(format!("product {}", link.product_id)))?;

        // Each node reports its own subtree commission at its own product price
        let engine = CommissionEngine::new(self.referrers, self.products, self.links);
        let commission = engine.calculate(link_id, None)?;

        out.push_str(&format!(
            "{:indent$}Referrer: {} ({}, commission: {:.2})\n",
            "",
            referrer.name,
            product.name,
            commission,
            indent = indent
        ));

        for entry in &link.children {
            match entry {
                ChildEntry::Single(child_id) => {
                    self.render_node(child_id, indent + INDENT_STEP, out)?;
                }
                ChildEntry::Group(members) => {
                    for member_id in members {
                        self.render_node(member_id, indent + INDENT_STEP, out)?;
                    }
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
