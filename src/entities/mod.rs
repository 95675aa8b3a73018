// Entity Models - referrers, products, referral links
//
// Each entity has:
// - Stable identity (generated string id) that never changes
// - A registry owning the id → entity map for lookups and mutation

pub mod link;
pub mod product;
pub mod referrer;

pub use link::{ChildEntry, LinkRegistry, ReferralLink};
pub use product::{Product, ProductRegistry};
pub use referrer::{Referrer, ReferrerRegistry};
