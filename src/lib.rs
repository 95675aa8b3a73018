// Referral Program - Core Library
// Multi-level referral commissions propagated over a tree of referral links.
// Exposes all modules for use in the CLI demo, API server, and tests.

pub mod commission;
pub mod entities;
pub mod error;
pub mod ids;
pub mod render;
pub mod service;

// Re-export commonly used types
pub use commission::CommissionEngine;
pub use entities::{
    ChildEntry, LinkRegistry, Product, ProductRegistry, ReferralLink, Referrer, ReferrerRegistry,
};
pub use error::{Error, Result};
pub use ids::{IdGenerator, SequentialGenerator, UuidGenerator};
pub use render::TreeRenderer;
pub use service::{ClickOutcome, LinkView, ReferralService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
