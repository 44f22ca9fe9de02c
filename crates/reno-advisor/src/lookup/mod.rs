//! Price Lookup
//!
//! The capability the `house_price` tool depends on: resolve an address to a
//! price or report that it is unknown.

mod store;

pub use store::StorePriceLookup;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

/// Price lookup trait (Strategy pattern)
///
/// Lookups are exact-match: no case folding, trimming or partial matches.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Current price of the house at `address`, or `AdvisorError::NotFound`
    async fn price_of(&self, address: &str) -> Result<Decimal>;

    /// Lookup backend name
    fn name(&self) -> &str;
}
