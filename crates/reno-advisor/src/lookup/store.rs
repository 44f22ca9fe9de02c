//! Store-backed Price Lookup
//!
//! Reads the session's house store on every call, with no caching, so a price
//! edited after the agent was built is what the next lookup returns.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::PriceLookup;
use crate::error::{AdvisorError, Result};
use crate::store::HouseStore;

/// Price lookup over a [`HouseStore`]
pub struct StorePriceLookup {
    store: HouseStore,
}

impl StorePriceLookup {
    pub const fn new(store: HouseStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PriceLookup for StorePriceLookup {
    async fn price_of(&self, address: &str) -> Result<Decimal> {
        let price = self.store.get(address).await.map(|h| h.price);
        tracing::debug!(address, found = price.is_some(), "House price lookup");
        price.ok_or_else(|| AdvisorError::NotFound(address.to_string()))
    }

    fn name(&self) -> &str {
        "HouseStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::House;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_price_of_known_address() {
        let lookup = StorePriceLookup::new(HouseStore::seeded());
        assert_eq!(lookup.price_of("123 Main St").await.unwrap(), dec!(350000));
        assert_eq!(lookup.price_of("789 Pine Rd").await.unwrap(), dec!(250000));
    }

    #[tokio::test]
    async fn test_near_misses_are_not_found() {
        let store = HouseStore::seeded();
        let lookup = StorePriceLookup::new(store.clone());

        for address in ["123 main st", " 123 Main St", "123 Main", "999 Unknown Ave", ""] {
            let err = lookup.price_of(address).await.unwrap_err();
            assert!(matches!(&err, AdvisorError::NotFound(a) if a == address));
        }
        assert_eq!(store.get("123 Main St").await.unwrap().price, dec!(350000));
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_sees_edits_made_after_construction() {
        let store = HouseStore::seeded();
        let lookup = StorePriceLookup::new(store.clone());

        store.save(House::new("123 Main St", dec!(375000), 3, 2, 1500)).await.unwrap();
        store.save(House::new("1 New Rd", dec!(99000), 1, 1, 400)).await.unwrap();

        assert_eq!(lookup.price_of("123 Main St").await.unwrap(), dec!(375000));
        assert_eq!(lookup.price_of("1 New Rd").await.unwrap(), dec!(99000));
    }

    #[test]
    fn test_not_found_message() {
        let err = AdvisorError::NotFound("999 Unknown Ave".into());
        assert_eq!(err.to_string(), "House not found: 999 Unknown Ave");
    }
}
