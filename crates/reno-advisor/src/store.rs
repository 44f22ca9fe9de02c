//! House Store
//!
//! Session-scoped map from exact address to house. Clones of a store share
//! the same map, so the price lookup and the shell of one session always see
//! the latest save.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ValidationError;
use crate::model::House;

/// Whether a save added a house or replaced one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Replaced,
}

/// Shared handle to one session's houses
#[derive(Clone, Debug, Default)]
pub struct HouseStore {
    houses: Arc<RwLock<HashMap<String, House>>>,
}

impl HouseStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the three default listings
    pub fn seeded() -> Self {
        Self::from_houses(seed_houses())
    }

    pub fn from_houses(houses: impl IntoIterator<Item = House>) -> Self {
        let map = houses
            .into_iter()
            .map(|h| (h.address.clone(), h))
            .collect();
        Self {
            houses: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or overwrite a house; last write wins
    ///
    /// The address is trimmed. A blank address or a negative price leaves the
    /// store untouched.
    pub async fn save(&self, mut house: House) -> Result<SaveOutcome, ValidationError> {
        house.address = house.address.trim().to_string();

        if house.address.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        if house.price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }

        let address = house.address.clone();
        let previous = self.houses.write().await.insert(address.clone(), house);

        let outcome = if previous.is_some() {
            SaveOutcome::Replaced
        } else {
            SaveOutcome::Inserted
        };
        tracing::debug!(address = %address, ?outcome, "House saved");
        Ok(outcome)
    }

    /// Exact-match lookup
    pub async fn get(&self, address: &str) -> Option<House> {
        self.houses.read().await.get(address).cloned()
    }

    /// All houses sorted by address
    pub async fn houses(&self) -> Vec<House> {
        let mut houses: Vec<House> = self.houses.read().await.values().cloned().collect();
        houses.sort_by(|a, b| a.address.cmp(&b.address));
        houses
    }

    pub async fn len(&self) -> usize {
        self.houses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.houses.read().await.is_empty()
    }
}

/// Default listings every new session starts with
pub fn seed_houses() -> Vec<House> {
    vec![
        House::new("123 Main St", dec!(350000), 3, 2, 1500),
        House::new("456 Oak Ave", dec!(450000), 4, 3, 2000),
        House::new("789 Pine Rd", dec!(250000), 2, 1, 900),
    ]
}
