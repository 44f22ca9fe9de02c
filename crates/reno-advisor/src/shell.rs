//! Presentation Shell
//!
//! One session's view of the advisor: collects task input, guards it, runs the
//! agent and keeps what the page should display. House edits are independent
//! of the run state.
//!
//! ```text
//! Idle ──open──▶ CollectingInput ──submit──▶ Invoking ──▶ DisplayingResult
//!                  ▲     │ guard failed                └─▶ DisplayingError
//!                  │     ▼                                      │
//!                  └── CollectingInput{validation} ◀── submit ──┘
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::agent::{RenovationAgent, compose_prompt};
use crate::error::{AdvisorError, Result, ValidationError};
use crate::lookup::{PriceLookup, StorePriceLookup};
use crate::model::{House, TaskDependency, TaskOutput};
use crate::store::{HouseStore, SaveOutcome};

/// Where the task form is in its lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    CollectingInput { validation: Option<ValidationError> },
    Invoking,
    DisplayingResult(TaskOutput),
    DisplayingError(String),
}

/// Outcome of the last house edit, shown next to the sidebar form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HouseNotice {
    Saved { address: String, outcome: SaveOutcome },
    Rejected(ValidationError),
}

/// Raw house form fields as submitted
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HouseForm {
    pub address: String,
    pub price: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: String,
}

impl HouseForm {
    /// Parse the text fields into a house
    pub fn parse(&self) -> std::result::Result<House, ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        let price = Decimal::from_str(self.price.trim()).map_err(|_| invalid("Price", &self.price))?;

        Ok(House::new(
            self.address.trim(),
            price,
            parse_count("Bedrooms", &self.bedrooms)?,
            parse_count("Bathrooms", &self.bathrooms)?,
            parse_count("Square feet", &self.square_feet)?,
        ))
    }
}

fn invalid(field: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}

fn parse_count(field: &'static str, value: &str) -> std::result::Result<u32, ValidationError> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

/// Per-session presentation state
pub struct RenovationShell {
    store: HouseStore,
    lookup: Arc<dyn PriceLookup>,
    agent: Option<Arc<RenovationAgent>>,
    state: ShellState,
    last_task: String,
    last_address: Option<String>,
    house_notice: Option<HouseNotice>,
}

impl RenovationShell {
    /// Shell whose price lookup reads `store`
    ///
    /// `agent` is `None` when no provider credential is configured.
    pub fn new(store: HouseStore, agent: Option<Arc<RenovationAgent>>) -> Self {
        let lookup = Arc::new(StorePriceLookup::new(store.clone()));
        Self::with_lookup(store, lookup, agent)
    }

    pub fn with_lookup(
        store: HouseStore,
        lookup: Arc<dyn PriceLookup>,
        agent: Option<Arc<RenovationAgent>>,
    ) -> Self {
        Self {
            store,
            lookup,
            agent,
            state: ShellState::Idle,
            last_task: String::new(),
            last_address: None,
            house_notice: None,
        }
    }

    /// Show the input form
    pub fn open(&mut self) {
        if self.state == ShellState::Idle {
            self.state = ShellState::CollectingInput { validation: None };
        }
    }

    /// Validate the input and run one assessment
    ///
    /// A blank `address` means no address. Guard failures make no provider call
    /// and leave the shell collecting input with the validation message.
    pub async fn submit_task(&mut self, task: &str, address: Option<&str>) -> Result<TaskOutput> {
        let address = address.filter(|a| !a.trim().is_empty());
        self.last_task = task.to_string();
        self.last_address = address.map(String::from);

        let agent = match self.guard(task) {
            Ok(agent) => agent,
            Err(validation) => {
                tracing::warn!(error = %validation, "Task rejected");
                self.state = ShellState::CollectingInput {
                    validation: Some(validation.clone()),
                };
                return Err(validation.into());
            }
        };

        self.state = ShellState::Invoking;
        tracing::info!(address = ?address, provider = agent.provider_name(), "Running assessment");

        let deps = TaskDependency::new(address.map(String::from), Arc::clone(&self.lookup));
        let prompt = compose_prompt(task.trim(), address);

        match agent.run(&deps, &prompt).await {
            Ok(output) => {
                tracing::info!(
                    urgency = output.urgency,
                    pro_required = output.pro_required,
                    "Assessment ready"
                );
                self.state = ShellState::DisplayingResult(output.clone());
                Ok(output)
            }
            Err(e) => {
                tracing::error!(error = %e, "Assessment failed");
                let err = AdvisorError::from(e);
                self.state = ShellState::DisplayingError(err.user_message());
                Err(err)
            }
        }
    }

    fn guard(&self, task: &str) -> std::result::Result<Arc<RenovationAgent>, ValidationError> {
        if task.trim().is_empty() {
            return Err(ValidationError::EmptyTask);
        }
        self.agent.clone().ok_or(ValidationError::MissingCredential)
    }

    /// Save a house; the run state is untouched
    pub async fn save_house(&mut self, house: House) -> std::result::Result<SaveOutcome, ValidationError> {
        let result = self.store.save(house.clone()).await;
        self.record_notice(house.address.trim(), &result);
        result
    }

    /// Parse and save the sidebar form
    pub async fn save_form(&mut self, form: &HouseForm) -> std::result::Result<SaveOutcome, ValidationError> {
        match form.parse() {
            Ok(house) => self.save_house(house).await,
            Err(e) => {
                let result = Err(e);
                self.record_notice(form.address.trim(), &result);
                result
            }
        }
    }

    fn record_notice(&mut self, address: &str, result: &std::result::Result<SaveOutcome, ValidationError>) {
        self.house_notice = Some(match result {
            Ok(outcome) => HouseNotice::Saved {
                address: address.to_string(),
                outcome: *outcome,
            },
            Err(e) => {
                tracing::warn!(address, error = %e, "House rejected");
                HouseNotice::Rejected(e.clone())
            }
        });
    }

    pub const fn state(&self) -> &ShellState {
        &self.state
    }

    pub const fn store(&self) -> &HouseStore {
        &self.store
    }

    pub fn last_task(&self) -> &str {
        &self.last_task
    }

    pub fn last_address(&self) -> Option<&str> {
        self.last_address.as_deref()
    }

    pub const fn house_notice(&self) -> Option<&HouseNotice> {
        self.house_notice.as_ref()
    }

    /// Whether runs can reach a provider
    pub const fn has_agent(&self) -> bool {
        self.agent.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(address: &str, price: &str, bedrooms: &str) -> HouseForm {
        HouseForm {
            address: address.into(),
            price: price.into(),
            bedrooms: bedrooms.into(),
            bathrooms: "1".into(),
            square_feet: "800".into(),
        }
    }

    #[test]
    fn test_open_moves_idle_to_collecting() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);
        assert_eq!(shell.state(), &ShellState::Idle);

        shell.open();
        assert_eq!(shell.state(), &ShellState::CollectingInput { validation: None });
    }

    #[tokio::test]
    async fn test_empty_task_is_rejected() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);
        shell.open();

        let err = shell.submit_task("   ", Some("123 Main St")).await.unwrap_err();

        assert!(matches!(err, AdvisorError::Validation(ValidationError::EmptyTask)));
        assert_eq!(
            shell.state(),
            &ShellState::CollectingInput { validation: Some(ValidationError::EmptyTask) }
        );
        assert_eq!(shell.last_address(), Some("123 Main St"));
    }

    #[tokio::test]
    async fn test_missing_credential_blocks_run() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);

        let err = shell.submit_task("Paint the fence", None).await.unwrap_err();

        assert!(matches!(err, AdvisorError::Validation(ValidationError::MissingCredential)));
        assert!(!shell.has_agent());
        assert_eq!(shell.last_task(), "Paint the fence");
    }

    #[tokio::test]
    async fn test_blank_address_means_none() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);
        let _ = shell.submit_task("Paint the fence", Some("  ")).await;
        assert_eq!(shell.last_address(), None);
    }

    #[test]
    fn test_form_parsing() {
        let house = form(" 12 Elm St ", "125000.50", "2").parse().unwrap();
        assert_eq!(house.address, "12 Elm St");
        assert_eq!(house.price, dec!(125000.50));
        assert_eq!(house.num_bedrooms, 2);

        assert_eq!(form("", "1", "1").parse().unwrap_err(), ValidationError::EmptyAddress);
        assert_eq!(
            form("12 Elm St", "lots", "1").parse().unwrap_err(),
            ValidationError::InvalidNumber { field: "Price", value: "lots".into() }
        );
        assert!(matches!(
            form("12 Elm St", "1", "-2").parse().unwrap_err(),
            ValidationError::InvalidNumber { field: "Bedrooms", .. }
        ));
    }

    #[tokio::test]
    async fn test_save_form_records_notice_and_keeps_state() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);
        shell.open();

        let outcome = shell.save_form(&form("12 Elm St", "100000", "2")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Inserted);
        assert_eq!(
            shell.house_notice(),
            Some(&HouseNotice::Saved { address: "12 Elm St".into(), outcome: SaveOutcome::Inserted })
        );

        let err = shell.save_form(&form("   ", "100000", "2")).await.unwrap_err();
        assert_eq!(err, ValidationError::EmptyAddress);
        assert_eq!(shell.house_notice(), Some(&HouseNotice::Rejected(ValidationError::EmptyAddress)));

        assert_eq!(shell.store().len().await, 4);
        assert_eq!(shell.state(), &ShellState::CollectingInput { validation: None });
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_store() {
        let mut shell = RenovationShell::new(HouseStore::seeded(), None);
        let err = shell.save_form(&form("12 Elm St", "-10", "2")).await.unwrap_err();
        assert_eq!(err, ValidationError::NegativePrice);
        assert_eq!(shell.store().len().await, 3);
    }
}
