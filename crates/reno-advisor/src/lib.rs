//! # reno-advisor
//!
//! Home renovation advisor: assesses a free-text task, decides whether a
//! professional contractor is needed and how urgent it is, and can look up the
//! price of a listed house while it reasons.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐  TaskDependency   ┌──────────────────┐
//! │ RenovationShell  │──────────────────▶│ RenovationAgent  │
//! │ (one per session)│◀──── TaskOutput ──│ Agent<Dep, Out>  │
//! └────────┬─────────┘                   └────────┬─────────┘
//!          │ owns                                 │ house_price tool
//!          ▼                                      ▼
//! ┌──────────────────┐     reads         ┌──────────────────┐
//! │    HouseStore    │◀──────────────────│   PriceLookup    │
//! └──────────────────┘                   └──────────────────┘
//! ```

pub mod agent;
pub mod error;
pub mod lookup;
pub mod model;
pub mod shell;
pub mod store;
pub mod svckit;

pub use agent::{RENOVATION_PROMPT, RefinerOptions, RenovationAgent, compose_prompt, refiner_agent, refiner_agent_with};
pub use error::{AdvisorError, Result, ValidationError};
pub use lookup::{PriceLookup, StorePriceLookup};
pub use model::{House, TaskDependency, TaskOutput, URGENCY_RANGE};
pub use shell::{HouseForm, HouseNotice, RenovationShell, ShellState};
pub use store::{HouseStore, SaveOutcome, seed_houses};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::HousePriceTool;
}
