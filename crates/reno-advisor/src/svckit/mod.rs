//! Service Kit - Agent Tools
//!
//! Tools that implement `agent_core::Tool<TaskDependency>` for the renovation advisor.

mod house_price;

pub use house_price::HousePriceTool;
