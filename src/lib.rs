//! Daily simulation core for a multi-farm agricultural community sharing
//! water, energy and food-processing infrastructure.

pub mod aquifer;
pub mod crop;
pub mod data;
pub mod energy;
pub mod error;
pub mod events;
pub mod inventory;
pub mod metrics;
pub mod policies;
pub mod records;
pub mod scenario;
pub mod simulation;
pub mod state;
pub mod types;

pub use data::{DataProvider, DataSet, InMemoryDataProvider};
pub use error::{SimError, SimResult};
pub use records::SimulationResults;
pub use scenario::Scenario;
pub use simulation::Simulation;

#[cfg(test)]
mod energy_test;
#[cfg(test)]
mod policies_test;
#[cfg(test)]
mod scenario_test;
