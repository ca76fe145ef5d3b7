//! Tax rules: tags, combos, regimes, addons, scenarios and tax totals.
//!
//! Regimes and addons are plain data registered once in a [`Registry`]
//! and read by every calculation.

mod addon;
mod combo;
mod regime;
mod registry;
pub mod scenario;
mod tag;
mod total;

pub use addon::*;
pub use combo::*;
pub use regime::*;
pub use registry::*;
pub use scenario::{Scenario, ScenarioSet, ScenarioSummary};
pub use tag::*;
pub use total::*;
