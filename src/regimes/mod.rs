//! Built-in tax regimes.
//!
//! Each regime is plain data plus an optional validator. Register them
//! with [`RegistryBuilder::regime`](crate::tax::RegistryBuilder::regime),
//! or take them all through [`Registry::with_defaults`](crate::tax::Registry::with_defaults).

pub mod gr;
pub mod nl;

use crate::tax::Regime;

/// Every built-in regime.
pub fn all() -> Vec<Regime> {
    vec![gr::regime(), nl::regime()]
}
