//! Built-in addons.
//!
//! An addon is enabled per document by listing its key in
//! [`Invoice::addons`](crate::core::Invoice::addons).

pub mod en16931;

use crate::tax::AddonDef;

/// Every built-in addon.
pub fn all() -> Vec<AddonDef> {
    vec![en16931::addon()]
}
