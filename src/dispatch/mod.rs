//! Extension dispatch: runs addon and regime hooks over every node of a
//! document.
//!
//! The walkers know the document shape; addons only know the node kinds
//! they care about. Each addon matches on [`Node`] / [`NodeMut`] and
//! ignores every other kind.

mod node;
mod walk;

pub use node::{Node, NodeKind, NodeMut};
pub use walk::{node_count, walk, walk_mut};

use tracing::{debug, trace};

use crate::core::{Invoice, ValidationError};
use crate::tax::{AddonDef, Regime};

/// Run every addon's normalizer over the whole document, one full pass per
/// addon, in the order given.
pub fn normalize(invoice: &mut Invoice, addons: &[&AddonDef]) {
    for addon in addons {
        if addon.normalizer.is_none() {
            continue;
        }
        let mut visited = 0usize;
        walk_mut(invoice, &mut |node| {
            visited += 1;
            addon.normalize(node);
        });
        debug!(addon = %addon.key, nodes = visited, "normalize pass");
    }
}

/// Run every addon validator and the regime's object validator on every
/// node. Failures are re-rooted at the node's field path and attributed to
/// the addon key or regime country.
pub fn validate(
    invoice: &Invoice,
    addons: &[&AddonDef],
    regime: Option<&Regime>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut found = Vec::new();
    walk(invoice, &mut |path, node| {
        for addon in addons {
            addon.validate(node, &mut found);
            for e in found.drain(..) {
                trace!(addon = %addon.key, path, kind = ?node.kind(), "validation failed");
                errors.push(e.nested(path, &addon.key));
            }
        }
        if let Some(regime) = regime {
            regime.validate_object(node, &mut found);
            for e in found.drain(..) {
                trace!(regime = %regime.country, path, kind = ?node.kind(), "validation failed");
                errors.push(e.nested(path, &regime.country));
            }
        }
    });
    debug!(
        addons = addons.len(),
        errors = errors.len(),
        "validate pass"
    );
    errors
}
