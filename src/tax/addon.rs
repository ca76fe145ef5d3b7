use super::scenario::ScenarioSet;
use super::tag::TagDefinition;
use crate::core::{Key, ValidationError};
use crate::dispatch::{Node, NodeMut};

/// Mutates a node an addon recognises. Unrecognised kinds are ignored.
pub type Normalizer = fn(NodeMut<'_>);

/// Checks a node an addon recognises, pushing one error per failing
/// field. Unrecognised kinds pass.
pub type Validator = fn(Node<'_>, &mut Vec<ValidationError>);

/// An opt-in rule module, such as a standard, applied on top of a regime.
///
/// Each addon supplies its own `match` over the node kinds it cares about
/// in `normalizer` and `validator`; the dispatch engine calls them for
/// every node of every document that lists the addon's key.
#[derive(Debug, Clone)]
pub struct AddonDef {
    pub key: Key,
    pub name: String,
    pub description: String,
    /// Extra document tags the addon recognises.
    pub tags: Vec<TagDefinition>,
    pub scenarios: Vec<ScenarioSet>,
    pub normalizer: Option<Normalizer>,
    pub validator: Option<Validator>,
}

impl AddonDef {
    pub fn scenario_set(&self, schema: &str) -> Option<&ScenarioSet> {
        self.scenarios.iter().find(|s| s.schema == schema)
    }

    pub fn tag(&self, key: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.key == key)
    }

    pub fn normalize(&self, node: NodeMut<'_>) {
        if let Some(normalize) = self.normalizer {
            normalize(node);
        }
    }

    pub fn validate(&self, node: Node<'_>, errors: &mut Vec<ValidationError>) {
        if let Some(validate) = self.validator {
            validate(node, errors);
        }
    }
}
