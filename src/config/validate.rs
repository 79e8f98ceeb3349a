//! Validation pass.

use std::collections::HashSet;

use tracing::trace;

use super::coerce::Coerce;
use super::path::FieldPath;
use super::section::{Field, NodeId, Section, Visitor};
use super::ConfigError;

/// Runs every validator in the tree, root first, then children in declaration order.
///
/// Stops at the first failure and reports it with the failing record's path.
/// A validator reachable through more than one field runs once.
pub fn validate(root: &mut dyn Section) -> Result<(), ConfigError> {
    let mut dispatcher = Dispatcher {
        path: FieldPath::root(),
        seen: HashSet::new(),
    };
    dispatcher.node(root)
}

struct Dispatcher {
    path: FieldPath,
    seen: HashSet<NodeId>,
}

impl Dispatcher {
    fn node(&mut self, node: &mut dyn Section) -> Result<(), ConfigError> {
        if let Some(validator) = node.validator() {
            let first_visit = validator.id().map_or(true, |id| self.seen.insert(id));
            if first_visit {
                trace!(path = %self.path, "validating section");
                validator
                    .run()
                    .map_err(|source| ConfigError::Validation {
                        path: self.path.clone(),
                        source,
                    })?;
            }
        }
        node.visit(self)
    }
}

impl Visitor for Dispatcher {
    fn value(&mut self, _field: Field, _value: &mut dyn Coerce) -> Result<(), ConfigError> {
        Ok(())
    }

    fn section(
        &mut self,
        field: Field,
        section: Option<&mut dyn Section>,
    ) -> Result<(), ConfigError> {
        let Some(section) = section else {
            return Ok(());
        };
        self.path.push(field.name);
        let result = self.node(section);
        self.path.pop();
        result
    }
}
