use std::collections::BTreeSet;

use serde::Serialize;

/// Partition of table names between the model file and the live schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// In the model, absent from the database.
    pub new: BTreeSet<String>,
    /// In the model and in the database.
    pub existing: BTreeSet<String>,
    /// In the database under the prefix, absent from the model. Never dropped.
    pub orphaned: BTreeSet<String>,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        !self.new.is_empty() || !self.existing.is_empty()
    }

    /// Tables the import touches, in name order.
    pub fn affected(&self) -> Vec<String> {
        self.new.union(&self.existing).cloned().collect()
    }
}
