use std::collections::BTreeSet;

use crate::types::DiffResult;

/// Splits table names into new, existing and orphaned.
///
/// `new` and `existing` partition the model tables. `orphaned` holds live
/// tables under `prefix` that the model does not mention; live tables outside
/// the prefix are ignored.
pub fn diff_tables<'a, M, L>(model_tables: M, live_tables: L, prefix: &str) -> DiffResult
where
    M: IntoIterator<Item = &'a str>,
    L: IntoIterator<Item = &'a str>,
{
    let model: BTreeSet<&str> = model_tables.into_iter().collect();
    let live: BTreeSet<&str> = live_tables.into_iter().collect();

    let owned = |names: Vec<&&str>| -> BTreeSet<String> {
        names.into_iter().map(|n| n.to_string()).collect()
    };

    DiffResult {
        new: owned(model.difference(&live).collect()),
        existing: owned(model.intersection(&live).collect()),
        orphaned: owned(
            live.difference(&model)
                .filter(|t| t.starts_with(prefix))
                .collect(),
        ),
    }
}
