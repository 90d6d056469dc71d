//! Folding lowered pipeline items into one connected fragment.

use crate::error::{Error, Result};
use crate::ir::{Fragment, Lowered};

/// Merge lowered pipeline items, left to right, into a single fragment.
///
/// Tree nodes are wrapped as opaque single-element fragments first; the
/// boundaries around them stay unbound.
pub fn merge_pipeline(items: Vec<Lowered>) -> Result<Fragment> {
    let count = items.len();
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return Err(Error::invariant("pipeline merge produced no fragment"));
    };
    let mut merged = into_fragment(first);
    for item in items {
        merged.splice(into_fragment(item));
    }
    log::debug!("merged {count} pipeline items into {} stages", merged.len());
    Ok(merged)
}

fn into_fragment(item: Lowered) -> Fragment {
    match item {
        Lowered::Fragment(f) => f,
        Lowered::Tree(t) => {
            log::debug!("pipeline item is not a command; wrapping with unbound channels");
            Fragment::opaque(t)
        }
    }
}
