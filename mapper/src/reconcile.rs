//! Collection reconciliation

use crate::bean::CollectionSlot;
use crate::bean::CollectionStrategy;
use crate::bean::PropertyView;
use crate::bean::PropertyViewMut;
use crate::error::Result;

/// Fills one freshly instantiated target element from one source element. Returns
/// whether the element should be kept.
pub type MapElement<'f> =
    dyn FnMut(&PropertyView<'_>, PropertyViewMut<'_>) -> Result<bool> + 'f;

/// Reconcile `target` with the mapped `elements`
///
/// [`Replace`](CollectionStrategy::Replace) installs a fresh collection instance;
/// [`ClearAndRefill`](CollectionStrategy::ClearAndRefill) empties the existing one in
/// place. Either way every source element is then mapped into a new target element
/// and appended. Returns the number of elements appended.
pub fn reconcile(
    target: &mut dyn CollectionSlot,
    elements: &[PropertyView<'_>],
    strategy: CollectionStrategy,
    map_element: &mut MapElement<'_>,
) -> Result<usize> {
    match strategy {
        CollectionStrategy::Replace => target.reset(elements.len()),
        CollectionStrategy::ClearAndRefill => target.clear(),
    }

    let mut appended = 0;
    for element in elements {
        if target.push_with(&mut |slot: PropertyViewMut<'_>| map_element(element, slot))? {
            appended += 1;
        }
    }

    tracing::trace!(
        kind = %target.kind(),
        %strategy,
        source_elements = elements.len(),
        appended,
        "Reconciled collection"
    );
    Ok(appended)
}
