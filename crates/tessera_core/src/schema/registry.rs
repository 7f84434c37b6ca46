//! # Layout Registry
//!
//! Process-wide cache of [`SchemaLayout`]s keyed by record type, so the
//! schema walk runs once per record type no matter how many stores use it.
//! Registered layouts are leaked and live for the rest of the process.

use std::any::TypeId;
use std::collections::HashMap;

use parking_lot::RwLock;

use super::layout::SchemaLayout;
use super::reflect::Record;
use crate::error::StoreResult;

type LayoutTable = HashMap<TypeId, &'static SchemaLayout>;

static REGISTRY: RwLock<Option<LayoutTable>> = parking_lot::const_rwlock(None);

/// Returns the layout of `R`, building and registering it on first use.
///
/// A layout that fails validation is not cached; every call for that record
/// reports the same schema violation.
pub fn layout_of<R: Record>() -> StoreResult<&'static SchemaLayout> {
    let key = TypeId::of::<R>();

    let cached = REGISTRY
        .read()
        .as_ref()
        .and_then(|table| table.get(&key).copied());
    if let Some(layout) = cached {
        return Ok(layout);
    }

    let layout = SchemaLayout::build::<R>().inspect_err(|err| {
        tracing::warn!(schema = std::any::type_name::<R>(), %err, "rejected record schema");
    })?;

    let mut guard = REGISTRY.write();
    let table = guard.get_or_insert_with(HashMap::new);
    // Another thread may have registered it while we were building.
    let registered = *table.entry(key).or_insert_with(|| {
        tracing::debug!(
            schema = layout.name(),
            leaves = layout.leaf_count(),
            structured_view = layout.has_structured_view(),
            "registered record schema"
        );
        Box::leak(Box::new(layout))
    });
    Ok(registered)
}

/// Whether `R`'s layout has already been registered.
#[must_use]
pub fn is_registered<R: Record>() -> bool {
    REGISTRY
        .read()
        .as_ref()
        .is_some_and(|table| table.contains_key(&TypeId::of::<R>()))
}

/// Number of record types registered so far.
#[must_use]
pub fn registered_count() -> usize {
    REGISTRY.read().as_ref().map_or(0, HashMap::len)
}
