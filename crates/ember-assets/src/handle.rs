//! RAII asset handles.
//!
//! A [`Handle`] owns exactly one reference to one record. Creating it
//! acquires the reference, cloning acquires another and dropping releases
//! it, so the handler's count always equals the number of live handles
//! (plus any raw `get_reference` calls).
//!
//! A handle also remembers which record it counted on. Once that record is
//! released, by [`AssetHandler::release_all`] for example, the handle goes
//! stale: cloning or dropping it no longer touches the count of a newer
//! record created under the same id.

use std::rc::Rc;

use ember_core::alloc::sparse_set::IndexSlot;

use crate::Asset;
use crate::handler::AssetHandler;
use crate::policy::{AssetId, AssetPolicy, DropTime, LoadStyle, LoadTime};

/// A counted reference to an asset of type `T`.
///
/// # Example
///
/// ```
/// use ember_assets::{AssetHandler, AssetLoader, AssetResult, Handle, LoadContext};
///
/// struct Text;
///
/// impl AssetLoader<String> for Text {
///     fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
///         Ok(ctx.text()?.to_string())
///     }
/// }
///
/// let handler = AssetHandler::new(Text);
/// let first = Handle::new(&handler, "missing.txt");
/// let second = first.clone();
/// assert_eq!(handler.ref_count("missing.txt"), 2);
///
/// // Loading fails, so the placeholder is served.
/// assert_eq!(*second.get_asset(), "");
///
/// drop(first);
/// drop(second);
/// assert!(!handler.contains("missing.txt"));
/// ```
pub struct Handle<T: Asset> {
    handler: AssetHandler<T>,
    id: AssetId,
    slot: IndexSlot,
}

impl<T: Asset> Handle<T> {
    /// Binds to `id` with the default policy: load on first use, read from
    /// a file, release when the last handle drops.
    pub fn new(handler: &AssetHandler<T>, id: impl Into<AssetId>) -> Self {
        Self::with_policy(handler, id, AssetPolicy::default())
    }

    pub fn with_policy(handler: &AssetHandler<T>, id: impl Into<AssetId>, policy: AssetPolicy) -> Self {
        let id = id.into();
        let slot = handler.acquire(id.clone(), policy);
        Self {
            handler: handler.clone(),
            id,
            slot,
        }
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn handler(&self) -> &AssetHandler<T> {
        &self.handler
    }

    /// `true` once the record this handle counted on has been released.
    pub fn is_stale(&self) -> bool {
        !self.handler.is_live(self.slot)
    }

    /// Re-binds to another id: the new reference is acquired before the old
    /// one is released, so re-binding to the same id never evicts it.
    pub fn set_id(&mut self, id: impl Into<AssetId>) {
        self.set_id_with_policy(id, AssetPolicy::default());
    }

    pub fn set_id_with_policy(&mut self, id: impl Into<AssetId>, policy: AssetPolicy) {
        let id = id.into();
        let slot = self.handler.acquire(id.clone(), policy);
        let old = std::mem::replace(&mut self.slot, slot);
        self.id = id;
        self.handler.drop_reference_at(old);
    }

    /// Returns the resource, loading it first if needed. A failed load or a
    /// stale handle yields the handler's placeholder.
    pub fn get_asset(&self) -> Rc<T> {
        self.handler.load_at(self.slot)
    }

    pub fn is_loaded(&self) -> bool {
        self.handler.is_loaded_at(self.slot)
    }

    /// References on this handle's record; `0` when stale.
    pub fn ref_count(&self) -> u32 {
        self.handler.ref_count_at(self.slot)
    }

    pub fn filename(&self) -> String {
        self.handler.filename(self.id.as_str())
    }

    pub fn set_filename(&self, filename: impl Into<String>) {
        self.handler.set_filename(self.id.as_str(), filename);
    }

    pub fn load_style(&self) -> LoadStyle {
        self.handler.load_style(self.id.as_str())
    }

    pub fn set_load_style(&self, style: LoadStyle) {
        self.handler.set_load_style(self.id.as_str(), style);
    }

    pub fn load_time(&self) -> LoadTime {
        self.handler.load_time(self.id.as_str())
    }

    pub fn set_load_time(&self, load_time: LoadTime) {
        self.handler.set_load_time(self.id.as_str(), load_time);
    }

    pub fn drop_time(&self) -> DropTime {
        self.handler.drop_time(self.id.as_str())
    }

    pub fn set_drop_time(&self, drop_time: DropTime) {
        self.handler.set_drop_time(self.id.as_str(), drop_time);
    }
}

impl<T: Asset> Clone for Handle<T> {
    fn clone(&self) -> Self {
        self.handler.add_reference_at(self.slot);
        Self {
            handler: self.handler.clone(),
            id: self.id.clone(),
            slot: self.slot,
        }
    }
}

impl<T: Asset> Drop for Handle<T> {
    fn drop(&mut self) {
        self.handler.drop_reference_at(self.slot);
    }
}

impl<T: Asset> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("type", &T::type_name())
            .field("id", &self.id)
            .field("stale", &self.is_stale())
            .finish()
    }
}

impl<T: Asset> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.slot == other.slot
    }
}

impl<T: Asset> Eq for Handle<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetResult;
    use crate::loader::LoadContext;
    use crate::AssetLoader;

    struct Upper;

    impl AssetLoader<String> for Upper {
        fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
            Ok(ctx.text()?.to_uppercase())
        }

        fn load_from_memory(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
            self.load_from_file(ctx)
        }
    }

    fn memory_handler() -> AssetHandler<String> {
        let handler = AssetHandler::new(Upper);
        handler.set_memory("a", b"alpha".to_vec());
        handler.set_memory("b", b"beta".to_vec());
        handler
    }

    fn memory() -> AssetPolicy {
        AssetPolicy::default().with_load_style(LoadStyle::Memory)
    }

    #[test]
    fn clone_and_drop_balance_the_count() {
        let handler = memory_handler();
        let handle = Handle::with_policy(&handler, "a", memory());
        let copies: Vec<_> = (0..3).map(|_| handle.clone()).collect();
        assert_eq!(handle.ref_count(), 4);

        drop(copies);
        assert_eq!(handle.ref_count(), 1);
        drop(handle);
        assert!(!handler.contains("a"));
    }

    #[test]
    fn set_id_moves_the_reference() {
        let handler = memory_handler();
        let mut handle = Handle::with_policy(&handler, "a", memory());
        handle.set_id_with_policy("b", memory());

        assert!(!handler.contains("a"));
        assert_eq!(handler.ref_count("b"), 1);
        assert_eq!(*handle.get_asset(), "BETA");
    }

    #[test]
    fn set_id_to_same_id_keeps_record() {
        let handler = memory_handler();
        let mut handle = Handle::with_policy(&handler, "a", memory());
        assert_eq!(*handle.get_asset(), "ALPHA");

        handle.set_id("a");
        assert!(handle.is_loaded());
        assert_eq!(handle.ref_count(), 1);
    }

    #[test]
    fn clone_from_reassigns_ownership() {
        let handler = memory_handler();
        let a = Handle::with_policy(&handler, "a", memory());
        let mut b = Handle::with_policy(&handler, "b", memory());

        b.clone_from(&a);
        assert!(!handler.contains("b"));
        assert_eq!(handler.ref_count("a"), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn accessors_forward_to_the_record() {
        let handler = memory_handler();
        let handle = Handle::new(&handler, "a");
        assert_eq!(handle.load_style(), LoadStyle::File);
        handle.set_load_style(LoadStyle::Memory);
        handle.set_filename("alpha.txt");
        handle.set_load_time(LoadTime::Now);

        assert_eq!(handle.filename(), "alpha.txt");
        assert_eq!(handle.load_time(), LoadTime::Now);
        assert_eq!(*handle.get_asset(), "ALPHA");
    }

    #[test]
    fn pinned_handle_keeps_record_after_drop() {
        let handler = memory_handler();
        let handle = Handle::with_policy(&handler, "a", memory());
        handle.set_drop_time(DropTime::AtExit);
        drop(handle);

        assert!(handler.contains("a"));
        assert_eq!(handler.drop_time("a"), DropTime::AtExit);
    }

    #[test]
    fn released_handles_leave_newer_records_alone() {
        let handler = memory_handler();
        let stale = Handle::with_policy(&handler, "a", memory());
        handler.release_all();
        assert!(stale.is_stale());

        let fresh = Handle::with_policy(&handler, "a", memory());
        let stale_copy = stale.clone();
        assert_eq!(fresh.ref_count(), 1);
        assert_eq!(stale_copy.ref_count(), 0);

        drop(stale);
        drop(stale_copy);
        assert!(handler.contains("a"));
        assert_eq!(fresh.ref_count(), 1);
        assert!(!fresh.is_stale());
        assert_eq!(*fresh.get_asset(), "ALPHA");

        drop(fresh);
        assert!(!handler.contains("a"));
    }

    #[test]
    fn stale_handle_serves_the_placeholder() {
        let handler = memory_handler();
        let stale = Handle::with_policy(&handler, "a", memory());
        handler.release_all();
        let _fresh = Handle::with_policy(&handler, "a", memory());

        assert_eq!(*stale.get_asset(), "");
        assert!(!stale.is_loaded());
    }
}
