//! Per-type asset cache with reference counting.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ember_core::alloc::HashMap;
use ember_core::alloc::sparse_set::{IndexSlot, SparseSet};
use ember_core::profiling::profile_function;

use crate::Asset;
use crate::error::AssetError;
use crate::event::{AssetEvent, AssetEventBuffer};
use crate::io::{FileReader, MemoryReader};
use crate::loader::{AssetLoader, LoadContext};
use crate::policy::{AssetId, AssetPolicy, DropTime, LoadStyle, LoadTime};
use crate::record::AssetRecord;

struct HandlerInner<T: Asset> {
    records: SparseSet<AssetRecord<T>>,
    index: HashMap<AssetId, IndexSlot>,
    loader: Box<dyn AssetLoader<T>>,
    files: FileReader,
    memory: MemoryReader,
    dummy: Rc<T>,
    events: AssetEventBuffer,
}

impl<T: Asset> HandlerInner<T> {
    fn slot(&self, id: &str) -> Option<IndexSlot> {
        self.index.get(id).copied()
    }

    fn resource_of(&self, slot: IndexSlot) -> Rc<T> {
        self.records
            .try_get(slot)
            .and_then(|record| record.resource.clone())
            .unwrap_or_else(|| Rc::clone(&self.dummy))
    }

    /// Runs the load strategy selected by the record's style. No-op for a
    /// record that is already loaded.
    fn load(&mut self, slot: IndexSlot) -> bool {
        profile_function!();
        let HandlerInner {
            records,
            loader,
            files,
            memory,
            events,
            ..
        } = self;
        let Some(record) = records.try_get_mut(slot) else {
            return false;
        };
        if record.resource.is_some() {
            return true;
        }

        let result = match record.load_style {
            LoadStyle::File => {
                let path = Path::new(&record.filename);
                files.read_bytes(path).and_then(|bytes| {
                    let full_path = files.resolve_path(path);
                    loader.load_from_file(&LoadContext::new(&record.id, &full_path, &bytes))
                })
            }
            LoadStyle::Memory => memory.read_bytes(record.id.as_str()).and_then(|bytes| {
                let path = PathBuf::from(record.id.as_str());
                loader.load_from_memory(&LoadContext::new(&record.id, &path, bytes))
            }),
            LoadStyle::Network => loader.load_from_network(&record.id),
            LoadStyle::Unknown => Err(AssetError::Unsupported {
                id: record.id.to_string(),
                style: LoadStyle::Unknown,
            }),
        };

        match result {
            Ok(asset) => {
                record.resource = Some(Rc::new(asset));
                tracing::debug!("Loaded {} '{}'", T::type_name(), record.id);
                events.push(AssetEvent::Loaded {
                    id: record.id.clone(),
                    type_name: T::type_name(),
                });
                true
            }
            Err(error) => {
                tracing::error!("Unable to load {} '{}': {}", T::type_name(), record.id, error);
                events.push(AssetEvent::LoadFailed {
                    id: record.id.clone(),
                    type_name: T::type_name(),
                    error: error.to_string(),
                });
                false
            }
        }
    }

    fn evict(&mut self, slot: IndexSlot) {
        if let Some(record) = self.records.try_remove(slot) {
            self.index.remove(record.id.as_str());
            tracing::debug!("Released {} '{}'", T::type_name(), record.id);
            self.events.push(AssetEvent::Evicted {
                id: record.id,
                type_name: T::type_name(),
            });
        }
    }
}

/// Cache of all assets of type `T`.
///
/// Cloning an `AssetHandler` clones a reference to the same cache; the
/// [`AssetManager`](crate::AssetManager) and every [`Handle`](crate::Handle)
/// share it this way. Loaders run while the cache is borrowed, so a loader
/// must not call back into the handler it belongs to.
///
/// Queries on an unknown id never fail: they log a warning and return a
/// sentinel (`false`, `0`, an empty filename, [`LoadStyle::Unknown`],
/// [`DropTime::Unspecified`]).
pub struct AssetHandler<T: Asset> {
    inner: Rc<RefCell<HandlerInner<T>>>,
}

impl<T: Asset> Clone for AssetHandler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Asset> std::fmt::Debug for AssetHandler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AssetHandler")
            .field("type", &T::type_name())
            .field("records", &inner.records.len())
            .finish()
    }
}

impl<T: Asset> AssetHandler<T> {
    /// Creates a handler that resolves file paths against the working
    /// directory.
    pub fn new(loader: impl AssetLoader<T>) -> Self {
        Self::with_base_path(loader, ".")
    }

    pub fn with_base_path(loader: impl AssetLoader<T>, base_path: impl AsRef<Path>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HandlerInner {
                records: SparseSet::new(),
                index: HashMap::new(),
                loader: Box::new(loader),
                files: FileReader::new(base_path),
                memory: MemoryReader::new(),
                dummy: Rc::new(T::default()),
                events: AssetEventBuffer::new(),
            })),
        }
    }

    pub fn set_base_path(&self, base_path: impl AsRef<Path>) {
        self.inner.borrow_mut().files = FileReader::new(base_path);
    }

    pub fn base_path(&self) -> PathBuf {
        self.inner.borrow().files.base_path().to_path_buf()
    }

    /// Registers the buffer read by [`LoadStyle::Memory`] loads of `id`.
    pub fn set_memory(&self, id: impl AsRef<str>, bytes: Vec<u8>) {
        self.inner.borrow_mut().memory.insert(id, bytes);
    }

    /// Acquires a reference to `id`, creating its record with `policy` when
    /// the id is new. The policy of an existing record is left alone.
    ///
    /// With [`LoadTime::Now`] an unloaded record is loaded before returning.
    /// The returned resource is the placeholder while the record is not
    /// loaded.
    pub fn get_reference(&self, id: impl Into<AssetId>, policy: AssetPolicy) -> Rc<T> {
        let slot = self.acquire(id, policy);
        self.inner.borrow().resource_of(slot)
    }

    /// [`AssetHandler::get_reference`], returning the slot of the record the
    /// reference was taken on.
    pub(crate) fn acquire(&self, id: impl Into<AssetId>, policy: AssetPolicy) -> IndexSlot {
        profile_function!();
        let id = id.into();
        let mut inner = self.inner.borrow_mut();
        let slot = match inner.slot(id.as_str()) {
            Some(slot) => slot,
            None => {
                let slot = inner.records.push(AssetRecord::new(id.clone(), policy));
                inner.index.insert(id.clone(), slot);
                tracing::trace!("Created {} record '{}'", T::type_name(), id);
                slot
            }
        };

        let record = inner.records.get_mut(slot);
        record.ref_count = record.ref_count.saturating_add(1);
        if policy.load_time == LoadTime::Now && !record.is_loaded() {
            inner.load(slot);
        }
        slot
    }

    /// Adds one reference to the record in `slot`. A slot whose record was
    /// evicted is left alone, even if a new record now has the same id.
    pub(crate) fn add_reference_at(&self, slot: IndexSlot) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(record) = inner.records.try_get_mut(slot) else {
            tracing::warn!("add_reference: stale {} handle", T::type_name());
            return false;
        };
        record.ref_count = record.ref_count.saturating_add(1);
        true
    }

    /// Releases one reference. A record that reaches zero with
    /// [`DropTime::AtZero`] is evicted immediately.
    pub fn drop_reference(&self, id: &str) {
        let slot = self.inner.borrow().slot(id);
        match slot {
            Some(slot) => self.drop_reference_at(slot),
            None => tracing::warn!("drop_reference: unknown {} '{}'", T::type_name(), id),
        }
    }

    /// Releases one reference on the record in `slot`. Does nothing once
    /// that record has been evicted.
    pub(crate) fn drop_reference_at(&self, slot: IndexSlot) {
        let mut inner = self.inner.borrow_mut();
        let Some(record) = inner.records.try_get_mut(slot) else {
            tracing::trace!("drop_reference: stale {} handle", T::type_name());
            return;
        };
        if record.ref_count == 0 {
            tracing::warn!(
                "drop_reference: {} '{}' has no outstanding references",
                T::type_name(),
                record.id
            );
            return;
        }
        record.ref_count -= 1;
        if record.is_evictable() {
            inner.evict(slot);
        }
    }

    /// Whether `slot` still names a live record.
    pub(crate) fn is_live(&self, slot: IndexSlot) -> bool {
        self.inner.borrow().records.contains(slot)
    }

    pub(crate) fn is_loaded_at(&self, slot: IndexSlot) -> bool {
        self.inner
            .borrow()
            .records
            .try_get(slot)
            .is_some_and(|record| record.is_loaded())
    }

    pub(crate) fn ref_count_at(&self, slot: IndexSlot) -> u32 {
        self.inner
            .borrow()
            .records
            .try_get(slot)
            .map_or(0, |record| record.ref_count())
    }

    /// Loads the record in `slot` if needed and returns its resource, or
    /// the placeholder for a failed load or an evicted record.
    pub(crate) fn load_at(&self, slot: IndexSlot) -> Rc<T> {
        let mut inner = self.inner.borrow_mut();
        if inner.records.contains(slot) {
            inner.load(slot);
        }
        inner.resource_of(slot)
    }

    /// Loads `id` now regardless of its load time. Returns `true` when the
    /// record is loaded afterwards; calling it again on a loaded record does
    /// nothing.
    pub fn load_asset(&self, id: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.slot(id) {
            Some(slot) => inner.load(slot),
            None => {
                tracing::error!("load_asset: unknown {} '{}'", T::type_name(), id);
                false
            }
        }
    }

    /// The loaded resource for `id`, or the placeholder.
    pub fn resource(&self, id: &str) -> Rc<T> {
        let inner = self.inner.borrow();
        match inner.slot(id) {
            Some(slot) => inner.resource_of(slot),
            None => {
                tracing::warn!("resource: unknown {} '{}'", T::type_name(), id);
                Rc::clone(&inner.dummy)
            }
        }
    }

    /// The default-constructed placeholder served for unloaded records.
    pub fn dummy(&self) -> Rc<T> {
        Rc::clone(&self.inner.borrow().dummy)
    }

    fn read<R>(&self, id: &str, op: &str, missing: R, f: impl FnOnce(&AssetRecord<T>) -> R) -> R {
        let inner = self.inner.borrow();
        match inner.slot(id) {
            Some(slot) => f(inner.records.get(slot)),
            None => {
                tracing::warn!("{}: unknown {} '{}'", op, T::type_name(), id);
                missing
            }
        }
    }

    fn write(&self, id: &str, op: &str, f: impl FnOnce(&mut AssetRecord<T>)) {
        let mut inner = self.inner.borrow_mut();
        match inner.slot(id) {
            Some(slot) => f(inner.records.get_mut(slot)),
            None => tracing::warn!("{}: unknown {} '{}'", op, T::type_name(), id),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.borrow().index.contains_key(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        let inner = self.inner.borrow();
        inner
            .slot(id)
            .is_some_and(|slot| inner.records.get(slot).is_loaded())
    }

    pub fn ref_count(&self, id: &str) -> u32 {
        let inner = self.inner.borrow();
        inner
            .slot(id)
            .map_or(0, |slot| inner.records.get(slot).ref_count())
    }

    pub fn filename(&self, id: &str) -> String {
        self.read(id, "filename", String::new(), |record| record.filename.clone())
    }

    /// Changes the file read by the next file load. An already loaded
    /// resource is kept.
    pub fn set_filename(&self, id: &str, filename: impl Into<String>) {
        let filename = filename.into();
        self.write(id, "set_filename", |record| record.filename = filename);
    }

    pub fn load_style(&self, id: &str) -> LoadStyle {
        self.read(id, "load_style", LoadStyle::Unknown, |record| record.load_style)
    }

    pub fn set_load_style(&self, id: &str, style: LoadStyle) {
        if style == LoadStyle::Unknown {
            tracing::warn!("set_load_style: refusing to set Unknown on '{}'", id);
            return;
        }
        self.write(id, "set_load_style", |record| record.load_style = style);
    }

    pub fn load_time(&self, id: &str) -> LoadTime {
        self.read(id, "load_time", LoadTime::Later, |record| record.load_time)
    }

    pub fn set_load_time(&self, id: &str, load_time: LoadTime) {
        self.write(id, "set_load_time", |record| record.load_time = load_time);
    }

    pub fn drop_time(&self, id: &str) -> DropTime {
        self.read(id, "drop_time", DropTime::Unspecified, |record| record.drop_time)
    }

    /// Changes when the record is released. Switching an unreferenced
    /// record to [`DropTime::AtZero`] evicts it right away.
    pub fn set_drop_time(&self, id: &str, drop_time: DropTime) {
        if drop_time == DropTime::Unspecified {
            tracing::warn!("set_drop_time: refusing to set Unspecified on '{}'", id);
            return;
        }
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slot(id) else {
            tracing::warn!("set_drop_time: unknown {} '{}'", T::type_name(), id);
            return;
        };
        let record = inner.records.get_mut(slot);
        record.drop_time = drop_time;
        if record.is_evictable() {
            inner.evict(slot);
        }
    }

    pub fn policy(&self, id: &str) -> Option<AssetPolicy> {
        let inner = self.inner.borrow();
        inner.slot(id).map(|slot| inner.records.get(slot).policy())
    }

    pub fn ids(&self) -> Vec<AssetId> {
        self.inner.borrow().index.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every record, pinned or not. Returns how many were
    /// released.
    pub fn release_all(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let slots: Vec<IndexSlot> = inner.records.iter_slots().map(|(slot, _)| slot).collect();
        for &slot in &slots {
            let record = inner.records.get(slot);
            if record.ref_count > 0 {
                tracing::warn!(
                    "Releasing {} '{}' with {} outstanding references",
                    T::type_name(),
                    record.id,
                    record.ref_count
                );
            }
            inner.evict(slot);
        }
        slots.len()
    }

    pub fn take_events(&self) -> Vec<AssetEvent> {
        self.inner.borrow_mut().events.drain().collect()
    }
}
