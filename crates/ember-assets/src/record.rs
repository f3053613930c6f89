//! Per-id bookkeeping held inside an [`AssetHandler`](crate::AssetHandler).

use std::rc::Rc;

use crate::policy::{AssetId, AssetPolicy, DropTime, LoadStyle, LoadTime};

/// One cached asset.
///
/// `resource` is `None` until a load succeeds; readers are handed the
/// handler's placeholder in the meantime.
#[derive(Debug)]
pub struct AssetRecord<T> {
    pub(crate) id: AssetId,
    pub(crate) resource: Option<Rc<T>>,
    pub(crate) ref_count: u32,
    pub(crate) load_time: LoadTime,
    pub(crate) load_style: LoadStyle,
    pub(crate) drop_time: DropTime,
    pub(crate) filename: String,
}

impl<T> AssetRecord<T> {
    pub(crate) fn new(id: AssetId, policy: AssetPolicy) -> Self {
        Self {
            filename: id.as_str().to_string(),
            id,
            resource: None,
            ref_count: 0,
            load_time: policy.load_time,
            load_style: policy.load_style,
            drop_time: policy.drop_time,
        }
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn is_loaded(&self) -> bool {
        self.resource.is_some()
    }

    pub fn load_time(&self) -> LoadTime {
        self.load_time
    }

    pub fn load_style(&self) -> LoadStyle {
        self.load_style
    }

    pub fn drop_time(&self) -> DropTime {
        self.drop_time
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn policy(&self) -> AssetPolicy {
        AssetPolicy::new(self.load_time, self.load_style, self.drop_time)
    }

    /// Whether the record should be evicted now that nobody references it.
    pub(crate) fn is_evictable(&self) -> bool {
        self.ref_count == 0 && self.drop_time == DropTime::AtZero
    }
}
