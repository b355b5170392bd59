//! Descriptor lookup by tag name.

use crate::descriptor::{BoundAttribute, TagDescriptor};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::sync::Arc;

/// Resolves the descriptors that may apply to a tag.
pub trait DescriptorLookup {
    /// Every descriptor with a rule for `tag_name` or for any tag, in registration order.
    ///
    /// Parent and attribute requirements are checked by the caller.
    fn resolve(&self, tag_name: &str) -> Vec<Arc<TagDescriptor>>;

    /// Attributes declared by a descriptor.
    fn attributes_of<'d>(&self, descriptor: &'d TagDescriptor) -> &'d [BoundAttribute] {
        &descriptor.bound_attributes
    }
}

impl<L: DescriptorLookup + ?Sized> DescriptorLookup for &L {
    fn resolve(&self, tag_name: &str) -> Vec<Arc<TagDescriptor>> {
        (**self).resolve(tag_name)
    }

    fn attributes_of<'d>(&self, descriptor: &'d TagDescriptor) -> &'d [BoundAttribute] {
        (**self).attributes_of(descriptor)
    }
}

/// A fixed set of descriptors.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descriptors: Vec<Arc<TagDescriptor>>,
}

impl DescriptorSet {
    /// Create a set from descriptors.
    pub fn new(descriptors: impl IntoIterator<Item = TagDescriptor>) -> Self {
        Self {
            descriptors: descriptors.into_iter().map(Arc::new).collect(),
        }
    }

    /// Add a descriptor.
    pub fn push(&mut self, descriptor: TagDescriptor) {
        self.descriptors.push(Arc::new(descriptor));
    }

    /// Every descriptor, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TagDescriptor>> {
        self.descriptors.iter()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Extend<TagDescriptor> for DescriptorSet {
    fn extend<T: IntoIterator<Item = TagDescriptor>>(&mut self, iter: T) {
        self.descriptors.extend(iter.into_iter().map(Arc::new));
    }
}

impl DescriptorLookup for DescriptorSet {
    fn resolve(&self, tag_name: &str) -> Vec<Arc<TagDescriptor>> {
        self.descriptors
            .iter()
            .filter(|d| d.rules.iter().any(|r| r.matches_tag_name(tag_name)))
            .cloned()
            .collect()
    }
}

/// Caches the results of another lookup per tag name.
///
/// One instance serves one document; it is not shared across threads.
#[derive(Debug)]
pub struct MemoizedLookup<L> {
    inner: L,
    cache: RefCell<FxHashMap<SmolStr, Vec<Arc<TagDescriptor>>>>,
}

impl<L: DescriptorLookup> MemoizedLookup<L> {
    /// Wrap a lookup.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Number of tag names resolved so far.
    pub fn cached_tags(&self) -> usize {
        self.cache.borrow().len()
    }

    /// The wrapped lookup.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: DescriptorLookup> DescriptorLookup for MemoizedLookup<L> {
    fn resolve(&self, tag_name: &str) -> Vec<Arc<TagDescriptor>> {
        let key = SmolStr::new(tag_name.to_ascii_lowercase());
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }
        let resolved = self.inner.resolve(tag_name);
        tracing::trace!(tag = tag_name, count = resolved.len(), "resolved descriptors");
        self.cache.borrow_mut().insert(key, resolved.clone());
        resolved
    }

    fn attributes_of<'d>(&self, descriptor: &'d TagDescriptor) -> &'d [BoundAttribute] {
        self.inner.attributes_of(descriptor)
    }
}
