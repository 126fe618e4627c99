// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Stage-indexed cache of shader resource bindings.
//!
//! A [`ShaderResourceCache`] records which constant buffers, views and samplers are bound to
//! which slots of which shader stages, together with the native handles needed to bind them.
//! The owning pipeline fills it through the `set_*` operations as shader variables are resolved.
//! At draw or dispatch time the device context diffs it against the handles it last submitted
//! with the `bind_*` operations, which report the contiguous range of slots that changed.
//!
//! # Example
//!
//! ```
//! use shader_resource_cache::cache::{ResourceCacheContentType, ShaderResourceCache};
//! use shader_resource_cache::cache::ranges::ShaderResourceViews;
//! use shader_resource_cache::range::{ResourceRange, ShaderResourceCounters};
//! use shader_resource_cache::stages::{ResourceBindPoints, ShaderStage};
//!
//! let counters = ShaderResourceCounters::new()
//!     .with(ResourceRange::ShaderResourceView, ShaderStage::Pixel, 2);
//! let cache = ShaderResourceCache::new(ResourceCacheContentType::Resources, &counters, None)
//!     .expect("layout fits");
//!
//! let bind_points = ResourceBindPoints::single(ShaderStage::Pixel, 1);
//! assert!(!cache.is_resource_bound::<ShaderResourceViews>(&bind_points));
//! assert_eq!(cache.srv_count(ShaderStage::Pixel), 2);
//! ```

pub mod bind;
pub mod entries;
pub mod layout;
pub mod ranges;
mod storage;
pub mod transition;

use crate::bittricks::slot_bit;
use crate::error::Error;
use crate::range::{ResourceRange, ShaderResourceCounters};
use crate::resources::{Buffer, Sampler, ShaderView};
use crate::stages::{NUM_SHADER_STAGES, ResourceBindPoints, ShaderStage};
use entries::CachedEntry;
use layout::ResourceSlotLayout;
use ranges::{CacheRange, ConstantBuffers, Samplers, ShaderResourceViews, UnorderedAccessViews};
use std::sync::Arc;
use storage::{DynamicCbMasks, RangeTables};

pub use bind::{CommittedConstantBuffers, SlotRange};
pub use entries::{CachedConstantBuffer, CachedSampler, CachedView, ConstantBufferWindow, ViewOwner};
pub use transition::StateTransitionMode;

/// Constant buffers can only be bound at offsets that are a multiple of this.
pub const CONSTANT_BUFFER_OFFSET_ALIGNMENT: u32 = 256;

/// Constant buffer slots per stage. Bounded by the width of the dynamic offset masks.
pub const MAX_CONSTANT_BUFFER_SLOTS: u32 = 14;

static_assertions::const_assert!(MAX_CONSTANT_BUFFER_SLOTS <= u16::BITS);

/// What kind of bindings a cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCacheContentType {
    /// Static bindings of a resource signature, used as a template for instance caches.
    Signature,
    /// Bindings of one shader resource binding instance.
    Resources,
}

/// Bindings of every shader stage of one pipeline resource binding object.
///
/// The cache is laid out once for a resource-count profile and keeps that shape for its lifetime.
/// Resources are held by shared reference and released when their slot is overwritten or the
/// cache is dropped.
///
/// The cache does no locking. Calls on one instance must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct ShaderResourceCache {
    content_type: ResourceCacheContentType,
    layout: ResourceSlotLayout,
    tables: RangeTables,
    dynamic_cbs: DynamicCbMasks,
}

impl ShaderResourceCache {
    /// Bytes of binding storage a cache with the given resource counts requires.
    pub fn required_memory_size(counters: &ShaderResourceCounters) -> Result<usize, Error> {
        ResourceSlotLayout::required_size(counters)
    }

    /// Creates an empty cache laid out for `counters`.
    ///
    /// `dynamic_cb_slots` marks, per stage, the constant buffer slots that may take dynamic
    /// offsets. Every slot starts unbound.
    pub fn new(
        content_type: ResourceCacheContentType,
        counters: &ShaderResourceCounters,
        dynamic_cb_slots: Option<&[u16; NUM_SHADER_STAGES]>,
    ) -> Result<Self, Error> {
        for stage in ShaderStage::ALL {
            let count = counters.get(ResourceRange::ConstantBuffer, stage);
            if count > MAX_CONSTANT_BUFFER_SLOTS {
                return Err(Error::TooManyConstantBuffers {
                    stage,
                    count,
                    max: MAX_CONSTANT_BUFFER_SLOTS,
                });
            }
        }
        let layout = ResourceSlotLayout::new(counters)?;

        let mut dynamic_cbs = DynamicCbMasks::default();
        if let Some(slots) = dynamic_cb_slots {
            for stage in ShaderStage::ALL {
                //slots past the stage's buffer count can never be bound
                let count = layout.resource_count(ResourceRange::ConstantBuffer, stage);
                let valid = slot_bit(count).wrapping_sub(1);
                dynamic_cbs.slots[stage.index()] = slots[stage.index()] & valid;
            }
        }

        logwise::trace_sync!(
            "ShaderResourceCache::new: {bytes} bytes, {cbs} CBs, {srvs} SRVs, {samplers} samplers, {uavs} UAVs",
            bytes = layout.total_size(),
            cbs = counters.total(ResourceRange::ConstantBuffer),
            srvs = counters.total(ResourceRange::ShaderResourceView),
            samplers = counters.total(ResourceRange::Sampler),
            uavs = counters.total(ResourceRange::UnorderedAccessView)
        );

        Ok(ShaderResourceCache {
            content_type,
            tables: RangeTables::new(&layout),
            layout,
            dynamic_cbs,
        })
    }

    pub fn content_type(&self) -> ResourceCacheContentType {
        self.content_type
    }

    pub fn layout(&self) -> &ResourceSlotLayout {
        &self.layout
    }

    pub fn resource_count<R: CacheRange>(&self, stage: ShaderStage) -> u32 {
        self.layout.resource_count(R::RANGE, stage)
    }

    pub fn cb_count(&self, stage: ShaderStage) -> u32 {
        self.resource_count::<ConstantBuffers>(stage)
    }

    pub fn srv_count(&self, stage: ShaderStage) -> u32 {
        self.resource_count::<ShaderResourceViews>(stage)
    }

    pub fn sampler_count(&self, stage: ShaderStage) -> u32 {
        self.resource_count::<Samplers>(stage)
    }

    pub fn uav_count(&self, stage: ShaderStage) -> u32 {
        self.resource_count::<UnorderedAccessViews>(stage)
    }

    /// Records of one stage of one range, in slot order.
    pub fn resources<R: CacheRange>(&self, stage: ShaderStage) -> &[R::Entry] {
        R::table(&self.tables).stage(stage).0
    }

    /// Native handles of one stage of one range, in slot order. `None` marks an unbound slot.
    pub fn resource_handles<R: CacheRange>(&self, stage: ShaderStage) -> &[Option<R::Handle>] {
        R::table(&self.tables).stage(stage).1
    }

    /// Binds a window of `buffer` to every stage of `bind_points`, or unbinds it with `None`.
    ///
    /// `offset` must be a multiple of [`CONSTANT_BUFFER_OFFSET_ALIGNMENT`] and
    /// `offset + range` must lie within the buffer. A zero `range` binds to the end of the
    /// buffer. Any dynamic offset previously set on the slot is reset.
    ///
    /// # Panics
    ///
    /// Panics if a slot is past its stage's constant buffer count.
    pub fn set_constant_buffer(
        &mut self,
        bind_points: &ResourceBindPoints,
        buffer: Option<Arc<dyn Buffer>>,
        offset: u32,
        range: u32,
    ) -> Result<(), Error> {
        let buffer_size = buffer.as_ref().map_or(0, |buffer| buffer.size_in_bytes());
        if offset.checked_add(range).is_none_or(|end| end > buffer_size) {
            return Err(Error::ConstantBufferRangeOutOfBounds {
                offset,
                range,
                buffer_size,
            });
        }
        if offset % CONSTANT_BUFFER_OFFSET_ALIGNMENT != 0 {
            return Err(Error::MisalignedConstantBufferOffset {
                offset,
                alignment: CONSTANT_BUFFER_OFFSET_ALIGNMENT,
            });
        }

        let handle = buffer.as_ref().map(|buffer| buffer.native_buffer());
        self.set_internal::<ConstantBuffers>(
            bind_points,
            |entry| entry.set(buffer.clone(), offset, range),
            handle,
        );
        Ok(())
    }

    /// Binds a view to a read-only slot of every stage of `bind_points`, or unbinds it with `None`.
    ///
    /// # Panics
    ///
    /// Panics if a slot is past its stage's view count.
    pub fn set_srv(&mut self, bind_points: &ResourceBindPoints, view: Option<ShaderView>) {
        let handle = view.as_ref().map(ShaderView::native_view);
        self.set_internal::<ShaderResourceViews>(bind_points, |entry| entry.set(view.clone()), handle);
    }

    /// Binds a view to a read-write slot of every stage of `bind_points`, or unbinds it with `None`.
    ///
    /// # Panics
    ///
    /// Panics if a slot is past its stage's view count.
    pub fn set_uav(&mut self, bind_points: &ResourceBindPoints, view: Option<ShaderView>) {
        let handle = view.as_ref().map(ShaderView::native_view);
        self.set_internal::<UnorderedAccessViews>(bind_points, |entry| entry.set(view.clone()), handle);
    }

    /// # Panics
    ///
    /// Panics if a slot is past its stage's sampler count.
    pub fn set_sampler(&mut self, bind_points: &ResourceBindPoints, sampler: Option<Arc<dyn Sampler>>) {
        let handle = sampler.as_ref().map(|sampler| sampler.native_sampler());
        self.set_internal::<Samplers>(bind_points, |entry| entry.set(sampler.clone()), handle);
    }

    /// Sets the offset added to the base offset of a constant buffer at bind time.
    ///
    /// Every slot addressed by `bind_points` must have been marked dynamic when the cache was
    /// created and must currently be bound to a strict sub-range of its buffer; otherwise
    /// [`Error::NonDynamicConstantBufferSlot`] is returned. The shifted window must still lie
    /// within the buffer, or [`Error::ConstantBufferRangeOutOfBounds`] is returned. Nothing is
    /// written on error.
    ///
    /// # Panics
    ///
    /// Panics if a slot is past its stage's constant buffer count.
    pub fn set_dynamic_cb_offset(&mut self, bind_points: &ResourceBindPoints, dynamic_offset: u32) -> Result<(), Error> {
        for (stage, slot) in bind_points {
            let (cb, _) = self.tables.constant_buffers.slot(stage, slot);
            //the offsets mask holds eligible slots whose binding allows a dynamic offset
            if self.dynamic_cbs.offsets[stage.index()] & slot_bit(slot) == 0 {
                return Err(Error::NonDynamicConstantBufferSlot { stage, slot });
            }
            debug_assert!(cb.allows_dynamic_offset());
            let buffer_size = cb.buffer().map_or(0, |buffer| buffer.size_in_bytes());
            let offset = cb.base_offset().checked_add(dynamic_offset);
            let end = offset.and_then(|offset| offset.checked_add(cb.range_size()));
            if end.is_none_or(|end| end > buffer_size) {
                return Err(Error::ConstantBufferRangeOutOfBounds {
                    offset: cb.base_offset().saturating_add(dynamic_offset),
                    range: cb.range_size(),
                    buffer_size,
                });
            }
        }
        for (stage, slot) in bind_points {
            let (entries, _) = self.tables.constant_buffers.stage_mut(stage);
            entries[slot as usize].set_dynamic_offset(dynamic_offset);
        }
        Ok(())
    }

    /// The record bound at `bind_points`, read from its first active stage.
    ///
    /// In debug builds every other active stage is checked to hold the same record and handle.
    ///
    /// # Panics
    ///
    /// Panics if `bind_points` is empty or its slot is out of range.
    pub fn get_resource<R: CacheRange>(&self, bind_points: &ResourceBindPoints) -> &R::Entry {
        let Some((first_stage, first_slot)) = bind_points.first() else {
            panic!("No active shader stage");
        };
        let table = R::table(&self.tables);
        let (entry, handle) = table.slot(first_stage, first_slot);
        if cfg!(debug_assertions) {
            for (stage, slot) in bind_points {
                let (other_entry, other_handle) = table.slot(stage, slot);
                debug_assert!(
                    entry == other_entry && handle == other_handle,
                    "Cached resources are not consistent between stages {first_stage:?} and {stage:?}"
                );
            }
        }
        entry
    }

    /// Native handle bound at `bind_points`, read from its first active stage.
    ///
    /// # Panics
    ///
    /// Panics if `bind_points` is empty or its slot is out of range.
    pub fn get_handle<R: CacheRange>(&self, bind_points: &ResourceBindPoints) -> Option<R::Handle> {
        let Some((stage, slot)) = bind_points.first() else {
            panic!("No active shader stage");
        };
        R::table(&self.tables).slot(stage, slot).1
    }

    /// Whether a resource is bound at `bind_points`.
    ///
    /// Empty bind points are never bound, and neither are bind points with a slot past its
    /// stage's resource count in any stage.
    pub fn is_resource_bound<R: CacheRange>(&self, bind_points: &ResourceBindPoints) -> bool {
        let table = R::table(&self.tables);
        if bind_points
            .iter()
            .any(|(stage, slot)| slot as usize >= table.len(stage))
        {
            return false;
        }
        let Some((stage, slot)) = bind_points.first() else {
            return false;
        };
        let is_bound = table.slot(stage, slot).0.is_bound();
        debug_assert!(
            bind_points
                .iter()
                .all(|(stage, slot)| table.slot(stage, slot).0.is_bound() == is_bound),
            "Bound state is not consistent between stages"
        );
        is_bound
    }

    /// Copies one binding from `source`, a cache with the same layout, into every stage of
    /// `bind_points`. Returns whether the copied binding is bound.
    ///
    /// # Panics
    ///
    /// Panics if a slot is out of range in either cache.
    pub fn copy_resource<R: CacheRange>(&mut self, source: &ShaderResourceCache, bind_points: &ResourceBindPoints) -> bool {
        let mut is_bound = true;
        let source_table = R::table(&source.tables);
        for (stage, slot) in bind_points {
            let (source_entry, source_handle) = source_table.slot(stage, slot);
            if !source_entry.is_bound() {
                is_bound = false;
            }
            let entry = R::table_mut(&mut self.tables).write(
                stage,
                slot,
                |entry| entry.clone_from(source_entry),
                source_handle,
            );
            R::update_dynamic_flag(entry, &mut self.dynamic_cbs, stage, slot);
        }
        debug_assert_eq!(is_bound, self.is_resource_bound::<R>(bind_points));
        is_bound
    }

    /// Constant buffer slots of `stage` that may take dynamic offsets.
    pub fn dynamic_cb_slots_mask(&self, stage: ShaderStage) -> u16 {
        self.dynamic_cbs.slots[stage.index()]
    }

    /// Constant buffer slots of `stage` whose binding currently makes a dynamic offset meaningful.
    pub fn dynamic_cb_offsets_mask(&self, stage: ShaderStage) -> u16 {
        self.dynamic_cbs.offsets[stage.index()]
    }

    pub fn has_dynamic_resources(&self) -> bool {
        self.dynamic_cbs.offsets.iter().any(|mask| *mask != 0)
    }

    /// Checks that the dynamic offset masks agree with the bound constant buffers.
    pub fn verify_dynamic_buffer_masks(&self) -> Result<(), Error> {
        for stage in ShaderStage::ALL {
            let slots = self.dynamic_cbs.slots[stage.index()];
            let offsets = self.dynamic_cbs.offsets[stage.index()];
            for (slot, cb) in (0u32..).zip(self.resources::<ConstantBuffers>(stage)) {
                let bit = slot_bit(slot);
                let expected = slots & bit != 0 && cb.allows_dynamic_offset();
                if (offsets & bit != 0) != expected {
                    return Err(Error::InconsistentDynamicMask { stage, slot });
                }
            }
        }
        Ok(())
    }

    fn set_internal<R: CacheRange>(
        &mut self,
        bind_points: &ResourceBindPoints,
        update: impl Fn(&mut R::Entry),
        handle: Option<R::Handle>,
    ) {
        for (stage, slot) in bind_points {
            let entry = R::table_mut(&mut self.tables).write(stage, slot, &update, handle);
            debug_assert_eq!(
                entry.is_bound(),
                handle.is_some(),
                "A resource and its native handle must be set together"
            );
            R::update_dynamic_flag(entry, &mut self.dynamic_cbs, stage, slot);
        }
    }
}
