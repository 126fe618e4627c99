// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Diffing cached bindings against the bindings last submitted to the driver.
//!
//! The device context keeps arrays of the native handles it has submitted for each stage. Each
//! `bind_*` operation compares one (range, stage) sub-array of the cache against those arrays at
//! the stage's base slot, writes the cached values through, and returns the [`SlotRange`]
//! covering every slot that differed. The caller then issues one multi-slot bind call for that
//! range.
//!
//! Slots are visited in ascending order within a stage.

use crate::bittricks::extract_lowest_bit;
use crate::cache::ShaderResourceCache;
use crate::cache::entries::ConstantBufferWindow;
use crate::cache::ranges::{CacheRange, ConstantBuffers, ViewRange};
use crate::native::{NativeBuffer, NativeResource, NativeView};
use crate::range::ShaderResourceCounters;
use crate::stages::ShaderStage;
use std::ops::RangeInclusive;

/// The smallest contiguous range of slots covering every changed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRange {
    min: u32,
    max: u32,
}

impl Default for SlotRange {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRange {
    /// An empty range.
    pub const fn new() -> Self {
        SlotRange {
            min: u32::MAX,
            max: 0,
        }
    }

    /// Extends the range to cover `slot`. Slots must be added in ascending order.
    pub fn add(&mut self, slot: u32) {
        self.min = self.min.min(slot);
        debug_assert!(slot >= self.max, "Slots must be added in ascending order");
        self.max = slot;
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn min_slot(&self) -> Option<u32> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max_slot(&self) -> Option<u32> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Number of slots a bind call for this range covers.
    pub fn len(&self) -> u32 {
        if self.is_empty() { 0 } else { self.max - self.min + 1 }
    }

    pub fn as_range(&self) -> Option<RangeInclusive<u32>> {
        (!self.is_empty()).then(|| self.min..=self.max)
    }
}

/// Constant buffer state last submitted for one stage, indexed by native slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedConstantBuffers {
    pub buffers: Vec<Option<NativeBuffer>>,
    pub first_constants: Vec<u32>,
    pub num_constants: Vec<u32>,
}

impl CommittedConstantBuffers {
    /// Nothing bound in any of `slot_count` slots.
    pub fn new(slot_count: usize) -> Self {
        CommittedConstantBuffers {
            buffers: vec![None; slot_count],
            first_constants: vec![0; slot_count],
            num_constants: vec![0; slot_count],
        }
    }

    /// Writes `buffer` and `window` to `slot`, returning whether anything changed.
    fn commit(&mut self, slot: usize, buffer: Option<NativeBuffer>, window: ConstantBufferWindow) -> bool {
        let changed = self.buffers[slot] != buffer
            || self.first_constants[slot] != window.first_constant
            || self.num_constants[slot] != window.num_constants;
        self.buffers[slot] = buffer;
        self.first_constants[slot] = window.first_constant;
        self.num_constants[slot] = window.num_constants;
        changed
    }

    pub fn window(&self, slot: usize) -> ConstantBufferWindow {
        ConstantBufferWindow {
            first_constant: self.first_constants[slot],
            num_constants: self.num_constants[slot],
        }
    }
}

impl ShaderResourceCache {
    /// Diffs the native handles of one (range, stage) sub-array against `committed`.
    ///
    /// Slot `i` of the stage is compared with `committed[base + i]`, where `base` is the
    /// stage's entry in `base_bindings`.
    ///
    /// # Panics
    ///
    /// Panics if `committed` is shorter than the base slot plus the stage's resource count.
    pub fn bind_resources<R: CacheRange>(
        &self,
        stage: ShaderStage,
        committed: &mut [Option<R::Handle>],
        base_bindings: &ShaderResourceCounters,
    ) -> SlotRange {
        let handles = self.resource_handles::<R>(stage);
        let base = base_bindings.get(R::RANGE, stage);

        let mut slots = SlotRange::new();
        for (slot, handle) in (base..).zip(handles) {
            let submitted = &mut committed[slot as usize];
            if *submitted != *handle {
                slots.add(slot);
            }
            *submitted = *handle;
        }
        slots
    }

    /// Like [`Self::bind_resources`] for a view range, additionally recording the native
    /// resource underneath each view in `committed_resources`.
    ///
    /// Only view changes count towards the returned range.
    pub fn bind_resource_views<R: ViewRange>(
        &self,
        stage: ShaderStage,
        committed_views: &mut [Option<NativeView>],
        committed_resources: &mut [Option<NativeResource>],
        base_bindings: &ShaderResourceCounters,
    ) -> SlotRange {
        let views = self.resources::<R>(stage);
        let handles = self.resource_handles::<R>(stage);
        let base = base_bindings.get(R::RANGE, stage);

        let mut slots = SlotRange::new();
        for ((slot, view), handle) in (base..).zip(views).zip(handles) {
            let slot = slot as usize;
            if committed_views[slot] != *handle {
                slots.add(slot as u32);
            }
            committed_resources[slot] = view.native_resource();
            committed_views[slot] = *handle;
        }
        slots
    }

    /// Diffs the constant buffers of `stage`, including their constant windows.
    ///
    /// A slot changes when its buffer, first constant or constant count differs from
    /// `committed`. The first constant includes the slot's dynamic offset.
    pub fn bind_cbs(
        &self,
        stage: ShaderStage,
        committed: &mut CommittedConstantBuffers,
        base_bindings: &ShaderResourceCounters,
    ) -> SlotRange {
        let cbs = self.resources::<ConstantBuffers>(stage);
        let handles = self.resource_handles::<ConstantBuffers>(stage);
        let base = base_bindings.get(ConstantBuffers::RANGE, stage);

        let mut slots = SlotRange::new();
        for ((slot, cb), handle) in (base..).zip(cbs).zip(handles) {
            if committed.commit(slot as usize, *handle, cb.bind_window()) {
                slots.add(slot);
            }
        }
        slots
    }

    /// Rebinds only the constant buffers of `stage` that currently have a dynamic offset.
    ///
    /// `on_changed` is called with the native slot of every buffer whose window changed, in
    /// ascending order, after `committed` has been updated for that slot.
    pub fn bind_dynamic_cbs(
        &self,
        stage: ShaderStage,
        committed: &mut CommittedConstantBuffers,
        base_bindings: &ShaderResourceCounters,
        mut on_changed: impl FnMut(u32),
    ) {
        let cbs = self.resources::<ConstantBuffers>(stage);
        let handles = self.resource_handles::<ConstantBuffers>(stage);
        let base = base_bindings.get(ConstantBuffers::RANGE, stage);

        let mut mask = self.dynamic_cb_offsets_mask(stage);
        while let Some(binding) = extract_lowest_bit(&mut mask) {
            let cb = &cbs[binding as usize];
            debug_assert!(cb.allows_dynamic_offset());
            let slot = base + binding;
            if committed.commit(slot as usize, handles[binding as usize], cb.bind_window()) {
                on_changed(slot);
            }
        }
    }
}
