// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Backing storage of a cache, one table per resource range.

use crate::bittricks::slot_bit;
use crate::cache::entries::{CachedConstantBuffer, CachedEntry, CachedSampler, CachedView};
use crate::cache::layout::ResourceSlotLayout;
use crate::native::{NativeBuffer, NativeSampler, NativeView};
use crate::range::ResourceRange;
use crate::stages::{NUM_SHADER_STAGES, ShaderStage};

/// Records and native handles of one range, for all stages.
///
/// Each stage owns a contiguous run of both arrays, so the handles of a stage can be passed to a
/// multi-slot bind call as a single slice.
#[derive(Debug, Clone)]
pub struct RangeTable<Entry, Handle> {
    entries: Box<[Entry]>,
    handles: Box<[Option<Handle>]>,
    starts: [usize; NUM_SHADER_STAGES + 1],
}

impl<Entry: CachedEntry, Handle: Copy> RangeTable<Entry, Handle> {
    fn new(layout: &ResourceSlotLayout, range: ResourceRange) -> Self {
        let mut starts = [0; NUM_SHADER_STAGES + 1];
        for stage in ShaderStage::ALL {
            starts[stage.index() + 1] =
                starts[stage.index()] + layout.resource_count(range, stage) as usize;
        }
        let len = starts[NUM_SHADER_STAGES];
        RangeTable {
            entries: (0..len).map(|_| Entry::default()).collect(),
            handles: vec![None; len].into_boxed_slice(),
            starts,
        }
    }

    pub fn len(&self, stage: ShaderStage) -> usize {
        self.starts[stage.index() + 1] - self.starts[stage.index()]
    }

    pub fn stage(&self, stage: ShaderStage) -> (&[Entry], &[Option<Handle>]) {
        let run = self.starts[stage.index()]..self.starts[stage.index() + 1];
        (&self.entries[run.clone()], &self.handles[run])
    }

    pub fn stage_mut(&mut self, stage: ShaderStage) -> (&mut [Entry], &mut [Option<Handle>]) {
        let run = self.starts[stage.index()]..self.starts[stage.index() + 1];
        (&mut self.entries[run.clone()], &mut self.handles[run])
    }

    /// Record and handle of one slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is past the stage's resource count.
    pub fn slot(&self, stage: ShaderStage, slot: u32) -> (&Entry, Option<Handle>) {
        let (entries, handles) = self.stage(stage);
        check_slot(stage, slot, entries.len());
        (&entries[slot as usize], handles[slot as usize])
    }

    /// Overwrites record and handle of one slot together.
    pub fn write(&mut self, stage: ShaderStage, slot: u32, update: impl FnOnce(&mut Entry), handle: Option<Handle>) -> &Entry {
        let (entries, handles) = self.stage_mut(stage);
        check_slot(stage, slot, entries.len());
        update(&mut entries[slot as usize]);
        handles[slot as usize] = handle;
        &entries[slot as usize]
    }
}

fn check_slot(stage: ShaderStage, slot: u32, count: usize) {
    assert!(
        (slot as usize) < count,
        "Slot {slot} is out of range for the {stage:?} stage, which has {count} resources"
    );
}

#[derive(Debug, Clone)]
pub struct RangeTables {
    pub constant_buffers: RangeTable<CachedConstantBuffer, NativeBuffer>,
    pub shader_resource_views: RangeTable<CachedView, NativeView>,
    pub samplers: RangeTable<CachedSampler, NativeSampler>,
    pub unordered_access_views: RangeTable<CachedView, NativeView>,
}

impl RangeTables {
    pub fn new(layout: &ResourceSlotLayout) -> Self {
        RangeTables {
            constant_buffers: RangeTable::new(layout, ResourceRange::ConstantBuffer),
            shader_resource_views: RangeTable::new(layout, ResourceRange::ShaderResourceView),
            samplers: RangeTable::new(layout, ResourceRange::Sampler),
            unordered_access_views: RangeTable::new(layout, ResourceRange::UnorderedAccessView),
        }
    }
}

/// Per-stage constant buffer masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicCbMasks {
    /// Slots that may take a dynamic offset. Fixed at initialization.
    pub slots: [u16; NUM_SHADER_STAGES],
    /// Eligible slots whose current binding is a strict sub-range of its buffer.
    pub offsets: [u16; NUM_SHADER_STAGES],
}

impl DynamicCbMasks {
    pub fn update(&mut self, stage: ShaderStage, slot: u32, allows_dynamic_offset: bool) {
        let bit = slot_bit(slot);
        let stage = stage.index();
        if self.slots[stage] & bit != 0 {
            if allows_dynamic_offset {
                self.offsets[stage] |= bit;
            } else {
                self.offsets[stage] &= !bit;
            }
        } else {
            debug_assert!(
                self.offsets[stage] & bit == 0,
                "A slot that is not dynamic must never be flagged as having a dynamic offset"
            );
        }
    }
}
