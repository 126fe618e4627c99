// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Memory blueprint of a resource cache.

For every (range, stage) pair the cache holds a sub-array of cached records immediately followed
by a parallel sub-array of native handles of the same length:

```text
| records 0..n | handles 0..n || records 0..m | handles 0..m || ...
|<-- (CB, Vertex) ----------->||<-- (CB, Pixel) ----------->||
```

Sub-arrays are ordered by range (constant buffers, read-only views, samplers, read-write views)
and then by stage, and each one starts on a [`MAX_ALIGNMENT`] boundary. The layout stores the
byte start of every sub-array in a 16-bit offset table terminated by the total size, so the
element count of a sub-array is the distance to the next offset divided by the slot footprint.
*/

use crate::bittricks::align_up;
use crate::cache::entries::{CachedConstantBuffer, CachedSampler, CachedView};
use crate::error::Error;
use crate::native::{NativeBuffer, NativeSampler, NativeView};
use crate::range::{NUM_RESOURCE_RANGES, ResourceRange, ShaderResourceCounters};
use crate::stages::{NUM_SHADER_STAGES, ShaderStage};
use std::mem::{align_of, size_of};

type OffsetType = u16;

const MAX_OFFSETS: usize = NUM_RESOURCE_RANGES * NUM_SHADER_STAGES + 1;

/// Bytes one slot of a range occupies: its record plus its native handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotFootprint {
    pub entry_size: usize,
    pub handle_size: usize,
}

impl SlotFootprint {
    const fn of<Entry, Handle>() -> Self {
        SlotFootprint {
            entry_size: size_of::<Entry>(),
            handle_size: size_of::<Option<Handle>>(),
        }
    }

    pub const fn stride(self) -> usize {
        self.entry_size + self.handle_size
    }

    pub const fn for_range(range: ResourceRange) -> Self {
        FOOTPRINTS[range.index()]
    }
}

const FOOTPRINTS: [SlotFootprint; NUM_RESOURCE_RANGES] = [
    SlotFootprint::of::<CachedConstantBuffer, NativeBuffer>(),
    SlotFootprint::of::<CachedView, NativeView>(),
    SlotFootprint::of::<CachedSampler, NativeSampler>(),
    SlotFootprint::of::<CachedView, NativeView>(),
];

const fn max(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

/// Every sub-array starts on this boundary.
pub const MAX_ALIGNMENT: usize = max(
    max(
        max(align_of::<CachedConstantBuffer>(), align_of::<CachedView>()),
        align_of::<CachedSampler>(),
    ),
    align_of::<Option<NativeBuffer>>(),
);

//the handle sub-array directly follows the records, so records must keep handles aligned
static_assertions::const_assert!(size_of::<CachedConstantBuffer>() % align_of::<Option<NativeBuffer>>() == 0);
static_assertions::const_assert!(size_of::<CachedView>() % align_of::<Option<NativeView>>() == 0);
static_assertions::const_assert!(size_of::<CachedSampler>() % align_of::<Option<NativeSampler>>() == 0);

/// Byte offsets of every (range, stage) sub-array of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceSlotLayout {
    offsets: [OffsetType; MAX_OFFSETS],
}

const fn offset_index(range: ResourceRange, stage: ShaderStage) -> usize {
    range.index() * NUM_SHADER_STAGES + stage.index()
}

impl ResourceSlotLayout {
    /// Total bytes a cache with the given resource counts occupies.
    pub fn required_size(counters: &ShaderResourceCounters) -> Result<usize, Error> {
        let mut size = 0;
        for range in ResourceRange::ALL {
            let stride = SlotFootprint::for_range(range).stride();
            for stage in ShaderStage::ALL {
                size = align_up(size + stride * counters.get(range, stage) as usize, MAX_ALIGNMENT);
            }
        }
        check_addressable(size)?;
        Ok(size)
    }

    /// Lays out a cache for the given resource counts.
    ///
    /// Fails with [`Error::LayoutTooLarge`] when the total size does not fit the offset table.
    pub fn new(counters: &ShaderResourceCounters) -> Result<Self, Error> {
        let required = Self::required_size(counters)?;

        let mut offsets = [0; MAX_OFFSETS];
        let mut offset = 0;
        for range in ResourceRange::ALL {
            let stride = SlotFootprint::for_range(range).stride();
            for stage in ShaderStage::ALL {
                //fits, because it does not exceed the checked total
                offsets[offset_index(range, stage)] = offset as OffsetType;
                offset = align_up(offset + stride * counters.get(range, stage) as usize, MAX_ALIGNMENT);
            }
        }
        debug_assert_eq!(offset, required);
        offsets[MAX_OFFSETS - 1] = offset as OffsetType;
        Ok(ResourceSlotLayout { offsets })
    }

    /// Byte offset of the first record of the (range, stage) sub-array.
    pub fn data_offset(&self, range: ResourceRange, stage: ShaderStage) -> usize {
        self.offsets[offset_index(range, stage)] as usize
    }

    /// Byte offset of the first native handle of the (range, stage) sub-array.
    pub fn handles_offset(&self, range: ResourceRange, stage: ShaderStage) -> usize {
        self.data_offset(range, stage)
            + self.resource_count(range, stage) as usize * SlotFootprint::for_range(range).entry_size
    }

    pub fn resource_count(&self, range: ResourceRange, stage: ShaderStage) -> u32 {
        let index = offset_index(range, stage);
        let bytes = (self.offsets[index + 1] - self.offsets[index]) as usize;
        (bytes / SlotFootprint::for_range(range).stride()) as u32
    }

    /// Resource counts the layout was built for.
    pub fn counters(&self) -> ShaderResourceCounters {
        let mut counters = ShaderResourceCounters::new();
        for range in ResourceRange::ALL {
            for stage in ShaderStage::ALL {
                //counts never exceed u8, they came from u8 counters
                counters.set(range, stage, self.resource_count(range, stage) as u8);
            }
        }
        counters
    }

    pub fn total_size(&self) -> usize {
        self.offsets[MAX_OFFSETS - 1] as usize
    }
}

fn check_addressable(size: usize) -> Result<(), Error> {
    let max = OffsetType::MAX as usize;
    if size > max {
        Err(Error::LayoutTooLarge {
            required: size,
            max,
        })
    } else {
        Ok(())
    }
}
