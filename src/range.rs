// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource ranges and per-stage resource counters.

use crate::resources::ResourceState;
use crate::stages::{NUM_SHADER_STAGES, ShaderStage};
use std::ops::{Index, IndexMut};

pub const NUM_RESOURCE_RANGES: usize = 4;

/// A class of shader-visible resource. Each range has its own slot space in every stage.
///
/// The discriminant order is the order in which ranges are laid out in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ResourceRange {
    ConstantBuffer = 0,
    /// Read-only texture or buffer view.
    ShaderResourceView = 1,
    Sampler = 2,
    /// Read-write texture or buffer view.
    UnorderedAccessView = 3,
}

impl ResourceRange {
    pub const ALL: [ResourceRange; NUM_RESOURCE_RANGES] = [
        ResourceRange::ConstantBuffer,
        ResourceRange::ShaderResourceView,
        ResourceRange::Sampler,
        ResourceRange::UnorderedAccessView,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The state a resource must be in to be used through this range, if any.
    pub fn required_state(self) -> Option<ResourceState> {
        match self {
            ResourceRange::ConstantBuffer => Some(ResourceState::CONSTANT_BUFFER),
            ResourceRange::ShaderResourceView => Some(ResourceState::SHADER_RESOURCE),
            ResourceRange::UnorderedAccessView => Some(ResourceState::UNORDERED_ACCESS),
            ResourceRange::Sampler => None,
        }
    }
}

/// One `u8` per (range, stage) pair.
///
/// Used both as the resource-count profile a cache is laid out for and as the base slot of each
/// (range, stage) sub-array in the device context's committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderResourceCounters([[u8; NUM_SHADER_STAGES]; NUM_RESOURCE_RANGES]);

impl ShaderResourceCounters {
    pub const fn new() -> Self {
        ShaderResourceCounters([[0; NUM_SHADER_STAGES]; NUM_RESOURCE_RANGES])
    }

    pub fn get(&self, range: ResourceRange, stage: ShaderStage) -> u32 {
        self.0[range.index()][stage.index()] as u32
    }

    pub fn set(&mut self, range: ResourceRange, stage: ShaderStage, count: u8) {
        self.0[range.index()][stage.index()] = count;
    }

    /// Builder form of [`Self::set`].
    pub fn with(mut self, range: ResourceRange, stage: ShaderStage, count: u8) -> Self {
        self.set(range, stage, count);
        self
    }

    /// Sum of all counters of `range` across stages.
    pub fn total(&self, range: ResourceRange) -> u32 {
        self.0[range.index()].iter().map(|c| *c as u32).sum()
    }
}

impl Index<ResourceRange> for ShaderResourceCounters {
    type Output = [u8; NUM_SHADER_STAGES];
    fn index(&self, range: ResourceRange) -> &Self::Output {
        &self.0[range.index()]
    }
}

impl IndexMut<ResourceRange> for ShaderResourceCounters {
    fn index_mut(&mut self, range: ResourceRange) -> &mut Self::Output {
        &mut self.0[range.index()]
    }
}
