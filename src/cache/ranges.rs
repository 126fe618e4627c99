// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Type-level selectors for the four resource ranges.
//!
//! Generic cache operations such as [`get_resource`](crate::cache::ShaderResourceCache::get_resource)
//! take one of these types as a parameter to pick the record type, the native handle type and
//! the backing table at compile time.

use crate::cache::entries::{CachedConstantBuffer, CachedEntry, CachedSampler, CachedView};
use crate::cache::storage::{DynamicCbMasks, RangeTable, RangeTables};
use crate::native::{NativeBuffer, NativeSampler, NativeView};
use crate::range::ResourceRange;
use crate::stages::ShaderStage;
use std::fmt::Debug;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A resource range that can be stored in a cache.
pub trait CacheRange: sealed::Sealed + 'static {
    const RANGE: ResourceRange;

    /// Record stored per slot.
    type Entry: CachedEntry;

    /// Native handle stored next to each record.
    type Handle: Copy + Eq + Debug;

    #[doc(hidden)]
    fn table(tables: &RangeTables) -> &RangeTable<Self::Entry, Self::Handle>;

    #[doc(hidden)]
    fn table_mut(tables: &mut RangeTables) -> &mut RangeTable<Self::Entry, Self::Handle>;

    /// Only constant buffers take part in dynamic offset bookkeeping.
    #[doc(hidden)]
    fn update_dynamic_flag(
        _entry: &Self::Entry,
        _masks: &mut DynamicCbMasks,
        _stage: ShaderStage,
        _slot: u32,
    ) {
    }
}

/// The read-only and read-write view ranges.
pub trait ViewRange: CacheRange<Entry = CachedView, Handle = NativeView> {}

#[derive(Debug, Clone, Copy)]
pub enum ConstantBuffers {}

#[derive(Debug, Clone, Copy)]
pub enum ShaderResourceViews {}

#[derive(Debug, Clone, Copy)]
pub enum Samplers {}

#[derive(Debug, Clone, Copy)]
pub enum UnorderedAccessViews {}

impl sealed::Sealed for ConstantBuffers {}
impl sealed::Sealed for ShaderResourceViews {}
impl sealed::Sealed for Samplers {}
impl sealed::Sealed for UnorderedAccessViews {}

impl CacheRange for ConstantBuffers {
    const RANGE: ResourceRange = ResourceRange::ConstantBuffer;
    type Entry = CachedConstantBuffer;
    type Handle = NativeBuffer;

    fn table(tables: &RangeTables) -> &RangeTable<Self::Entry, Self::Handle> {
        &tables.constant_buffers
    }

    fn table_mut(tables: &mut RangeTables) -> &mut RangeTable<Self::Entry, Self::Handle> {
        &mut tables.constant_buffers
    }

    fn update_dynamic_flag(
        entry: &CachedConstantBuffer,
        masks: &mut DynamicCbMasks,
        stage: ShaderStage,
        slot: u32,
    ) {
        masks.update(stage, slot, entry.allows_dynamic_offset());
    }
}

impl CacheRange for ShaderResourceViews {
    const RANGE: ResourceRange = ResourceRange::ShaderResourceView;
    type Entry = CachedView;
    type Handle = NativeView;

    fn table(tables: &RangeTables) -> &RangeTable<Self::Entry, Self::Handle> {
        &tables.shader_resource_views
    }

    fn table_mut(tables: &mut RangeTables) -> &mut RangeTable<Self::Entry, Self::Handle> {
        &mut tables.shader_resource_views
    }
}

impl CacheRange for Samplers {
    const RANGE: ResourceRange = ResourceRange::Sampler;
    type Entry = CachedSampler;
    type Handle = NativeSampler;

    fn table(tables: &RangeTables) -> &RangeTable<Self::Entry, Self::Handle> {
        &tables.samplers
    }

    fn table_mut(tables: &mut RangeTables) -> &mut RangeTable<Self::Entry, Self::Handle> {
        &mut tables.samplers
    }
}

impl CacheRange for UnorderedAccessViews {
    const RANGE: ResourceRange = ResourceRange::UnorderedAccessView;
    type Entry = CachedView;
    type Handle = NativeView;

    fn table(tables: &RangeTables) -> &RangeTable<Self::Entry, Self::Handle> {
        &tables.unordered_access_views
    }

    fn table_mut(tables: &mut RangeTables) -> &mut RangeTable<Self::Entry, Self::Handle> {
        &mut tables.unordered_access_views
    }
}

impl ViewRange for ShaderResourceViews {}
impl ViewRange for UnorderedAccessViews {}
