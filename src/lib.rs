// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! shader_resource_cache is the binding-state cache of a slot-based GPU backend.

Slot-based APIs bind resources per shader stage: each of the vertex, pixel, geometry, hull,
domain and compute stages has its own array of constant buffer, view, sampler and read-write
view slots. A pipeline's resource binding object records which resources it wants in which
slots; at draw time the device context compares that against what it last submitted and issues
as few bind calls as possible.

This crate is that record.

| Type                                     | Role                                                      |
|------------------------------------------|-----------------------------------------------------------|
| [`cache::ShaderResourceCache`]           | Per-stage, per-range slots plus their native handles      |
| [`cache::layout::ResourceSlotLayout`]    | Sizing and placement of every (range, stage) sub-array    |
| [`stages::ResourceBindPoints`]           | One slot index per shader stage for a single resource     |
| [`cache::SlotRange`]                     | Contiguous run of slots that changed since the last bind  |
| [`resources::StateTransitionContext`]    | The device context's barrier tracker                      |

# Binding flow

1. Create a cache with [`cache::ShaderResourceCache::new`] for a resource-count profile.
2. Fill it with the `set_*` operations, or copy bindings from a signature cache with
   [`cache::ShaderResourceCache::copy_resource`].
3. Before a draw, call [`cache::ShaderResourceCache::transition_resource_states`], then the
   `bind_*` operations for each stage and range, and submit the changed [`cache::SlotRange`]s.
4. Between draws that only change constant buffer offsets, use
   [`cache::ShaderResourceCache::set_dynamic_cb_offset`] and
   [`cache::ShaderResourceCache::bind_dynamic_cbs`].

The cache does no locking and never talks to a driver. Native handles are opaque integers
supplied by the resource objects.
*/

mod bittricks;
pub mod cache;
pub mod error;
pub mod native;
pub mod range;
pub mod resources;
pub mod stages;

pub use cache::ShaderResourceCache;
pub use error::Error;
