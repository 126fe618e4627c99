// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Setting, reading, copying and diffing bindings through the public cache API.

mod common;

use common::{MockBuffer, MockSampler, MockTexture, buffer_view, texture_view};
use shader_resource_cache::cache::ranges::{
    ConstantBuffers, Samplers, ShaderResourceViews, UnorderedAccessViews,
};
use shader_resource_cache::cache::{
    CommittedConstantBuffers, ResourceCacheContentType, ShaderResourceCache,
};
use shader_resource_cache::error::Error;
use shader_resource_cache::native::{NativeResource, NativeSampler, NativeView};
use shader_resource_cache::range::{ResourceRange, ShaderResourceCounters};
use shader_resource_cache::resources::{Buffer, ResourceState, Sampler, Texture};
use shader_resource_cache::stages::{ResourceBindPoints, ShaderStage};

/// 1 constant buffer, 2 read-only views and 1 sampler in the pixel stage.
fn pixel_profile() -> ShaderResourceCounters {
    ShaderResourceCounters::new()
        .with(ResourceRange::ConstantBuffer, ShaderStage::Pixel, 1)
        .with(ResourceRange::ShaderResourceView, ShaderStage::Pixel, 2)
        .with(ResourceRange::Sampler, ShaderStage::Pixel, 1)
}

fn new_cache(counters: &ShaderResourceCounters) -> ShaderResourceCache {
    ShaderResourceCache::new(ResourceCacheContentType::Resources, counters, None).unwrap()
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn counts_follow_profile() {
    let cache = new_cache(&pixel_profile());
    assert_eq!(cache.content_type(), ResourceCacheContentType::Resources);
    assert_eq!(cache.cb_count(ShaderStage::Pixel), 1);
    assert_eq!(cache.srv_count(ShaderStage::Pixel), 2);
    assert_eq!(cache.sampler_count(ShaderStage::Pixel), 1);
    assert_eq!(cache.uav_count(ShaderStage::Pixel), 0);
    for stage in [ShaderStage::Vertex, ShaderStage::Compute] {
        assert_eq!(cache.srv_count(stage), 0);
        assert!(cache.resources::<ShaderResourceViews>(stage).is_empty());
    }
    assert_eq!(cache.resource_handles::<ShaderResourceViews>(ShaderStage::Pixel), &[None::<NativeView>, None]);
    assert_eq!(
        ShaderResourceCache::required_memory_size(&pixel_profile()).unwrap(),
        cache.layout().total_size()
    );
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn oversized_profiles_are_rejected() {
    let mut counters = ShaderResourceCounters::new();
    for stage in ShaderStage::ALL {
        counters.set(ResourceRange::ShaderResourceView, stage, 255);
        counters.set(ResourceRange::UnorderedAccessView, stage, 255);
    }
    let result = ShaderResourceCache::new(ResourceCacheContentType::Signature, &counters, None);
    assert!(matches!(result, Err(Error::LayoutTooLarge { .. })));

    let counters = ShaderResourceCounters::new().with(ResourceRange::ConstantBuffer, ShaderStage::Hull, 15);
    let result = ShaderResourceCache::new(ResourceCacheContentType::Signature, &counters, None);
    assert_eq!(
        result.unwrap_err(),
        Error::TooManyConstantBuffers {
            stage: ShaderStage::Hull,
            count: 15,
            max: 14
        }
    );
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn binding_is_idempotent() {
    let mut cache = new_cache(&pixel_profile());
    let texture = MockTexture::new(ResourceState::SHADER_RESOURCE);
    let first = texture_view(&texture);
    let second = texture_view(&texture);
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 0), Some(first.clone()));
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 1), Some(second.clone()));

    let base = ShaderResourceCounters::new().with(ResourceRange::ShaderResourceView, ShaderStage::Pixel, 3);
    let mut committed: Vec<Option<NativeView>> = vec![None; 8];
    let changed = cache.bind_resources::<ShaderResourceViews>(ShaderStage::Pixel, &mut committed, &base);
    assert_eq!(changed.as_range(), Some(3..=4));
    assert_eq!(committed[3], Some(first.native_view()));
    assert_eq!(committed[4], Some(second.native_view()));

    let changed = cache.bind_resources::<ShaderResourceViews>(ShaderStage::Pixel, &mut committed, &base);
    assert!(changed.is_empty());

    //only the slot that changed is reported
    let replacement = texture_view(&texture);
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 1), Some(replacement.clone()));
    let changed = cache.bind_resources::<ShaderResourceViews>(ShaderStage::Pixel, &mut committed, &base);
    assert_eq!(changed.as_range(), Some(4..=4));
    assert_eq!(committed[4], Some(replacement.native_view()));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn unbinding_clears_handle() {
    let mut cache = new_cache(&pixel_profile());
    let bind_points = ResourceBindPoints::single(ShaderStage::Pixel, 0);
    let sampler = MockSampler::new();
    cache.set_sampler(&bind_points, Some(sampler.clone()));
    assert!(cache.is_resource_bound::<Samplers>(&bind_points));
    assert_eq!(cache.get_handle::<Samplers>(&bind_points), Some(sampler.native_sampler()));

    let mut committed: Vec<Option<NativeSampler>> = vec![None; 1];
    let base = ShaderResourceCounters::new();
    assert_eq!(
        cache
            .bind_resources::<Samplers>(ShaderStage::Pixel, &mut committed, &base)
            .as_range(),
        Some(0..=0)
    );

    cache.set_sampler(&bind_points, None);
    assert!(!cache.is_resource_bound::<Samplers>(&bind_points));
    assert_eq!(cache.get_handle::<Samplers>(&bind_points), None);
    assert!(cache.get_resource::<Samplers>(&bind_points).sampler().is_none());
    assert_eq!(
        cache
            .bind_resources::<Samplers>(ShaderStage::Pixel, &mut committed, &base)
            .as_range(),
        Some(0..=0)
    );
    assert_eq!(committed[0], None);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn view_records_owner() {
    let counters = ShaderResourceCounters::new()
        .with(ResourceRange::ShaderResourceView, ShaderStage::Compute, 1)
        .with(ResourceRange::UnorderedAccessView, ShaderStage::Compute, 1);
    let mut cache = new_cache(&counters);
    let texture = MockTexture::new(ResourceState::UNKNOWN);
    let buffer = MockBuffer::new(4096);
    let srv = texture_view(&texture);
    let uav = buffer_view(&buffer);
    let bind_points = ResourceBindPoints::single(ShaderStage::Compute, 0);
    cache.set_srv(&bind_points, Some(srv.clone()));
    cache.set_uav(&bind_points, Some(uav.clone()));

    let cached = cache.get_resource::<ShaderResourceViews>(&bind_points);
    assert_eq!(cached.view(), Some(&srv));
    assert!(cached.buffer().is_none());
    assert_eq!(cached.native_resource(), Some(texture.native_resource()));

    let cached = cache.get_resource::<UnorderedAccessViews>(&bind_points);
    assert_eq!(cached.view(), Some(&uav));
    assert!(cached.texture().is_none());
    assert_eq!(cached.native_resource(), Some(buffer.native_resource()));

    let mut views = vec![None; 2];
    let mut resources = vec![None; 2];
    let base = ShaderResourceCounters::new().with(ResourceRange::UnorderedAccessView, ShaderStage::Compute, 1);
    let changed = cache.bind_resource_views::<UnorderedAccessViews>(
        ShaderStage::Compute,
        &mut views,
        &mut resources,
        &base,
    );
    assert_eq!(changed.as_range(), Some(1..=1));
    assert_eq!(views, vec![None, Some(uav.native_view())]);
    assert_eq!(resources, vec![None, Some(buffer.native_resource())]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn bind_points_fan_out_to_every_stage() {
    let counters = ShaderResourceCounters::new()
        .with(ResourceRange::ConstantBuffer, ShaderStage::Vertex, 1)
        .with(ResourceRange::ConstantBuffer, ShaderStage::Pixel, 3);
    let mut cache = new_cache(&counters);
    let mut bind_points = ResourceBindPoints::new();
    bind_points.set(ShaderStage::Vertex, 0);
    bind_points.set(ShaderStage::Pixel, 2);

    let buffer = MockBuffer::new(512);
    cache
        .set_constant_buffer(&bind_points, Some(buffer.clone()), 256, 128)
        .unwrap();

    assert!(cache.is_resource_bound::<ConstantBuffers>(&bind_points));
    let pixel_only = ResourceBindPoints::single(ShaderStage::Pixel, 2);
    let cb = cache.get_resource::<ConstantBuffers>(&pixel_only);
    assert_eq!(cb.base_offset(), 256);
    assert_eq!(cb.range_size(), 128);
    assert_eq!(
        cache.resource_handles::<ConstantBuffers>(ShaderStage::Pixel),
        &[None, None, Some(buffer.native_buffer())]
    );
    assert_eq!(
        cache.resource_handles::<ConstantBuffers>(ShaderStage::Vertex),
        &[Some(buffer.native_buffer())]
    );

    let mut committed = CommittedConstantBuffers::new(3);
    let base = ShaderResourceCounters::new();
    let changed = cache.bind_cbs(ShaderStage::Pixel, &mut committed, &base);
    assert_eq!(changed.as_range(), Some(2..=2));
    assert_eq!(committed.buffers[2], Some(buffer.native_buffer()));
    assert_eq!(committed.first_constants[2], 16);
    assert_eq!(committed.num_constants[2], 16);
    assert!(cache.bind_cbs(ShaderStage::Pixel, &mut committed, &base).is_empty());
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn whole_buffer_binding() {
    let mut cache = new_cache(&pixel_profile());
    let bind_points = ResourceBindPoints::single(ShaderStage::Pixel, 0);
    let buffer = MockBuffer::new(1024);
    cache
        .set_constant_buffer(&bind_points, Some(buffer.clone()), 256, 0)
        .unwrap();
    let cb = cache.get_resource::<ConstantBuffers>(&bind_points);
    assert_eq!(cb.range_size(), 768);
    let window = cb.bind_window();
    assert_eq!(window.first_constant, 16);
    assert_eq!(window.num_constants, 48);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn copy_from_signature() {
    let counters = pixel_profile();
    let mut signature =
        ShaderResourceCache::new(ResourceCacheContentType::Signature, &counters, None).unwrap();
    let mut instance = new_cache(&counters);
    let bound = ResourceBindPoints::single(ShaderStage::Pixel, 1);
    let unbound = ResourceBindPoints::single(ShaderStage::Pixel, 0);
    let texture = MockTexture::new(ResourceState::SHADER_RESOURCE);
    let view = texture_view(&texture);
    signature.set_srv(&bound, Some(view.clone()));

    assert!(instance.copy_resource::<ShaderResourceViews>(&signature, &bound));
    assert!(!instance.copy_resource::<ShaderResourceViews>(&signature, &unbound));
    assert_eq!(
        instance.get_resource::<ShaderResourceViews>(&bound),
        signature.get_resource::<ShaderResourceViews>(&bound)
    );
    assert_eq!(
        instance.get_handle::<ShaderResourceViews>(&bound),
        Some(view.native_view())
    );
    assert!(!instance.is_resource_bound::<ShaderResourceViews>(&unbound));

    //copying an unbound slot over a bound one unbinds it
    instance.set_srv(&unbound, Some(view));
    assert!(!instance.copy_resource::<ShaderResourceViews>(&signature, &unbound));
    assert_eq!(instance.get_handle::<ShaderResourceViews>(&unbound), None);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn fill_every_slot() {
    let mut counters = ShaderResourceCounters::new();
    for stage in ShaderStage::ALL {
        counters.set(ResourceRange::ConstantBuffer, stage, 14);
        counters.set(ResourceRange::ShaderResourceView, stage, 32);
        counters.set(ResourceRange::Sampler, stage, 16);
        counters.set(ResourceRange::UnorderedAccessView, stage, 8);
    }
    let mut cache = new_cache(&counters);
    let buffer = MockBuffer::new(256);
    let texture = MockTexture::new(ResourceState::UNKNOWN);
    let sampler = MockSampler::new();

    let mut views = Vec::new();
    for stage in ShaderStage::ALL {
        for slot in 0..14 {
            let bind_points = ResourceBindPoints::single(stage, slot);
            cache
                .set_constant_buffer(&bind_points, Some(buffer.clone()), 0, 256)
                .unwrap();
        }
        for slot in 0..32 {
            let view = texture_view(&texture);
            cache.set_srv(&ResourceBindPoints::single(stage, slot), Some(view.clone()));
            views.push((stage, slot, view));
        }
        for slot in 0..16 {
            cache.set_sampler(&ResourceBindPoints::single(stage, slot), Some(sampler.clone()));
        }
        for slot in 0..8 {
            let view = buffer_view(&buffer);
            cache.set_uav(&ResourceBindPoints::single(stage, slot), Some(view));
        }
    }

    for (stage, slot, view) in &views {
        let bind_points = ResourceBindPoints::single(*stage, *slot);
        assert_eq!(
            cache.get_handle::<ShaderResourceViews>(&bind_points),
            Some(view.native_view())
        );
    }
    for stage in ShaderStage::ALL {
        assert!(
            cache
                .resource_handles::<ConstantBuffers>(stage)
                .iter()
                .all(|handle| *handle == Some(buffer.native_buffer()))
        );
        assert!(
            cache
                .resource_handles::<Samplers>(stage)
                .iter()
                .all(|handle| *handle == Some(sampler.native_sampler()))
        );
        assert!(cache.resources::<UnorderedAccessViews>(stage).iter().all(|view| view.buffer().is_some()));
    }
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn out_of_range_slot_is_not_bound() {
    let cache = new_cache(&pixel_profile());
    assert!(!cache.is_resource_bound::<ShaderResourceViews>(&ResourceBindPoints::single(ShaderStage::Pixel, 7)));
    assert!(!cache.is_resource_bound::<ShaderResourceViews>(&ResourceBindPoints::new()));
}

#[test]
#[should_panic]
fn out_of_range_slot_panics() {
    let mut cache = new_cache(&pixel_profile());
    let texture = MockTexture::new(ResourceState::UNKNOWN);
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 2), Some(texture_view(&texture)));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn view_diff_writes_resources_through() {
    let mut cache = new_cache(&pixel_profile());
    let texture = MockTexture::new(ResourceState::SHADER_RESOURCE);
    let buffer = MockBuffer::new(1024);
    let texture_srv = texture_view(&texture);
    let buffer_srv = buffer_view(&buffer);
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 0), Some(texture_srv.clone()));
    cache.set_srv(&ResourceBindPoints::single(ShaderStage::Pixel, 1), Some(buffer_srv.clone()));

    let base = ShaderResourceCounters::new().with(ResourceRange::ShaderResourceView, ShaderStage::Pixel, 2);
    let mut views = vec![None; 4];
    let mut resources = vec![None; 4];
    let changed = cache.bind_resource_views::<ShaderResourceViews>(
        ShaderStage::Pixel,
        &mut views,
        &mut resources,
        &base,
    );
    assert_eq!(changed.as_range(), Some(2..=3));
    assert_eq!(views[2..], [Some(texture_srv.native_view()), Some(buffer_srv.native_view())]);
    assert_eq!(resources[2..], [Some(texture.native_resource()), Some(buffer.native_resource())]);

    //a stale resource entry is overwritten even though no view changed
    resources[3] = NativeResource::from_raw(u64::MAX);
    let changed = cache.bind_resource_views::<ShaderResourceViews>(
        ShaderStage::Pixel,
        &mut views,
        &mut resources,
        &base,
    );
    assert!(changed.is_empty());
    assert_eq!(resources[3], Some(buffer.native_resource()));
    assert_eq!(resources[..2], [None::<NativeResource>, None]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn out_of_range_slot_in_later_stage_is_not_bound() {
    let counters = ShaderResourceCounters::new()
        .with(ResourceRange::ShaderResourceView, ShaderStage::Vertex, 4)
        .with(ResourceRange::ShaderResourceView, ShaderStage::Pixel, 1);
    let cache = new_cache(&counters);
    let mut bind_points = ResourceBindPoints::new();
    bind_points.set(ShaderStage::Vertex, 2);
    bind_points.set(ShaderStage::Pixel, 3);
    assert!(!cache.is_resource_bound::<ShaderResourceViews>(&bind_points));
}
