// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! In-memory resources for exercising the cache without a device.
#![allow(dead_code)]

use shader_resource_cache::native::{NativeBuffer, NativeResource, NativeSampler, NativeView};
use shader_resource_cache::resources::{
    Buffer, BufferView, ResourceState, Sampler, ShaderView, StateTransitionContext, Texture,
    TextureView, TrackedResource,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn next_handle() -> u64 {
    NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub struct MockBuffer {
    handle: u64,
    size: u32,
    state: Mutex<ResourceState>,
}

impl MockBuffer {
    pub fn new(size: u32) -> Arc<dyn Buffer> {
        Self::with_state(size, ResourceState::UNKNOWN)
    }

    pub fn with_state(size: u32, state: ResourceState) -> Arc<dyn Buffer> {
        Arc::new(MockBuffer {
            handle: next_handle(),
            size,
            state: Mutex::new(state),
        })
    }
}

impl Buffer for MockBuffer {
    fn native_buffer(&self) -> NativeBuffer {
        NativeBuffer::from_raw(self.handle).expect("handles start at 1")
    }

    fn size_in_bytes(&self) -> u32 {
        self.size
    }

    fn state(&self) -> ResourceState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: ResourceState) {
        *self.state.lock().unwrap() = state;
    }
}

#[derive(Debug)]
pub struct MockTexture {
    handle: u64,
    state: Mutex<ResourceState>,
}

impl MockTexture {
    pub fn new(state: ResourceState) -> Arc<dyn Texture> {
        Arc::new(MockTexture {
            handle: next_handle(),
            state: Mutex::new(state),
        })
    }
}

impl Texture for MockTexture {
    fn native_resource(&self) -> NativeResource {
        NativeResource::from_raw(self.handle).expect("handles start at 1")
    }

    fn state(&self) -> ResourceState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: ResourceState) {
        *self.state.lock().unwrap() = state;
    }
}

#[derive(Debug)]
pub struct MockTextureView {
    handle: u64,
    texture: Arc<dyn Texture>,
}

impl TextureView for MockTextureView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn native_view(&self) -> NativeView {
        NativeView::from_raw(self.handle).expect("handles start at 1")
    }
}

#[derive(Debug)]
pub struct MockBufferView {
    handle: u64,
    buffer: Arc<dyn Buffer>,
}

impl BufferView for MockBufferView {
    fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    fn native_view(&self) -> NativeView {
        NativeView::from_raw(self.handle).expect("handles start at 1")
    }
}

#[derive(Debug)]
pub struct MockSampler {
    handle: u64,
}

impl MockSampler {
    pub fn new() -> Arc<dyn Sampler> {
        Arc::new(MockSampler {
            handle: next_handle(),
        })
    }
}

impl Sampler for MockSampler {
    fn native_sampler(&self) -> NativeSampler {
        NativeSampler::from_raw(self.handle).expect("handles start at 1")
    }
}

/// A view of `texture`.
pub fn texture_view(texture: &Arc<dyn Texture>) -> ShaderView {
    let view: Arc<dyn TextureView> = Arc::new(MockTextureView {
        handle: next_handle(),
        texture: texture.clone(),
    });
    view.into()
}

/// A view of `buffer`.
pub fn buffer_view(buffer: &Arc<dyn Buffer>) -> ShaderView {
    let view: Arc<dyn BufferView> = Arc::new(MockBufferView {
        handle: next_handle(),
        buffer: buffer.clone(),
    });
    view.into()
}

/// Applies every requested transition and remembers it.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub transitions: Vec<(NativeResource, ResourceState)>,
}

impl StateTransitionContext for RecordingContext {
    fn transition_resource(&mut self, resource: TrackedResource<'_>, state: ResourceState) {
        resource.set_state(state);
        self.transitions.push((resource.native_resource(), state));
    }
}
