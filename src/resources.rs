// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource objects the cache binds, and the state tracker it reports to.
//!
//! The cache does not create or own GPU resources. It holds shared references to objects
//! implementing these traits and reads their native handles once, when a slot is set.

use crate::native::{NativeBuffer, NativeResource, NativeSampler, NativeView};
use std::fmt::Debug;
use std::sync::Arc;

/// A GPU buffer.
pub trait Buffer: Debug + Send + Sync {
    fn native_buffer(&self) -> NativeBuffer;

    /// Handle used when the buffer takes part in a state transition.
    fn native_resource(&self) -> NativeResource {
        self.native_buffer().into()
    }

    fn size_in_bytes(&self) -> u32;

    fn state(&self) -> ResourceState;

    /// Records the state the buffer was moved into. Called by a [`StateTransitionContext`].
    fn set_state(&self, state: ResourceState);
}

/// A GPU texture.
pub trait Texture: Debug + Send + Sync {
    fn native_resource(&self) -> NativeResource;
    fn state(&self) -> ResourceState;
    fn set_state(&self, state: ResourceState);
}

/// A shader-resource or unordered-access view of a texture.
///
/// The view keeps its texture alive.
pub trait TextureView: Debug + Send + Sync {
    fn texture(&self) -> &Arc<dyn Texture>;
    fn native_view(&self) -> NativeView;
}

/// A shader-resource or unordered-access view of a buffer.
///
/// The view keeps its buffer alive.
pub trait BufferView: Debug + Send + Sync {
    fn buffer(&self) -> &Arc<dyn Buffer>;
    fn native_view(&self) -> NativeView;
}

pub trait Sampler: Debug + Send + Sync {
    fn native_sampler(&self) -> NativeSampler;
}

/// A view bound to a read-only or read-write slot.
#[derive(Debug, Clone)]
pub enum ShaderView {
    Texture(Arc<dyn TextureView>),
    Buffer(Arc<dyn BufferView>),
}

impl ShaderView {
    pub fn native_view(&self) -> NativeView {
        match self {
            ShaderView::Texture(view) => view.native_view(),
            ShaderView::Buffer(view) => view.native_view(),
        }
    }
}

impl From<Arc<dyn TextureView>> for ShaderView {
    fn from(view: Arc<dyn TextureView>) -> Self {
        ShaderView::Texture(view)
    }
}

impl From<Arc<dyn BufferView>> for ShaderView {
    fn from(view: Arc<dyn BufferView>) -> Self {
        ShaderView::Buffer(view)
    }
}

/// Views are the same binding when they are the same object.
impl PartialEq for ShaderView {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ShaderView::Texture(a), ShaderView::Texture(b)) => same_object(a, b),
            (ShaderView::Buffer(a), ShaderView::Buffer(b)) => same_object(a, b),
            _ => false,
        }
    }
}

impl Eq for ShaderView {}

/// Compares the data pointers of two shared objects, ignoring vtables.
pub(crate) fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

bitflags::bitflags! {
    /// Usage state of a resource. An empty set means the state is not tracked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceState: u32 {
        const UNDEFINED = 1 << 0;
        const VERTEX_BUFFER = 1 << 1;
        const CONSTANT_BUFFER = 1 << 2;
        const INDEX_BUFFER = 1 << 3;
        const RENDER_TARGET = 1 << 4;
        const UNORDERED_ACCESS = 1 << 5;
        const DEPTH_WRITE = 1 << 6;
        const DEPTH_READ = 1 << 7;
        const SHADER_RESOURCE = 1 << 8;
        const COPY_DEST = 1 << 9;
        const COPY_SOURCE = 1 << 10;
    }
}

impl ResourceState {
    pub const UNKNOWN: ResourceState = ResourceState::empty();

    pub fn is_known(self) -> bool {
        !self.is_empty()
    }

    /// Whether a resource in this state can be used as `required` without a transition.
    pub fn satisfies(self, required: ResourceState) -> bool {
        self.contains(required)
    }
}

/// A resource handed to a [`StateTransitionContext`].
#[derive(Debug, Clone, Copy)]
pub enum TrackedResource<'a> {
    Buffer(&'a Arc<dyn Buffer>),
    Texture(&'a Arc<dyn Texture>),
}

impl TrackedResource<'_> {
    pub fn state(&self) -> ResourceState {
        match self {
            TrackedResource::Buffer(buffer) => buffer.state(),
            TrackedResource::Texture(texture) => texture.state(),
        }
    }

    pub fn set_state(&self, state: ResourceState) {
        match self {
            TrackedResource::Buffer(buffer) => buffer.set_state(state),
            TrackedResource::Texture(texture) => texture.set_state(state),
        }
    }

    pub fn native_resource(&self) -> NativeResource {
        match self {
            TrackedResource::Buffer(buffer) => buffer.native_resource(),
            TrackedResource::Texture(texture) => texture.native_resource(),
        }
    }
}

/// The barrier tracker of a device context.
pub trait StateTransitionContext {
    /// Ensures `resource` is in `state`, issuing whatever barriers that takes.
    fn transition_resource(&mut self, resource: TrackedResource<'_>, state: ResourceState);
}
