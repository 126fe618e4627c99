// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The value records stored in each cache slot.
//!
//! Every record has an unbound state, which is also its [`Default`]. Records compare equal when
//! they hold the same objects and parameters; resources are compared by identity.

use crate::bittricks::align_up_u32;
use crate::native::NativeResource;
use crate::resources::{Buffer, Sampler, ShaderView, Texture, same_object};
use std::fmt::Debug;
use std::sync::Arc;

/// Size of one shader constant, in bytes.
pub const CONSTANT_SIZE: u32 = 16;

/// The number of constants bound from a buffer must be a multiple of this.
pub const NUM_CONSTANTS_ALIGNMENT: u32 = 16;

/// Common behavior of cache records.
pub trait CachedEntry: Default + Clone + PartialEq + Debug {
    fn is_bound(&self) -> bool;
}

/// A constant buffer binding: a byte window of a buffer plus a per-draw dynamic offset.
#[derive(Debug, Clone, Default)]
pub struct CachedConstantBuffer {
    buffer: Option<Arc<dyn Buffer>>,
    base_offset: u32,
    range_size: u32,
    dynamic_offset: u32,
}

impl CachedConstantBuffer {
    /// Replaces the binding. A zero `range_size` means "to the end of the buffer".
    /// Any dynamic offset is reset.
    pub(crate) fn set(&mut self, buffer: Option<Arc<dyn Buffer>>, base_offset: u32, range_size: u32) {
        self.range_size = match &buffer {
            Some(buffer) if range_size == 0 => buffer.size_in_bytes().saturating_sub(base_offset),
            _ => range_size,
        };
        self.buffer = buffer;
        self.base_offset = base_offset;
        self.dynamic_offset = 0;
    }

    pub(crate) fn set_dynamic_offset(&mut self, dynamic_offset: u32) {
        self.dynamic_offset = dynamic_offset;
    }

    pub fn buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.buffer.as_ref()
    }

    pub fn base_offset(&self) -> u32 {
        self.base_offset
    }

    pub fn range_size(&self) -> u32 {
        self.range_size
    }

    pub fn dynamic_offset(&self) -> u32 {
        self.dynamic_offset
    }

    /// A dynamic offset only makes sense when the bound window is a strict sub-range of the buffer.
    pub fn allows_dynamic_offset(&self) -> bool {
        match &self.buffer {
            Some(buffer) => self.range_size != 0 && self.range_size < buffer.size_in_bytes(),
            None => false,
        }
    }

    /// The constant window a bind call should use for this slot.
    pub fn bind_window(&self) -> ConstantBufferWindow {
        ConstantBufferWindow {
            first_constant: (self.base_offset + self.dynamic_offset) / CONSTANT_SIZE,
            num_constants: align_up_u32(self.range_size / CONSTANT_SIZE, NUM_CONSTANTS_ALIGNMENT),
        }
    }
}

impl PartialEq for CachedConstantBuffer {
    fn eq(&self, other: &Self) -> bool {
        let same_buffer = match (&self.buffer, &other.buffer) {
            (Some(a), Some(b)) => same_object(a, b),
            (None, None) => true,
            _ => false,
        };
        same_buffer
            && self.base_offset == other.base_offset
            && self.range_size == other.range_size
            && self.dynamic_offset == other.dynamic_offset
    }
}

impl CachedEntry for CachedConstantBuffer {
    fn is_bound(&self) -> bool {
        self.buffer.is_some()
    }
}

/// First constant and constant count of a constant buffer bind, in 16-byte constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConstantBufferWindow {
    pub first_constant: u32,
    pub num_constants: u32,
}

/// The resource underneath a bound view.
#[derive(Debug, Clone)]
pub enum ViewOwner {
    Texture(Arc<dyn Texture>),
    Buffer(Arc<dyn Buffer>),
}

impl PartialEq for ViewOwner {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ViewOwner::Texture(a), ViewOwner::Texture(b)) => same_object(a, b),
            (ViewOwner::Buffer(a), ViewOwner::Buffer(b)) => same_object(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BoundView {
    view: ShaderView,
    owner: ViewOwner,
    native_resource: NativeResource,
}

/// A read-only or read-write view binding.
///
/// The view, its owner and the owner's native handle are either all present or all absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedView(Option<BoundView>);

impl CachedView {
    pub(crate) fn set(&mut self, view: Option<ShaderView>) {
        self.0 = view.map(|view| {
            let owner = match &view {
                ShaderView::Texture(view) => ViewOwner::Texture(view.texture().clone()),
                ShaderView::Buffer(view) => ViewOwner::Buffer(view.buffer().clone()),
            };
            let native_resource = match &owner {
                ViewOwner::Texture(texture) => texture.native_resource(),
                ViewOwner::Buffer(buffer) => buffer.native_resource(),
            };
            BoundView {
                view,
                owner,
                native_resource,
            }
        });
    }

    pub fn view(&self) -> Option<&ShaderView> {
        self.0.as_ref().map(|bound| &bound.view)
    }

    pub fn owner(&self) -> Option<&ViewOwner> {
        self.0.as_ref().map(|bound| &bound.owner)
    }

    pub fn texture(&self) -> Option<&Arc<dyn Texture>> {
        match self.owner() {
            Some(ViewOwner::Texture(texture)) => Some(texture),
            _ => None,
        }
    }

    pub fn buffer(&self) -> Option<&Arc<dyn Buffer>> {
        match self.owner() {
            Some(ViewOwner::Buffer(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// Native handle of the texture or buffer underneath the view.
    pub fn native_resource(&self) -> Option<NativeResource> {
        self.0.as_ref().map(|bound| bound.native_resource)
    }
}

impl CachedEntry for CachedView {
    fn is_bound(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CachedSampler(Option<Arc<dyn Sampler>>);

impl CachedSampler {
    pub(crate) fn set(&mut self, sampler: Option<Arc<dyn Sampler>>) {
        self.0 = sampler;
    }

    pub fn sampler(&self) -> Option<&Arc<dyn Sampler>> {
        self.0.as_ref()
    }
}

impl PartialEq for CachedSampler {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => same_object(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl CachedEntry for CachedSampler {
    fn is_bound(&self) -> bool {
        self.0.is_some()
    }
}
