// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Errors reported by the resource cache.

use crate::range::ResourceRange;
use crate::resources::ResourceState;
use crate::stages::ShaderStage;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Constant buffers can only be bound at offsets that are a multiple of
    /// [`CONSTANT_BUFFER_OFFSET_ALIGNMENT`](crate::cache::CONSTANT_BUFFER_OFFSET_ALIGNMENT).
    #[error("constant buffer offset {offset} is not a multiple of {alignment}")]
    MisalignedConstantBufferOffset { offset: u32, alignment: u32 },

    #[error("constant buffer range [{offset}, {offset}+{range}) is out of bounds of a {buffer_size}-byte buffer")]
    ConstantBufferRangeOutOfBounds {
        offset: u32,
        range: u32,
        buffer_size: u32,
    },

    /// A dynamic offset was set on a slot that was not marked dynamic at initialization.
    #[error("constant buffer slot {slot} of the {stage:?} stage does not accept dynamic offsets")]
    NonDynamicConstantBufferSlot { stage: ShaderStage, slot: u32 },

    /// The resource-count profile does not fit in the 16-bit offset table.
    #[error("resource cache layout requires {required} bytes, but at most {max} are addressable")]
    LayoutTooLarge { required: usize, max: usize },

    #[error("{count} constant buffers requested for the {stage:?} stage, but at most {max} are supported")]
    TooManyConstantBuffers {
        stage: ShaderStage,
        count: u32,
        max: u32,
    },

    /// A bound resource was found in the wrong state while verifying transitions.
    #[error("resource {label} bound to {range:?} slot {slot} of the {stage:?} stage is in state {actual:?}, expected {expected:?}")]
    UnexpectedResourceState {
        label: String,
        range: ResourceRange,
        stage: ShaderStage,
        slot: u32,
        expected: ResourceState,
        actual: ResourceState,
    },

    #[error("dynamic constant buffer mask of the {stage:?} stage is inconsistent at slot {slot}")]
    InconsistentDynamicMask { stage: ShaderStage, slot: u32 },
}
