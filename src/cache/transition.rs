// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Moving bound resources into the states their bindings require.
//!
//! | Range                  | Required state                        |
//! |------------------------|---------------------------------------|
//! | Constant buffers       | [`ResourceState::CONSTANT_BUFFER`]    |
//! | Read-only views        | [`ResourceState::SHADER_RESOURCE`]    |
//! | Read-write views       | [`ResourceState::UNORDERED_ACCESS`]   |
//! | Samplers               | none                                  |
//!
//! Resources whose state is not tracked are skipped.

use crate::cache::ShaderResourceCache;
use crate::cache::entries::{CachedView, ViewOwner};
use crate::cache::ranges::{ConstantBuffers, ShaderResourceViews, UnorderedAccessViews, ViewRange};
use crate::error::Error;
use crate::range::ResourceRange;
use crate::resources::{ResourceState, StateTransitionContext, TrackedResource};
use crate::stages::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTransitionMode {
    /// Ask the context to transition every resource that is not in its required state.
    Transition,
    /// Only check that every resource already is in its required state.
    Verify,
}

/// Where a resource is bound, for diagnostics.
#[derive(Debug, Clone, Copy)]
struct SlotLocation {
    range: ResourceRange,
    stage: ShaderStage,
    slot: u32,
}

impl ShaderResourceCache {
    /// Visits every bound resource of every stage and range once per slot it occupies.
    ///
    /// In [`StateTransitionMode::Transition`] mode, resources that are not in the state their
    /// range requires are handed to `context` for a transition. In
    /// [`StateTransitionMode::Verify`] mode nothing is transitioned; the first resource found in
    /// the wrong state is reported as [`Error::UnexpectedResourceState`].
    pub fn transition_resource_states(
        &self,
        mode: StateTransitionMode,
        context: &mut dyn StateTransitionContext,
    ) -> Result<(), Error> {
        for stage in ShaderStage::ALL {
            for (slot, cb) in (0u32..).zip(self.resources::<ConstantBuffers>(stage)) {
                if let Some(buffer) = cb.buffer() {
                    let location = SlotLocation {
                        range: ResourceRange::ConstantBuffer,
                        stage,
                        slot,
                    };
                    process(mode, context, TrackedResource::Buffer(buffer), location)?;
                }
            }
            self.transition_views::<ShaderResourceViews>(stage, mode, context)?;
            //samplers have no state
            self.transition_views::<UnorderedAccessViews>(stage, mode, context)?;
        }
        Ok(())
    }

    fn transition_views<R: ViewRange>(
        &self,
        stage: ShaderStage,
        mode: StateTransitionMode,
        context: &mut dyn StateTransitionContext,
    ) -> Result<(), Error> {
        for (slot, view) in (0u32..).zip(self.resources::<R>(stage)) {
            if let Some(resource) = tracked_owner(view) {
                let location = SlotLocation {
                    range: R::RANGE,
                    stage,
                    slot,
                };
                process(mode, context, resource, location)?;
            }
        }
        Ok(())
    }
}

fn tracked_owner(view: &CachedView) -> Option<TrackedResource<'_>> {
    match view.owner()? {
        ViewOwner::Texture(texture) => Some(TrackedResource::Texture(texture)),
        ViewOwner::Buffer(buffer) => Some(TrackedResource::Buffer(buffer)),
    }
}

fn process(
    mode: StateTransitionMode,
    context: &mut dyn StateTransitionContext,
    resource: TrackedResource<'_>,
    location: SlotLocation,
) -> Result<(), Error> {
    let Some(required) = location.range.required_state() else {
        return Ok(());
    };
    let state = resource.state();
    if !state.is_known() || state.satisfies(required) {
        return Ok(());
    }
    match mode {
        StateTransitionMode::Transition => {
            logwise::trace_sync!(
                "transitioning {resource} bound to {location} into {required}",
                resource = logwise::privacy::LogIt(&resource),
                location = logwise::privacy::LogIt(&location),
                required = logwise::privacy::LogIt(&required)
            );
            context.transition_resource(resource, required);
            Ok(())
        }
        StateTransitionMode::Verify => {
            logwise::error_sync!(
                "{resource} bound to {location} is in state {actual}, expected {expected}",
                resource = logwise::privacy::LogIt(&resource),
                location = logwise::privacy::LogIt(&location),
                actual = logwise::privacy::LogIt(&state),
                expected = logwise::privacy::LogIt(&required)
            );
            Err(Error::UnexpectedResourceState {
                label: format!("{resource:?}"),
                range: location.range,
                stage: location.stage,
                slot: location.slot,
                expected: required,
                actual: state,
            })
        }
    }
}
