// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shader stages and bind-point addressing.
//!
//! A single shader variable may be visible to several stages at once, and each stage may place it
//! at a different slot. [`ResourceBindPoints`] records, for every active stage, the slot the
//! variable occupies in that stage's sub-array of the cache.
//!
//! ```
//! use shader_resource_cache::stages::{ResourceBindPoints, ShaderStage};
//!
//! let mut bind_points = ResourceBindPoints::new();
//! bind_points.set(ShaderStage::Vertex, 2);
//! bind_points.set(ShaderStage::Pixel, 0);
//!
//! let visited: Vec<_> = bind_points.iter().collect();
//! assert_eq!(visited, vec![(ShaderStage::Vertex, 2), (ShaderStage::Pixel, 0)]);
//! ```

use std::fmt::{Debug, Formatter};

pub const NUM_SHADER_STAGES: usize = 6;

/// A programmable pipeline stage. The discriminant is the stage index used throughout the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ShaderStage {
    Vertex = 0,
    Pixel = 1,
    Geometry = 2,
    Hull = 3,
    Domain = 4,
    Compute = 5,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; NUM_SHADER_STAGES] = [
        ShaderStage::Vertex,
        ShaderStage::Pixel,
        ShaderStage::Geometry,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Compute,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<ShaderStage> {
        if index < NUM_SHADER_STAGES {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    pub const fn flag(self) -> ShaderStages {
        ShaderStages::from_bits_truncate(1 << self as u8)
    }
}

bitflags::bitflags! {
    /// A set of shader stages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStages: u8 {
        const VERTEX = 1 << 0;
        const PIXEL = 1 << 1;
        const GEOMETRY = 1 << 2;
        const HULL = 1 << 3;
        const DOMAIN = 1 << 4;
        const COMPUTE = 1 << 5;
    }
}

impl ShaderStages {
    /// The lowest-indexed stage in the set.
    pub fn first(self) -> Option<ShaderStage> {
        if self.is_empty() {
            None
        } else {
            ShaderStage::from_index(self.bits().trailing_zeros() as usize)
        }
    }

    /// Removes and returns the lowest-indexed stage in the set.
    pub fn extract_first(&mut self) -> Option<ShaderStage> {
        let stage = self.first()?;
        self.remove(stage.flag());
        Some(stage)
    }
}

/// Marks a stage that does not use the resource.
const INVALID_BIND_POINT: u8 = 0xFF;

/// Per-stage slot indices of one resource.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceBindPoints {
    bindings: [u8; NUM_SHADER_STAGES],
    active: ShaderStages,
}

impl Default for ResourceBindPoints {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceBindPoints {
    pub const fn new() -> Self {
        ResourceBindPoints {
            bindings: [INVALID_BIND_POINT; NUM_SHADER_STAGES],
            active: ShaderStages::empty(),
        }
    }

    /// Bind points with a single active stage.
    pub fn single(stage: ShaderStage, slot: u8) -> Self {
        let mut bind_points = Self::new();
        bind_points.set(stage, slot);
        bind_points
    }

    /// Activates `stage` and places the resource at `slot` in it.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is the reserved invalid slot (255).
    pub fn set(&mut self, stage: ShaderStage, slot: u8) {
        assert!(slot != INVALID_BIND_POINT, "Slot {slot} is reserved");
        self.bindings[stage.index()] = slot;
        self.active.insert(stage.flag());
    }

    pub fn clear(&mut self, stage: ShaderStage) {
        self.bindings[stage.index()] = INVALID_BIND_POINT;
        self.active.remove(stage.flag());
    }

    pub fn active_stages(&self) -> ShaderStages {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_stage_active(&self, stage: ShaderStage) -> bool {
        self.active.contains(stage.flag())
    }

    /// Slot of the resource in `stage`, if the stage is active.
    pub fn get(&self, stage: ShaderStage) -> Option<u32> {
        if self.is_stage_active(stage) {
            Some(self.bindings[stage.index()] as u32)
        } else {
            None
        }
    }

    /// Stage and slot of the lowest-indexed active stage.
    pub fn first(&self) -> Option<(ShaderStage, u32)> {
        let stage = self.active.first()?;
        Some((stage, self.bindings[stage.index()] as u32))
    }

    /// Iterates active stages in ascending stage order.
    pub fn iter(&self) -> BindPointIter {
        BindPointIter {
            remaining: self.active,
            bindings: self.bindings,
        }
    }
}

impl std::ops::Index<ShaderStage> for ResourceBindPoints {
    type Output = u8;

    /// # Panics
    ///
    /// Panics if the stage is not active.
    fn index(&self, stage: ShaderStage) -> &u8 {
        assert!(
            self.is_stage_active(stage),
            "Stage {stage:?} is not active in these bind points"
        );
        &self.bindings[stage.index()]
    }
}

impl Debug for ResourceBindPoints {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ResourceBindPoints {
    type Item = (ShaderStage, u32);
    type IntoIter = BindPointIter;
    fn into_iter(self) -> BindPointIter {
        self.iter()
    }
}

/// Iterator over `(stage, slot)` pairs of the active stages.
#[derive(Debug, Clone)]
pub struct BindPointIter {
    remaining: ShaderStages,
    bindings: [u8; NUM_SHADER_STAGES],
}

impl Iterator for BindPointIter {
    type Item = (ShaderStage, u32);
    fn next(&mut self) -> Option<Self::Item> {
        let stage = self.remaining.extract_first()?;
        Some((stage, self.bindings[stage.index()] as u32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining.bits().count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BindPointIter {}
