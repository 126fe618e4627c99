// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Opaque driver-side handles.

The cache never dereferences these; it only stores them next to the resources that own them,
compares them while diffing, and hands them back to the submission layer. Handles are non-zero,
so an unbound slot is simply `None` and `Option<Handle>` stays pointer sized.
*/

use std::fmt::{Debug, Formatter};
use std::num::NonZeroU64;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            pub const fn new(raw: NonZeroU64) -> Self {
                $name(raw)
            }

            /// Wraps a raw handle value; zero is the null handle and yields `None`.
            pub const fn from_raw(raw: u64) -> Option<Self> {
                match NonZeroU64::new(raw) {
                    Some(raw) => Some($name(raw)),
                    None => None,
                }
            }

            pub const fn raw(self) -> u64 {
                self.0.get()
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0.get())
            }
        }
    };
}

native_handle!(
    /// Handle of a native buffer object, as passed to a constant buffer bind call.
    NativeBuffer
);
native_handle!(
    /// Handle of a native shader-resource or unordered-access view.
    NativeView
);
native_handle!(
    /// Handle of a native sampler state.
    NativeSampler
);
native_handle!(
    /// Handle of the native texture or buffer underneath a view.
    NativeResource
);

impl From<NativeBuffer> for NativeResource {
    fn from(buffer: NativeBuffer) -> Self {
        NativeResource(buffer.0)
    }
}

static_assertions::assert_eq_size!(Option<NativeBuffer>, u64);
static_assertions::assert_eq_size!(Option<NativeView>, u64);
