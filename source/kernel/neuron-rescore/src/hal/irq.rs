// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Local interrupt masking used by the scheduling critical section.
//!
//! Off target (host tests) there is nothing to mask and the saved state is
//! a constant.

/// Interrupt state captured by [`save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "the saved state has to be handed back to `restore`"]
pub struct IrqState(u32);

/// Masks IRQs on the local CPU and returns the previous state.
#[inline]
pub fn save() -> IrqState {
    #[cfg(target_arch = "arm")]
    {
        IrqState(super::armv7::irq_save())
    }
    #[cfg(not(target_arch = "arm"))]
    {
        IrqState(0)
    }
}

/// Restores the state returned by [`save`].
#[inline]
pub fn restore(state: IrqState) {
    #[cfg(target_arch = "arm")]
    {
        super::armv7::irq_restore(state.0);
    }
    #[cfg(not(target_arch = "arm"))]
    {
        let _ = state;
    }
}
