// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hardware abstraction layer traits consumed by the resource core.

#[cfg(target_arch = "arm")]
pub mod armv7;
pub mod irq;

use crate::types::VirtAddr;

/// Word-granular read access to kernel-mapped page-table memory.
pub trait TableMemory {
    /// Reads the descriptor word at kernel virtual address `va`.
    fn read_word(&self, va: VirtAddr) -> u32;
}

/// Data-cache maintenance by virtual address.
pub trait CacheMaintenance {
    /// Invalidates every data-cache line overlapping `[start, end)`.
    ///
    /// Subsequent reads in the range are served from memory.
    fn invalidate_dcache(&self, start: VirtAddr, end: VirtAddr);
}

impl<T: TableMemory + ?Sized> TableMemory for &T {
    #[inline]
    fn read_word(&self, va: VirtAddr) -> u32 {
        (**self).read_word(va)
    }
}

impl<T: CacheMaintenance + ?Sized> CacheMaintenance for &T {
    #[inline]
    fn invalidate_dcache(&self, start: VirtAddr, end: VirtAddr) {
        (**self).invalidate_dcache(start, end)
    }
}
