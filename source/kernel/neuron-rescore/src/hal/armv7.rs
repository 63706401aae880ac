// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: ARMv7-A implementations of the HAL traits
//! OWNERS: @kernel-arch-team
//! PUBLIC API: Armv7Cache, KernelMemory, irq_save(), irq_restore()
//! DEPENDS_ON: core::arch::asm (CP15, CPSR)
//! INVARIANTS: Cache operations complete (DSB) before returning

use core::arch::asm;
use core::sync::atomic::{AtomicU32, Ordering};

use super::{CacheMaintenance, TableMemory};
use crate::types::VirtAddr;

/// Smallest D-cache line, read from CTR on first use. 0 = not read yet.
static DCACHE_LINE: AtomicU32 = AtomicU32::new(0);

#[inline]
fn dcache_line_size() -> u32 {
    let cached = DCACHE_LINE.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }
    let ctr: u32;
    // SAFETY: reading CTR has no side effects.
    unsafe {
        asm!("mrc p15, 0, {}, c0, c0, 1", out(reg) ctr, options(nomem, nostack, preserves_flags));
    }
    // DminLine, bits [19:16]: log2 of the line length in words.
    let line = 4 << ((ctr >> 16) & 0xf);
    DCACHE_LINE.store(line, Ordering::Relaxed);
    line
}

/// D-cache maintenance through CP15 (DCIMVAC).
#[derive(Clone, Copy, Debug, Default)]
pub struct Armv7Cache;

impl CacheMaintenance for Armv7Cache {
    fn invalidate_dcache(&self, start: VirtAddr, end: VirtAddr) {
        if end <= start {
            return;
        }
        let line = dcache_line_size();
        let mut addr = start.raw() & !(line - 1);
        while addr < end.raw() {
            // SAFETY: DCIMVAC by MVA only affects cache state.
            unsafe {
                asm!("mcr p15, 0, {}, c7, c6, 1", in(reg) addr, options(nostack, preserves_flags));
            }
            match addr.checked_add(line) {
                Some(next) => addr = next,
                None => break,
            }
        }
        // SAFETY: barrier only.
        unsafe {
            asm!("dsb", options(nostack, preserves_flags));
        }
    }
}

/// Volatile reads of kernel-mapped page-table memory.
#[derive(Debug)]
pub struct KernelMemory {
    _private: (),
}

impl KernelMemory {
    /// # Safety
    ///
    /// Every address later passed to [`TableMemory::read_word`] must be a
    /// word-aligned kernel mapping of page-table memory (the L1 table or an
    /// L2 table inside the pool window).
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl TableMemory for KernelMemory {
    #[inline]
    fn read_word(&self, va: VirtAddr) -> u32 {
        // SAFETY: guaranteed by the contract of `KernelMemory::new`.
        unsafe { core::ptr::read_volatile(va.raw() as usize as *const u32) }
    }
}

/// Masks IRQs and returns the previous CPSR.
#[inline]
pub fn irq_save() -> u32 {
    let cpsr: u32;
    // SAFETY: only changes the local I bit; acts as a compiler barrier.
    unsafe {
        asm!("mrs {}, cpsr", "cpsid i", out(reg) cpsr, options(nostack, preserves_flags));
    }
    cpsr
}

/// Restores the control field of a CPSR returned by [`irq_save`].
#[inline]
pub fn irq_restore(cpsr: u32) {
    // SAFETY: writes back the control bits captured by `irq_save`.
    unsafe {
        asm!("msr cpsr_c, {}", in(reg) cpsr, options(nostack, preserves_flags));
    }
}
