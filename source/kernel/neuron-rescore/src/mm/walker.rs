// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Virtual-to-physical translation for demand-mapped user regions
//! OWNERS: @kernel-mm-team
//! PUBLIC API: PageTableWalker::{new, translate, translate_raw}, NO_MAPPING
//! DEPENDS_ON: mm::region (classify), mm::pool (L2 alias), hal (TableMemory, CacheMaintenance)
//! INVARIANTS: No allocation, no locking; at most two descriptor reads and one cache
//!             invalidation per call; failure is `None`, never a fault
//!
//! Only page-table L1 entries are followed. Section, fault and reserved L1
//! entries are reported as unmapped without looking at any L2 memory.
//!
//! L2 tables may be written by another bus master (DMA, another core), so the
//! descriptor word is invalidated in the local D-cache right before it is read.

use crate::hal::{CacheMaintenance, TableMemory};
use crate::mm::descriptor::{L1Descriptor, L1Entry, L2Entry};
use crate::mm::pool::PoolWindow;
use crate::mm::region::AddressLayout;
use crate::mm::DESCRIPTOR_SIZE;
use crate::types::{PhysAddr, VirtAddr};

/// Boundary encoding of a failed translation.
///
/// Physical address zero is never a pool frame on the supported boards, so it
/// can double as "no mapping" for callers that only take a raw word.
pub const NO_MAPPING: u32 = 0;

/// Two-level walker over the active user translation tables.
pub struct PageTableWalker<'a, M, C> {
    layout: &'a AddressLayout,
    pool: &'a PoolWindow,
    l1_table: VirtAddr,
    memory: M,
    cache: C,
}

impl<'a, M: TableMemory, C: CacheMaintenance> PageTableWalker<'a, M, C> {
    /// `l1_table` is the kernel virtual address of the L1 table.
    pub const fn new(
        layout: &'a AddressLayout,
        pool: &'a PoolWindow,
        l1_table: VirtAddr,
        memory: M,
        cache: C,
    ) -> Self {
        Self { layout, pool, l1_table, memory, cache }
    }

    /// Physical address `va` is mapped to, or `None`.
    pub fn translate(&self, va: VirtAddr) -> Option<PhysAddr> {
        self.layout.classify(va)?;

        let L1Descriptor::PageTable(table) = self.l1_entry(va).decode() else {
            return None;
        };
        let l2_table = self.pool.phys_to_virt(table.l2_table())?;

        let index = L2Entry::index_of(va) as u32;
        let slot = VirtAddr::new(l2_table.raw().wrapping_add(index * DESCRIPTOR_SIZE));
        self.cache
            .invalidate_dcache(slot, VirtAddr::new(slot.raw().wrapping_add(DESCRIPTOR_SIZE)));

        L2Entry::from_raw(self.memory.read_word(slot)).decode().resolve(va)
    }

    /// [`translate`](Self::translate) with failure encoded as [`NO_MAPPING`].
    #[inline]
    pub fn translate_raw(&self, va: u32) -> u32 {
        self.translate(VirtAddr::new(va)).map_or(NO_MAPPING, PhysAddr::raw)
    }

    fn l1_entry(&self, va: VirtAddr) -> L1Entry {
        let offset = L1Entry::index_of(va) as u32 * DESCRIPTOR_SIZE;
        L1Entry::from_raw(self.memory.read_word(VirtAddr::new(self.l1_table.raw().wrapping_add(offset))))
    }
}
