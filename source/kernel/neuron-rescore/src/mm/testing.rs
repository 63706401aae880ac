// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Host doubles for page-table memory and cache maintenance
//! OWNERS: @kernel-mm-team
//! NOTE: Tests only. Tables are written through the pool alias, exactly where
//!       the walker reads them.

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::hal::{CacheMaintenance, TableMemory};
use crate::mm::descriptor::{L1Entry, L2Entry, PageAttrs, PageTableAttrs};
use crate::mm::pool::{PoolConfig, PoolWindow};
use crate::mm::region::{AddressLayout, LayoutConfig};
use crate::mm::{PageTableWalker, DESCRIPTOR_SIZE};
use crate::types::{PhysAddr, VirtAddr};

pub(crate) const POOL: PoolConfig = PoolConfig {
    phys_section: 0x2000_0000,
    virt_section: 0x6000_0000,
    offset: 0x0010_0000,
    size: 0x0080_0000,
};

pub(crate) const LAYOUT: LayoutConfig = LayoutConfig {
    text_vbase: 0x8000_0000,
    text_npages: 256,
    data_vbase: 0x8010_0000,
    data_npages: 256,
    heap_vbase: 0x8020_0000,
    heap_npages: 256,
    stack_vbase: 0x8030_0000,
    stack_npages: 256,
};

/// Kernel virtual address of the L1 table in the simulated memory.
pub(crate) const L1_TABLE: VirtAddr = VirtAddr::new(0x6000_4000);

/// Sparse word-addressed memory; unwritten words read as zero (fault).
#[derive(Default)]
pub(crate) struct SimMemory {
    words: RefCell<BTreeMap<u32, u32>>,
    reads: Cell<usize>,
}

impl SimMemory {
    pub(crate) fn write_word(&self, va: VirtAddr, value: u32) {
        self.words.borrow_mut().insert(va.raw(), value);
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl TableMemory for SimMemory {
    fn read_word(&self, va: VirtAddr) -> u32 {
        assert_eq!(va.raw() % DESCRIPTOR_SIZE, 0, "unaligned descriptor read at {va}");
        self.reads.set(self.reads.get() + 1);
        self.words.borrow().get(&va.raw()).copied().unwrap_or(0)
    }
}

/// Records every invalidated range.
#[derive(Default)]
pub(crate) struct RecordingCache {
    ranges: RefCell<Vec<(VirtAddr, VirtAddr)>>,
}

impl RecordingCache {
    pub(crate) fn ranges(&self) -> Vec<(VirtAddr, VirtAddr)> {
        self.ranges.borrow().clone()
    }
}

impl CacheMaintenance for RecordingCache {
    fn invalidate_dcache(&self, start: VirtAddr, end: VirtAddr) {
        self.ranges.borrow_mut().push((start, end));
    }
}

/// Writes L1 and L2 descriptors the way the pager would.
pub(crate) struct TableBuilder<'a> {
    memory: &'a SimMemory,
    pool: &'a PoolWindow,
}

impl<'a> TableBuilder<'a> {
    pub(crate) fn new(memory: &'a SimMemory, pool: &'a PoolWindow) -> Self {
        Self { memory, pool }
    }

    pub(crate) fn set_l1(&self, va: VirtAddr, entry: L1Entry) {
        let slot = L1_TABLE.raw() + L1Entry::index_of(va) as u32 * DESCRIPTOR_SIZE;
        self.memory.write_word(VirtAddr::new(slot), entry.raw());
    }

    /// Installs an L2 table at physical `l2_table` for the section of `va`.
    pub(crate) fn install_table(&self, va: VirtAddr, l2_table: PhysAddr) {
        self.set_l1(va, L1Entry::page_table(l2_table, 0, PageTableAttrs::empty()));
    }

    /// Writes `entry` into the L2 table at physical `l2_table`, slot for `va`.
    pub(crate) fn set_l2(&self, l2_table: PhysAddr, va: VirtAddr, entry: L2Entry) {
        let alias = self.pool.phys_to_virt(l2_table).expect("L2 table inside the pool");
        let slot = alias.raw() + L2Entry::index_of(va) as u32 * DESCRIPTOR_SIZE;
        self.memory.write_word(VirtAddr::new(slot), entry.raw());
    }

    /// Installs an L2 table and one small page mapping `va` to `frame`.
    pub(crate) fn map_small(&self, va: VirtAddr, l2_table: PhysAddr, frame: PhysAddr) {
        self.install_table(va, l2_table);
        self.set_l2(l2_table, va, L2Entry::small(frame, PageAttrs::USER_RW));
    }
}

pub(crate) fn pool() -> PoolWindow {
    PoolWindow::new(POOL).expect("valid pool")
}

pub(crate) fn layout() -> AddressLayout {
    AddressLayout::new(&LAYOUT).expect("valid layout")
}

pub(crate) fn walker<'a>(
    layout: &'a AddressLayout,
    pool: &'a PoolWindow,
    memory: &'a SimMemory,
    cache: &'a RecordingCache,
) -> PageTableWalker<'a, &'a SimMemory, &'a RecordingCache> {
    PageTableWalker::new(layout, pool, L1_TABLE, memory, cache)
}
