// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: One-shot boot initialization of the resource core
//! OWNERS: @kernel-team
//! PUBLIC API: init_page_heap(), init_state_table(), page_heap(), Bootstrap, PageAllocatorSeed
//! DEPENDS_ON: mm::pool, sched::table, config, log
//! INVARIANTS: The frame allocator is seeded at most once; the state table is built before
//!             the first scheduling decision

use crate::config::BOARD_POOL;
use crate::mm::{PageHeap, PoolWindow};
use crate::sched::table::{self, StateTable};

/// Frame allocator that takes the pool extent once at boot.
pub trait PageAllocatorSeed {
    fn seed(&mut self, heap: PageHeap);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapError {
    /// The step already ran.
    AlreadyInitialized,
}

/// Boot-time state with run-once guards.
pub struct Bootstrap {
    heap: spin::Once<PageHeap>,
}

static BOOTSTRAP: Bootstrap = Bootstrap::new();

impl Bootstrap {
    pub const fn new() -> Self {
        Self { heap: spin::Once::new() }
    }

    /// Hands the pool extent of `pool` to `allocator`.
    ///
    /// Misaligned pool fields are reported and otherwise ignored.
    pub fn init_page_heap<A: PageAllocatorSeed + ?Sized>(
        &self,
        pool: &PoolWindow,
        allocator: &mut A,
    ) -> Result<PageHeap, BootstrapError> {
        let mut seeded = false;
        let heap = *self.heap.call_once(|| {
            seeded = true;
            let misaligned = pool.config().misalignment();
            if !misaligned.is_empty() {
                log_warn!(target: "bootstrap", "page pool not page aligned: {:?}", misaligned);
            }
            let heap = pool.heap_descriptor();
            allocator.seed(heap);
            heap
        });
        if !seeded {
            return Err(BootstrapError::AlreadyInitialized);
        }
        log_info!(
            target: "bootstrap",
            "page heap start={} size={:#x}",
            heap.start,
            heap.size
        );
        Ok(heap)
    }

    /// Extent handed to the allocator, once seeded.
    pub fn page_heap(&self) -> Option<PageHeap> {
        self.heap.get().copied()
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeds `allocator` with the board's page pool.
pub fn init_page_heap<A: PageAllocatorSeed + ?Sized>(
    allocator: &mut A,
) -> Result<PageHeap, BootstrapError> {
    BOOTSTRAP.init_page_heap(&BOARD_POOL, allocator)
}

/// Board page heap, once [`init_page_heap`] has run.
pub fn page_heap() -> Option<PageHeap> {
    BOOTSTRAP.page_heap()
}

/// Builds the global state table.
pub fn init_state_table() -> Result<&'static StateTable, BootstrapError> {
    if !table::init() {
        return Err(BootstrapError::AlreadyInitialized);
    }
    log_info!(target: "bootstrap", "state table ready");
    table::get().ok_or(BootstrapError::AlreadyInitialized)
}

#[cfg(target_arch = "arm")]
mod board {
    use crate::config::{BOARD_LAYOUT, BOARD_POOL, L1_TABLE_VADDR};
    use crate::hal::armv7::{Armv7Cache, KernelMemory};
    use crate::mm::{AddressLayout, PageTableWalker, PoolWindow};

    static LAYOUT: AddressLayout = BOARD_LAYOUT;
    static POOL: PoolWindow = BOARD_POOL;

    /// Walker over the live user tables of this board.
    ///
    /// # Safety
    ///
    /// The L1 table at `L1_TABLE_VADDR` and the pool alias must be mapped in
    /// the kernel address space.
    pub unsafe fn walker() -> PageTableWalker<'static, KernelMemory, Armv7Cache> {
        // SAFETY: forwarded to the caller.
        let memory = unsafe { KernelMemory::new() };
        PageTableWalker::new(&LAYOUT, &POOL, L1_TABLE_VADDR, memory, Armv7Cache)
    }
}

#[cfg(target_arch = "arm")]
pub use board::walker as board_walker;
