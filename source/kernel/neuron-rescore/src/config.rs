// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Board configuration for the resource core
//! OWNERS: @kernel-team
//! PUBLIC API: BOARD_POOL_CONFIG, BOARD_LAYOUT_CONFIG, BOARD_POOL, BOARD_LAYOUT, L1_TABLE_VADDR,
//!             NCPUS, TASK_LIST_CAPACITY
//! INVARIANTS: Board constants are page aligned and the layout is disjoint (checked at build time)

use static_assertions::const_assert;

use crate::mm::{AddressLayout, LayoutConfig, PoolConfig, PoolWindow};
use crate::types::VirtAddr;

/// Physical base of the DDR section holding the page pool.
pub const DDRCS_PSECTION: u32 = 0x2000_0000;
/// Kernel virtual base the DDR section is mapped at.
pub const DDRCS_VSECTION: u32 = 0x6000_0000;
/// Offset of the page pool inside the DDR section.
pub const PGHEAP_OFFSET: u32 = 0x0010_0000;
/// Size of the page pool.
pub const PGHEAP_SIZE: u32 = 0x0080_0000;

pub const TEXT_VBASE: u32 = 0x8000_0000;
pub const TEXT_NPAGES: u32 = 256;
pub const DATA_VBASE: u32 = 0x8010_0000;
pub const DATA_NPAGES: u32 = 256;
pub const HEAP_VBASE: u32 = 0x8020_0000;
pub const HEAP_NPAGES: u32 = 256;
pub const STACK_VBASE: u32 = 0x8030_0000;
pub const STACK_NPAGES: u32 = 256;

/// Kernel virtual address of the user L1 translation table.
pub const L1_TABLE_VADDR: VirtAddr = VirtAddr::new(0x6000_4000);

/// CPUs with their own assigned-task list.
#[cfg(feature = "smp")]
pub const NCPUS: usize = 4;
#[cfg(not(feature = "smp"))]
pub const NCPUS: usize = 1;

/// Maximum number of tasks held by any single wait list.
pub const TASK_LIST_CAPACITY: usize = 32;

pub const BOARD_POOL_CONFIG: PoolConfig = PoolConfig {
    phys_section: DDRCS_PSECTION,
    virt_section: DDRCS_VSECTION,
    offset: PGHEAP_OFFSET,
    size: PGHEAP_SIZE,
};

pub const BOARD_LAYOUT_CONFIG: LayoutConfig = LayoutConfig {
    text_vbase: TEXT_VBASE,
    text_npages: TEXT_NPAGES,
    data_vbase: DATA_VBASE,
    data_npages: DATA_NPAGES,
    heap_vbase: HEAP_VBASE,
    heap_npages: HEAP_NPAGES,
    stack_vbase: STACK_VBASE,
    stack_npages: STACK_NPAGES,
};

const_assert!(BOARD_POOL_CONFIG.misalignment().is_empty());
const_assert!(BOARD_LAYOUT_CONFIG.check().is_ok());
const_assert!(L1_TABLE_VADDR.raw() % 0x4000 == 0);
const_assert!(NCPUS >= 1);

/// Pool window of the board, validated at compile time.
pub const BOARD_POOL: PoolWindow = match PoolWindow::new(BOARD_POOL_CONFIG) {
    Ok(pool) => pool,
    Err(_) => panic!("board page pool does not fit the physical address space"),
};

/// User address layout of the board, validated at compile time.
pub const BOARD_LAYOUT: AddressLayout = AddressLayout::from_config(&BOARD_LAYOUT_CONFIG);
