// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Virtual memory primitives for the ARMv7-A short-descriptor format.
//!
//! The translation path is: [`region`] rejects addresses outside the user
//! layout, [`walker`] reads the L1/L2 descriptors defined in [`descriptor`],
//! and [`pool`] supplies the kernel alias of L2 tables living in the page pool.

pub mod descriptor;
pub mod pool;
pub mod region;
pub mod walker;

pub use descriptor::{L1Descriptor, L1Entry, L2Descriptor, L2Entry};
pub use pool::{PageHeap, PoolConfig, PoolError, PoolMisalignment, PoolWindow};
pub use region::{AddressLayout, LayoutConfig, LayoutError, RegionKind, VirtRange};
pub use walker::{PageTableWalker, NO_MAPPING};

/// log2 of the small page size.
pub const PAGE_SHIFT: u32 = 12;
/// Size of a small page in bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
/// Offset bits within a small page.
pub const PAGE_MASK: u32 = (1 << PAGE_SHIFT) - 1;

/// log2 of the region covered by one L1 entry.
pub const SECTION_SHIFT: u32 = 20;
/// Bytes covered by one L1 entry (1 MiB).
pub const SECTION_SIZE: u32 = 1 << SECTION_SHIFT;
/// Offset bits within a section.
pub const SECTION_MASK: u32 = SECTION_SIZE - 1;

/// Entries in the L1 table (4096 x 1 MiB).
pub const L1_ENTRIES: usize = 1 << (32 - SECTION_SHIFT);
/// Entries in one coarse L2 table (256 x 4 KiB).
pub const L2_ENTRIES: usize = 1 << (SECTION_SHIFT - PAGE_SHIFT);
/// Size of one table descriptor word.
pub const DESCRIPTOR_SIZE: u32 = core::mem::size_of::<u32>() as u32;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests_prop;
