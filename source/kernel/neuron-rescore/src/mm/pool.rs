// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Physical page pool and its fixed kernel alias
//! OWNERS: @kernel-mm-team
//! PUBLIC API: PoolWindow::{new, heap_descriptor, phys_to_virt, contains}, PoolConfig, PageHeap
//! DEPENDS_ON: types (PhysAddr, VirtAddr)
//! INVARIANTS: Immutable after construction; every query is O(1) and side-effect free
//!
//! The pool is carved out of one physical memory section that the kernel maps
//! at a single fixed virtual offset. Inverting that alias needs arithmetic
//! only. The returned address is the *kernel* alias of a pool frame, not the
//! address a user process sees it at; no general inverse walk is provided.

use bitflags::bitflags;

use crate::mm::PAGE_SIZE;
use crate::types::{PhysAddr, VirtAddr};

/// Board description of the page pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Physical base of the memory section holding the pool.
    pub phys_section: u32,
    /// Kernel virtual base the section is mapped at.
    pub virt_section: u32,
    /// Offset of the pool from `phys_section`.
    pub offset: u32,
    /// Pool size in bytes.
    pub size: u32,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Configuration fields that are not page aligned.
    pub struct PoolMisalignment: u8 {
        const SECTION = 1 << 0;
        const OFFSET = 1 << 1;
        const SIZE = 1 << 2;
    }
}

impl PoolConfig {
    /// Reports page-misaligned fields.
    ///
    /// Misalignment is a configuration defect that is warned about, not
    /// rejected: the pool still works, it just wastes partial pages.
    pub const fn misalignment(&self) -> PoolMisalignment {
        let page = PAGE_SIZE as u32;
        let mut bits = 0;
        if self.phys_section % page != 0 {
            bits |= PoolMisalignment::SECTION.bits();
        }
        if self.offset % page != 0 {
            bits |= PoolMisalignment::OFFSET.bits();
        }
        if self.size % page != 0 {
            bits |= PoolMisalignment::SIZE.bits();
        }
        PoolMisalignment::from_bits_retain(bits)
    }
}

/// Error returned when a pool configuration cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// `phys_section + offset` overflows the physical address space.
    StartOverflow,
    /// The pool extends beyond the physical address space.
    EndOverflow,
    /// Pool size is zero.
    Empty,
}

/// Physical extent handed to the frame allocator at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageHeap {
    pub start: PhysAddr,
    pub size: u32,
}

/// Affine window between the pool and its kernel alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolWindow {
    config: PoolConfig,
    start: u32,
    // u64 so a pool may end exactly at 4 GiB.
    end: u64,
}

impl PoolWindow {
    pub const fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.size == 0 {
            return Err(PoolError::Empty);
        }
        let Some(start) = config.phys_section.checked_add(config.offset) else {
            return Err(PoolError::StartOverflow);
        };
        let end = start as u64 + config.size as u64;
        if end > 1u64 << 32 {
            return Err(PoolError::EndOverflow);
        }
        Ok(Self { config, start, end })
    }

    #[inline]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Physical start and size of the pool.
    ///
    /// Queried once by bootstrap to seed the frame allocator; repeated calls
    /// return the same value.
    #[inline]
    pub const fn heap_descriptor(&self) -> PageHeap {
        PageHeap { start: PhysAddr::new(self.start), size: self.config.size }
    }

    /// Whether `pa` lies in `[start, start + size)`.
    #[inline]
    pub const fn contains(&self, pa: PhysAddr) -> bool {
        pa.raw() >= self.start && (pa.raw() as u64) < self.end
    }

    /// Kernel virtual alias of a pool address, or `None` outside the pool.
    #[inline]
    pub const fn phys_to_virt(&self, pa: PhysAddr) -> Option<VirtAddr> {
        if !self.contains(pa) {
            return None;
        }
        Some(VirtAddr::new(
            pa.raw()
                .wrapping_sub(self.config.phys_section)
                .wrapping_add(self.config.virt_section),
        ))
    }
}
