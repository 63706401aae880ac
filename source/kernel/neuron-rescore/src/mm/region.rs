// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Classification of user virtual addresses into layout regions
//! OWNERS: @kernel-mm-team
//! PUBLIC API: AddressLayout::{new, from_config, classify, range}, LayoutConfig, RegionKind
//! DEPENDS_ON: config (board layout constants)
//! INVARIANTS: Regions are page aligned, non-empty and pairwise disjoint; classify is pure
//!
//! The stack region exists only with the `stack_dynamic` feature. Without it
//! [`RegionKind::Stack`] is never produced.

use crate::mm::PAGE_SIZE;
use crate::types::VirtAddr;

/// Virtual-address class of a user address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    Code,
    Data,
    Heap,
    Stack,
}

/// Error returned when a layout violates its invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Region base is not page aligned.
    Unaligned(RegionKind),
    /// Region covers zero pages.
    Empty(RegionKind),
    /// Region end lies beyond the 32-bit address space.
    Overflow(RegionKind),
    /// Two regions share at least one page.
    Overlap(RegionKind, RegionKind),
}

/// Half-open virtual range `[base, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtRange {
    base: u32,
    // u64 so a range may end exactly at 4 GiB.
    end: u64,
}

impl VirtRange {
    /// Range of `npages` small pages starting at `base`.
    pub const fn from_pages(base: VirtAddr, npages: u32) -> Self {
        Self {
            base: base.raw(),
            end: base.raw() as u64 + npages as u64 * PAGE_SIZE as u64,
        }
    }

    #[inline]
    pub const fn base(self) -> VirtAddr {
        VirtAddr::new(self.base)
    }

    #[inline]
    pub const fn len(self) -> u64 {
        self.end - self.base as u64
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end == self.base as u64
    }

    #[inline]
    pub const fn contains(self, va: VirtAddr) -> bool {
        va.raw() >= self.base && (va.raw() as u64) < self.end
    }

    #[inline]
    pub const fn overlaps(self, other: Self) -> bool {
        (self.base as u64) < other.end && (other.base as u64) < self.end
    }
}

/// Base and size of each user region, as configured for the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    pub text_vbase: u32,
    pub text_npages: u32,
    pub data_vbase: u32,
    pub data_npages: u32,
    pub heap_vbase: u32,
    pub heap_npages: u32,
    pub stack_vbase: u32,
    pub stack_npages: u32,
}

impl LayoutConfig {
    const fn region(&self, kind: RegionKind) -> (u32, u32) {
        match kind {
            RegionKind::Code => (self.text_vbase, self.text_npages),
            RegionKind::Data => (self.data_vbase, self.data_npages),
            RegionKind::Heap => (self.heap_vbase, self.heap_npages),
            RegionKind::Stack => (self.stack_vbase, self.stack_npages),
        }
    }

    /// Checks every region that is compiled in.
    ///
    /// `const` so board constants can be checked at build time.
    pub const fn check(&self) -> Result<(), LayoutError> {
        let kinds = ACTIVE_REGIONS;
        let mut i = 0;
        while i < kinds.len() {
            let (vbase, npages) = self.region(kinds[i]);
            if vbase as usize % PAGE_SIZE != 0 {
                return Err(LayoutError::Unaligned(kinds[i]));
            }
            if npages == 0 {
                return Err(LayoutError::Empty(kinds[i]));
            }
            let range = VirtRange::from_pages(VirtAddr::new(vbase), npages);
            if range.end > 1u64 << 32 {
                return Err(LayoutError::Overflow(kinds[i]));
            }
            let mut j = 0;
            while j < i {
                let (other_base, other_npages) = self.region(kinds[j]);
                let other = VirtRange::from_pages(VirtAddr::new(other_base), other_npages);
                if range.overlaps(other) {
                    return Err(LayoutError::Overlap(kinds[j], kinds[i]));
                }
                j += 1;
            }
            i += 1;
        }
        Ok(())
    }
}

#[cfg(feature = "stack_dynamic")]
const ACTIVE_REGIONS: [RegionKind; 4] =
    [RegionKind::Code, RegionKind::Data, RegionKind::Heap, RegionKind::Stack];
#[cfg(not(feature = "stack_dynamic"))]
const ACTIVE_REGIONS: [RegionKind; 3] = [RegionKind::Code, RegionKind::Data, RegionKind::Heap];

/// Fixed user virtual layout shared by every process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    text: VirtRange,
    data: VirtRange,
    heap: VirtRange,
    #[cfg(feature = "stack_dynamic")]
    stack: VirtRange,
}

impl AddressLayout {
    /// Validates `config` and builds the layout.
    pub const fn new(config: &LayoutConfig) -> Result<Self, LayoutError> {
        match config.check() {
            Ok(()) => Ok(Self::from_config(config)),
            Err(err) => Err(err),
        }
    }

    /// Builds the layout without validation.
    ///
    /// Only for configurations already checked with [`LayoutConfig::check`].
    pub const fn from_config(config: &LayoutConfig) -> Self {
        Self {
            text: VirtRange::from_pages(VirtAddr::new(config.text_vbase), config.text_npages),
            data: VirtRange::from_pages(VirtAddr::new(config.data_vbase), config.data_npages),
            heap: VirtRange::from_pages(VirtAddr::new(config.heap_vbase), config.heap_npages),
            #[cfg(feature = "stack_dynamic")]
            stack: VirtRange::from_pages(VirtAddr::new(config.stack_vbase), config.stack_npages),
        }
    }

    /// Returns the region containing `va`, or `None` if it is outside every region.
    #[inline]
    pub const fn classify(&self, va: VirtAddr) -> Option<RegionKind> {
        if self.text.contains(va) {
            return Some(RegionKind::Code);
        }
        if self.data.contains(va) {
            return Some(RegionKind::Data);
        }
        if self.heap.contains(va) {
            return Some(RegionKind::Heap);
        }
        #[cfg(feature = "stack_dynamic")]
        if self.stack.contains(va) {
            return Some(RegionKind::Stack);
        }
        None
    }

    /// Range backing `kind`, if compiled in.
    pub const fn range(&self, kind: RegionKind) -> Option<VirtRange> {
        match kind {
            RegionKind::Code => Some(self.text),
            RegionKind::Data => Some(self.data),
            RegionKind::Heap => Some(self.heap),
            #[cfg(feature = "stack_dynamic")]
            RegionKind::Stack => Some(self.stack),
            #[cfg(not(feature = "stack_dynamic"))]
            RegionKind::Stack => None,
        }
    }
}
