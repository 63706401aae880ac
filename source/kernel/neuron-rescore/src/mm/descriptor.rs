// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! ARMv7-A short-descriptor table entries.
//!
//! ```text
//! L1 page table:  | L2 base [31:10] | imp | domain [8:5] | NS | PXN | 0 1 |
//! L1 section:     | base [31:20] | NS | 0 | nG | S | AP2 | TEX | AP[1:0] | imp | domain | XN | C | B | 1 0 |
//! L2 large page:  | base [31:16] | XN | TEX | nG | S | AP2 | SBZ | AP[1:0] | C | B | 0 1 |
//! L2 small page:  | base [31:12] | nG | S | AP2 | TEX | AP[1:0] | C | B | 1 XN |
//! ```
//!
//! Raw words are wrapped in [`L1Entry`]/[`L2Entry`] and only expose their
//! address fields after [`L1Entry::decode`]/[`L2Entry::decode`] has
//! established the type tag.

use bitflags::bitflags;

use crate::types::{PhysAddr, VirtAddr};

const L1_TYPE_MASK: u32 = 0b11;
const L1_TYPE_FAULT: u32 = 0b00;
const L1_TYPE_PAGE_TABLE: u32 = 0b01;
const L1_TYPE_SECTION: u32 = 0b10;

/// L2 table base field of a page-table L1 entry (1 KiB aligned).
pub const L1_PAGE_TABLE_BASE_MASK: u32 = 0xffff_fc00;
/// Section base field of a section L1 entry.
pub const L1_SECTION_BASE_MASK: u32 = 0xfff0_0000;
const L1_SUPERSECTION: u32 = 1 << 18;

const L2_TYPE_MASK: u32 = 0b11;
const L2_TYPE_FAULT: u32 = 0b00;
const L2_TYPE_LARGE: u32 = 0b01;
const L2_TYPE_SMALL: u32 = 0b10;

/// Frame base field of a small-page L2 entry.
pub const L2_SMALL_BASE_MASK: u32 = 0xffff_f000;
/// Frame base field of a large-page L2 entry.
pub const L2_LARGE_BASE_MASK: u32 = 0xffff_0000;
/// Offset bits within a 64 KiB large page.
pub const LARGE_PAGE_MASK: u32 = !L2_LARGE_BASE_MASK;

const DOMAIN_SHIFT: u32 = 5;
const DOMAIN_MASK: u32 = 0xf << DOMAIN_SHIFT;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Attribute bits of a page-table L1 entry.
    pub struct PageTableAttrs: u32 {
        const PXN = 1 << 2;
        const NS = 1 << 3;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Attribute bits of a section L1 entry.
    pub struct SectionAttrs: u32 {
        const BUFFERABLE = 1 << 2;
        const CACHEABLE = 1 << 3;
        const XN = 1 << 4;
        const AP0 = 1 << 10;
        const AP1 = 1 << 11;
        const AP2 = 1 << 15;
        const SHAREABLE = 1 << 16;
        const NOT_GLOBAL = 1 << 17;
        const NS = 1 << 19;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Attribute bits shared by large and small L2 entries.
    pub struct PageAttrs: u32 {
        const BUFFERABLE = 1 << 2;
        const CACHEABLE = 1 << 3;
        const AP0 = 1 << 4;
        const AP1 = 1 << 5;
        const AP2 = 1 << 9;
        const SHAREABLE = 1 << 10;
        const NOT_GLOBAL = 1 << 11;
    }
}

impl PageAttrs {
    /// User read/write, normal write-back memory.
    pub const USER_RW: Self = Self::AP0
        .union(Self::AP1)
        .union(Self::CACHEABLE)
        .union(Self::BUFFERABLE)
        .union(Self::NOT_GLOBAL);
}

/// Raw level-1 descriptor word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct L1Entry(u32);

/// Decoded view of an [`L1Entry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L1Descriptor {
    Fault,
    PageTable(PageTableDescriptor),
    Section(SectionDescriptor),
    /// Type `0b11`; never interpreted.
    Reserved,
}

/// L1 entry pointing at a coarse L2 table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTableDescriptor(u32);

/// L1 entry mapping a 1 MiB section (or 16 MiB supersection) directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionDescriptor(u32);

impl L1Entry {
    pub const FAULT: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Builds a page-table entry for the L2 table at `l2_table`.
    ///
    /// The low 10 bits of `l2_table` are discarded.
    pub const fn page_table(l2_table: PhysAddr, domain: u8, attrs: PageTableAttrs) -> Self {
        Self(
            (l2_table.raw() & L1_PAGE_TABLE_BASE_MASK)
                | (((domain as u32) << DOMAIN_SHIFT) & DOMAIN_MASK)
                | attrs.bits()
                | L1_TYPE_PAGE_TABLE,
        )
    }

    /// Builds a section entry mapping the 1 MiB section at `base`.
    pub const fn section(base: PhysAddr, domain: u8, attrs: SectionAttrs) -> Self {
        Self(
            (base.raw() & L1_SECTION_BASE_MASK)
                | (((domain as u32) << DOMAIN_SHIFT) & DOMAIN_MASK)
                | attrs.bits()
                | L1_TYPE_SECTION,
        )
    }

    /// Returns the type-tagged view of this entry.
    #[inline]
    pub const fn decode(self) -> L1Descriptor {
        match self.0 & L1_TYPE_MASK {
            L1_TYPE_FAULT => L1Descriptor::Fault,
            L1_TYPE_PAGE_TABLE => L1Descriptor::PageTable(PageTableDescriptor(self.0)),
            L1_TYPE_SECTION => L1Descriptor::Section(SectionDescriptor(self.0)),
            _ => L1Descriptor::Reserved,
        }
    }

    /// L1 table index covering `va`.
    #[inline]
    pub const fn index_of(va: VirtAddr) -> usize {
        (va.raw() >> super::SECTION_SHIFT) as usize
    }
}

impl PageTableDescriptor {
    /// Physical base of the referenced L2 table.
    #[inline]
    pub const fn l2_table(self) -> PhysAddr {
        PhysAddr::new(self.0 & L1_PAGE_TABLE_BASE_MASK)
    }

    #[inline]
    pub const fn domain(self) -> u8 {
        ((self.0 & DOMAIN_MASK) >> DOMAIN_SHIFT) as u8
    }

    #[inline]
    pub const fn attrs(self) -> PageTableAttrs {
        PageTableAttrs::from_bits_truncate(self.0)
    }
}

impl SectionDescriptor {
    /// Physical base of the section.
    #[inline]
    pub const fn base(self) -> PhysAddr {
        PhysAddr::new(self.0 & L1_SECTION_BASE_MASK)
    }

    #[inline]
    pub const fn is_supersection(self) -> bool {
        self.0 & L1_SUPERSECTION != 0
    }

    #[inline]
    pub const fn attrs(self) -> SectionAttrs {
        SectionAttrs::from_bits_truncate(self.0)
    }
}

/// Raw level-2 descriptor word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct L2Entry(u32);

/// Decoded view of an [`L2Entry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L2Descriptor {
    Fault,
    Large(LargePage),
    Small(SmallPage),
}

/// 64 KiB page mapping (replicated across 16 consecutive L2 slots).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LargePage(u32);

/// 4 KiB page mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmallPage(u32);

impl L2Entry {
    pub const FAULT: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Builds a small-page entry mapping the frame at `frame`.
    pub const fn small(frame: PhysAddr, attrs: PageAttrs) -> Self {
        Self((frame.raw() & L2_SMALL_BASE_MASK) | attrs.bits() | L2_TYPE_SMALL)
    }

    /// Builds a large-page entry mapping the 64 KiB frame at `frame`.
    pub const fn large(frame: PhysAddr, attrs: PageAttrs) -> Self {
        Self((frame.raw() & L2_LARGE_BASE_MASK) | attrs.bits() | L2_TYPE_LARGE)
    }

    /// Returns the type-tagged view of this entry.
    #[inline]
    pub const fn decode(self) -> L2Descriptor {
        match self.0 & L2_TYPE_MASK {
            L2_TYPE_FAULT => L2Descriptor::Fault,
            L2_TYPE_LARGE => L2Descriptor::Large(LargePage(self.0)),
            // 0b10 and 0b11 are both small pages; bit 0 is XN.
            _ => L2Descriptor::Small(SmallPage(self.0)),
        }
    }

    /// Index of the slot covering `va` within its L2 table.
    #[inline]
    pub const fn index_of(va: VirtAddr) -> usize {
        ((va.raw() & super::SECTION_MASK) >> super::PAGE_SHIFT) as usize
    }
}

impl L2Descriptor {
    /// Physical address `va` resolves to through this entry, if mapped.
    #[inline]
    pub const fn resolve(self, va: VirtAddr) -> Option<PhysAddr> {
        match self {
            L2Descriptor::Fault => None,
            L2Descriptor::Large(page) => {
                Some(PhysAddr::new(page.frame().raw() | (va.raw() & LARGE_PAGE_MASK)))
            }
            L2Descriptor::Small(page) => {
                Some(PhysAddr::new(page.frame().raw() | (va.raw() & super::PAGE_MASK)))
            }
        }
    }
}

impl LargePage {
    #[inline]
    pub const fn frame(self) -> PhysAddr {
        PhysAddr::new(self.0 & L2_LARGE_BASE_MASK)
    }

    #[inline]
    pub const fn attrs(self) -> PageAttrs {
        PageAttrs::from_bits_truncate(self.0)
    }

    #[inline]
    pub const fn execute_never(self) -> bool {
        self.0 & (1 << 15) != 0
    }
}

impl SmallPage {
    #[inline]
    pub const fn frame(self) -> PhysAddr {
        PhysAddr::new(self.0 & L2_SMALL_BASE_MASK)
    }

    #[inline]
    pub const fn attrs(self) -> PageAttrs {
        PageAttrs::from_bits_truncate(self.0)
    }

    #[inline]
    pub const fn execute_never(self) -> bool {
        self.0 & 1 != 0
    }
}
