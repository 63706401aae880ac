// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Newtypes shared by the translation and dispatch paths
//! OWNERS: @kernel-team
//! PUBLIC API: PhysAddr, VirtAddr, Pid, CpuId, SemId, MqId
//! DEPENDS_ON: mm (PAGE_SIZE)
//! INVARIANTS: Addresses are 32-bit (ARMv7-A short-descriptor translation)
//!
//! Physical and virtual addresses are kept as distinct types so the walker
//! cannot hand a physical table base to a memory read without first going
//! through the pool window.

use crate::mm::PAGE_SIZE;
use core::fmt;

/// Physical address (bytes).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(u32);

impl PhysAddr {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        self.0 as usize % PAGE_SIZE == 0
    }

    #[inline]
    pub const fn checked_add(self, bytes: u32) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

/// Virtual address (bytes).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u32);

impl VirtAddr {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        self.0 as usize % PAGE_SIZE == 0
    }

    #[inline]
    pub const fn checked_add(self, bytes: u32) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#010x})", self.0)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Task identifier.
///
/// **Invariant**: PID 0 is the idle task of the boot CPU.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Pid(u32);

impl Pid {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub const IDLE: Self = Self(0);
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Logical CPU identifier used to pick per-CPU task lists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CpuId(u16);

impl CpuId {
    pub const BOOT: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Identifier of a counting semaphore.
///
/// Held by a blocked TCB as a non-owning reference; the semaphore's owner
/// controls its lifetime. The upper half is the slot generation, so an id
/// outliving its object never names the slot's next occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SemId(u32);

impl SemId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn new(index: u16, generation: u16) -> Self {
        Self(pack_id(index, generation))
    }

    #[inline]
    pub const fn as_index(self) -> usize {
        (self.0 & ID_INDEX_MASK) as usize
    }

    #[inline]
    pub const fn generation(self) -> u16 {
        (self.0 >> ID_GENERATION_SHIFT) as u16
    }
}

/// Identifier of a message queue. Non-owning and generation-tagged, like [`SemId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MqId(u32);

impl MqId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn new(index: u16, generation: u16) -> Self {
        Self(pack_id(index, generation))
    }

    #[inline]
    pub const fn as_index(self) -> usize {
        (self.0 & ID_INDEX_MASK) as usize
    }

    #[inline]
    pub const fn generation(self) -> u16 {
        (self.0 >> ID_GENERATION_SHIFT) as u16
    }
}

const ID_GENERATION_SHIFT: u32 = 16;
const ID_INDEX_MASK: u32 = (1 << ID_GENERATION_SHIFT) - 1;

const fn pack_id(index: u16, generation: u16) -> u32 {
    ((generation as u32) << ID_GENERATION_SHIFT) | index as u32
}
