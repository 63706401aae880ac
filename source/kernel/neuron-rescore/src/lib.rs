// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Address translation and wait-list dispatch for the NEURON real-time kernel
//! OWNERS: @kernel-team
//! PUBLIC API: mm (PageTableWalker, PoolWindow, AddressLayout), sched (select_wait_list),
//!             bootstrap (init_page_heap, init_state_table), log_* macros
//! DEPENDS_ON: bitflags, spin, static_assertions
//! INVARIANTS: No heap allocation, locking or logging on the translation and dispatch paths
//!
//! Target is ARMv7-A with short-descriptor translation tables. Everything
//! except [`hal::armv7`] builds and tests on the host.

#![cfg_attr(not(test), no_std)]
#![forbid(clippy::unwrap_used)]

extern crate alloc;

#[macro_use]
pub mod log;

pub mod bootstrap;
pub mod config;
pub mod hal;
pub mod mm;
pub mod sched;
pub mod types;

pub use types::{CpuId, MqId, PhysAddr, Pid, SemId, VirtAddr};
