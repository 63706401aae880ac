// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Static state-indexed task lists
//! OWNERS: @kernel-sched-team
//! PUBLIC API: StaticList, StateListEntry, StateTable::{new, entry}, TaskLists, init(), get()
//! DEPENDS_ON: sched::state, sched::wait_list, config (NCPUS, TASK_LIST_CAPACITY)
//! INVARIANTS: The global table is built once before the first scheduling decision and is
//!             immutable afterwards; reads take no lock
//!
//! Without `smp` the running task stays at the head of the ready-to-run list
//! and `Assigned` shares that list. With `smp` both `Running` and `Assigned`
//! tasks live on the assigned list of their CPU.

use alloc::vec::Vec;

use crate::config::{NCPUS, TASK_LIST_CAPACITY};
use crate::sched::state::{ListAttrs, TaskState};
use crate::sched::wait_list::{ListOrdering, WaitList};
use crate::types::CpuId;

/// Kernel-global task lists.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticList {
    Pending = 0,
    ReadyToRun = 1,
    /// Per-CPU.
    Assigned = 2,
    Inactive = 3,
    /// Fallback for `WaitSem` when the task names no semaphore.
    WaitSem = 4,
    WaitSig = 5,
    /// Fallback for `WaitMqNotEmpty` when the task names no queue.
    WaitMqNotEmpty = 6,
    /// Fallback for `WaitMqNotFull` when the task names no queue.
    WaitMqNotFull = 7,
    WaitPageFill = 8,
    Stopped = 9,
}

impl StaticList {
    pub const COUNT: usize = 10;

    pub const ALL: [StaticList; Self::COUNT] = [
        StaticList::Pending,
        StaticList::ReadyToRun,
        StaticList::Assigned,
        StaticList::Inactive,
        StaticList::WaitSem,
        StaticList::WaitSig,
        StaticList::WaitMqNotEmpty,
        StaticList::WaitMqNotFull,
        StaticList::WaitPageFill,
        StaticList::Stopped,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn attrs(self) -> ListAttrs {
        match self {
            StaticList::Pending
            | StaticList::WaitSem
            | StaticList::WaitMqNotEmpty
            | StaticList::WaitMqNotFull
            | StaticList::WaitPageFill => ListAttrs::PRIORITIZED,
            StaticList::ReadyToRun => ListAttrs::PRIORITIZED.union(ListAttrs::RUNNABLE),
            StaticList::Assigned => ListAttrs::PRIORITIZED
                .union(ListAttrs::RUNNABLE)
                .union(ListAttrs::PER_CPU),
            StaticList::Inactive | StaticList::WaitSig | StaticList::Stopped => ListAttrs::empty(),
        }
    }

    pub const fn ordering(self) -> ListOrdering {
        if self.attrs().contains(ListAttrs::PRIORITIZED) {
            ListOrdering::Prioritized
        } else {
            ListOrdering::Fifo
        }
    }
}

/// Where tasks in one state are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateListEntry {
    pub list: StaticList,
    pub attrs: ListAttrs,
}

impl StateListEntry {
    const fn of(list: StaticList) -> Option<Self> {
        Some(Self { list, attrs: list.attrs() })
    }
}

/// State-indexed table of static lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateTable {
    entries: [Option<StateListEntry>; TaskState::COUNT],
}

impl StateTable {
    pub const fn new() -> Self {
        let mut entries = [None; TaskState::COUNT];
        entries[TaskState::Pending.index()] = StateListEntry::of(StaticList::Pending);
        entries[TaskState::ReadyToRun.index()] = StateListEntry::of(StaticList::ReadyToRun);
        #[cfg(feature = "smp")]
        {
            entries[TaskState::Assigned.index()] = StateListEntry::of(StaticList::Assigned);
            entries[TaskState::Running.index()] = StateListEntry::of(StaticList::Assigned);
        }
        #[cfg(not(feature = "smp"))]
        {
            entries[TaskState::Assigned.index()] = StateListEntry::of(StaticList::ReadyToRun);
            entries[TaskState::Running.index()] = StateListEntry::of(StaticList::ReadyToRun);
        }
        entries[TaskState::Inactive.index()] = StateListEntry::of(StaticList::Inactive);
        entries[TaskState::WaitSem.index()] = StateListEntry::of(StaticList::WaitSem);
        entries[TaskState::WaitSig.index()] = StateListEntry::of(StaticList::WaitSig);
        entries[TaskState::WaitMqNotEmpty.index()] = StateListEntry::of(StaticList::WaitMqNotEmpty);
        entries[TaskState::WaitMqNotFull.index()] = StateListEntry::of(StaticList::WaitMqNotFull);
        entries[TaskState::WaitPageFill.index()] = StateListEntry::of(StaticList::WaitPageFill);
        entries[TaskState::Stopped.index()] = StateListEntry::of(StaticList::Stopped);
        Self { entries }
    }

    /// Static list for `state`; `None` for `Invalid`.
    #[inline]
    pub const fn entry(&self, state: TaskState) -> Option<StateListEntry> {
        self.entries[state.index()]
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}

static STATE_TABLE: spin::Once<StateTable> = spin::Once::new();

/// Builds the global table. Returns `false` if it already existed.
pub(crate) fn init() -> bool {
    let mut built = false;
    STATE_TABLE.call_once(|| {
        built = true;
        StateTable::new()
    });
    built
}

/// The global table, once [`init`] has run.
pub fn get() -> Option<&'static StateTable> {
    STATE_TABLE.get()
}

/// Backing storage for every static list.
#[derive(Debug)]
pub struct TaskLists {
    shared: Vec<WaitList>,
    assigned: Vec<WaitList>,
}

impl TaskLists {
    pub fn new() -> Self {
        Self::with_capacity(NCPUS, TASK_LIST_CAPACITY)
    }

    /// Lists for `cpus` CPUs, each holding up to `capacity` tasks.
    pub fn with_capacity(cpus: usize, capacity: usize) -> Self {
        let shared = StaticList::ALL
            .iter()
            .map(|list| WaitList::new(list.ordering(), capacity))
            .collect();
        let assigned = (0..cpus)
            .map(|_| WaitList::new(StaticList::Assigned.ordering(), capacity))
            .collect();
        Self { shared, assigned }
    }

    #[inline]
    pub fn cpus(&self) -> usize {
        self.assigned.len()
    }

    /// The list named by `list`; per-CPU lists need `cpu`.
    pub fn get_mut(&mut self, list: StaticList, cpu: Option<CpuId>) -> Option<&mut WaitList> {
        if list.attrs().contains(ListAttrs::PER_CPU) {
            self.assigned.get_mut(cpu?.as_index())
        } else {
            self.shared.get_mut(list.index())
        }
    }

    pub fn get(&self, list: StaticList, cpu: Option<CpuId>) -> Option<&WaitList> {
        if list.attrs().contains(ListAttrs::PER_CPU) {
            self.assigned.get(cpu?.as_index())
        } else {
            self.shared.get(list.index())
        }
    }
}

impl Default for TaskLists {
    fn default() -> Self {
        Self::new()
    }
}
