// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Task states and the attributes of the lists that hold them.

use bitflags::bitflags;

/// Scheduling state of a task.
///
/// Discriminants index the state table and must stay dense.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Not yet initialized or already torn down; on no list.
    Invalid = 0,
    /// Ready, but held back while preemption is disabled.
    Pending = 1,
    ReadyToRun = 2,
    /// Ready and bound to a CPU.
    Assigned = 3,
    Running = 4,
    /// Created but not yet started.
    Inactive = 5,
    WaitSem = 6,
    WaitSig = 7,
    WaitMqNotEmpty = 8,
    WaitMqNotFull = 9,
    WaitPageFill = 10,
    Stopped = 11,
}

impl TaskState {
    pub const COUNT: usize = 12;

    pub const ALL: [TaskState; Self::COUNT] = [
        TaskState::Invalid,
        TaskState::Pending,
        TaskState::ReadyToRun,
        TaskState::Assigned,
        TaskState::Running,
        TaskState::Inactive,
        TaskState::WaitSem,
        TaskState::WaitSig,
        TaskState::WaitMqNotEmpty,
        TaskState::WaitMqNotFull,
        TaskState::WaitPageFill,
        TaskState::Stopped,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_raw(raw: u8) -> Option<Self> {
        if (raw as usize) < Self::COUNT {
            Some(Self::ALL[raw as usize])
        } else {
            None
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Properties of a static task list.
    pub struct ListAttrs: u8 {
        /// Ordered by task priority instead of arrival.
        const PRIORITIZED = 1 << 0;
        /// Holds tasks that can be given a CPU.
        const RUNNABLE = 1 << 1;
        /// One list per CPU; the task's CPU selects it.
        const PER_CPU = 1 << 2;
    }
}
