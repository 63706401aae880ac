// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Task-list plumbing for blocking and unblocking transitions
//! OWNERS: @kernel-sched-team
//! PUBLIC API: select_wait_list(), resolve(), StateTable, TaskLists, WaitList, CriticalSection
//! DEPENDS_ON: spin (lock, global table), config (list capacity, CPU count)
//! INVARIANTS: A task is on at most one list; list selection is pure and lock-free under
//!             the caller's critical section
//!
//! This module only decides *where* a task goes. Moving it, waking it and
//! picking what runs next belong to the scheduler proper.

pub mod dispatch;
pub mod lock;
pub mod objects;
pub mod state;
pub mod table;
pub mod tcb;
pub mod wait_list;

pub use dispatch::{resolve, select_wait_list, WaitListHandle};
pub use lock::{CriticalSection, SchedLock, SCHED_LOCK};
pub use objects::{MessageQueue, ObjectTable, Semaphore, SyncObjects};
pub use state::{ListAttrs, TaskState};
pub use table::{StateListEntry, StateTable, StaticList, TaskLists};
pub use tcb::{Priority, Tcb};
pub use wait_list::{ListOrdering, WaitList, WaitListError};

#[cfg(test)]
mod tests_prop;
