// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Bounded task lists used for ready, blocked and object wait queues
//! OWNERS: @kernel-sched-team
//! PUBLIC API: WaitList::{new, insert, remove, pop_front, contains, len}, WaitListError, ListOrdering
//! INVARIANTS: Bounded capacity with deterministic reject; a pid appears at most once;
//!             prioritized lists are sorted by descending priority, FIFO among equals

use alloc::collections::VecDeque;

use crate::sched::tcb::Priority;
use crate::types::Pid;

/// Insertion discipline of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOrdering {
    Prioritized,
    Fifo,
}

/// Error returned by list mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitListError {
    /// The list is at capacity.
    Full { capacity: usize },
    /// The task is already on this list.
    AlreadyQueued,
    /// The task is not on this list.
    NotQueued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    pid: Pid,
    priority: Priority,
}

/// Ordered collection of task ids.
#[derive(Debug)]
pub struct WaitList {
    entries: VecDeque<Entry>,
    ordering: ListOrdering,
    capacity: usize,
}

impl WaitList {
    pub fn new(ordering: ListOrdering, capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), ordering, capacity }
    }

    #[inline]
    pub fn ordering(&self) -> ListOrdering {
        self.ordering
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries.iter().any(|entry| entry.pid == pid)
    }

    /// Queues `pid`.
    ///
    /// Prioritized lists place it after every task of equal or higher
    /// priority.
    pub fn insert(&mut self, pid: Pid, priority: Priority) -> Result<(), WaitListError> {
        if self.entries.len() >= self.capacity {
            return Err(WaitListError::Full { capacity: self.capacity });
        }
        if self.contains(pid) {
            return Err(WaitListError::AlreadyQueued);
        }
        let entry = Entry { pid, priority };
        match self.ordering {
            ListOrdering::Fifo => self.entries.push_back(entry),
            ListOrdering::Prioritized => {
                let at = self
                    .entries
                    .iter()
                    .position(|queued| queued.priority < priority)
                    .unwrap_or(self.entries.len());
                self.entries.insert(at, entry);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, pid: Pid) -> Result<(), WaitListError> {
        let at = self
            .entries
            .iter()
            .position(|entry| entry.pid == pid)
            .ok_or(WaitListError::NotQueued)?;
        self.entries.remove(at);
        Ok(())
    }

    /// Removes and returns the head of the list.
    pub fn pop_front(&mut self) -> Option<Pid> {
        self.entries.pop_front().map(|entry| entry.pid)
    }

    pub fn front(&self) -> Option<Pid> {
        self.entries.front().map(|entry| entry.pid)
    }

    /// Queued pids from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().map(|entry| entry.pid)
    }
}
