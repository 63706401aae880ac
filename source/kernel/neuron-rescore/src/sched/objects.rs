// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Synchronization objects owning their own wait lists.
//!
//! Tasks refer to these objects by id only. [`SyncObjects`] is the lookup
//! the dispatcher's handles are resolved through. Ids carry the generation of
//! their slot, so a destroyed object stops resolving even after its slot is
//! reused.

use alloc::vec::Vec;

use crate::config::TASK_LIST_CAPACITY;
use crate::sched::wait_list::{ListOrdering, WaitList};
use crate::types::{MqId, SemId};

/// Counting semaphore with its waiters.
#[derive(Debug)]
pub struct Semaphore {
    pub count: i32,
    pub waiters: WaitList,
}

impl Semaphore {
    pub fn new(count: i32) -> Self {
        Self { count, waiters: WaitList::new(ListOrdering::Prioritized, TASK_LIST_CAPACITY) }
    }
}

/// Message queue with readers waiting for data and writers waiting for room.
#[derive(Debug)]
pub struct MessageQueue {
    pub not_empty: WaitList,
    pub not_full: WaitList,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            not_empty: WaitList::new(ListOrdering::Prioritized, TASK_LIST_CAPACITY),
            not_full: WaitList::new(ListOrdering::Prioritized, TASK_LIST_CAPACITY),
        }
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Id-based access to live synchronization objects.
pub trait SyncObjects {
    fn semaphore_mut(&mut self, id: SemId) -> Option<&mut Semaphore>;
    fn queue_mut(&mut self, id: MqId) -> Option<&mut MessageQueue>;
}

/// Object slot; `generation` advances every time the slot is vacated.
#[derive(Debug)]
struct Slot<T> {
    generation: u16,
    value: Option<T>,
}

/// Vacant-slot reusing table whose handles are checked against the slot generation.
#[derive(Debug)]
struct Slots<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> Slots<T> {
    /// Stores `value`; returns `(index, generation)`, or `None` once every index is taken.
    fn insert(&mut self, value: T) -> Option<(u16, u16)> {
        if let Some(index) = self.slots.iter().position(|slot| slot.value.is_none()) {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return Some((index as u16, slot.generation));
        }
        let index = u16::try_from(self.slots.len()).ok()?;
        self.slots.push(Slot { generation: 0, value: Some(value) });
        Some((index, 0))
    }

    fn get_mut(&mut self, index: usize, generation: u16) -> Option<&mut T> {
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    fn remove(&mut self, index: usize, generation: u16) -> Option<T> {
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(value)
    }
}

/// Slot table of semaphores and message queues.
#[derive(Debug, Default)]
pub struct ObjectTable {
    semaphores: Slots<Semaphore>,
    queues: Slots<MessageQueue>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` once every semaphore index is in use.
    pub fn create_semaphore(&mut self, count: i32) -> Option<SemId> {
        let (index, generation) = self.semaphores.insert(Semaphore::new(count))?;
        Some(SemId::new(index, generation))
    }

    /// Removes the semaphore. Tasks still naming it must have been unblocked.
    pub fn destroy_semaphore(&mut self, id: SemId) -> Option<Semaphore> {
        self.semaphores.remove(id.as_index(), id.generation())
    }

    pub fn create_queue(&mut self) -> Option<MqId> {
        let (index, generation) = self.queues.insert(MessageQueue::new())?;
        Some(MqId::new(index, generation))
    }

    pub fn destroy_queue(&mut self, id: MqId) -> Option<MessageQueue> {
        self.queues.remove(id.as_index(), id.generation())
    }
}

impl SyncObjects for ObjectTable {
    fn semaphore_mut(&mut self, id: SemId) -> Option<&mut Semaphore> {
        self.semaphores.get_mut(id.as_index(), id.generation())
    }

    fn queue_mut(&mut self, id: MqId) -> Option<&mut MessageQueue> {
        self.queues.get_mut(id.as_index(), id.generation())
    }
}
