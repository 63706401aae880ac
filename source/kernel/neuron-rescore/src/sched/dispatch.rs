// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Blocking-list dispatch for task state transitions
//! OWNERS: @kernel-sched-team
//! PUBLIC API: select_wait_list(), resolve(), WaitListHandle
//! DEPENDS_ON: sched::{lock, table, tcb, objects}
//! INVARIANTS: Constant time; never locks, blocks, allocates or mutates a list;
//!             caller holds the scheduling critical section
//!
//! Object wait lists take precedence over the static table, but only when
//! the task actually names the object. A task in `WaitSem` without a
//! semaphore falls back to the static `WaitSem` list.

use crate::sched::lock::CriticalSection;
use crate::sched::objects::SyncObjects;
use crate::sched::state::{ListAttrs, TaskState};
use crate::sched::table::{StateTable, StaticList, TaskLists};
use crate::sched::tcb::Tcb;
use crate::sched::wait_list::WaitList;
use crate::types::{CpuId, MqId, SemId};

/// Names the list a task belongs on. Resolve with [`resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitListHandle {
    /// Waiters of a semaphore.
    Semaphore(SemId),
    /// Readers waiting for a message queue to become non-empty.
    MqNotEmpty(MqId),
    /// Writers waiting for a message queue to have room.
    MqNotFull(MqId),
    /// A state-table list; `cpu` is set for per-CPU lists.
    Static { list: StaticList, cpu: Option<CpuId> },
    /// The state keeps the task off every list.
    Unlisted,
}

/// Returns the list `tcb` must be put on when it enters `state`.
///
/// `state` is the target state, not `tcb.state`.
pub fn select_wait_list(
    _cs: &CriticalSection<'_>,
    table: &StateTable,
    tcb: &Tcb,
    state: TaskState,
) -> WaitListHandle {
    match (state, tcb.wait_sem, tcb.msg_waitq) {
        (TaskState::WaitSem, Some(sem), _) => WaitListHandle::Semaphore(sem),
        (TaskState::WaitMqNotEmpty, _, Some(mq)) => WaitListHandle::MqNotEmpty(mq),
        (TaskState::WaitMqNotFull, _, Some(mq)) => WaitListHandle::MqNotFull(mq),
        _ => match table.entry(state) {
            Some(entry) => WaitListHandle::Static {
                list: entry.list,
                cpu: entry.attrs.contains(ListAttrs::PER_CPU).then_some(tcb.cpu),
            },
            None => WaitListHandle::Unlisted,
        },
    }
}

/// Borrows the list a handle names.
///
/// `None` for [`WaitListHandle::Unlisted`], for destroyed objects and for
/// CPUs without an assigned list.
pub fn resolve<'a, O: SyncObjects + ?Sized>(
    _cs: &CriticalSection<'_>,
    handle: WaitListHandle,
    lists: &'a mut TaskLists,
    objects: &'a mut O,
) -> Option<&'a mut WaitList> {
    match handle {
        WaitListHandle::Semaphore(id) => objects.semaphore_mut(id).map(|sem| &mut sem.waiters),
        WaitListHandle::MqNotEmpty(id) => objects.queue_mut(id).map(|mq| &mut mq.not_empty),
        WaitListHandle::MqNotFull(id) => objects.queue_mut(id).map(|mq| &mut mq.not_full),
        WaitListHandle::Static { list, cpu } => lists.get_mut(list, cpu),
        WaitListHandle::Unlisted => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::lock::SchedLock;
    use crate::sched::objects::ObjectTable;
    use crate::types::Pid;

    fn task(state: TaskState) -> Tcb {
        Tcb { state, ..Tcb::new(Pid::from_raw(7), 100) }
    }

    #[test]
    fn semaphore_wait_goes_to_the_semaphore() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let table = StateTable::new();
        let sem = SemId::from_raw(3);
        let tcb = Tcb { wait_sem: Some(sem), ..task(TaskState::Running) };

        assert_eq!(
            select_wait_list(&cs, &table, &tcb, TaskState::WaitSem),
            WaitListHandle::Semaphore(sem)
        );
    }

    #[test]
    fn running_goes_to_the_state_table() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let table = StateTable::new();
        let tcb = task(TaskState::ReadyToRun);
        let expected = table.entry(TaskState::Running).map(|entry| entry.list);

        let WaitListHandle::Static { list, .. } =
            select_wait_list(&cs, &table, &tcb, TaskState::Running)
        else {
            panic!("running task must map to a static list");
        };
        assert_eq!(Some(list), expected);
    }

    #[test]
    fn missing_object_falls_back_to_static_list() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let table = StateTable::new();
        let tcb = task(TaskState::Running);
        for (state, list) in [
            (TaskState::WaitSem, StaticList::WaitSem),
            (TaskState::WaitMqNotEmpty, StaticList::WaitMqNotEmpty),
            (TaskState::WaitMqNotFull, StaticList::WaitMqNotFull),
        ] {
            assert_eq!(
                select_wait_list(&cs, &table, &tcb, state),
                WaitListHandle::Static { list, cpu: None }
            );
        }
    }

    #[test]
    fn object_is_ignored_for_unrelated_states() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let table = StateTable::new();
        let tcb = Tcb {
            wait_sem: Some(SemId::from_raw(1)),
            msg_waitq: Some(MqId::from_raw(2)),
            ..task(TaskState::Running)
        };
        assert_eq!(
            select_wait_list(&cs, &table, &tcb, TaskState::WaitSig),
            WaitListHandle::Static { list: StaticList::WaitSig, cpu: None }
        );
        assert_eq!(
            select_wait_list(&cs, &table, &tcb, TaskState::WaitMqNotFull),
            WaitListHandle::MqNotFull(MqId::from_raw(2))
        );
    }

    #[test]
    fn invalid_state_is_unlisted() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let tcb = task(TaskState::Stopped);
        let handle = select_wait_list(&cs, &StateTable::new(), &tcb, TaskState::Invalid);
        assert_eq!(handle, WaitListHandle::Unlisted);
    }

    #[cfg(feature = "smp")]
    #[test]
    fn assigned_list_follows_task_cpu() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let tcb = Tcb { cpu: CpuId::from_raw(2), ..task(TaskState::ReadyToRun) };
        assert_eq!(
            select_wait_list(&cs, &StateTable::new(), &tcb, TaskState::Assigned),
            WaitListHandle::Static { list: StaticList::Assigned, cpu: Some(CpuId::from_raw(2)) }
        );
    }

    #[test]
    fn resolve_reaches_object_lists() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let mut lists = TaskLists::with_capacity(1, 4);
        let mut objects = ObjectTable::new();
        let sem = objects.create_semaphore(0).expect("free slot");
        let pid = Pid::from_raw(9);

        resolve(&cs, WaitListHandle::Semaphore(sem), &mut lists, &mut objects)
            .expect("live semaphore")
            .insert(pid, 5)
            .expect("room on the list");
        assert!(objects.semaphore_mut(sem).expect("live semaphore").waiters.contains(pid));
    }

    #[test]
    fn resolve_rejects_stale_and_unlisted_handles() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let mut lists = TaskLists::with_capacity(1, 4);
        let mut objects = ObjectTable::new();
        let mq = objects.create_queue().expect("free slot");
        objects.destroy_queue(mq).expect("live queue");

        assert!(resolve(&cs, WaitListHandle::MqNotEmpty(mq), &mut lists, &mut objects).is_none());
        assert!(resolve(&cs, WaitListHandle::Unlisted, &mut lists, &mut objects).is_none());
        assert!(resolve(
            &cs,
            WaitListHandle::Static { list: StaticList::Stopped, cpu: None },
            &mut lists,
            &mut objects
        )
        .is_some());
    }

    #[test]
    fn stale_semaphore_handle_does_not_reach_slot_successor() {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let mut lists = TaskLists::with_capacity(1, 4);
        let mut objects = ObjectTable::new();
        let old = objects.create_semaphore(0).expect("free slot");
        objects.destroy_semaphore(old).expect("live semaphore");
        let fresh = objects.create_semaphore(1).expect("free slot");
        assert_eq!(fresh.as_index(), old.as_index());

        assert!(resolve(&cs, WaitListHandle::Semaphore(old), &mut lists, &mut objects).is_none());
        assert!(objects.semaphore_mut(fresh).expect("live semaphore").waiters.is_empty());
        assert!(resolve(&cs, WaitListHandle::Semaphore(fresh), &mut lists, &mut objects).is_some());
    }
}
