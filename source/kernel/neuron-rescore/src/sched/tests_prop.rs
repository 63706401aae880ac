// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Property-based tests for wait-list selection and list ordering
//! OWNERS: @kernel-sched-team
//! NOTE: Tests only; no kernel logic.
//!
//! TEST_SCOPE:
//!   - Selection depends only on target state and the task's wait objects
//!   - Object lists win exactly when the task names the matching object
//!   - Prioritized lists stay sorted and stable under any insert order
//!
//! TEST_SCENARIOS:
//!   - object_list_iff_object_named()
//!   - selection_ignores_current_state_and_priority()
//!   - prioritized_list_is_sorted_and_stable()

use proptest::prelude::*;
use std::vec::Vec;

use super::{
    select_wait_list, ListOrdering, SchedLock, StateTable, TaskState, Tcb, WaitList,
    WaitListHandle,
};
use crate::types::{CpuId, MqId, Pid, SemId};

fn arb_state() -> impl Strategy<Value = TaskState> {
    (0u8..TaskState::COUNT as u8).prop_map(|raw| TaskState::from_raw(raw).expect("dense states"))
}

fn arb_tcb() -> impl Strategy<Value = Tcb> {
    (
        any::<u32>(),
        arb_state(),
        any::<u8>(),
        0u16..4,
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
    )
        .prop_map(|(pid, state, priority, cpu, sem, mq)| Tcb {
            pid: Pid::from_raw(pid),
            state,
            priority,
            cpu: CpuId::from_raw(cpu),
            wait_sem: sem.map(SemId::from_raw),
            msg_waitq: mq.map(MqId::from_raw),
        })
}

proptest! {
    #[test]
    fn object_list_iff_object_named(tcb in arb_tcb(), state in arb_state()) {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let handle = select_wait_list(&cs, &StateTable::new(), &tcb, state);

        let expected = match state {
            TaskState::WaitSem => tcb.wait_sem.map(WaitListHandle::Semaphore),
            TaskState::WaitMqNotEmpty => tcb.msg_waitq.map(WaitListHandle::MqNotEmpty),
            TaskState::WaitMqNotFull => tcb.msg_waitq.map(WaitListHandle::MqNotFull),
            _ => None,
        };
        match expected {
            Some(object) => {
                prop_assert_eq!(handle, object);
            }
            None => {
                let object_free =
                    matches!(handle, WaitListHandle::Static { .. } | WaitListHandle::Unlisted);
                prop_assert!(object_free, "object-free state picked {:?}", handle);
            }
        }
        prop_assert_eq!(handle == WaitListHandle::Unlisted, state == TaskState::Invalid);
    }

    #[test]
    fn selection_ignores_current_state_and_priority(
        tcb in arb_tcb(),
        state in arb_state(),
        other_state in arb_state(),
        other_priority in any::<u8>(),
    ) {
        let lock = SchedLock::new();
        let cs = lock.enter();
        let table = StateTable::new();
        let moved = Tcb { state: other_state, priority: other_priority, ..tcb };
        prop_assert_eq!(
            select_wait_list(&cs, &table, &tcb, state),
            select_wait_list(&cs, &table, &moved, state)
        );
    }

    #[test]
    fn prioritized_list_is_sorted_and_stable(priorities in proptest::collection::vec(any::<u8>(), 0..32)) {
        let mut list = WaitList::new(ListOrdering::Prioritized, 32);
        for (i, priority) in priorities.iter().enumerate() {
            list.insert(Pid::from_raw(i as u32), *priority).expect("within capacity");
        }

        let mut expected: Vec<(u8, u32)> =
            priorities.iter().enumerate().map(|(i, p)| (*p, i as u32)).collect();
        // Descending priority, then ascending arrival.
        expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let queued: Vec<u32> = list.iter().map(Pid::as_raw).collect();
        let wanted: Vec<u32> = expected.into_iter().map(|(_, pid)| pid).collect();
        prop_assert_eq!(queued, wanted);
    }
}
