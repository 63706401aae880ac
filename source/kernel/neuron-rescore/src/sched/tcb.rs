// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! The slice of a task control block the dispatcher looks at.

use crate::sched::state::TaskState;
use crate::types::{CpuId, MqId, Pid, SemId};

/// Task priority; larger runs first.
pub type Priority = u8;

/// Task control block fields consulted when picking a wait list.
///
/// `wait_sem` and `msg_waitq` are non-owning references installed and
/// cleared by the blocking logic. They must be cleared before the object
/// they name is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tcb {
    pub pid: Pid,
    pub state: TaskState,
    pub priority: Priority,
    /// CPU the task runs on or is assigned to.
    pub cpu: CpuId,
    pub wait_sem: Option<SemId>,
    pub msg_waitq: Option<MqId>,
}

impl Tcb {
    /// Inactive task on the boot CPU with no wait object.
    pub const fn new(pid: Pid, priority: Priority) -> Self {
        Self {
            pid,
            state: TaskState::Inactive,
            priority,
            cpu: CpuId::BOOT,
            wait_sem: None,
            msg_waitq: None,
        }
    }
}
