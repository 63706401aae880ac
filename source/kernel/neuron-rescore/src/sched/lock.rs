// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Scheduling critical section
//! OWNERS: @kernel-sched-team
//! PUBLIC API: SchedLock::{new, enter}, CriticalSection, SCHED_LOCK
//! DEPENDS_ON: spin::Mutex, hal::irq
//! INVARIANTS: IRQs are masked on the local CPU for as long as a CriticalSection lives;
//!             the token never leaves the CPU that created it
//!
//! Operations that read or pick task lists take `&CriticalSection` instead of
//! locking themselves. Holding the token is the proof that list state cannot
//! change underneath them.

use core::marker::PhantomData;

use crate::hal::irq::{self, IrqState};

/// Lock serializing task-list transitions across CPUs.
pub struct SchedLock {
    inner: spin::Mutex<()>,
}

/// The kernel's scheduling lock.
pub static SCHED_LOCK: SchedLock = SchedLock::new();

impl SchedLock {
    pub const fn new() -> Self {
        Self { inner: spin::Mutex::new(()) }
    }

    /// Masks local IRQs, then takes the lock.
    pub fn enter(&self) -> CriticalSection<'_> {
        let irq = irq::save();
        let guard = self.inner.lock();
        CriticalSection { guard: Some(guard), irq: Some(irq), _not_send_sync: PhantomData }
    }

    /// Whether some CPU is inside the critical section.
    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }
}

impl Default for SchedLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Token for the scheduling critical section.
#[must_use = "the critical section ends when the token is dropped"]
pub struct CriticalSection<'a> {
    guard: Option<spin::MutexGuard<'a, ()>>,
    irq: Option<IrqState>,
    // IRQ state belongs to the CPU that saved it.
    _not_send_sync: PhantomData<*mut ()>,
}
static_assertions::assert_not_impl_any!(CriticalSection<'static>: Send, Sync);

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        // Unlock before unmasking so an IRQ cannot spin on our own lock.
        drop(self.guard.take());
        if let Some(state) = self.irq.take() {
            irq::restore(state);
        }
    }
}
