/*
 * The occupancy gate: a counting semaphore over the free slots of the space,
 * and the only place where occupancy is stored.
 *
 * Entries wait a short, bounded time for a slot. Running out of that time is
 * how the panel learns that the space is full, so there is never a separate
 * "is there room?" check that could race with the claim itself.
 *
 * Everything that reads the count gets a snapshot. By the time a render
 * channel uses it, another task may already have changed it, and the
 * channels are built to cope with that.
 */

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};
use embassy_sync::waitqueue::MultiWakerRegistration;
use embassy_time::{Duration, with_timeout};

/// Number of entries that may wait for a slot at the same time before the
/// oldest waiters are woken early to make room.
const MAX_WAITING_ENTRIES: usize = 4;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Admission {
    Admitted,
    CapacityFull,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Release {
    Released,
    NoOccupantsToRelease,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GateError {
    /// A slot was released while all slots were already free.
    ReleaseBeyondCapacity,
}

struct GateState {
    free_slots: usize,
    waiting_entries: MultiWakerRegistration<MAX_WAITING_ENTRIES>,
}

impl GateState {
    fn release(&mut self, capacity: usize) -> Result<(), GateError> {
        if self.free_slots >= capacity {
            return Err(GateError::ReleaseBeyondCapacity);
        }
        self.free_slots += 1;
        self.waiting_entries.wake();
        Ok(())
    }
}

pub struct OccupancyGate<M: RawMutex> {
    capacity: usize,
    state: Mutex<M, RefCell<GateState>>,
}

impl<M: RawMutex> OccupancyGate<M> {
    /// A gate with every slot free.
    pub const fn new(capacity: usize) -> Self {
        OccupancyGate {
            capacity,
            state: Mutex::new(RefCell::new(GateState {
                free_slots: capacity,
                waiting_entries: MultiWakerRegistration::new(),
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn free_slots(&self) -> usize {
        self.state.lock(|state| state.borrow().free_slots)
    }

    pub fn active_occupants(&self) -> usize {
        self.capacity - self.free_slots()
    }

    /// Claims a slot, waiting at most `timeout` for one to come free.
    pub async fn try_enter(&self, timeout: Duration) -> Admission {
        match with_timeout(timeout, self.claim()).await {
            Ok(()) => Admission::Admitted,
            Err(_) => Admission::CapacityFull,
        }
    }

    // The claim happens inside the poll that observes the free slot, so a
    // timed-out (dropped) claim never holds a slot.
    async fn claim(&self) {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.free_slots > 0 {
                    state.free_slots -= 1;
                    Poll::Ready(())
                } else {
                    state.waiting_entries.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    pub fn try_exit(&self) -> Release {
        self.state.lock(|state| {
            match state.borrow_mut().release(self.capacity) {
                Ok(()) => Release::Released,
                Err(GateError::ReleaseBeyondCapacity) => Release::NoOccupantsToRelease,
            }
        })
    }

    /*
     * Frees every slot as one critical section, so no entry or exit can
     * interleave with the reset. The loop releases one slot at a time. A
     * failing release cannot happen while the loop condition holds, and if it
     * ever does the loop stops instead of spinning and the caller gets the
     * error.
     */
    pub fn reset_all(&self) -> Result<(), GateError> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            while state.free_slots < self.capacity {
                state.release(self.capacity)?;
            }
            Ok(())
        })
    }
}
