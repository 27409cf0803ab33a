//! Admission Gate Module
//!
//! Reader/writer arbitration for the cache store using the first-reader /
//! last-reader protocol.
//!
//! Any number of readers may hold the gate at once. The first reader to
//! arrive takes the exclusive write permit on behalf of every reader, and the
//! last reader to leave hands it back. Writers take the same permit directly,
//! so a writer only runs once no reader is registered. Waiting writers are not
//! prioritized over a continuous stream of readers.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

// == Write Permit ==
/// Binary semaphore guarding exclusive access.
///
/// A plain mutex guard cannot be used here: the reader that releases the
/// permit is usually not the reader that acquired it.
#[derive(Debug, Default)]
struct WritePermit {
    held: Mutex<bool>,
    released: Condvar,
}

impl WritePermit {
    fn acquire(&self) {
        let mut held = self.held.lock();
        while *held {
            self.released.wait(&mut held);
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.held.lock();
        *held = false;
        self.released.notify_one();
    }
}

// == Admission Gate ==
/// Reader/writer gate owning the value it protects.
pub struct AdmissionGate<T> {
    /// Active reader count, behind its own short-lived lock
    readers: Mutex<usize>,
    /// Exclusive permit shared by the reader group and writers
    permit: WritePermit,
    /// Writers currently inside their critical section
    writers: AtomicUsize,
    peak_readers: AtomicUsize,
    peak_writers: AtomicUsize,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is only handed out through `ReadGuard` and
// `WriteGuard`. A `WriteGuard` exists only while the write permit is held by
// that writer; `ReadGuard`s exist only while the permit is held by the reader
// group. Shared references may cross threads, hence `T: Sync` for `Sync`.
unsafe impl<T: Send> Send for AdmissionGate<T> {}
unsafe impl<T: Send + Sync> Sync for AdmissionGate<T> {}

impl<T> AdmissionGate<T> {
    // == Constructor ==
    /// Creates an open gate around `value`.
    pub fn new(value: T) -> Self {
        Self {
            readers: Mutex::new(0),
            permit: WritePermit::default(),
            writers: AtomicUsize::new(0),
            peak_readers: AtomicUsize::new(0),
            peak_writers: AtomicUsize::new(0),
            data: UnsafeCell::new(value),
        }
    }

    // == Read ==
    /// Registers the caller as a reader, blocking while a writer is active.
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.enter_read();
        ReadGuard { gate: self }
    }

    // == Write ==
    /// Acquires exclusive access, blocking while any reader or writer is active.
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.enter_write();
        WriteGuard { gate: self }
    }

    fn enter_read(&self) {
        let mut count = self.readers.lock();
        if *count == 0 {
            // First reader locks writers out for the whole group
            self.permit.acquire();
        }
        *count += 1;
        self.peak_readers.fetch_max(*count, Ordering::Relaxed);
    }

    fn exit_read(&self) {
        let mut count = self.readers.lock();
        *count -= 1;
        if *count == 0 {
            self.permit.release();
        }
    }

    fn enter_write(&self) {
        self.permit.acquire();
        let active = self.writers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_writers.fetch_max(active, Ordering::Relaxed);
    }

    fn exit_write(&self) {
        self.writers.fetch_sub(1, Ordering::SeqCst);
        self.permit.release();
    }

    // == Instrumentation ==
    /// Number of readers currently registered.
    pub fn active_readers(&self) -> usize {
        *self.readers.lock()
    }

    /// Number of writers currently inside the gate (0 or 1).
    pub fn active_writers(&self) -> usize {
        self.writers.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously registered readers observed.
    pub fn peak_readers(&self) -> usize {
        self.peak_readers.load(Ordering::Relaxed)
    }

    /// Highest number of simultaneously active writers observed.
    pub fn peak_writers(&self) -> usize {
        self.peak_writers.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for AdmissionGate<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for AdmissionGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("active_readers", &self.active_readers())
            .field("active_writers", &self.active_writers())
            .finish_non_exhaustive()
    }
}

// == Guards ==
/// Shared access to the gated value. Deregisters the reader on drop.
pub struct ReadGuard<'a, T> {
    gate: &'a AdmissionGate<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the reader group holds the write permit, so no `WriteGuard`
        // can exist while this guard is alive.
        unsafe { &*self.gate.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.gate.exit_read();
    }
}

/// Exclusive access to the gated value. Releases the permit on drop.
pub struct WriteGuard<'a, T> {
    gate: &'a AdmissionGate<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this writer holds the write permit exclusively.
        unsafe { &*self.gate.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this writer holds the write permit exclusively, and the
        // `&mut self` receiver rules out aliasing through this guard.
        unsafe { &mut *self.gate.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.gate.exit_write();
    }
}
