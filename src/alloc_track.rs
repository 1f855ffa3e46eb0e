//! Allocation tracing for memory measurements.
//!
//! `TrackingAllocator` forwards to the system allocator and, while a
//! [`TraceScope`] is open on the current thread, keeps a running byte total
//! and its high-water mark for that thread. Other threads are not counted.
//!
//! Only bytes requested through the global allocator are seen. Stack usage,
//! allocator bookkeeping and memory freed before the scope opened are not,
//! so the numbers are only comparable between algorithms in the same run.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BenchError, Result};

static INSTALLED: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Copy)]
struct Trace {
    active: bool,
    current: isize,
    peak: usize,
}

const IDLE: Trace = Trace {
    active: false,
    current: 0,
    peak: 0,
};

thread_local! {
    static TRACE: Cell<Trace> = const { Cell::new(IDLE) };
}

#[inline]
fn record(delta: isize) {
    // try_with: allocations can happen while the thread-local is torn down.
    let _ = TRACE.try_with(|cell| {
        let mut t = cell.get();
        if !t.active {
            return;
        }
        t.current = t.current.saturating_add(delta);
        if t.current > 0 && t.current as usize > t.peak {
            t.peak = t.current as usize;
        }
        cell.set(t);
    });
}

#[inline]
fn mark_installed() {
    if !INSTALLED.load(Ordering::Relaxed) {
        INSTALLED.store(true, Ordering::Relaxed);
    }
}

/// Global allocator wrapper around [`System`] that feeds the thread's trace.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        mark_installed();
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record(layout.size() as isize);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        mark_installed();
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        mark_installed();
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record(new_size as isize - layout.size() as isize);
        }
        new_ptr
    }
}

/// True once any allocation has gone through [`TrackingAllocator`].
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Snapshot of a closed trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracedMemory {
    /// Net bytes still held at close (negative if the scope freed older memory).
    pub current: isize,
    pub peak: usize,
}

/// An open tracing scope on the current thread. Closing (or dropping) it
/// stops tracing. Scopes do not nest.
pub struct TraceScope {
    // Thread-bound: the counters it reads live in a thread-local.
    _not_send: PhantomData<*const ()>,
}

impl TraceScope {
    pub fn start() -> Result<Self> {
        if !is_installed() {
            return Err(BenchError::config(
                "allocation tracker is not the global allocator (enable the `track-alloc` feature)",
            ));
        }
        let nested = TRACE.with(|cell| {
            let t = cell.get();
            if t.active {
                true
            } else {
                cell.set(Trace {
                    active: true,
                    current: 0,
                    peak: 0,
                });
                false
            }
        });
        if nested {
            return Err(BenchError::config("allocation trace scopes cannot be nested"));
        }
        Ok(TraceScope {
            _not_send: PhantomData,
        })
    }

    pub fn peak_bytes(&self) -> usize {
        TRACE.with(|cell| cell.get().peak)
    }

    pub fn stop(self) -> TracedMemory {
        let t = TRACE.with(|cell| cell.get());
        // Drop resets the thread state.
        drop(self);
        TracedMemory {
            current: t.current,
            peak: t.peak,
        }
    }
}

impl Drop for TraceScope {
    fn drop(&mut self) {
        let _ = TRACE.try_with(|cell| cell.set(IDLE));
    }
}
