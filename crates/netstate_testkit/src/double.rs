//! A counting double for the native library.

use netstate_core::{BufferKind, NativeLibrary, NISPOR_FAIL, NISPOR_PASS};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::ffi::{c_char, c_int, CString};
use std::thread;
use std::time::Duration;

/// What the double writes for one native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Return code.
    pub code: i32,
    /// Bytes for the state buffer, or `None` to leave it null.
    pub state: Option<Vec<u8>>,
    /// Bytes for the error kind buffer, or `None` to leave it null.
    pub err_kind: Option<Vec<u8>>,
    /// Bytes for the error message buffer, or `None` to leave it null.
    pub err_msg: Option<Vec<u8>>,
    /// Time to block inside the native call before returning.
    pub delay: Option<Duration>,
}

impl Outcome {
    /// A successful call returning `state`.
    pub fn success(state: impl Into<String>) -> Self {
        Self {
            code: NISPOR_PASS,
            state: Some(state.into().into_bytes()),
            err_kind: None,
            err_msg: None,
            delay: None,
        }
    }

    /// A failed call reporting `kind` and `message`.
    pub fn failure(code: i32, kind: &str, message: &str) -> Self {
        Self::bare_failure(code)
            .with_err_kind(kind.as_bytes())
            .with_err_msg(message.as_bytes())
    }

    /// A failed call that leaves every buffer null.
    pub fn bare_failure(code: i32) -> Self {
        Self {
            code,
            state: None,
            err_kind: None,
            err_msg: None,
            delay: None,
        }
    }

    /// Sets the state buffer bytes.
    pub fn with_state(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.state = Some(bytes.into());
        self
    }

    /// Sets the error kind buffer bytes.
    pub fn with_err_kind(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.err_kind = Some(bytes.into());
        self
    }

    /// Sets the error message buffer bytes.
    pub fn with_err_msg(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.err_msg = Some(bytes.into());
        self
    }

    /// Makes the native call block for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of non-null buffers this outcome allocates.
    pub fn buffer_count(&self) -> usize {
        [&self.state, &self.err_kind, &self.err_msg]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::bare_failure(NISPOR_FAIL)
    }
}

/// A misuse of native memory observed by [`CountingNative`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A pointer that is not live was freed (double free or foreign pointer).
    UnknownFree {
        /// Free function that was called.
        freed_as: BufferKind,
        /// Address passed in.
        addr: usize,
    },
    /// A buffer was freed through the wrong free function.
    MismatchedFree {
        /// Slot the buffer was allocated for.
        allocated_as: BufferKind,
        /// Free function that was called.
        freed_as: BufferKind,
    },
}

/// Snapshot of the double's allocation ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Native calls made.
    pub calls: usize,
    /// Buffers allocated.
    pub allocated: usize,
    /// Live buffers released.
    pub freed: usize,
    /// Free calls made with a null pointer.
    pub null_frees: usize,
    /// Buffers allocated and not yet released.
    pub outstanding: usize,
    /// Misuses observed.
    pub violations: Vec<Violation>,
}

impl AllocationReport {
    /// Returns true if every buffer was released exactly once through the
    /// right free function.
    pub fn is_balanced(&self) -> bool {
        self.outstanding == 0 && self.allocated == self.freed && self.violations.is_empty()
    }
}

#[derive(Default)]
struct Ledger {
    live: HashMap<usize, BufferKind>,
    calls: usize,
    allocated: usize,
    freed: usize,
    null_frees: usize,
    violations: Vec<Violation>,
    // Released buffers, zeroed and kept allocated until the double drops.
    quarantine: Vec<Vec<u8>>,
}

/// A [`NativeLibrary`] double that hands out real heap-allocated C strings.
///
/// Outcomes are taken from a script in order; once the script is exhausted
/// every call uses the fallback outcome. Every allocation is recorded, and
/// free calls are checked against the live set, so leaks, double frees and
/// frees through the wrong function all show up in [`Self::report`]. Pointers
/// that are not live are never dereferenced or released.
///
/// Released buffers are zeroed and stay allocated until the double drops, so
/// a read after release sees an empty string instead of the old payload.
pub struct CountingNative {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    ledger: Mutex<Ledger>,
}

impl CountingNative {
    /// Creates a double that always produces `outcome`.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: outcome,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Creates a double that plays `outcomes` in order, then fails with
    /// [`NISPOR_FAIL`].
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let double = Self::new(Outcome::default());
        double.push_all(outcomes);
        double
    }

    /// Appends `outcome` to the script.
    pub fn push(&self, outcome: Outcome) {
        self.script.lock().push_back(outcome);
    }

    /// Appends `outcomes` to the script.
    pub fn push_all(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.script.lock().extend(outcomes);
    }

    /// Returns a snapshot of the allocation ledger.
    pub fn report(&self) -> AllocationReport {
        let ledger = self.ledger.lock();
        AllocationReport {
            calls: ledger.calls,
            allocated: ledger.allocated,
            freed: ledger.freed,
            null_frees: ledger.null_frees,
            outstanding: ledger.live.len(),
            violations: ledger.violations.clone(),
        }
    }

    fn next_outcome(&self) -> Outcome {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn allocate(&self, kind: BufferKind, bytes: Option<&[u8]>) -> *mut c_char {
        let Some(bytes) = bytes else {
            return std::ptr::null_mut();
        };
        let ptr = CString::new(bytes)
            .expect("outcome buffers must not contain NUL")
            .into_raw();
        let mut ledger = self.ledger.lock();
        ledger.allocated += 1;
        ledger.live.insert(ptr as usize, kind);
        ptr
    }

    unsafe fn free(&self, freed_as: BufferKind, ptr: *mut c_char) {
        let mut ledger = self.ledger.lock();
        if ptr.is_null() {
            ledger.null_frees += 1;
            return;
        }
        let Some(allocated_as) = ledger.live.remove(&(ptr as usize)) else {
            ledger.violations.push(Violation::UnknownFree {
                freed_as,
                addr: ptr as usize,
            });
            return;
        };
        if allocated_as != freed_as {
            ledger.violations.push(Violation::MismatchedFree {
                allocated_as,
                freed_as,
            });
        }
        ledger.freed += 1;
        let mut bytes = CString::from_raw(ptr).into_bytes_with_nul();
        bytes.fill(0);
        ledger.quarantine.push(bytes);
    }
}

impl Default for CountingNative {
    fn default() -> Self {
        Self::new(Outcome::default())
    }
}

impl std::fmt::Debug for CountingNative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingNative")
            .field("report", &self.report())
            .finish_non_exhaustive()
    }
}

// SAFETY: slots receive fresh `CString` allocations or null, and only
// pointers still in the live set are ever released.
unsafe impl NativeLibrary for CountingNative {
    unsafe fn collect_state(
        &self,
        state: *mut *mut c_char,
        err_kind: *mut *mut c_char,
        err_msg: *mut *mut c_char,
    ) -> c_int {
        assert!(!state.is_null());
        assert!(!err_kind.is_null());
        assert!(!err_msg.is_null());

        self.ledger.lock().calls += 1;
        let outcome = self.next_outcome();
        if let Some(delay) = outcome.delay {
            thread::sleep(delay);
        }

        *state = self.allocate(BufferKind::State, outcome.state.as_deref());
        *err_kind = self.allocate(BufferKind::ErrKind, outcome.err_kind.as_deref());
        *err_msg = self.allocate(BufferKind::ErrMsg, outcome.err_msg.as_deref());
        outcome.code
    }

    unsafe fn free_state(&self, ptr: *mut c_char) {
        self.free(BufferKind::State, ptr);
    }

    unsafe fn free_err_kind(&self, ptr: *mut c_char) {
        self.free(BufferKind::ErrKind, ptr);
    }

    unsafe fn free_err_msg(&self, ptr: *mut c_char) {
        self.free(BufferKind::ErrMsg, ptr);
    }
}

impl Drop for CountingNative {
    fn drop(&mut self) {
        for (addr, _) in self.ledger.get_mut().live.drain() {
            // SAFETY: live addresses came from `CString::into_raw` and have
            // not been released.
            drop(unsafe { CString::from_raw(addr as *mut c_char) });
        }
    }
}
