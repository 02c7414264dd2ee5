// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared-memory checkpoint cell: the last-processed timestamp for one tail
//! target, stored where any process on the host can read it without going
//! through this one.
//!
//! Per SPEC_FULL §3.2/§4.1, the cell is two POSIX shared-memory segments,
//! `"<name>"` (a [`CHECKPOINT_MAX_SIZE`]-byte timestamp buffer) and
//! `"<name>_lock"` (a one-byte spinlock guarding it). Mapping that memory is
//! the one place in this workspace that needs `unsafe`; everything built on
//! top of [`CheckpointCell`] is safe.

use crate::EngineError;
use lt_core::CHECKPOINT_MAX_SIZE;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;
use std::num::NonZeroUsize;
use std::os::unix::io::{AsFd, BorrowedFd, IntoRawFd, RawFd};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

const LOCK_SIZE: usize = 1;
const SPIN_SLEEP: Duration = Duration::from_micros(50);
const MAX_SPINS: u32 = 20_000;

/// A shared-memory checkpoint cell for one executor, identified by `name`
/// (conventionally `service~file_basename`, per spec.md §3).
pub struct CheckpointCell {
    name: String,
    data_fd: RawFd,
    lock_fd: RawFd,
    data_ptr: NonNull<u8>,
    lock_ptr: NonNull<u8>,
}

// SAFETY: the pointers are mappings of shared memory owned exclusively by
// this struct; access is always mediated by the spinlock in `lock_ptr`.
unsafe impl Send for CheckpointCell {}
unsafe impl Sync for CheckpointCell {}

impl CheckpointCell {
    /// Open the named cell, creating both backing segments if they do not
    /// already exist. Reopening an existing cell preserves whatever
    /// timestamp a previous process run left behind — this is what lets a
    /// restarted executor resume warm.
    pub fn open_or_create(name: impl Into<String>) -> Result<Self, EngineError> {
        let name = name.into();
        let data_fd = open_segment(&data_segment_path(&name), CHECKPOINT_MAX_SIZE)
            .map_err(|e| shm_error(&name, e))?;
        let lock_fd = open_segment(&lock_segment_path(&name), LOCK_SIZE)
            .map_err(|e| shm_error(&name, e))?;

        // SAFETY: both fds were just truncated to exactly the size mapped.
        let data_ptr =
            unsafe { map_segment(data_fd, CHECKPOINT_MAX_SIZE) }.map_err(|e| shm_error(&name, e))?;
        // SAFETY: same as above, for the one-byte lock segment.
        let lock_ptr = unsafe { map_segment(lock_fd, LOCK_SIZE) }.map_err(|e| shm_error(&name, e))?;

        Ok(Self {
            name,
            data_fd,
            lock_fd,
            data_ptr,
            lock_ptr,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `raw` — the log's own literal timestamp text, never reparsed or
    /// reformatted — into the cell, taking the spinlock first.
    pub fn set(&self, raw: &str) -> Result<(), EngineError> {
        let bytes = raw.as_bytes();
        if bytes.len() > CHECKPOINT_MAX_SIZE {
            return Err(EngineError::CheckpointUnavailable {
                name: self.name.clone(),
                reason: format!("encoded timestamp {raw:?} exceeds {CHECKPOINT_MAX_SIZE} bytes"),
            });
        }

        self.with_lock(|| {
            // SAFETY: exclusive access is guaranteed by the spinlock above;
            // `data_ptr` maps exactly `CHECKPOINT_MAX_SIZE` bytes.
            unsafe {
                let slice = std::slice::from_raw_parts_mut(self.data_ptr.as_ptr(), CHECKPOINT_MAX_SIZE);
                slice.fill(0);
                slice[..bytes.len()].copy_from_slice(bytes);
            }
        })
    }

    /// Read the cell's current timestamp, or `None` if it has never been set.
    pub fn get(&self) -> Result<Option<String>, EngineError> {
        let raw = self.with_lock(|| {
            // SAFETY: same invariants as `set`.
            let slice =
                unsafe { std::slice::from_raw_parts(self.data_ptr.as_ptr(), CHECKPOINT_MAX_SIZE) };
            let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
            String::from_utf8_lossy(&slice[..end]).into_owned()
        })?;

        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    /// Remove both backing segments from the system. Call this only when a
    /// tail target is permanently decommissioned — not on ordinary shutdown,
    /// since the cell is meant to outlive any one process.
    pub fn destroy(self) -> Result<(), EngineError> {
        shm_unlink(data_segment_path(&self.name).as_str()).ok();
        shm_unlink(lock_segment_path(&self.name).as_str()).ok();
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> T) -> Result<T, EngineError> {
        self.acquire_lock()?;
        let result = f();
        self.release_lock();
        Ok(result)
    }

    fn acquire_lock(&self) -> Result<(), EngineError> {
        let lock = self.lock_atomic();
        for _ in 0..MAX_SPINS {
            if lock
                .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return Ok(());
            }
            std::thread::sleep(SPIN_SLEEP);
        }
        Err(EngineError::CheckpointUnavailable {
            name: self.name.clone(),
            reason: "timed out waiting for checkpoint spinlock".to_string(),
        })
    }

    fn release_lock(&self) {
        self.lock_atomic().store(0, Ordering::Release);
    }

    fn lock_atomic(&self) -> &AtomicU8 {
        // SAFETY: `lock_ptr` maps exactly one byte, exclusively owned by us.
        unsafe { &*self.lock_ptr.as_ptr().cast::<AtomicU8>() }
    }
}

impl Drop for CheckpointCell {
    fn drop(&mut self) {
        // SAFETY: both pointers were produced by `mmap` with these exact sizes
        // and are not used again after this point.
        unsafe {
            let _ = munmap(self.data_ptr.cast(), CHECKPOINT_MAX_SIZE);
            let _ = munmap(self.lock_ptr.cast(), LOCK_SIZE);
            let _ = libc::close(self.data_fd);
            let _ = libc::close(self.lock_fd);
        }
    }
}

fn data_segment_path(name: &str) -> String {
    format!("/{name}")
}

fn lock_segment_path(name: &str) -> String {
    format!("/{name}_lock")
}

fn open_segment(path: &str, size: usize) -> nix::Result<RawFd> {
    let fd = shm_open(
        path,
        OFlag::O_CREAT | OFlag::O_RDWR,
        Mode::S_IRUSR | Mode::S_IWUSR,
    )?;
    ftruncate(fd.as_fd(), size as libc::off_t)?;
    Ok(fd.into_raw_fd())
}

/// # Safety
/// `fd` must reference a segment truncated to at least `size` bytes, and the
/// caller must not map it again for the lifetime of the returned pointer.
unsafe fn map_segment(fd: RawFd, size: usize) -> nix::Result<NonNull<u8>> {
    let len = NonZeroUsize::new(size).expect("checkpoint segments are never zero-sized");
    let borrowed_fd = BorrowedFd::borrow_raw(fd);
    let ptr = mmap(
        None,
        len,
        ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        MapFlags::MAP_SHARED,
        borrowed_fd,
        0,
    )?;
    Ok(ptr.cast())
}

fn shm_error(name: &str, e: nix::errno::Errno) -> EngineError {
    EngineError::CheckpointUnavailable {
        name: name.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
