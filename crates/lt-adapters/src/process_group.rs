// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-group helpers for the tail reader subprocess.
//!
//! The tail reader is spawned in its own process group so that the
//! executor can kill it (and anything it forked, e.g. a follow helper)
//! with one signal without touching the executor's own process. Grounded
//! on the original implementation's `preexec_fn=os.setpgrp` /
//! `os.killpg`.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::io;
use std::os::unix::process::CommandExt;
use tokio::process::{Child, Command};

/// Spawn `cmd` as the leader of a new process group and return the child
/// handle. `process_group(0)` makes the child its own group leader, the
/// same effect as the original's `preexec_fn=os.setpgrp`.
pub fn spawn_in_new_group(mut cmd: Command) -> io::Result<Child> {
    cmd.process_group(0);
    cmd.spawn()
}

/// Send `SIGKILL` to every process in `pid`'s process group.
///
/// `pid` must be the group leader's pid, i.e. the pid returned by spawning
/// via [`spawn_in_new_group`]. Returns `Ok(())` if the group is already
/// gone (`ESRCH`), since that is the desired end state.
pub fn killpg(pid: u32) -> io::Result<()> {
    let group = Pid::from_raw(-(pid as i32));
    match signal::kill(group, Signal::SIGKILL) {
        Ok(()) => Ok(()),
        Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
    }
}

#[cfg(test)]
#[path = "process_group_tests.rs"]
mod tests;
