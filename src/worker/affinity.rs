//! CPU affinity binding
//!
//! Optional pinning of worker threads to CPU cores, so repeated runs place
//! workers the same way. Worker `i` goes to core `i % num_cpus`.
//!
//! # Platform Support
//!
//! CPU affinity is supported on Linux via `sched_setaffinity`. Elsewhere the
//! call returns an error, which the harness logs and ignores.

use crate::Result;
use tracing::warn;

/// Pin the current thread to one CPU core
///
/// # Errors
///
/// Returns an error if the core ID is out of range or the syscall fails.
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(core: usize) -> Result<()> {
    use anyhow::Context;
    use libc::{cpu_set_t, sched_setaffinity, CPU_SET, CPU_SETSIZE, CPU_ZERO};
    use std::mem;

    if core >= CPU_SETSIZE as usize {
        anyhow::bail!("CPU core ID {} is too large (max {})", core, CPU_SETSIZE - 1);
    }

    // SAFETY: cpu_set_t is plain data; the macros only touch the local set
    let result = unsafe {
        let mut cpu_set: cpu_set_t = mem::zeroed();
        CPU_ZERO(&mut cpu_set);
        CPU_SET(core, &mut cpu_set);
        sched_setaffinity(0, mem::size_of::<cpu_set_t>(), &cpu_set)
    };

    if result != 0 {
        let err = std::io::Error::last_os_error();
        return Err(err).context(format!("Failed to set CPU affinity to core {}", core));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(_core: usize) -> Result<()> {
    anyhow::bail!("CPU affinity is only supported on Linux")
}

/// Core a worker is pinned to
pub fn cpu_for_worker(worker_id: usize, cpu_count: usize) -> usize {
    worker_id % cpu_count.max(1)
}

/// Pin the calling thread for `worker_id`, logging instead of failing
pub fn pin_worker(worker_id: usize) {
    let core = cpu_for_worker(worker_id, num_cpus::get());
    if let Err(e) = set_cpu_affinity(core) {
        warn!(worker = worker_id, core, error = %e, "could not pin worker to CPU");
    }
}

/// Check if thread count exceeds CPU count and warn if so
///
/// Returns true if thread count exceeds CPU count.
pub fn warn_if_oversubscribed(thread_count: usize) -> bool {
    let cpu_count = num_cpus::get();
    if thread_count > cpu_count {
        warn!(
            threads = thread_count,
            cpus = cpu_count,
            "thread count exceeds CPU count; scheduling overhead is part of the measurement"
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_for_worker() {
        assert_eq!(cpu_for_worker(0, 4), 0);
        assert_eq!(cpu_for_worker(5, 4), 1);
        assert_eq!(cpu_for_worker(47, 48), 47);
        assert_eq!(cpu_for_worker(3, 0), 0);
    }

    #[test]
    fn test_warn_if_oversubscribed() {
        let cpu_count = num_cpus::get();

        assert!(!warn_if_oversubscribed(cpu_count));
        assert!(warn_if_oversubscribed(cpu_count + 1));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_set_cpu_affinity_current_core() {
        // The core we are running on is always in our allowed set
        let current = unsafe { libc::sched_getcpu() };
        assert!(current >= 0);
        assert!(set_cpu_affinity(current as usize).is_ok());
    }

    #[test]
    fn test_set_cpu_affinity_out_of_range() {
        assert!(set_cpu_affinity(usize::MAX).is_err());
    }
}
