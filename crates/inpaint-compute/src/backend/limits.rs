//! Memory limits for field allocation.

use crate::{ComputeError, ComputeResult};

/// Fallback when available memory cannot be detected.
const DEFAULT_MEMORY_BYTES: u64 = 4 * 1024 * 1024 * 1024; // 4 GB

/// Backend resource limits.
///
/// Contains detected or default capabilities used to reject allocations
/// that cannot succeed before any work is queued.
#[derive(Debug, Clone)]
pub struct DeviceLimits {
    /// Maximum size of a single field in bytes.
    pub max_buffer_bytes: u64,
    /// Total memory in bytes (detected or estimated).
    pub total_memory: u64,
    /// Memory available for new fields in bytes.
    pub available_memory: u64,
    /// Whether values were auto-detected vs defaults.
    pub detected: bool,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_buffer_bytes: u64::MAX,
            total_memory: DEFAULT_MEMORY_BYTES,
            available_memory: DEFAULT_MEMORY_BYTES,
            detected: false,
        }
    }
}

impl DeviceLimits {
    /// Limits of host RAM, for backends whose "device" memory is RAM.
    pub fn host() -> Self {
        match sys_info::mem_info() {
            Ok(mem) => Self {
                max_buffer_bytes: u64::MAX,
                total_memory: mem.total * 1024,
                available_memory: mem.avail * 1024,
                detected: true,
            },
            Err(_) => Self::default(),
        }
    }

    /// Creates limits with explicit values (tests, constrained targets).
    pub fn with_memory(available_bytes: u64, max_buffer_bytes: u64) -> Self {
        Self {
            max_buffer_bytes,
            total_memory: available_bytes,
            available_memory: available_bytes,
            detected: false,
        }
    }

    /// Checks whether a buffer of `bytes` can be allocated.
    pub fn check(&self, bytes: u64) -> ComputeResult<()> {
        if bytes > self.max_buffer_bytes {
            return Err(ComputeError::BufferTooLarge {
                requested: bytes,
                limit: self.max_buffer_bytes,
            });
        }
        if bytes > self.available_memory {
            return Err(inpaint_core::Error::allocation_failed(
                bytes as usize,
                format!("only {} bytes available", self.available_memory),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        let limits = DeviceLimits::with_memory(1024, 512);
        assert!(limits.check(256).is_ok());
        assert!(matches!(limits.check(600), Err(ComputeError::BufferTooLarge { .. })));

        let tight = DeviceLimits::with_memory(100, 512);
        assert!(matches!(tight.check(200), Err(ComputeError::Field(_))));
    }

    #[test]
    fn test_host_limits_nonzero() {
        let limits = DeviceLimits::host();
        assert!(limits.available_memory > 0);
    }
}
