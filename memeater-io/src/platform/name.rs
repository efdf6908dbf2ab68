use log::debug;

use super::PlatformError;

/// Longest label the process table keeps (`TASK_COMM_LEN` minus the NUL).
pub const LABEL_MAX: usize = 15;

/// Best-effort access to the OS-visible process name.
pub trait ProcessLabel {
    /// Reads the current label, `None` if the platform will not tell.
    fn get_label(&self) -> Option<String>;

    /// Replaces the current label. Longer labels are cut by the kernel.
    fn set_label(&self, label: &str) -> Result<(), PlatformError>;
}

/// The process table of the running OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTable;

#[cfg(target_os = "linux")]
impl ProcessLabel for ProcessTable {
    fn get_label(&self) -> Option<String> {
        let mut buf = [0u8; LABEL_MAX + 1];

        // SAFETY: PR_GET_NAME writes at most 16 bytes, NUL included, into buf.
        let ret = unsafe {
            libc::prctl(
                libc::PR_GET_NAME,
                buf.as_mut_ptr(),
                0 as libc::c_ulong,
                0 as libc::c_ulong,
                0 as libc::c_ulong,
            )
        };
        if ret != 0 {
            let errno = nix::errno::Errno::last();
            log::warn!(
                "Unable to get program name with error {} ({})",
                errno as i32,
                errno.desc()
            );
            return None;
        }

        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let label = String::from_utf8_lossy(&buf[..end]).into_owned();
        debug!("Process table label: {:?}", label);
        (!label.is_empty()).then_some(label)
    }

    fn set_label(&self, label: &str) -> Result<(), PlatformError> {
        let c_label = std::ffi::CString::new(label)
            .map_err(|_| PlatformError::InvalidLabel(label.to_string()))?;

        // SAFETY: c_label is a valid NUL-terminated string for the duration of the call.
        let ret = unsafe {
            libc::prctl(
                libc::PR_SET_NAME,
                c_label.as_ptr(),
                0 as libc::c_ulong,
                0 as libc::c_ulong,
                0 as libc::c_ulong,
            )
        };
        if ret != 0 {
            return Err(PlatformError::Prctl(nix::errno::Errno::last()));
        }
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl ProcessLabel for ProcessTable {
    fn get_label(&self) -> Option<String> {
        None
    }

    fn set_label(&self, _label: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    // PR_SET_NAME renames the calling thread, and every test runs on its own thread.

    #[test]
    fn test_label_round_trip() {
        let table = ProcessTable;
        table.set_label("eater-test").unwrap();
        assert_eq!(table.get_label().as_deref(), Some("eater-test"));
    }

    #[test]
    fn test_kernel_truncates_long_labels() {
        let table = ProcessTable;
        table.set_label("abcdefghijklmnopqrstuvwxyz").unwrap();
        let label = table.get_label().unwrap();
        assert_eq!(label.len(), LABEL_MAX);
        assert_eq!(label, "abcdefghijklmno");
    }

    #[test]
    fn test_nul_in_label_is_rejected() {
        let table = ProcessTable;
        assert!(matches!(
            table.set_label("bad\0label"),
            Err(PlatformError::InvalidLabel(_))
        ));
    }
}
