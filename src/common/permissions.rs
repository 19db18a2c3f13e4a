use std::path::Path;

#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;

/// Directories where NGINX usually keeps its cache
const RUNTIME_ROOTS: &[&str] = &["/var/run", "/run", "/var/cache", "/tmp"];

/// Check if this process may create and unlink entries in a directory.
///
/// A directory with every write bit cleared reads as unwritable even for
/// root, which the kernel access check alone would allow.
pub fn can_write_dir(path: &Path) -> bool {
    let writable_bits = std::fs::metadata(path)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false);
    writable_bits && process_can_write(path)
}

#[cfg(unix)]
fn process_can_write(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK | libc::X_OK) == 0 }
}

#[cfg(not(unix))]
fn process_can_write(_path: &Path) -> bool {
    true
}

/// Get a helpful message for permission issues
pub fn permission_hint(path: &Path) -> String {
    let path_str = path.to_string_lossy();
    if RUNTIME_ROOTS.iter().any(|r| path_str.starts_with(r)) {
        format!(
            "'{}' is usually owned by the NGINX worker user. Run the purger as that user or add it to the group that owns the cache.",
            path.display()
        )
    } else {
        format!(
            "Check file permissions for '{}'. The purger needs write access to remove cached entries.",
            path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_temp_dir_is_writable() {
        let tmp = TempDir::new().unwrap();
        assert!(can_write_dir(tmp.path()));
    }

    #[test]
    fn test_read_only_dir_is_not_writable() {
        let tmp = TempDir::new().unwrap();
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
        assert!(!can_write_dir(tmp.path()));
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_file_is_not_a_writable_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        assert!(!can_write_dir(&file));
    }

    #[test]
    fn test_hint_mentions_worker_for_runtime_paths() {
        assert!(permission_hint(Path::new("/var/run/nginx-cache")).contains("NGINX worker"));
        assert!(permission_hint(Path::new("/srv/cache")).contains("write access"));
    }
}
