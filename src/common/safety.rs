use std::path::Path;

/// Paths that must NEVER be emptied, whatever NGINX_CACHE_PATH says.
/// A typo in the environment must not turn a cache purge into `rm -rf /etc/*`.
const PROTECTED_PATHS: &[&str] = &[
    "/",
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/home",
    "/lib",
    "/lib64",
    "/opt",
    "/proc",
    "/root",
    "/run",
    "/sbin",
    "/srv",
    "/sys",
    "/tmp",
    "/usr",
    "/var",
    "/var/cache",
    "/var/lib",
    "/var/log",
    "/var/run",
    "/var/www",
];

/// Check if a path is protected and must never be purged.
///
/// Both the path as given and its canonical form are checked, so
/// `/var/run/../run/` is caught too.
pub fn is_protected(path: &Path) -> bool {
    if matches_protected(path) {
        return true;
    }
    match std::fs::canonicalize(path) {
        Ok(canonical) => matches_protected(&canonical),
        Err(_) => false,
    }
}

fn matches_protected(path: &Path) -> bool {
    // Path equality is component-wise, so trailing slashes don't matter
    if PROTECTED_PATHS.iter().any(|p| path == Path::new(p)) {
        return true;
    }

    if let Some(home) = dirs::home_dir() {
        if path == home {
            return true;
        }
    }

    false
}
