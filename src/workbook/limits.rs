//! Open-file budget for intermediate saves.
//!
//! Every inserted image is backed by a PNG file in the image directory.
//! The pipeline saves the workbook once the number of images inserted since
//! the last save gets within [`FILE_LIMIT_HEADROOM`] of the process's soft
//! `RLIMIT_NOFILE`.

/// Used when the limit cannot be queried.
pub const FALLBACK_FILE_LIMIT: u64 = 100;

/// Descriptors left free for everything else the process has open.
pub const FILE_LIMIT_HEADROOM: u64 = 50;

/// Soft limit on open file descriptors, or [`FALLBACK_FILE_LIMIT`].
#[cfg(unix)]
pub fn open_file_limit() -> u64 {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let result = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
    if result != 0 {
        tracing::warn!(
            error = %std::io::Error::last_os_error(),
            fallback = FALLBACK_FILE_LIMIT,
            "getrlimit failed, using fallback file limit"
        );
        return FALLBACK_FILE_LIMIT;
    }
    if limit.rlim_cur == libc::RLIM_INFINITY {
        return u64::MAX;
    }
    limit.rlim_cur as u64
}

#[cfg(not(unix))]
pub fn open_file_limit() -> u64 {
    tracing::warn!(
        fallback = FALLBACK_FILE_LIMIT,
        "open file limit unavailable on this platform, using fallback"
    );
    FALLBACK_FILE_LIMIT
}

/// Images to insert before an intermediate save. Never zero.
pub fn persist_threshold(file_limit: u64) -> u64 {
    file_limit.saturating_sub(FILE_LIMIT_HEADROOM).max(1)
}
