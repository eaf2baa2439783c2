use num_format::{Locale, ToFormattedString};
use std::time::{SystemTime, UNIX_EPOCH};

/// Format a count with thousands separators for log messages.
/// # Example
/// ```
/// assert_eq!(rustyovl::utils::fmt_count(12345678usize), "12,345,678");
/// ```
pub fn fmt_count<T: ToFormattedString>(n: T) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Wall-clock seconds since the epoch.
pub fn realtime() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// User plus system CPU seconds consumed by this process.
pub fn cputime() -> f64 {
    let rusage = unsafe {
        let mut rusage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, rusage.as_mut_ptr()) != 0 {
            return 0.0;
        }
        rusage.assume_init()
    };
    let user = rusage.ru_utime;
    let sys = rusage.ru_stime;
    (user.tv_sec as f64 + user.tv_usec as f64 * 1e-6)
        + (sys.tv_sec as f64 + sys.tv_usec as f64 * 1e-6)
}
