use std::time::{SystemTime, UNIX_EPOCH};

const DAYS_PER_400Y: u64 = 365 * 400 + 97;
const DAYS_PER_4Y: u64 = 365 * 4 + 1;

/// Civil date/time from a wall clock, good enough for log lines.
pub fn format_time(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let days = secs / 86_400;
    let tod = secs % 86_400;

    // days since 2000-03-01, the trick that keeps leap years simple
    let mut d = days as i64 - 10957 - 60;
    let mut y = 2000i64;
    y += 400 * d.div_euclid(DAYS_PER_400Y as i64);
    d = d.rem_euclid(DAYS_PER_400Y as i64);
    let c = (d / 36524).min(3);
    d -= c * 36524;
    y += c * 100;
    let q = (d / DAYS_PER_4Y as i64).min(24);
    d -= q * DAYS_PER_4Y as i64;
    y += 4 * q;
    let r = (d / 365).min(3);
    d -= r * 365;
    y += r;

    const MDAYS: [i64; 12] = [31, 30, 31, 30, 31, 31, 30, 31, 30, 31, 31, 29];
    let mut m = 0usize;
    while m < 12 && d >= MDAYS[m] {
        d -= MDAYS[m];
        m += 1;
    }
    let month = if m >= 10 { m - 9 } else { m + 3 };
    if m >= 10 {
        y += 1;
    }

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        y,
        month,
        d + 1,
        tod / 3600,
        (tod % 3600) / 60,
        tod % 60
    )
}

#[macro_export]
macro_rules! log {
    ($level:expr, $color:expr, $($arg:tt)*) => {{
        let ts = $crate::format_time(std::time::SystemTime::now());
        println!(
            "[{}] webserv[{}] \x1b[{}m{}\x1b[0m: {}",
            ts,
            std::process::id(),
            $color,
            $level,
            format!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! info { ($($arg:tt)*) => { $crate::log!("INFO ", "32", $($arg)*) }; } // Green
#[macro_export]
macro_rules! warn { ($($arg:tt)*) => { $crate::log!("WARN ", "33", $($arg)*) }; } // Yellow
#[macro_export]
macro_rules! error { ($($arg:tt)*) => { $crate::log!("ERROR", "31", $($arg)*) }; } // Red
#[macro_export]
macro_rules! debug { ($($arg:tt)*) => { $crate::log!("DEBUG", "36", $($arg)*) }; } // Cyan
#[macro_export]
macro_rules! trace { ($($arg:tt)*) => { $crate::log!("TRACE", "34", $($arg)*) }; } // Blue
