//! Timestamped, best-effort process/connection-lifecycle logging.
//!
//! A single free function per stream, a `chrono`-formatted local timestamp
//! prefix, no buffering, no log file. Neither function can panic or block
//! the caller beyond the cost of a `println!`/`eprintln!`.

use chrono::Local;

/// Log a low-noise informational line (accept, connection close) to stdout.
pub fn log_info(message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    println!("[{}] {}", timestamp, message);
}

/// Log a terminal error transition (the status emitted and its cause) to stderr.
pub fn log_error(message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    eprintln!("[{}] {}", timestamp, message);
}
