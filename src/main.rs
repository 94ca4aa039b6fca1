//! Thin CLI layer: read the listen port, bind a socket, and hand off to
//! proxycache-core's accept loop. `run()` executes on the main thread, so
//! `catch_unwind` below covers argument parsing, the bind, and the blocking
//! accept loop itself (`serve` never spawns the accept loop onto another
//! thread) — a panic there is reported instead of taking the process down
//! silently. It does not cover the per-connection worker threads `serve`
//! spawns: a panic in one of those unwinds only that thread, invisible to
//! this `catch_unwind`, and the process stays up regardless because that is
//! the default behavior of an unhandled panic in a spawned thread.
//!
//! Elaborate flag parsing is out of scope for this binary — `std::env::args()`
//! is read directly, no argument-parsing crate is introduced.

use std::net::TcpListener;
use std::process::exit;

use proxycache_core::Config;

fn usage(program: &str) -> String {
    format!("usage: {} <port>", program)
}

fn run() -> Result<(), String> {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "proxycache".to_string());
    let port = match (args.next(), args.next()) {
        (Some(port), None) => port,
        _ => return Err(usage(&program)),
    };

    let listener = TcpListener::bind(("0.0.0.0", port.parse::<u16>().map_err(|_| usage(&program))?))
        .map_err(|e| format!("cannot bind port {}: {}", port, e))?;

    proxycache_core::serve(listener, Config::from_env());
    Ok(())
}

fn main() {
    let code = match std::panic::catch_unwind(run) {
        Ok(Ok(())) => 0,
        Ok(Err(message)) => {
            eprintln!("{}", message);
            1
        }
        Err(_) => {
            eprintln!("An unexpected error occurred. Please report this issue.");
            1
        }
    };
    exit(code);
}
