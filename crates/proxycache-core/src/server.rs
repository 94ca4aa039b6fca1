//! Acceptor.
//!
//! A single-threaded accept loop: block on `accept`, and on success hand the
//! connection to a fresh, fully independent worker thread running the
//! request pipeline. Each accepted connection gets a detached
//! `std::thread::spawn` whose `JoinHandle` is simply dropped; the accepted
//! `TcpStream`'s own `Drop` impl closes the socket on every worker exit path
//! (normal return, `?`-propagated error, or panic unwind) without any manual
//! bookkeeping.
//!
//! `SIGPIPE` needs no explicit handling here: Rust's runtime already sets it
//! to `SIG_IGN` before `main` runs (see `std::rt`), so a write to a peer
//! that has reset the connection surfaces as an `io::Error` the pipeline
//! already handles, rather than terminating the process.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::cache::Cache;
use crate::config::Config;
use crate::pipeline;
use crate::utils::{log_error, log_info};

/// Run the accept loop against an already-bound listener until the process
/// is killed. Accept failures are transient and non-fatal: logged, then the
/// loop continues.
pub fn serve(listener: TcpListener, config: Config) {
    let cache = Arc::new(Cache::new(config.max_cache_bytes, config.max_object_bytes));
    let config = Arc::new(config);

    log_info(&format!(
        "proxycache listening on {}",
        listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string())
    ));

    for accepted in listener.incoming() {
        match accepted {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| "<unknown>".to_string());
                log_info(&format!("accepted connection from {}", peer));

                let cache = cache.clone();
                let config = config.clone();
                thread::spawn(move || {
                    pipeline::handle_connection(stream, &cache, &config, dial_origin);
                });
            }
            Err(err) => {
                log_error(&format!("accept failed: {}", err));
            }
        }
    }
}

fn dial_origin(host: &str, port: &str) -> std::io::Result<TcpStream> {
    TcpStream::connect(format!("{}:{}", host, port))
}
