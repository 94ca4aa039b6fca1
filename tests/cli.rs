//! Integration tests: run the proxycache binary itself, both its CLI
//! argument handling and a live end-to-end hit/miss scenario against a
//! throwaway origin server running in-process.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::time::Duration;

fn proxycache() -> Command {
    Command::new(env!("CARGO_BIN_EXE_proxycache"))
}

#[test]
fn no_args_exits_1_with_usage() {
    let out = proxycache().output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("usage:"));
}

#[test]
fn too_many_args_exits_1_with_usage() {
    let out = proxycache().args(["8080", "extra"]).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("usage:"));
}

#[test]
fn non_numeric_port_exits_1() {
    let out = proxycache().arg("not-a-port").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

/// A canned-response origin server for the child proxy process to forward
/// to. Serves exactly one connection per call, then stops listening.
fn spawn_once_origin(body: &'static [u8]) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let mut response = format!(
                "HTTP/1.0 200 OK\r\nContent-Length: {}\r\n\r\n",
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(body);
            let _ = stream.write_all(&response);
        }
    });
    port
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn connect_with_retries(port: u16) -> TcpStream {
    for _ in 0..50 {
        if let Ok(s) = TcpStream::connect(("127.0.0.1", port)) {
            return s;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("proxy never started listening on {}", port);
}

#[test]
fn hit_after_miss_serves_identical_bytes_without_recontacting_origin() {
    let origin_port = spawn_once_origin(b"hello from origin");
    let proxy_port = free_port();
    let mut child = proxycache().arg(proxy_port.to_string()).spawn().unwrap();

    let request = format!(
        "GET http://127.0.0.1:{}/a HTTP/1.1\r\nHost: x\r\n\r\n",
        origin_port
    );

    let mut first = connect_with_retries(proxy_port);
    first.write_all(request.as_bytes()).unwrap();
    let mut first_response = Vec::new();
    first.read_to_end(&mut first_response).unwrap();
    assert!(String::from_utf8_lossy(&first_response).ends_with("hello from origin"));

    // The origin only accepts one connection; a second identical request
    // must come back byte-identical from the cache, not a second fetch.
    let mut second = connect_with_retries(proxy_port);
    second.write_all(request.as_bytes()).unwrap();
    let mut second_response = Vec::new();
    second.read_to_end(&mut second_response).unwrap();

    assert_eq!(first_response, second_response);

    let _ = child.kill();
    let _ = child.wait();
}

#[test]
fn malformed_requests_get_expected_status_codes() {
    let proxy_port = free_port();
    let mut child = proxycache().arg(proxy_port.to_string()).spawn().unwrap();

    let cases: [(&str, &str); 3] = [
        ("POST http://x/ HTTP/1.1\r\n\r\n", "501"),
        ("GET /rel HTTP/1.1\r\n\r\n", "400"),
        ("GET http://x/ HTTP/2.0\r\n\r\n", "400"),
    ];
    for (request, expected_code) in cases {
        let mut conn = connect_with_retries(proxy_port);
        conn.write_all(request.as_bytes()).unwrap();
        let mut response = Vec::new();
        conn.read_to_end(&mut response).unwrap();
        let text = String::from_utf8_lossy(&response);
        assert!(
            text.starts_with(&format!("HTTP/1.0 {} ", expected_code)),
            "request {:?} expected {} but got: {}",
            request,
            expected_code,
            text
        );
    }

    let _ = child.kill();
    let _ = child.wait();
}
