//! Single-request HTTP server on a loopback port for exercising the send path.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

pub(crate) struct ReceivedRequest {
    /// Request line and headers, without the blank terminator line.
    pub head: String,
    pub body: String,
}

impl ReceivedRequest {
    /// Headers lowercased, so assertions do not depend on name casing.
    pub fn header_lines(&self) -> String {
        self.head.to_ascii_lowercase()
    }
}

pub(crate) struct TestServer {
    pub url: String,
    handle: JoinHandle<ReceivedRequest>,
}

impl TestServer {
    /// Waits for the served request and returns what the client sent.
    pub fn finish(self) -> ReceivedRequest {
        self.handle.join().expect("test server thread panicked")
    }
}

/// Accepts one connection and answers it with `status` and `body`.
pub(crate) fn serve_once(status: &str, content_type: &str, body: &str) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let url = format!(
        "http://{}/v1/chat",
        listener.local_addr().expect("listener address")
    );
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream);

        let mut head = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read request line");
            if line.is_empty() || line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("numeric content-length");
                }
            }
            head.push_str(&line);
        }

        let mut request_body = vec![0; content_length];
        reader
            .read_exact(&mut request_body)
            .expect("read request body");

        let mut stream = reader.into_inner();
        stream
            .write_all(response.as_bytes())
            .expect("write response");
        stream.flush().expect("flush response");

        ReceivedRequest {
            head,
            body: String::from_utf8(request_body).expect("utf-8 request body"),
        }
    });

    TestServer { url, handle }
}
