//! HTTP servers for downloader tests.
//!
//! [`HttpStub`] wraps a `wiremock` server for well-formed responses. The
//! blocking client must not run inside a tokio runtime, so the stub owns a
//! small runtime of its own and only enters it to start, mount and inspect.
//!
//! [`RawHttpServer`] writes the response head by hand, for framing that
//! `wiremock` cannot produce: a `Content-Length` that disagrees with the body,
//! or no `Content-Length` at all.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use tokio::runtime::{Builder, Runtime};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const AUDIO_PATH: &str = "/audio.mp3";

pub struct HttpStub {
    server: MockServer,
    runtime: Runtime,
}

impl HttpStub {
    pub fn start() -> Self {
        let runtime = Builder::new_current_thread().enable_all().build().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// `GET /audio.mp3` answers 200 with `body`.
    pub fn serving(body: impl Into<Vec<u8>>) -> Self {
        let stub = Self::start();
        stub.mount(
            Mock::given(method("GET"))
                .and(path(AUDIO_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into())),
        );
        stub
    }

    /// `GET /audio.mp3` answers `status` with an empty body.
    pub fn failing(status: u16) -> Self {
        let stub = Self::start();
        stub.mount(
            Mock::given(method("GET"))
                .and(path(AUDIO_PATH))
                .respond_with(ResponseTemplate::new(status)),
        );
        stub
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn url(&self) -> String {
        format!("{}{AUDIO_PATH}", self.server.uri())
    }

    pub fn received_requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

/// One-shot-per-connection server with a hand-written response head.
pub struct RawHttpServer {
    addr: SocketAddr,
}

impl RawHttpServer {
    /// Answer every request with 200, a `Content-Length` of `advertised`
    /// (omitted when `None`), then `body`, then close the connection.
    pub fn start(advertised: Option<u64>, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = body.clone();
                thread::spawn(move || serve(stream, advertised, &body));
            }
        });

        Self { addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}{AUDIO_PATH}", self.addr)
    }
}

fn serve(stream: TcpStream, advertised: Option<u64>, body: &[u8]) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
        }
    }

    let mut head = String::from("HTTP/1.1 200 OK\r\n");
    if let Some(len) = advertised {
        head.push_str(&format!("Content-Length: {len}\r\n"));
    }
    head.push_str("Content-Type: audio/mpeg\r\nConnection: close\r\n\r\n");

    // The client hangs up early in most of these tests; write errors are expected.
    let mut out = stream;
    if out.write_all(head.as_bytes()).is_err() {
        return;
    }
    for chunk in body.chunks(4096) {
        if out.write_all(chunk).is_err() {
            return;
        }
    }
    let _ = out.flush();
}
