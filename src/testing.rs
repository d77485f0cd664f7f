//! Shared helpers for the unit tests: request builders and a fake SMTP relay.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::Config;
use crate::mailer::Mailer;
use crate::templates::Templates;
use crate::AppState;

pub const BOUNDARY: &str = "XBOUNDARY";

pub struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self { name, filename: None, data: value.as_bytes() }
    }

    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self { name, filename: Some(filename), data }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn raw_multipart_request(body: &[u8]) -> Request {
    Request::builder()
        .method("POST")
        .uri("/send")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body.to_vec()))
        .unwrap()
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request {
    raw_multipart_request(&multipart_body(parts))
}

pub fn urlencoded_request(body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri("/send")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn views_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("views")
}

pub fn test_config(relay_port: u16) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        views_dir: views_dir(),
        relay_host: "127.0.0.1".to_string(),
        relay_port,
        relay_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

pub fn test_state(config: Config) -> Arc<AppState> {
    let templates = Templates::load(&config.views_dir).unwrap();
    let mailer = Mailer::new(&config).unwrap();
    Arc::new(AppState { config, templates, mailer })
}

/// A loopback port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub struct FakeRelay {
    pub port: u16,
    /// The DATA payload of the first message, lines joined with `\n`
    pub received: oneshot::Receiver<String>,
}

/// Accepts one SMTP session and says yes to everything.
pub async fn spawn_fake_relay() -> FakeRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut tx = Some(tx);

        write.write_all(b"220 fake.relay ESMTP\r\n").await.unwrap();

        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.to_ascii_uppercase();
            if command.starts_with("DATA") {
                write
                    .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                    .await
                    .unwrap();
                let mut data = String::new();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line == "." {
                        break;
                    }
                    data.push_str(&line);
                    data.push('\n');
                }
                write.write_all(b"250 OK queued\r\n").await.unwrap();
                if let Some(tx) = tx.take() {
                    let _ = tx.send(data);
                }
            } else if command.starts_with("QUIT") {
                let _ = write.write_all(b"221 Bye\r\n").await;
                break;
            } else {
                write.write_all(b"250 OK\r\n").await.unwrap();
            }
        }
    });

    FakeRelay { port, received: rx }
}
