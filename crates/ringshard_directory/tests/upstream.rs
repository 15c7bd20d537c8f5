// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]

//! Tests for `HttpUserSource` against a local HTTP listener.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringshard_directory::{DirectoryConfig, HttpUserSource, SourceError, UserDirectory, UserSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Responder = dyn Fn(&str) -> Option<(u16, String)> + Send + Sync;

/// Local stand-in for the upstream directory.
///
/// The responder maps a request path to a status and body; `None` leaves the request unanswered.
struct Upstream {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Upstream {
    async fn start(responder: impl Fn(&str) -> Option<(u16, String)> + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local listener");
        let address = listener.local_addr().expect("listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&responder), Arc::clone(&seen)));
            }
        });

        Self { address, requests }
    }

    fn config(&self) -> DirectoryConfig {
        DirectoryConfig::default().with_api_url(format!("http://{}", self.address))
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }
}

async fn serve(mut stream: TcpStream, responder: Arc<Responder>, seen: Arc<Mutex<Vec<String>>>) {
    let head = read_head(&mut stream).await;
    let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
    seen.lock().expect("request log").push(head);

    match responder(&path) {
        Some((status, body)) => {
            let response = format!(
                "HTTP/1.1 {status} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.expect("write response");
        }
        None => tokio::time::sleep(Duration::from_secs(30)).await,
    }
}

async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buffer = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).await.expect("read request");
        if read == 0 {
            break;
        }
        head.extend_from_slice(&buffer[..read]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn user_body(login: &str) -> String {
    format!(r#"{{"login":"{login}","name":"{login}","company":null,"followers":3,"public_repos":100}}"#)
}

#[tokio::test]
async fn fetches_user_with_directory_headers() {
    let upstream = Upstream::start(|path| {
        let login = path.rsplit('/').next().unwrap_or_default();
        Some((200, user_body(login)))
    })
    .await;
    let source = HttpUserSource::new(&upstream.config());

    let user = source.fetch("octocat").await.expect("upstream answered");

    assert_eq!(user.login, "octocat");
    assert_eq!(user.company, "");
    assert_eq!(user.followers, 3);
    assert_eq!(user.public_repos, 100);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let head = requests[0].to_ascii_lowercase();
    assert!(head.starts_with("get /users/octocat http/1.1\r\n"), "{head}");
    assert!(head.contains("\r\naccept: application/vnd.github+json\r\n"), "{head}");
    assert!(head.contains("\r\nx-github-api-version: 2022-11-28\r\n"), "{head}");
}

#[tokio::test]
async fn not_found_body_is_returned_as_record() {
    let upstream = Upstream::start(|_| Some((404, r#"{"message":"Not Found","documentation_url":"x"}"#.to_string()))).await;
    let source = HttpUserSource::new(&upstream.config());

    let user = source.fetch("ghost").await.expect("not found is an answer");

    assert!(user.is_not_found());
}

#[tokio::test]
async fn unexpected_status_is_an_error() {
    let upstream = Upstream::start(|path| match path {
        "/users/busy" => Some((503, r#"{"message":"Service Unavailable"}"#.to_string())),
        _ => Some((404, "<html>gone</html>".to_string())),
    })
    .await;
    let source = HttpUserSource::new(&upstream.config());

    let busy = source.fetch("busy").await.expect_err("server error");
    let gone = source.fetch("gone").await.expect_err("404 without a directory record");

    assert!(matches!(busy, SourceError::Status(503)), "{busy:?}");
    assert!(matches!(gone, SourceError::Status(404)), "{gone:?}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let upstream = Upstream::start(|_| Some((200, "{not json".to_string()))).await;
    let source = HttpUserSource::new(&upstream.config());

    let error = source.fetch("octocat").await.expect_err("malformed body");

    assert!(matches!(error, SourceError::Decode(_)), "{error:?}");
}

#[tokio::test]
async fn silent_upstream_times_out() {
    let upstream = Upstream::start(|_| None).await;
    let config = upstream.config().with_request_timeout(Duration::from_millis(100));
    let source = HttpUserSource::new(&config);

    let error = source.fetch("octocat").await.expect_err("no answer");

    assert!(matches!(error, SourceError::Timeout(timeout) if timeout == Duration::from_millis(100)), "{error:?}");
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local listener");
    let address = listener.local_addr().expect("listener address");
    drop(listener);
    let source = HttpUserSource::new(&DirectoryConfig::default().with_api_url(format!("http://{address}")));

    let error = source.fetch("octocat").await.expect_err("nothing listens");

    assert!(matches!(error, SourceError::Transport(_)), "{error:?}");
}

#[tokio::test]
async fn directory_fetches_each_login_once() {
    let upstream = Upstream::start(|path| {
        let login = path.rsplit('/').next().unwrap_or_default();
        Some((200, user_body(login)))
    })
    .await;
    let config = upstream.config();
    let directory = UserDirectory::new(&config, HttpUserSource::new(&config)).expect("valid config");

    let first = directory.retrieve_users("thienohs,apache,thienohs").await;
    let second = directory.retrieve_users("apache,thienohs").await;

    assert_eq!(first.users.len(), 2);
    assert_eq!(first, second);
    assert!((first.users[0].avg_followers_per_public_repo - 0.03).abs() < f32::EPSILON);
    assert_eq!(upstream.requests().len(), 2);
}
