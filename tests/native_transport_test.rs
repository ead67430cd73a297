//! The native transport against a loopback HTTP/1.1 server.
//!
//! The transport drives its own runtime, so these are plain `#[test]`s.

mod common;

use common::{response, TestServer};
use flate2::write::GzEncoder;
use flate2::Compression;
use mimicnet::base::neterror::TransportErrorKind;
use mimicnet::emulation::profiles::Chrome;
use mimicnet::http::info::InfoKey;
use mimicnet::transport::native::MAX_REDIRECTS;
use mimicnet::{HeaderMap, RequestOptions, Session};
use std::io::Write;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

fn chrome_session() -> Session {
    Session::builder()
        .profile(Chrome::V109)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

#[test]
fn test_get_sends_profile_headers_in_order() {
    let server = TestServer::start(|_| response("200 OK", &[], b"hello"));
    let mut session = chrome_session();

    let resp = session.get(&server.url("/hello"), RequestOptions::new()).unwrap();
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.text(), Some("hello"));
    assert_eq!(resp.http_version(), "HTTP/1.1");
    assert_eq!(resp.reason(), "OK");

    let requests = server.requests();
    let req = &requests[0];
    assert_eq!(req.request_line(), "GET /hello HTTP/1.1");
    assert!(req.header_names()[0].eq_ignore_ascii_case("host"));

    let sent: Vec<String> = req
        .header_names()
        .into_iter()
        .filter(|n| !n.eq_ignore_ascii_case("host") && !n.eq_ignore_ascii_case("content-length"))
        .map(|n| n.to_ascii_lowercase())
        .collect();
    let expected: Vec<String> = session
        .headers()
        .iter()
        .map(|(n, _)| n.to_ascii_lowercase())
        .collect();
    assert_eq!(sent, expected);
    assert!(req.header("user-agent").unwrap().contains("Chrome"));
}

#[test]
fn test_multiple_set_cookie_stored_and_replayed() {
    let server = TestServer::start(|req| {
        if req.path() == "/login" {
            response(
                "200 OK",
                &[("Set-Cookie", "a=1; Path=/"), ("Set-Cookie", "b=2; HttpOnly")],
                b"",
            )
        } else {
            response("200 OK", &[], b"")
        }
    });
    let mut session = chrome_session();

    let resp = session.get(&server.url("/login"), RequestOptions::new()).unwrap();
    assert_eq!(resp.cookies().count(), 2);
    let set_cookies = resp
        .raw_headers()
        .iter()
        .filter(|(n, _)| n.eq_ignore_ascii_case("set-cookie"))
        .count();
    assert_eq!(set_cookies, 2);

    session.get(&server.url("/next"), RequestOptions::new()).unwrap();
    let requests = server.requests();
    assert!(requests[0].header("cookie").is_none());
    assert_eq!(requests[1].header("cookie"), Some("a=1; b=2"));
}

#[test]
fn test_redirect_followed_with_history() {
    let server = TestServer::start(|req| match req.path() {
        "/start" => response(
            "302 Found",
            &[("Location", "/end"), ("Set-Cookie", "hop=1")],
            b"",
        ),
        _ => response("200 OK", &[], b"landed"),
    });
    let mut session = chrome_session();

    let resp = session.get(&server.url("/start"), RequestOptions::new()).unwrap();
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.text(), Some("landed"));
    assert_eq!(resp.history().len(), 1);
    assert_eq!(resp.history()[0].status_code, 302);
    assert_eq!(resp.redirect_count(), 1);
    assert_eq!(resp.url(), server.url("/end"));
    assert_eq!(session.cookies().lookup("hop"), Some("1"));
}

#[test]
fn test_redirect_not_followed_when_disabled() {
    let server = TestServer::start(|_| response("302 Found", &[("Location", "/elsewhere")], b""));
    let mut session = chrome_session();

    let resp = session
        .get(&server.url("/start"), RequestOptions::new().allow_redirects(false))
        .unwrap();
    assert_eq!(resp.status_code(), 302);
    assert!(resp.history().is_empty());
    assert_eq!(
        resp.info_value(InfoKey::RedirectUrl).and_then(|v| v.as_str()),
        Some(server.url("/elsewhere").as_str())
    );
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_see_other_turns_post_into_get() {
    let server = TestServer::start(|req| match req.path() {
        "/submit" => response("303 See Other", &[("Location", "/done")], b""),
        _ => response("200 OK", &[], b"done"),
    });
    let mut session = chrome_session();

    session
        .post(&server.url("/submit"), RequestOptions::new().form([("k", "v")]))
        .unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].request_line(), "POST /submit HTTP/1.1");
    assert_eq!(requests[0].body, b"k=v".to_vec());
    assert_eq!(requests[1].request_line(), "GET /done HTTP/1.1");
    assert!(requests[1].body.is_empty());
    assert!(requests[1].header("content-type").is_none());
}

#[test]
fn test_temporary_redirect_keeps_method_and_body() {
    let server = TestServer::start(|req| match req.path() {
        "/old" => response("307 Temporary Redirect", &[("Location", "/new")], b""),
        _ => response("200 OK", &[], b""),
    });
    let mut session = chrome_session();

    session
        .post(&server.url("/old"), RequestOptions::new().body("payload"))
        .unwrap();

    let requests = server.requests();
    assert_eq!(requests[1].request_line(), "POST /new HTTP/1.1");
    assert_eq!(requests[1].body, b"payload".to_vec());
}

#[test]
fn test_redirect_loop_gives_up() {
    let server = TestServer::start(|_| response("302 Found", &[("Location", "/loop")], b""));
    let mut session = chrome_session();

    let err = session.get(&server.url("/loop"), RequestOptions::new()).unwrap_err();
    assert_eq!(
        err.transport().unwrap().kind,
        TransportErrorKind::TooManyRedirects
    );
    assert_eq!(server.requests().len(), MAX_REDIRECTS + 1);
}

#[test]
fn test_keep_alive_connection_reused() {
    let server = TestServer::start(|_| response("200 OK", &[], b"ok"));
    let mut session = chrome_session();

    for _ in 0..3 {
        let resp = session.get(&server.url("/"), RequestOptions::new()).unwrap();
        assert_eq!(resp.status_code(), 200);
    }
    assert_eq!(server.requests().len(), 3);
    assert_eq!(server.connection_count(), 1);
}

#[test]
fn test_connection_close_opens_new_connection() {
    let server = TestServer::start(|_| response("200 OK", &[("Connection", "close")], b"ok"));
    let mut session = chrome_session();

    session.get(&server.url("/"), RequestOptions::new()).unwrap();
    session.get(&server.url("/"), RequestOptions::new()).unwrap();
    assert_eq!(server.connection_count(), 2);
}

#[test]
fn test_timeout() {
    let server = TestServer::start(|_| {
        thread::sleep(Duration::from_secs(2));
        response("200 OK", &[], b"late")
    });
    let mut session = chrome_session();

    let err = session
        .get(
            &server.url("/slow"),
            RequestOptions::new().timeout(Duration::from_millis(200)),
        )
        .unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut session = chrome_session();

    let err = session
        .get(&format!("http://{}/", addr), RequestOptions::new())
        .unwrap_err();
    assert_eq!(
        err.transport().unwrap().kind,
        TransportErrorKind::ConnectionFailed
    );
}

#[test]
fn test_gzip_response_decoded() {
    let server = TestServer::start(|_| {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"compressed hello").unwrap();
        let body = enc.finish().unwrap();
        response("200 OK", &[("Content-Encoding", "gzip")], &body)
    });
    let mut session = chrome_session();

    let resp = session.get(&server.url("/"), RequestOptions::new()).unwrap();
    assert_eq!(resp.text(), Some("compressed hello"));
    assert_ne!(resp.content().as_ref(), b"compressed hello");
}

#[test]
fn test_json_post_and_query_string() {
    let server = TestServer::start(|_| {
        response(
            "200 OK",
            &[("Content-Type", "application/json")],
            br#"{"ok":true}"#,
        )
    });
    let mut session = chrome_session();

    let resp = session
        .post(
            &server.url("/api"),
            RequestOptions::new()
                .param("page", "2")
                .json(&serde_json::json!({ "name": "mimic" })),
        )
        .unwrap();
    let value: serde_json::Value = resp.json().unwrap();
    assert_eq!(value["ok"], true);

    let req = &server.requests()[0];
    assert_eq!(req.path(), "/api?page=2;");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("charset"), Some("utf-8"));
    assert_eq!(req.body, br#"{"name":"mimic"}"#.to_vec());
}

#[test]
fn test_post_without_body_sends_zero_length() {
    let server = TestServer::start(|_| response("200 OK", &[], b""));
    let mut session = Session::new();

    session.post(&server.url("/empty"), RequestOptions::new()).unwrap();
    assert_eq!(server.requests()[0].header("content-length"), Some("0"));
}

#[test]
fn test_debug_trace_lines() {
    let server = TestServer::start(|_| response("200 OK", &[], b""));
    let mut session = chrome_session();

    session
        .get(&server.url("/trace"), RequestOptions::new().debug(true))
        .unwrap();
    let log = session.debug_log();
    assert!(log.iter().any(|l| l.starts_with("* ")));
    assert!(log.iter().any(|l| l == "> GET /trace HTTP/1.1"));
    assert!(log.iter().any(|l| l == "< HTTP/1.1 200 OK"));
}

#[test]
fn test_info_after_exchange() {
    let server = TestServer::start(|_| {
        response("200 OK", &[("Content-Type", "text/plain")], b"12345")
    });
    let mut session = chrome_session();

    let resp = session.get(&server.url("/info"), RequestOptions::new()).unwrap();
    let info = resp.info_map();
    assert_eq!(info.get("HTTP_CODE").map(String::as_str), Some("200"));
    assert_eq!(info.get("SIZE_DOWNLOAD").map(String::as_str), Some("5"));
    assert_eq!(info.get("CONTENT_TYPE").map(String::as_str), Some("text/plain"));
    assert_eq!(info.get("PRIMARY_IP").map(String::as_str), Some("127.0.0.1"));
    assert_eq!(info.get("NUM_CONNECTS").map(String::as_str), Some("1"));
    assert!(resp.elapsed().unwrap() >= 0.0);
}

#[test]
fn test_caller_cookie_header_merged_with_jar() {
    let server = TestServer::start(|_| response("200 OK", &[], b""));
    let mut session = chrome_session();
    session.add_cookie("jar", "1", "");

    let mut headers = HeaderMap::new();
    headers.set("Cookie", "manual=2");
    session
        .get(&server.url("/"), RequestOptions::new().headers(&headers))
        .unwrap();
    assert_eq!(server.requests()[0].header("cookie"), Some("manual=2; jar=1"));
}

#[test]
fn test_cookie_not_sent_to_redirect_target_on_other_host() {
    let target = TestServer::start(|_| response("200 OK", &[], b"other host"));
    let location = format!("http://localhost:{}/landing", target.addr.port());
    let origin = TestServer::start(move |_| {
        response("302 Found", &[("Location", location.as_str())], b"")
    });
    let mut session = chrome_session();
    session.add_cookie("sid", "x", "127.0.0.1");

    let resp = session.get(&origin.url("/start"), RequestOptions::new()).unwrap();
    assert_eq!(resp.text(), Some("other host"));
    assert_eq!(origin.requests()[0].header("cookie"), Some("sid=x"));
    let landed = target.requests();
    assert_eq!(landed[0].path(), "/landing");
    assert!(landed[0].header("cookie").is_none());
}
