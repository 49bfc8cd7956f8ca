use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;
use quotype::app::App;
use quotype::quote::{FetchError, HttpQuoteSource, QuoteSource};
use quotype::session::Phase;
use quotype::theme::ThemeMode;

/// Serve a single canned HTTP response on a loopback port and return its URL
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/quote", listener.local_addr().unwrap());

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        // Drain the request head
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }

        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });

    url
}

fn source(url: String) -> HttpQuoteSource {
    HttpQuoteSource::new(url, Duration::from_secs(5))
}

#[test]
fn fetches_quote_field() {
    let url = serve_once("200 OK", r#"{"quote":"the cat sat","author":"someone"}"#);
    assert_eq!(source(url).fetch_random_quote().unwrap(), "the cat sat");
}

#[test]
fn server_error_is_status_error() {
    let url = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
    assert_eq!(
        source(url).fetch_random_quote(),
        Err(FetchError::Status(500))
    );
}

#[test]
fn missing_field_is_malformed() {
    let url = serve_once("200 OK", r#"{"text":"no quote here"}"#);
    assert_matches!(
        source(url).fetch_random_quote(),
        Err(FetchError::Malformed(_))
    );
}

#[test]
fn empty_quote_is_rejected() {
    let url = serve_once("200 OK", r#"{"quote":""}"#);
    assert_eq!(
        source(url).fetch_random_quote(),
        Err(FetchError::EmptyQuote)
    );
}

#[test]
fn app_shows_error_when_service_fails() {
    let url = serve_once("500 Internal Server Error", "");
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(Arc::new(source(url)), ThemeMode::Light, tx);

    app.activate();
    let quote = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    app.handle_event(quote);

    assert_eq!(
        app.session.phase(),
        &Phase::Error("Could not fetch text. Please try again.".into())
    );
    assert!(!app.session.accepts_input());
}
