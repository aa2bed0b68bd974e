//! Bridge protocol round-trip against a real socket. No mock-HTTP crate is
//! fabricated here: a raw `TcpListener` stands in for the sibling server.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

use gatewaydb_core::bridge::{read_payload_to_string, BridgeClient, QueryMode};
use gatewaydb_core::option::Config;
use gatewaydb_core::registry::{ConnectionHandle, Extension, Listener};
use gatewaydb_core::result::Payload;
use gatewaydb_core::variables::{QueryContext, ScopedStore};
use gatewaydb_core::vartag::VariableTag;
use std::sync::Arc;

fn read_request(stream: &mut impl Read) -> (String, usize) {
    let (line, len, _headers) = read_request_with_headers(stream);
    (line, len)
}

fn read_request_with_headers(stream: &mut impl Read) -> (String, usize, HashMap<String, String>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut content_length = 0usize;
    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.insert(name, value);
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok();
    (request_line, content_length, headers)
}

fn respond(stream: &mut impl Write, body: &str) {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).unwrap();
}

#[test]
fn execute_round_trips_config_fetch_and_query_body() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().unwrap();
            let (request_line, _) = read_request(&mut stream);
            if request_line.starts_with("GET") {
                respond(&mut stream, "format=csv\ntoken.required=false\ncompression=none\n");
            } else {
                respond(&mut stream, "hello-bridge");
            }
        }
    });

    let base_url = format!("http://{addr}/");
    let client = BridgeClient::new(&base_url, &Config::new()).unwrap();
    let mut result = client.execute("select 1", QueryMode::Sync, "csv", "none").unwrap();

    let body = match result.payload() {
        Some(Payload::Stream(stream)) => read_payload_to_string(stream).unwrap(),
        _ => panic!("expected a stream payload"),
    };
    assert_eq!(body, "hello-bridge");

    server.join().unwrap();
}

struct NoopConn;
impl ConnectionHandle for NoopConn {
    fn execute(&self, _sql: &str) -> gatewaydb_core::error::Result<gatewaydb_core::result::ResultSet> {
        Err(gatewaydb_core::error::GatewayError::client("not wired"))
    }
}

/// Spec §8 scenario E4: `{{ bridge(url=http://b/): select 7 }}` ships the
/// query with an `x-query-id` header and is substituted by that same id's
/// CSV URL, single-quoted under the generic dialect's default quoting.
#[test]
fn e4_bridge_block_emits_a_dialect_wrapped_remote_table_url() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let captured_query_id = Arc::new(std::sync::Mutex::new(None));
    let captured_for_server = captured_query_id.clone();

    let server = thread::spawn(move || {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().unwrap();
            let (request_line, _, headers) = read_request_with_headers(&mut stream);
            if request_line.starts_with("GET") {
                respond(&mut stream, "format=csv\ntoken.required=false\ncompression=none\n");
            } else {
                *captured_for_server.lock().unwrap() = headers.get("x-query-id").cloned();
                respond(&mut stream, "");
            }
        }
    });

    let base_url = format!("http://{addr}/");
    let registry = Arc::new(gatewaydb_core::registry::Registry::with_defaults());
    let ext = registry.resolve("bridge").unwrap();
    let ctx = Arc::new(QueryContext::new(VariableTag::Brace, Arc::new(ScopedStore::new())));
    let conn: Arc<dyn ConnectionHandle> = Arc::new(NoopConn);
    let mut cfg = Config::new();
    cfg.set("url", base_url.clone());

    let mut listener_box = ext.create_listener(ctx, conn, cfg).unwrap();
    let mut output = listener_box.on_query("select 7").unwrap();
    let row = output.next_row().unwrap().expect("one row");
    let rendered = row.get(0).unwrap().as_string();

    server.join().unwrap();

    let query_id = captured_query_id.lock().unwrap().clone().expect("x-query-id header sent");
    assert_eq!(rendered, format!("'{base_url}{query_id}.csv'"));
}
