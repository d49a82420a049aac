//! Integration tests for PageFetch using wiremock

use pagefetch::{
    fetch, ConverterKind, ErrorKind, FetchError, FetchRequest, OutputFormat, Tool,
    MAX_RESPONSE_SIZE,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve the same raw HTTP response bytes to every connection
async fn serve_raw(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn chunked_response(content_type: &str, body: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n\
         Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        content_type
    )
    .into_bytes();
    for chunk in body.chunks(chunk_size) {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

async fn mount_body(server: &MockServer, route: &str, content_type: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, content_type))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_text_reduces_html() {
    let mock_server = MockServer::start().await;
    mount_body(
        &mock_server,
        "/",
        "text/html",
        "<script>alert(1)</script><p>Hi  there</p>",
    )
    .await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri())).as_text();
    let result = fetch(req).await.unwrap();

    assert_eq!(result.output, "Hi there");
    assert!(result.metadata.is_empty());
}

#[tokio::test]
async fn test_markdown_fences_plain_text() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/plain", "text/plain", "abc").await;

    let req = FetchRequest::new(format!("{}/plain", mock_server.uri())).as_markdown();
    let result = fetch(req).await.unwrap();

    assert_eq!(result.output, "```\nabc\n```");
}

#[tokio::test]
async fn test_html_to_markdown() {
    let mock_server = MockServer::start().await;

    let html = r#"<!DOCTYPE html>
<html>
<head><title>Test</title><meta charset="utf-8"><link rel="stylesheet" href="a.css"></head>
<body>
    <h1>Hello World</h1>
    <p>This is a <strong>test</strong> paragraph.</p>
    <ul>
        <li>Item 1</li>
        <li>Item 2</li>
    </ul>
    <pre><code class="language-python">print("hi")</code></pre>
    <script>var tracking = true;</script>
</body>
</html>"#;
    mount_body(&mock_server, "/", "text/html; charset=utf-8", html).await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri())).as_markdown();
    let result = fetch(req).await.unwrap();

    assert!(result.output.lines().any(|l| l == "# Hello World"));
    assert!(result.output.contains("**test**"));
    assert!(result
        .output
        .lines()
        .any(|l| l.trim_start().starts_with('*') && l.contains("Item 1")));
    assert!(result.output.contains("```\nprint(\"hi\")"));
    assert!(!result.output.contains("```python"));
    assert!(!result.output.contains("tracking"));
    assert_eq!(result.output, result.output.trim());
}

#[tokio::test]
async fn test_html_format_returns_body_unchanged() {
    let mock_server = MockServer::start().await;
    let html = "<html><body><script>x()</script><p>Raw  content</p></body></html>";
    mount_body(&mock_server, "/", "text/html", html).await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri())).as_html();
    let result = fetch(req).await.unwrap();

    assert_eq!(result.output, html);
}

#[tokio::test]
async fn test_text_passes_non_markup_through() {
    let mock_server = MockServer::start().await;
    let json = "{\"key\":  \"<b>value</b>\"}\n";
    mount_body(&mock_server, "/data.json", "application/json", json).await;

    let req = FetchRequest::new(format!("{}/data.json", mock_server.uri())).as_text();
    let result = fetch(req).await.unwrap();

    assert_eq!(result.output, json);
}

#[tokio::test]
async fn test_http_falls_back_after_https_failure() {
    let mock_server = MockServer::start().await;

    // The mock only speaks plain HTTP, so the https attempt fails during TLS
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("fallback body", "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    let result = fetch(FetchRequest::new(url.clone()).as_text()).await.unwrap();

    assert_eq!(result.output, "fallback body");
    assert_eq!(result.title, format!("{} (text/plain)", url));
}

#[tokio::test]
async fn test_https_is_attempted_once() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/", "text/plain", "unreachable").await;

    let url = mock_server.uri().replacen("http://", "https://", 1);
    let err = fetch(FetchRequest::new(url).timeout(5)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkError);
    let received = mock_server.received_requests().await.unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_title_reflects_redirect_target() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_body(&mock_server, "/new", "text/plain; charset=utf-8", "moved").await;

    let req = FetchRequest::new(format!("{}/old", mock_server.uri())).as_text();
    let result = fetch(req).await.unwrap();

    assert_eq!(
        result.title,
        format!("{}/new (text/plain; charset=utf-8)", mock_server.uri())
    );
    assert_eq!(result.output, "moved");
}

#[tokio::test]
async fn test_error_status_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/missing", mock_server.uri()));
    let err = fetch(req).await.unwrap_err();

    assert!(matches!(err, FetchError::RequestFailed { status: 404 }));
    assert_eq!(err.to_string(), "Request failed with status code: 404");
    // A failing status is final: no retry on the same origin
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_error_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = fetch(FetchRequest::new(mock_server.uri())).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetch(FetchRequest::new(mock_server.uri()).as_html())
        .await
        .unwrap();
    assert_eq!(result.output, "ok");

    // Header values carry commas, so compare whole values on the recorded request
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let headers = &requests[0].headers;
    let value = |name: &str| headers.get(name).unwrap().to_str().unwrap().to_string();

    assert_eq!(value("user-agent"), pagefetch::DEFAULT_USER_AGENT);
    assert_eq!(value("accept-language"), "en-US,en;q=0.9");
    let accept = value("accept");
    assert!(accept.starts_with("text/html,application/xhtml+xml"));
    assert!(accept.ends_with("*/*;q=0.8"));
    assert!(headers.get("accept-encoding").is_none());
}

#[tokio::test]
async fn test_custom_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tool = Tool::builder().user_agent("TestAgent/1.0").build();
    let result = tool
        .execute(FetchRequest::new(mock_server.uri()).as_html())
        .await
        .unwrap();
    assert_eq!(result.output, "ok");
}

#[tokio::test]
async fn test_invalid_scheme_makes_no_request() {
    let mock_server = MockServer::start().await;

    let url = mock_server.uri().replacen("http://", "ftp://", 1);
    let err = fetch(FetchRequest::new(url)).await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidUrlScheme));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_format_is_rejected() {
    let err = "pdf".parse::<OutputFormat>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let tool = Tool::default();
    let bad: Result<FetchRequest, _> =
        serde_json::from_value(serde_json::json!({"url": "https://example.com", "format": "pdf"}));
    assert!(bad.is_err());
    assert!(!tool.input_schema().is_null());
}

#[tokio::test]
async fn test_timeout_fails_without_partial_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(mock_server.uri()).timeout(1);
    let err = fetch(req).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout { secs: 1 }));
    assert_eq!(err.to_string(), "Request timed out after 1 seconds");
}

#[tokio::test]
async fn test_declared_length_over_cap() {
    let raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\nshort",
        MAX_RESPONSE_SIZE + 1
    );
    let base = serve_raw(raw.into_bytes()).await;

    let err = fetch(FetchRequest::new(format!("{}/big", base)))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::ResponseTooLarge { .. }));
    assert_eq!(err.to_string(), "Response too large (exceeds 5MB limit)");
}

#[tokio::test]
async fn test_declared_length_over_cap_with_content_encoding() {
    let raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Encoding: gzip\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\nshort",
        MAX_RESPONSE_SIZE + 1
    );
    let base = serve_raw(raw.into_bytes()).await;

    let err = fetch(FetchRequest::new(format!("{}/gz", base)).as_html())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::ResponseTooLarge { .. }));
}

#[tokio::test]
async fn test_streamed_body_over_cap_without_declared_length() {
    let body = vec![b'a'; (MAX_RESPONSE_SIZE + 1) as usize];
    let base = serve_raw(chunked_response("text/plain", &body, 64 * 1024)).await;

    let err = fetch(FetchRequest::new(format!("{}/stream", base)).as_html())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::ResponseTooLarge { .. }));
}

#[tokio::test]
async fn test_custom_cap_boundaries() {
    let tool = Tool::builder().max_response_size(100).build();

    let exact = serve_raw(chunked_response("text/plain", &[b'x'; 100], 30)).await;
    let result = tool
        .execute(FetchRequest::new(exact).as_html())
        .await
        .unwrap();
    assert_eq!(result.output.len(), 100);

    let over = serve_raw(chunked_response("text/plain", &[b'x'; 101], 30)).await;
    let err = tool
        .execute(FetchRequest::new(over).as_html())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseTooLarge);
}

#[tokio::test]
async fn test_body_until_close_is_read() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
                Connection: close\r\n\r\nuntil close"
        .to_vec();
    let base = serve_raw(raw).await;

    let result = fetch(FetchRequest::new(base).as_text()).await.unwrap();
    assert_eq!(result.output, "until close");
}

#[tokio::test]
async fn test_declared_charset_decoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                b"<p>caf\xE9 cr\xE8me</p>".to_vec(),
                "text/html; charset=iso-8859-1",
            ),
        )
        .mount(&mock_server)
        .await;

    let result = fetch(FetchRequest::new(mock_server.uri()).as_text())
        .await
        .unwrap();
    assert_eq!(result.output, "café crème");
}

#[tokio::test]
async fn test_invalid_bytes_are_replaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"ok \xFF end".to_vec(), "text/plain; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let result = fetch(FetchRequest::new(mock_server.uri()).as_html())
        .await
        .unwrap();
    assert_eq!(result.output, "ok \u{FFFD} end");
}

#[tokio::test]
async fn test_missing_content_type() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbare".to_vec();
    let base = serve_raw(raw).await;

    let url = format!("{}/bare", base);
    let result = fetch(FetchRequest::new(url.clone()).as_markdown())
        .await
        .unwrap();

    assert_eq!(result.title, format!("{} ()", url));
    assert_eq!(result.output, "```\nbare\n```");
}

#[tokio::test]
async fn test_pattern_converter_tool() {
    let mock_server = MockServer::start().await;
    mount_body(
        &mock_server,
        "/",
        "text/html",
        "<h1>Title</h1><style>h1{}</style><p>Body &amp; more</p>",
    )
    .await;

    let tool = Tool::builder().converter(ConverterKind::Pattern).build();

    let text = tool
        .execute(FetchRequest::new(mock_server.uri()).as_text())
        .await
        .unwrap();
    assert_eq!(text.output, "Title Body & more");

    let markdown = tool
        .execute(FetchRequest::new(mock_server.uri()).as_markdown())
        .await
        .unwrap();
    assert_eq!(markdown.output, "```\nTitle Body & more\n```");
}

#[tokio::test]
async fn test_execute_with_status_phases() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/", "text/plain", "status").await;

    let tool = Tool::default();
    let mut phases = Vec::new();
    let result = tool
        .execute_with_status(FetchRequest::new(mock_server.uri()).as_text(), |s| {
            phases.push(s.phase)
        })
        .await
        .unwrap();

    assert_eq!(result.output, "status");
    assert_eq!(phases, vec!["validate", "fetch", "convert", "complete"]);
}

#[tokio::test]
async fn test_result_json_shape() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, "/", "text/plain", "shape").await;

    let result = fetch(FetchRequest::new(mock_server.uri()).as_text())
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["metadata"], serde_json::json!({}));
    assert_eq!(json["output"], "shape");
    assert!(json["title"].as_str().unwrap().ends_with("(text/plain)"));
}
