//! Error Responses
//!
//! HTML error pages written back to clients whose requests the proxy refuses.

/// Builds a complete HTTP/1.0 error response.
///
/// `detail` is HTML-escaped since it usually echoes client input.
pub fn error_page(status: u16, reason: &str, detail: &str) -> Vec<u8> {
    let body = format!(
        "<html><title>Proxy Error</title><body bgcolor=\"ffffff\">\r\n\
         {status}: {reason}\r\n\
         <p>{}\r\n\
         <hr><em>The caching proxy</em>\r\n\
         </body></html>\r\n",
        escape_html(detail)
    );

    format!(
        "HTTP/1.0 {status} {reason}\r\n\
         Content-type: text/html\r\n\
         Content-length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    )
    .into_bytes()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_format() {
        let page = String::from_utf8(error_page(501, "Not Implemented", "POST")).unwrap();
        let (head, body) = page.split_once("\r\n\r\n").unwrap();

        assert!(head.starts_with("HTTP/1.0 501 Not Implemented\r\n"));
        assert!(head.contains("Content-type: text/html"));
        assert!(head.contains(&format!("Content-length: {}", body.len())));
        assert!(body.contains("501: Not Implemented"));
        assert!(body.contains("<p>POST"));
    }

    #[test]
    fn test_error_page_escapes_detail() {
        let page = String::from_utf8(error_page(400, "Bad Request", "<script>")).unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
