//! Plain-text RFC 5322 message construction

use base64::{engine::general_purpose::STANDARD, Engine};

use super::types::OutgoingEmail;

const LINE_WIDTH: usize = 76;

/// Remove line breaks so a value cannot start a new header
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

/// RFC 2047 encoded-word for non-ASCII header text
fn encode_header_text(value: &str) -> String {
    let value = header_value(value);
    if value.is_ascii() {
        value
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn address_list(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|a| header_value(a.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Base64 body wrapped at the MIME line width
fn encode_body(body: &str) -> String {
    let encoded = STANDARD.encode(body.as_bytes());
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH * 2);
    for (i, chunk) in encoded.as_bytes().chunks(LINE_WIDTH).enumerate() {
        if i > 0 {
            wrapped.push_str("\r\n");
        }
        // base64 output is ASCII
        wrapped.push_str(&String::from_utf8_lossy(chunk));
    }
    wrapped
}

/// Render `email` as a single-part UTF-8 text/plain message
pub fn build_message(email: &OutgoingEmail) -> String {
    let mut headers = vec![
        format!("From: {}", header_value(&email.from)),
        format!("To: {}", address_list(&email.to)),
    ];
    if !email.cc.is_empty() {
        headers.push(format!("Cc: {}", address_list(&email.cc)));
    }
    headers.push(format!("Subject: {}", encode_header_text(&email.subject)));
    headers.push("MIME-Version: 1.0".to_string());
    headers.push("Content-Type: text/plain; charset=\"utf-8\"".to_string());
    headers.push("Content-Transfer-Encoding: base64".to_string());

    format!("{}\r\n\r\n{}\r\n", headers.join("\r\n"), encode_body(&email.body))
}
