//! Protocol messages
//!
//! The fixed byte strings sent to clients and the formatting of broadcast
//! payloads. Join and departure notifications share one convention: a
//! trailing `" \n"`.

/// Sent to every client immediately after the connection is accepted.
pub const WELCOME: &[u8] = b"Welcome to the Chat! Please enter your name:\n";

/// Sent to a connection rejected because the server is at capacity.
pub const CHAT_FULL: &[u8] = b"The Chat is Maximum";

/// Sent to a client that submits an empty display name.
pub const NO_NAME: &[u8] = b"No name provided";

/// Notification broadcast when a client completes name negotiation.
pub fn join_message(name: &str) -> Vec<u8> {
    format!("{} joined the Chat \n", name).into_bytes()
}

/// Notification broadcast when a named client disconnects.
pub fn left_message(name: &str) -> Vec<u8> {
    format!("{} left the Chat \n", name).into_bytes()
}

/// Tags a raw client payload with the sender's name.
///
/// The payload bytes are forwarded verbatim; embedded line terminators and
/// non-UTF-8 content are preserved.
pub fn tag_payload(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut tagged = Vec::with_capacity(name.len() + 2 + payload.len());
    tagged.push(b'[');
    tagged.extend_from_slice(name.as_bytes());
    tagged.push(b']');
    tagged.extend_from_slice(payload);
    tagged
}

/// Strips the trailing line terminator from a submitted name line.
pub fn trim_name(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
