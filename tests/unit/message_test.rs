//! Tests for the message type

use prometheus_async_log::Message;

#[test]
fn test_message_conversions() {
    let from_str = Message::from("selected box 3\n");
    let from_string = Message::from(String::from("selected box 3\n"));
    let from_new = Message::new("selected box 3\n");

    assert_eq!(from_str, from_string);
    assert_eq!(from_string, from_new);
    assert_eq!(from_new.as_ref(), "selected box 3\n");
}

#[test]
fn test_message_preserves_unicode() {
    let msg = Message::from("标注完成\n");
    assert_eq!(msg.as_str(), "标注完成\n");
    assert_eq!(msg.len(), "标注完成\n".len());
}
