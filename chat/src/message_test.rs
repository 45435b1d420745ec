use super::*;
use chrono::TimeZone;

#[test]
fn sender_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Sender::Assistant).unwrap(), "\"assistant\"");
}

#[test]
fn message_ids_are_unique() {
    let a = Message::user("hi");
    let b = Message::user("hi");
    assert_ne!(a.id, b.id);
    assert_eq!(a.sender, Sender::User);
}

#[test]
fn title_truncates_by_chars_and_appends_ellipsis() {
    assert_eq!(title_for("hello"), "hello...");
    let long = "é".repeat(60);
    let title = title_for(&long);
    assert_eq!(title.chars().count(), TITLE_CHARS + 3);
    assert!(title.ends_with("..."));
}

#[test]
fn conversation_id_is_epoch_millis() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(conversation_id(at), "1704164645000");
}

#[test]
fn snapshot_of_empty_turns_is_none() {
    assert!(Conversation::snapshot("1", &[], &ModelParameters::default()).is_none());
}

#[test]
fn snapshot_titles_from_first_message_and_copies_params() {
    let params = ModelParameters { model: "gpt-4o".into(), ..ModelParameters::default() };
    let turns = vec![Message::user("What is Rust?"), Message::assistant("A language.")];
    let conv = Conversation::snapshot("42", &turns, &params).unwrap();
    assert_eq!(conv.id, "42");
    assert_eq!(conv.title, "What is Rust?...");
    assert_eq!(conv.messages.len(), 2);
    assert_eq!(conv.model_params.model, "gpt-4o");
}

#[test]
fn conversation_serializes_model_params_camel_case() {
    let conv = Conversation::snapshot("1", &[Message::user("x")], &ModelParameters::default()).unwrap();
    let value = serde_json::to_value(&conv).unwrap();
    assert!(value.get("modelParams").is_some());
    assert_eq!(value["messages"][0]["sender"], "user");
}
