//! Property-based tests for real-time events

#[cfg(feature = "ssr")]
mod tests {
    use heyboo::shared::event::{Event, EventKind, InboundFrame};
    use proptest::prelude::*;

    fn inbound_kind() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("chat_message"), Just("typing_start"), Just("typing_stop")]
    }

    proptest! {
        #[test]
        fn test_session_identity_always_wins(
            kind in inbound_kind(),
            content in ".*",
            claimed_sender in ".*",
            claimed_scope in ".*",
            claimed_timestamp in any::<i64>(),
            sender in "[a-z]{1,12}",
            scope in "[a-z0-9]{1,12}",
        ) {
            let raw = serde_json::json!({
                "type": kind,
                "content": content,
                "sender": claimed_sender,
                "couple_id": claimed_scope,
                "timestamp": claimed_timestamp,
            })
            .to_string();

            let frame = InboundFrame::parse(raw.as_bytes()).unwrap();
            let event = Event::from_inbound(frame, &sender, &scope);

            prop_assert_eq!(event.sender(), sender.as_str());
            prop_assert_eq!(event.couple_id(), scope.as_str());
            if event.kind() == EventKind::ChatMessage {
                prop_assert_eq!(event.content(), content.as_str());
            } else {
                prop_assert_eq!(event.content(), "");
            }
        }

        #[test]
        fn test_parse_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = InboundFrame::parse(&raw);
        }
    }
}
