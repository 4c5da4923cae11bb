//! Property-based tests for scope isolation in the broadcast router

#[cfg(feature = "ssr")]
mod tests {
    use heyboo::backend::realtime::{BroadcastRouter, ConnectionHandle, ConnectionRegistry};
    use heyboo::shared::{Event, EventKind};
    use proptest::prelude::*;
    use tokio::runtime::Runtime;

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_fan_out_matches_scope_exactly(
            scopes in proptest::collection::vec(0u8..4, 1..16),
            origin in any::<prop::sample::Index>(),
        ) {
            let registry = ConnectionRegistry::new();
            let (router, _publisher) = BroadcastRouter::new(registry.clone());

            let mut receivers = Vec::new();
            for (i, scope) in scopes.iter().enumerate() {
                let (handle, rx) = ConnectionHandle::channel(4);
                registry
                    .register(handle, &format!("user{}", i), &format!("c{}", scope))
                    .unwrap();
                receivers.push(rx);
            }

            let origin = origin.index(scopes.len());
            let scope = format!("c{}", scopes[origin]);
            let sender = format!("user{}", origin);
            let event = Event::new(EventKind::ChatMessage, sender, scope.clone(), "hi");
            let delivered = runtime().block_on(router.dispatch(event));

            let expected = scopes.iter().filter(|s| **s == scopes[origin]).count();
            prop_assert_eq!(delivered, expected);
            for (i, rx) in receivers.iter_mut().enumerate() {
                let received = rx.try_recv().ok();
                if scopes[i] == scopes[origin] {
                    prop_assert!(received.is_some(), "user{} in scope missed the event", i);
                    let event = received.unwrap();
                    prop_assert_eq!(event.couple_id(), scope.as_str());
                } else {
                    prop_assert!(received.is_none(), "user{} in another scope received the event", i);
                }
            }
        }

        #[test]
        fn test_deregistration_is_idempotent(removals in 1usize..5) {
            let registry = ConnectionRegistry::new();
            let (handle, _rx) = ConnectionHandle::channel(1);
            let id = handle.id();
            registry.register(handle, "alice", "c1").unwrap();

            let removed = (0..removals).filter(|_| registry.deregister(id).is_some()).count();
            prop_assert_eq!(removed, 1);
            prop_assert!(registry.sessions_in_scope("c1").is_empty());
        }
    }
}
