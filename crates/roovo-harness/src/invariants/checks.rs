//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use roovo_app::Subscription;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Rendered message ids are unique within a conversation.
///
/// A duplicate means a redelivered push or a history merge added an entry
/// that was already shown.
pub struct UniqueRenderedIds;

impl Invariant for UniqueRenderedIds {
    fn name(&self) -> &'static str {
        "unique_rendered_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::with_capacity(client.rendered.len());
            for id in &client.rendered {
                if !seen.insert(id) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: id {id} rendered twice in {:?}",
                            client.id, client.mounted
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The mounted route is what the current location decodes to.
///
/// A mismatch means the view drifted from the navigator, e.g. after a
/// back/forward that skipped a remount.
pub struct RouteMatchesLocation;

impl Invariant for RouteMatchesLocation {
    fn name(&self) -> &'static str {
        "route_matches_location"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.route != client.resolved {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: at {} mounted {:?}, location decodes to {:?}",
                        client.id, client.path, client.route, client.resolved
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A message subscription is held exactly for the mounted conversation.
///
/// The backend's view of the client's subscriptions must equal the App's,
/// and a `Messages` subscription may only exist while that conversation is
/// mounted. Anything else leaks a subscription or misses deliveries.
pub struct SubscriptionScopedToView;

impl Invariant for SubscriptionScopedToView {
    fn name(&self) -> &'static str {
        "subscription_scoped_to_view"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let expected: Vec<_> = client.expected_subscription.iter().cloned().collect();
            let held: Vec<_> = client.held_subscriptions.iter().cloned().collect();
            if expected != held {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: app expects {expected:?}, backend holds {held:?}",
                        client.id
                    ),
                });
            }

            let wanted = client.mounted.map(Subscription::Messages);
            let messages = client
                .held_subscriptions
                .iter()
                .find(|s| matches!(s, Subscription::Messages(_)))
                .cloned();
            if messages != wanted {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: mounted {:?} but holds {messages:?}",
                        client.id, client.mounted
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use roovo_app::Route;
    use roovo_chat::{ConversationId, MessageId, UserId};

    use super::*;
    use crate::invariants::ClientSnapshot;

    fn mounted(rendered: Vec<MessageId>) -> ClientSnapshot {
        let route = Some(Route::Conversation { id: ConversationId(42) });
        let sub = Subscription::Messages(ConversationId(42));
        ClientSnapshot::new(1)
            .with_location("/messages/42", route, route)
            .with_conversation(ConversationId(42), rendered)
            .with_subscriptions(Some(sub.clone()), [sub])
    }

    #[test]
    fn healthy_conversation_passes() {
        let state = SystemSnapshot::single(mounted(vec![
            MessageId::Persisted(1),
            MessageId::Persisted(2),
        ]));
        assert!(UniqueRenderedIds.check(&state).is_ok());
        assert!(RouteMatchesLocation.check(&state).is_ok());
        assert!(SubscriptionScopedToView.check(&state).is_ok());
    }

    #[test]
    fn duplicate_id_detected() {
        let state = SystemSnapshot::single(mounted(vec![
            MessageId::Persisted(1),
            MessageId::Persisted(1),
        ]));
        let violation = UniqueRenderedIds.check(&state).unwrap_err();
        assert_eq!(violation.invariant, "unique_rendered_ids");
    }

    #[test]
    fn route_drift_detected() {
        let client = ClientSnapshot::new(1).with_location("/messages", Some(Route::Home), Some(Route::Inbox));
        assert!(RouteMatchesLocation.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn leaked_subscription_detected() {
        let leaked = Subscription::Messages(ConversationId(7));
        let client = ClientSnapshot::new(1)
            .with_location("/", Some(Route::Home), Some(Route::Home))
            .with_subscriptions(None, [leaked]);
        assert!(SubscriptionScopedToView.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn inbox_subscription_without_mount_is_fine() {
        let sub = Subscription::Conversations(UserId::new("guest"));
        let client = ClientSnapshot::new(1)
            .with_location("/messages", Some(Route::Inbox), Some(Route::Inbox))
            .with_subscriptions(Some(sub.clone()), [sub]);
        assert!(SubscriptionScopedToView.check(&SystemSnapshot::single(client)).is_ok());
    }
}
