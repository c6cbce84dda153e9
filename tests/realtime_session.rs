//! Realtime room session tests
//!
//! Drives several `ConnectionDriver`s against one in-memory `AppState`, the
//! same way the socket task does, and checks what each connection observes.

#[macro_use]
mod common;

use serde_json::json;

use codecollab::shared::event::ServerEvent;
use codecollab::shared::room::Language;
use common::*;

fn code_frame(room_id: &str, code: &str) -> String {
    frame("code_change", json!({ "roomId": room_id, "code": code }))
}

#[tokio::test]
async fn test_code_changes_reach_peers_and_late_joiners() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    let cy = create_user(&state, "Cy").await;
    create_room(&state, "pair0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    assert_events!(ada_conn.on_text(&join_frame("pair0001")).await, ["room_data"]);
    assert_events!(bob_conn.on_text(&join_frame("pair0001")).await, ["room_data"]);
    assert_eq!(ada_conn.try_relayed().map(|e| e.name()), Some("user_joined"));

    let replies = ada_conn.on_text(&code_frame("pair0001", "let x = 1;")).await;
    assert!(replies.is_empty());
    assert!(ada_conn.try_relayed().is_none());
    match bob_conn.try_relayed() {
        Some(ServerEvent::CodeUpdate(update)) => {
            assert_eq!(update.code, "let x = 1;");
            assert_eq!(update.user_id, ada.id);
            assert_eq!(update.user_name, "Ada");
        }
        other => panic!("expected code_update, got {:?}", other),
    }

    let mut cy_conn = connect(&state, &cy);
    let replies = cy_conn.on_text(&join_frame("pair0001")).await;
    match replies.as_slice() {
        [ServerEvent::RoomData(snapshot)] => {
            assert_eq!(snapshot.current_code, "let x = 1;");
            assert_eq!(snapshot.participants.len(), 3);
            assert!(snapshot.participants.iter().all(|p| p.is_active()));
        }
        other => panic!("expected room_data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_last_write_wins() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "lww00001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("lww00001")).await;
    bob_conn.on_text(&join_frame("lww00001")).await;
    ada_conn.try_relayed();

    ada_conn.on_text(&code_frame("lww00001", "from ada")).await;
    bob_conn.on_text(&code_frame("lww00001", "from bob")).await;

    assert_eq!(find_room(&state, "lww00001").await.current_code, "from bob");
    assert!(matches!(bob_conn.try_relayed(), Some(ServerEvent::CodeUpdate(u)) if u.code == "from ada"));
    assert!(matches!(ada_conn.try_relayed(), Some(ServerEvent::CodeUpdate(u)) if u.code == "from bob"));
}

#[tokio::test]
async fn test_non_member_mutations_are_rejected() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let mallory = create_user(&state, "Mallory").await;
    create_room(&state, "guard001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    ada_conn.on_text(&join_frame("guard001")).await;
    let before = find_room(&state, "guard001").await.current_code;

    let mut intruder = connect(&state, &mallory);
    let replies = intruder.on_text(&code_frame("guard001", "pwned")).await;
    assert_events!(replies, ["user_found_error"]);

    let replies = intruder
        .on_text(&frame("send_message", json!({ "roomId": "guard001", "message": "hi" })))
        .await;
    assert_events!(replies, ["user_found_error"]);

    let replies = intruder
        .on_text(&frame("language_change", json!({ "roomId": "guard001", "language": "python" })))
        .await;
    assert_events!(replies, ["user_found_error"]);

    let room = find_room(&state, "guard001").await;
    assert_eq!(room.current_code, before);
    assert_eq!(room.language, Language::Javascript);
    assert!(assert_ok!(state.store.recent_messages("guard001", 10).await).is_empty());
    assert!(ada_conn.try_relayed().is_none());
}

#[tokio::test]
async fn test_unknown_room_is_reported_to_sender() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;

    let mut conn = connect(&state, &ada);
    let replies = conn.on_text(&join_frame("nowhere1")).await;
    match replies.as_slice() {
        [ServerEvent::RoomFoundError(notice)] => assert_eq!(notice.message, "Room not found"),
        other => panic!("expected room_found_error, got {:?}", other),
    }
    assert_eq!(conn.subscribed_room(), None);
    assert!(state.sessions().is_empty().await);
}

#[tokio::test]
async fn test_full_room_rejects_newcomers_but_not_returning_members() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "solo0001", &ada, 1).await;

    let mut ada_conn = connect(&state, &ada);
    ada_conn.on_text(&join_frame("solo0001")).await;

    let mut bob_conn = connect(&state, &bob);
    match bob_conn.on_text(&join_frame("solo0001")).await.as_slice() {
        [ServerEvent::Error(notice)] => assert_eq!(notice.message, "Room is full"),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(bob_conn.subscribed_room(), None);

    ada_conn.close().await;
    assert!(!find_room(&state, "solo0001").await.is_active_participant(ada.id));

    let mut ada_again = connect(&state, &ada);
    assert_events!(ada_again.on_text(&join_frame("solo0001")).await, ["room_data"]);
    let room = find_room(&state, "solo0001").await;
    assert_eq!(room.participants.len(), 1);
    assert!(room.is_active_participant(ada.id));
}

#[tokio::test]
async fn test_disconnect_deactivates_and_announces() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "bye00001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("bye00001")).await;
    bob_conn.on_text(&join_frame("bye00001")).await;
    ada_conn.try_relayed();

    bob_conn.close().await;

    match ada_conn.try_relayed() {
        Some(ServerEvent::UserLeft(notice)) => {
            assert_eq!(notice.user_id, bob.id);
            assert_eq!(notice.message, "Bob disconnected");
        }
        other => panic!("expected user_left, got {:?}", other),
    }
    let room = find_room(&state, "bye00001").await;
    assert!(!room.is_active_participant(bob.id));
    assert!(room.participant(bob.id).is_some());
    assert_eq!(state.sessions().len().await, 1);
}

#[tokio::test]
async fn test_second_tab_keeps_participant_active() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    create_room(&state, "tabs0001", &ada, 10).await;

    let mut first = connect(&state, &ada);
    let mut second = connect(&state, &ada);
    first.on_text(&join_frame("tabs0001")).await;
    second.on_text(&join_frame("tabs0001")).await;
    assert_eq!(find_room(&state, "tabs0001").await.participants.len(), 1);

    first.close().await;
    assert!(find_room(&state, "tabs0001").await.is_active_participant(ada.id));

    second.close().await;
    assert!(!find_room(&state, "tabs0001").await.is_active_participant(ada.id));
    assert!(state.sessions().is_empty().await);
}

#[tokio::test]
async fn test_switching_rooms_leaves_previous_group() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "first001", &ada, 10).await;
    create_room(&state, "second01", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("first001")).await;
    bob_conn.on_text(&join_frame("first001")).await;
    ada_conn.try_relayed();

    assert_events!(ada_conn.on_text(&join_frame("second01")).await, ["room_data"]);
    assert_eq!(ada_conn.subscribed_room(), Some("second01"));
    assert!(matches!(bob_conn.try_relayed(), Some(ServerEvent::UserLeft(n)) if n.user_id == ada.id));
    assert!(!find_room(&state, "first001").await.is_active_participant(ada.id));

    bob_conn.on_text(&code_frame("first001", "only bob sees this")).await;
    assert!(ada_conn.try_relayed().is_none());
}

#[tokio::test]
async fn test_leave_room_revokes_edit_rights() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "leave001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("leave001")).await;
    bob_conn.on_text(&join_frame("leave001")).await;
    ada_conn.try_relayed();

    let replies = bob_conn
        .on_text(&frame("leave_room", json!({ "roomId": "leave001" })))
        .await;
    assert!(replies.is_empty());
    assert_eq!(bob_conn.subscribed_room(), None);
    match ada_conn.try_relayed() {
        Some(ServerEvent::UserLeft(notice)) => assert_eq!(notice.message, "Bob left the room"),
        other => panic!("expected user_left, got {:?}", other),
    }

    assert_events!(bob_conn.on_text(&code_frame("leave001", "late edit")).await, ["user_found_error"]);
    assert_ne!(find_room(&state, "leave001").await.current_code, "late edit");
}

#[tokio::test]
async fn test_chat_is_persisted_and_echoed_to_everyone() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "chat0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("chat0001")).await;
    bob_conn.on_text(&join_frame("chat0001")).await;
    ada_conn.try_relayed();

    let replies = ada_conn
        .on_text(&frame("send_message", json!({ "roomId": "chat0001", "message": "  hello  " })))
        .await;
    let sent = match replies.as_slice() {
        [ServerEvent::ReceiveMessage(message)] => message.clone(),
        other => panic!("expected receive_message, got {:?}", other),
    };
    assert_eq!(sent.content, "hello");
    assert_eq!(sent.sender.id, ada.id);

    match bob_conn.try_relayed() {
        Some(ServerEvent::ReceiveMessage(message)) => assert_eq!(message.id, sent.id),
        other => panic!("expected receive_message, got {:?}", other),
    }

    let stored = assert_ok!(state.store.recent_messages("chat0001", 10).await);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, sent.id);

    let replies = ada_conn
        .on_text(&frame("send_message", json!({ "roomId": "chat0001", "message": "   " })))
        .await;
    assert_events!(replies, ["error"]);
    assert!(bob_conn.try_relayed().is_none());
}

#[tokio::test]
async fn test_language_change_is_validated_and_broadcast() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "lang0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("lang0001")).await;
    bob_conn.on_text(&join_frame("lang0001")).await;
    ada_conn.try_relayed();

    let replies = bob_conn
        .on_text(&frame("language_change", json!({ "roomId": "lang0001", "language": "python" })))
        .await;
    assert_events!(replies, ["language_updated"]);
    match ada_conn.try_relayed() {
        Some(ServerEvent::LanguageUpdated(update)) => {
            assert_eq!(update.language, Language::Python);
            assert_eq!(update.changed_by, "Bob");
        }
        other => panic!("expected language_updated, got {:?}", other),
    }
    assert_eq!(find_room(&state, "lang0001").await.language, Language::Python);

    let replies = bob_conn
        .on_text(&frame("language_change", json!({ "roomId": "lang0001", "language": "cobol" })))
        .await;
    assert_events!(replies, ["error"]);
    assert_eq!(find_room(&state, "lang0001").await.language, Language::Python);
}

#[tokio::test]
async fn test_signaling_relays_to_members_and_drops_outsiders() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    let eve = create_user(&state, "Eve").await;
    create_room(&state, "call0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("call0001")).await;
    bob_conn.on_text(&join_frame("call0001")).await;
    ada_conn.try_relayed();

    let offer = json!({ "type": "offer", "sdp": "v=0" });
    let replies = ada_conn
        .on_text(&frame("webrtc_offer", json!({ "roomId": "call0001", "offer": offer.clone() })))
        .await;
    assert!(replies.is_empty());
    match bob_conn.try_relayed() {
        Some(ServerEvent::WebrtcOffer(relay)) => {
            assert_eq!(relay.payload, offer);
            assert_eq!(relay.user_id, ada.id);
        }
        other => panic!("expected webrtc_offer, got {:?}", other),
    }

    let mut eve_conn = connect(&state, &eve);
    let replies = eve_conn
        .on_text(&frame("start_call", json!({ "roomId": "call0001" })))
        .await;
    assert!(replies.is_empty());
    assert!(ada_conn.try_relayed().is_none());
    assert!(bob_conn.try_relayed().is_none());
}

#[tokio::test]
async fn test_cursor_and_typing_go_to_others_only() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "cursor01", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("cursor01")).await;
    bob_conn.on_text(&join_frame("cursor01")).await;
    ada_conn.try_relayed();

    ada_conn
        .on_text(&frame(
            "cursor_position",
            json!({ "roomId": "cursor01", "position": { "line": 3, "column": 7 } }),
        ))
        .await;
    ada_conn
        .on_text(&frame("typing_start", json!({ "roomId": "cursor01" })))
        .await;

    match bob_conn.try_relayed() {
        Some(ServerEvent::CursorUpdate(update)) => {
            assert_eq!(update.position.line, 3);
            assert_eq!(update.position.column, 7);
            assert_eq!(update.user_name, "Ada");
        }
        other => panic!("expected cursor_update, got {:?}", other),
    }
    assert!(matches!(bob_conn.try_relayed(), Some(ServerEvent::UserTyping(t)) if t.is_typing));
    assert!(ada_conn.try_relayed().is_none());
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_usable() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    create_room(&state, "robust01", &ada, 10).await;

    let mut conn = connect(&state, &ada);
    let replies = conn.on_text(r#"{"event":"teleport","data":{}}"#).await;
    match replies.as_slice() {
        [ServerEvent::Error(notice)] => assert_contains!(notice.message, "Invalid event"),
        other => panic!("expected error, got {:?}", other),
    }

    assert_events!(conn.on_text(&join_frame("robust01")).await, ["room_data"]);
}

#[tokio::test]
async fn test_tab_joining_while_another_closes_stays_active() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    create_room(&state, "race0001", &ada, 10).await;

    let mut first = connect(&state, &ada);
    first.on_text(&join_frame("race0001")).await;

    // The second tab's roster write has landed but its join has not finished
    let admitted = store.pause_after("admit_participant");
    let mut second = connect(&state, &ada);
    let join = join_frame("race0001");
    let (replies, ()) = tokio::join!(second.on_text(&join), async {
        admitted.entered().await;
        first.close().await;
        admitted.open();
    });

    assert_events!(replies, ["room_data"]);
    assert!(find_room(&state, "race0001").await.is_active_participant(ada.id));
    assert!(second.on_text(&code_frame("race0001", "still editing")).await.is_empty());
    assert_eq!(find_room(&state, "race0001").await.current_code, "still editing");
}

#[tokio::test]
async fn test_tab_joining_during_deactivation_is_reactivated() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    create_room(&state, "race0002", &ada, 10).await;

    let mut first = connect(&state, &ada);
    first.on_text(&join_frame("race0002")).await;

    let deactivating = store.pause("deactivate_participant");
    let mut second = connect(&state, &ada);
    let join = join_frame("race0002");
    let ((), replies) = tokio::join!(first.close(), async {
        deactivating.entered().await;
        let replies = second.on_text(&join).await;
        deactivating.open();
        replies
    });

    assert_events!(replies, ["room_data"]);
    assert!(find_room(&state, "race0002").await.is_active_participant(ada.id));
    assert!(second.on_text(&code_frame("race0002", "after the race")).await.is_empty());
    assert_eq!(state.sessions().len().await, 1);
}

#[tokio::test]
async fn test_deleted_room_rejects_joins_and_edits() {
    let state = test_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "gone0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    assert_events!(ada_conn.on_text(&join_frame("gone0001")).await, ["room_data"]);

    let token = token_for(&state, &ada);
    let response = send(&state, json_request("DELETE", "/api/rooms/gone0001", Some(&token), json!({}))).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    assert_events!(ada_conn.on_text(&code_frame("gone0001", "into the void")).await, ["user_found_error"]);
    let replies = ada_conn
        .on_text(&frame("send_message", json!({ "roomId": "gone0001", "message": "anyone?" })))
        .await;
    assert_events!(replies, ["user_found_error"]);

    let mut bob_conn = connect(&state, &bob);
    match bob_conn.on_text(&join_frame("gone0001")).await.as_slice() {
        [ServerEvent::RoomFoundError(notice)] => assert_eq!(notice.message, "Room not found"),
        other => panic!("expected room_found_error, got {:?}", other),
    }
    assert_eq!(bob_conn.subscribed_room(), None);
    assert!(assert_ok!(state.store.find_room("gone0001").await).is_none());
}

fn error_message(replies: &[ServerEvent]) -> &str {
    match replies {
        [ServerEvent::Error(notice)] => &notice.message,
        other => panic!("expected a single error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_failures_are_reported_to_sender() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "flaky001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("flaky001")).await;

    store.fail("admit_participant");
    let replies = bob_conn.on_text(&join_frame("flaky001")).await;
    assert_eq!(error_message(&replies), "Failed to join room");
    assert_eq!(bob_conn.subscribed_room(), None);
    assert_eq!(state.sessions().len().await, 1);
    assert!(ada_conn.try_relayed().is_none());
    store.recover("admit_participant");

    store.fail("update_code");
    let replies = ada_conn.on_text(&code_frame("flaky001", "lost")).await;
    assert_eq!(error_message(&replies), "Failed to update code");
    store.recover("update_code");

    store.fail("append_message");
    let replies = ada_conn
        .on_text(&frame("send_message", json!({ "roomId": "flaky001", "message": "hello" })))
        .await;
    assert_eq!(error_message(&replies), "Failed to send message");
    store.recover("append_message");

    // The connection keeps working once the store recovers
    assert!(ada_conn.on_text(&code_frame("flaky001", "kept")).await.is_empty());
    assert_eq!(find_room(&state, "flaky001").await.current_code, "kept");
}

#[tokio::test]
async fn test_failed_rejoin_keeps_previous_room() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    create_room(&state, "stay0001", &ada, 10).await;
    create_room(&state, "move0001", &ada, 10).await;

    let mut conn = connect(&state, &ada);
    conn.on_text(&join_frame("stay0001")).await;

    store.fail("admit_participant");
    let replies = conn.on_text(&join_frame("move0001")).await;
    assert_eq!(error_message(&replies), "Failed to join room");
    store.recover("admit_participant");

    assert_eq!(conn.subscribed_room(), Some("stay0001"));
    assert!(find_room(&state, "stay0001").await.is_active_participant(ada.id));
    assert!(conn.on_text(&code_frame("stay0001", "unchanged")).await.is_empty());

    conn.close().await;
    assert!(!find_room(&state, "stay0001").await.is_active_participant(ada.id));
    assert!(state.sessions().is_empty().await);
}

#[tokio::test]
async fn test_disconnect_survives_deactivation_failure() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "drop0001", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("drop0001")).await;
    bob_conn.on_text(&join_frame("drop0001")).await;
    ada_conn.try_relayed();

    store.fail("deactivate_participant");
    bob_conn.close().await;

    match ada_conn.try_relayed() {
        Some(ServerEvent::UserLeft(notice)) => assert_eq!(notice.message, "Bob disconnected"),
        other => panic!("expected user_left, got {:?}", other),
    }
    assert_eq!(state.sessions().len().await, 1);
    // The roster write was lost, so the stale flag stays behind
    assert!(find_room(&state, "drop0001").await.is_active_participant(bob.id));
}

#[tokio::test]
async fn test_leave_room_survives_deactivation_failure() {
    let (state, store) = scripted_state();
    let ada = create_user(&state, "Ada").await;
    let bob = create_user(&state, "Bob").await;
    create_room(&state, "drop0002", &ada, 10).await;

    let mut ada_conn = connect(&state, &ada);
    let mut bob_conn = connect(&state, &bob);
    ada_conn.on_text(&join_frame("drop0002")).await;
    bob_conn.on_text(&join_frame("drop0002")).await;
    ada_conn.try_relayed();

    store.fail("deactivate_participant");
    let replies = bob_conn
        .on_text(&frame("leave_room", json!({ "roomId": "drop0002" })))
        .await;
    assert!(replies.is_empty());
    assert_eq!(bob_conn.subscribed_room(), None);
    assert!(matches!(ada_conn.try_relayed(), Some(ServerEvent::UserLeft(n)) if n.user_id == bob.id));
    assert_eq!(state.sessions().len().await, 1);
}
