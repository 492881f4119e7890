use super::*;

fn join_options(uid: u32) -> JoinOptions {
    JoinOptions {
        token: None,
        channel_name: "channel-x".into(),
        optional_info: None,
        uid: PeerId(uid),
    }
}

#[tokio::test]
async fn join_acknowledges_with_server_assigned_uid() {
    let engine = SimulatedEngine::new("demo-app");
    let mut events = engine.subscribe_events();

    engine.join_channel(join_options(0)).await.expect("join");

    assert_eq!(
        events.recv().await.expect("event"),
        EngineEvent::JoinChannelSuccess {
            channel: "channel-x".into(),
            uid: PeerId(FIRST_ASSIGNED_UID),
            elapsed_ms: 0,
        }
    );
    assert_eq!(engine.current_channel().as_deref(), Some("channel-x"));
}

#[tokio::test]
async fn join_keeps_explicit_uid_hint() {
    let engine = SimulatedEngine::new("demo-app");
    let mut events = engine.subscribe_events();

    engine.join_channel(join_options(57)).await.expect("join");

    match events.recv().await.expect("event") {
        EngineEvent::JoinChannelSuccess { uid, .. } => assert_eq!(uid, PeerId(57)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn scripted_failure_is_not_recorded() {
    let engine = SimulatedEngine::new("demo-app");
    engine.fail(EngineOperation::SetClientRole);

    let err = engine
        .set_client_role(ClientRole::Audience)
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("SetClientRole"));
    assert!(engine.calls().is_empty());

    engine.recover(EngineOperation::SetClientRole);
    engine
        .set_client_role(ClientRole::Audience)
        .await
        .expect("recovered");
    assert_eq!(
        engine.calls(),
        vec![EngineCall::SetClientRole(ClientRole::Audience)]
    );
}

#[tokio::test]
async fn role_change_inside_channel_emits_notification() {
    let engine = SimulatedEngine::new("demo-app");
    engine
        .set_client_role(ClientRole::Broadcaster)
        .await
        .expect("role");
    engine.join_channel(join_options(5)).await.expect("join");
    let mut events = engine.subscribe_events();

    engine
        .set_client_role(ClientRole::Audience)
        .await
        .expect("role");

    assert_eq!(
        events.recv().await.expect("event"),
        EngineEvent::ClientRoleChanged {
            old: ClientRole::Broadcaster,
            new: ClientRole::Audience,
        }
    );
}

#[tokio::test]
async fn released_engine_rejects_commands() {
    let engine = SimulatedEngine::new("demo-app");
    engine.release();
    engine.release();

    assert_eq!(engine.release_count(), 2);
    assert!(engine.enable_video().await.is_err());
}

#[tokio::test]
async fn factory_rejects_placeholder_app_id() {
    let factory = SimulatedEngineFactory::new();

    assert!(factory.create("<Agora App ID>").await.is_err());
    assert!(factory.create("   ").await.is_err());
    assert!(factory.engines().is_empty());
}

#[tokio::test]
async fn factory_applies_scripted_failures_to_new_engines() {
    let factory = SimulatedEngineFactory::new();
    factory.fail_next(EngineOperation::EnableVideo);

    let engine = factory.create("demo-app").await.expect("create");
    assert!(engine.enable_video().await.is_err());

    factory.fail_next(EngineOperation::Create);
    assert!(factory.create("demo-app").await.is_err());
    assert_eq!(factory.engines().len(), 1);
}
