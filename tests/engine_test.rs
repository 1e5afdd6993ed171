// tests/engine_test.rs


use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tokio::time::sleep;

use test_helpers::{HostCall, StaticConfigSource, config_json, create_test_engine, widget_json};
use widgetic::report::{EventKind, NullSink};
use widgetic::store::{DisplayCountStore, MemoryStorage};
use widgetic::{Engine, EngineOptions, Interaction, RotationState, WidgetError};

fn storage() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new())
}

#[tokio::test(start_paused = true)]
async fn test_rotation_sequence_over_time() {
    let config = config_json(vec![
        widget_json("A", "NOTIFICATION", 1),
        widget_json("B", "NOTIFICATION", 0),
        widget_json("C", "NOTIFICATION", 1),
    ]);
    let t = create_test_engine(config, storage()).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(t.engine.run(shutdown_rx));

    // Shows land at 1s, 14s, 27s and 40s (5s visible, 8s cooldown)
    sleep(Duration::from_millis(500)).await;
    assert!(t.host.shown().is_empty());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(t.host.shown(), vec!["A"]);

    sleep(Duration::from_secs(13)).await;
    assert_eq!(t.host.shown(), vec!["A", "B"]);

    sleep(Duration::from_secs(26)).await;
    assert_eq!(t.host.shown(), vec!["A", "B", "C", "B"]);

    shutdown_tx.send(true).unwrap();
    let engine = running.await.unwrap();
    assert_eq!(engine.scheduler().display_count("B"), Some(2));
    assert_eq!(t.sink.kinds_for("A"), vec![EventKind::View]);
}

#[tokio::test(start_paused = true)]
async fn test_config_error_renders_nothing() {
    let source = StaticConfigSource::new(json!({ "error": "Website not found" }));
    let host = test_helpers::RecordingHost::default();
    let sink = Arc::new(test_helpers::CollectingSink::default());

    let engine = Engine::bootstrap(
        Some("pk_unknown"),
        EngineOptions::default(),
        &source,
        storage(),
        sink.clone(),
        Box::new(host.clone()),
    )
    .await
    .unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = engine.run(shutdown_rx).await;

    assert_eq!(source.fetches(), 1);
    assert_eq!(engine.state(), RotationState::Idle);
    assert!(host.calls().is_empty());
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_missing_key_never_fetches() {
    let source = StaticConfigSource::new(config_json(vec![widget_json("A", "NOTIFICATION", 0)]));
    let result = Engine::bootstrap(
        None,
        EngineOptions::default(),
        &source,
        storage(),
        Arc::new(NullSink),
        Box::new(test_helpers::RecordingHost::default()),
    )
    .await;

    assert!(matches!(result, Err(WidgetError::MissingIdentity)));
    assert_eq!(source.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_counts_survive_reload() {
    let shared = MemoryStorage::new();
    shared.seed_count("X", 2).unwrap();
    let config = config_json(vec![widget_json("X", "NOTIFICATION", 3)]);

    // First page view shows X once more, then runs out
    let first = create_test_engine(config.clone(), Arc::new(shared.clone())).await;
    assert_eq!(first.engine.scheduler().display_count("X"), Some(2));
    let (_tx, rx) = watch::channel(false);
    let engine = first.engine.run(rx).await;

    assert_eq!(engine.state(), RotationState::Exhausted);
    assert_eq!(first.host.shown(), vec!["X"]);
    assert_eq!(DisplayCountStore::new(Arc::new(shared.clone())).get("X"), 3);

    // A reload in the same session shows nothing
    let second = create_test_engine(config, Arc::new(shared)).await;
    let (_tx, rx) = watch::channel(false);
    let engine = second.engine.run(rx).await;

    assert_eq!(engine.state(), RotationState::Exhausted);
    assert!(second.host.shown().is_empty());
    assert!(second.sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_cancels_pending_auto_hide() {
    let config = config_json(vec![
        widget_json("A", "NOTIFICATION", 0),
        widget_json("B", "NOTIFICATION", 0),
    ]);
    let t = create_test_engine(config, storage()).await;
    let handle = t.engine.handle();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(t.engine.run(shutdown_rx));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(t.host.shown(), vec!["A"]);
    assert!(handle.send(Interaction::Dismiss).await);

    // Cooldown restarts from the dismiss at 2s, so B appears at 10s
    sleep(Duration::from_millis(7500)).await;
    assert_eq!(t.host.shown(), vec!["A"]);
    assert_eq!(t.host.hide_count(), 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(t.host.shown(), vec!["A", "B"]);

    // The cancelled auto-hide (due at 6s) never produced a second hide
    sleep(Duration::from_secs(4)).await;
    assert_eq!(t.host.shown(), vec!["A", "B"]);
    assert_eq!(t.host.hide_count(), 1);

    shutdown_tx.send(true).unwrap();
    running.await.unwrap();
    assert_eq!(t.sink.kinds_for("A"), vec![EventKind::View, EventKind::Dismiss]);
}

#[tokio::test(start_paused = true)]
async fn test_targeted_interaction_ignores_stale_widget() {
    let config = config_json(vec![
        widget_json("A", "NOTIFICATION", 0),
        widget_json("B", "NOTIFICATION", 0),
    ]);
    let t = create_test_engine(config, storage()).await;
    let handle = t.engine.handle();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(t.engine.run(shutdown_rx));

    // B is mounted at 14s; a late close for A must not touch it
    sleep(Duration::from_secs(15)).await;
    assert!(handle.send_to("A", Interaction::Dismiss).await);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(t.host.hide_count(), 1);

    assert!(handle.send_to("B", Interaction::Dismiss).await);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(t.host.hide_count(), 2);

    shutdown_tx.send(true).unwrap();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_modal_and_bar_stay_until_closed() {
    for widget_type in ["POPUP_MODAL", "ANNOUNCEMENT_BAR", "BANNER"] {
        let config = config_json(vec![widget_json("S", widget_type, 0)]);
        let t = create_test_engine(config, storage()).await;
        let handle = t.engine.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let running = tokio::spawn(t.engine.run(shutdown_rx));

        sleep(Duration::from_secs(30)).await;
        assert_eq!(t.host.calls(), vec![HostCall::Show("S".to_string())]);

        let overlay_closes = widget_type == "POPUP_MODAL";
        assert_eq!(*t.host.overlays.lock().unwrap(), vec![overlay_closes]);

        assert!(handle.send(Interaction::OverlayClick).await);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(t.host.hide_count(), usize::from(overlay_closes), "{}", widget_type);

        shutdown_tx.send(true).unwrap();
        running.await.unwrap();

        let expected = if overlay_closes {
            vec![EventKind::View, EventKind::Dismiss]
        } else {
            vec![EventKind::View]
        };
        assert_eq!(t.sink.kinds_for("S"), expected, "{}", widget_type);
    }
}

#[tokio::test(start_paused = true)]
async fn test_floating_button_reports_view_on_first_open() {
    let config = config_json(vec![widget_json("F", "FLOATING_BUTTON", 0)]);
    let t = create_test_engine(config, storage()).await;
    let handle = t.engine.handle();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(t.engine.run(shutdown_rx));

    sleep(Duration::from_secs(20)).await;
    assert_eq!(t.host.shown(), vec!["F"]);
    assert!(t.sink.events().is_empty());

    assert!(handle.send(Interaction::ToggleFloating).await);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(t.sink.kinds_for("F"), vec![EventKind::View, EventKind::Click]);

    // Collapsing closes it; the next showing comes after the cooldown
    assert!(handle.send(Interaction::ToggleFloating).await);
    sleep(Duration::from_secs(9)).await;
    assert_eq!(t.host.shown(), vec!["F", "F"]);

    shutdown_tx.send(true).unwrap();
    let engine = running.await.unwrap();
    assert_eq!(engine.scheduler().display_count("F"), Some(2));
    assert_eq!(
        &t.host.calls()[..4],
        &[
            HostCall::Show("F".to_string()),
            HostCall::Expand(true),
            HostCall::Expand(false),
            HostCall::Hide,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_huge_show_time_keeps_widget_visible() {
    let config = json!({
        "settings": { "timing": { "showTime": i64::MAX, "hideTime": 1e300 } },
        "widgets": [widget_json("A", "NOTIFICATION", 0)],
    });
    let t = create_test_engine(config, storage()).await;
    let handle = t.engine.handle();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(t.engine.run(shutdown_rx));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(t.host.shown(), vec!["A"]);

    // The cooldown is just as long, so the engine idles rather than failing
    assert!(handle.send(Interaction::Dismiss).await);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(t.host.calls(), vec![HostCall::Show("A".to_string()), HostCall::Hide]);

    shutdown_tx.send(true).unwrap();
    let engine = running.await.expect("engine task must not panic");
    assert_eq!(engine.state(), RotationState::HiddenCooldown);
}
