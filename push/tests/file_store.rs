//! File-backed store behaviour across simulated process restarts.

use std::sync::Arc;

use mockable::DefaultClock;
use momtn_push::domain::ports::KeyValueStore;
use momtn_push::domain::{
    DeliveryOutcome, NavigationTarget, PENDING_NOTIFICATION_KEY, PresentationSettings,
    PushEnvelope,
};
use momtn_push::outbound::kv::FileKeyValueStore;
use momtn_push::test_support::{RecordingNotificationPresenter, TempStoreDir};
use momtn_push::{PushPipeline, PushPipelinePorts};
use rstest::{fixture, rstest};

#[fixture]
fn temp_store() -> TempStoreDir {
    TempStoreDir::new().expect("temp store dir")
}

fn pipeline_over(dir: &TempStoreDir) -> (PushPipeline, Arc<RecordingNotificationPresenter>) {
    let store = FileKeyValueStore::open(dir.path()).expect("open store");
    let presenter = Arc::new(RecordingNotificationPresenter::default());
    let pipeline = PushPipeline::new(
        PushPipelinePorts::new(Arc::new(store), presenter.clone(), Arc::new(DefaultClock)),
        PresentationSettings::default(),
    );
    (pipeline, presenter)
}

#[rstest]
#[tokio::test]
async fn values_round_trip_and_missing_keys_read_as_absent(temp_store: TempStoreDir) {
    let store = FileKeyValueStore::open(temp_store.path()).expect("open store");

    assert!(store.get("push_dedupe_comment_p7").await.expect("get").is_none());
    store
        .set("push_dedupe_comment_p7", "1")
        .await
        .expect("set");
    store
        .set(PENDING_NOTIFICATION_KEY, "{\"group_id\":\"مجموعة\"}")
        .await
        .expect("set unicode value");

    assert_eq!(
        store.get("push_dedupe_comment_p7").await.expect("get").as_deref(),
        Some("1")
    );
    assert_eq!(
        store.get(PENDING_NOTIFICATION_KEY).await.expect("get").as_deref(),
        Some("{\"group_id\":\"مجموعة\"}")
    );

    store.remove("push_dedupe_comment_p7").await.expect("remove");
    store.remove("push_dedupe_comment_p7").await.expect("remove absent key");
    assert!(store.get("push_dedupe_comment_p7").await.expect("get").is_none());
}

#[rstest]
#[tokio::test]
async fn dedupe_survives_a_restart(temp_store: TempStoreDir) {
    let envelope = PushEnvelope::data_only([("type", "comment"), ("messageId", "m1")]);

    let (first_process, first_presenter) = pipeline_over(&temp_store);
    let first = first_process
        .delivery
        .handle_background_message(&envelope)
        .await;
    drop(first_process);

    let (second_process, second_presenter) = pipeline_over(&temp_store);
    let second = second_process
        .delivery
        .handle_background_message(&envelope)
        .await;

    assert!(matches!(first, DeliveryOutcome::Presented { .. }));
    assert!(matches!(second, DeliveryOutcome::Suppressed { .. }));
    assert_eq!(first_presenter.displayed().len(), 1);
    assert!(second_presenter.displayed().is_empty());
}

#[rstest]
#[tokio::test]
async fn cold_start_reads_what_a_killed_process_recorded(temp_store: TempStoreDir) {
    let (background, _) = pipeline_over(&temp_store);
    background
        .delivery
        .handle_background_message(&PushEnvelope::data_only([
            ("groupId", "g1"),
            ("type", "new_photo"),
        ]))
        .await;
    drop(background);

    let (launched, _) = pipeline_over(&temp_store);
    let pending = launched
        .recorder
        .take_pending()
        .await
        .expect("take pending")
        .expect("pending record present");

    assert_eq!(
        pending.navigation_target(),
        Some(NavigationTarget::Group {
            group_id: "g1".to_owned()
        })
    );
    assert!(
        launched
            .recorder
            .take_pending()
            .await
            .expect("second take")
            .is_none()
    );
}

#[rstest]
#[case("k".repeat(200))]
#[case("لحظة امتنان ".repeat(20))]
#[tokio::test]
async fn long_dedupe_keys_still_suppress_redelivery(
    temp_store: TempStoreDir,
    #[case] dedupe_key: String,
) {
    let envelope = PushEnvelope::data_only([
        ("type", "comment".to_owned()),
        ("dedupe_key", dedupe_key),
    ]);

    let (first_process, first_presenter) = pipeline_over(&temp_store);
    let first = first_process
        .delivery
        .handle_background_message(&envelope)
        .await;
    let second = first_process
        .delivery
        .handle_background_message(&envelope)
        .await;
    drop(first_process);

    let (restarted, restarted_presenter) = pipeline_over(&temp_store);
    let after_restart = restarted.delivery.handle_background_message(&envelope).await;

    assert!(matches!(first, DeliveryOutcome::Presented { .. }));
    assert!(matches!(second, DeliveryOutcome::Suppressed { .. }));
    assert!(matches!(after_restart, DeliveryOutcome::Suppressed { .. }));
    assert_eq!(first_presenter.displayed().len(), 1);
    assert!(restarted_presenter.displayed().is_empty());
}

#[rstest]
#[tokio::test]
async fn long_keys_round_trip_without_colliding(temp_store: TempStoreDir) {
    let store = FileKeyValueStore::open(temp_store.path()).expect("open store");
    let first = format!("push_dedupe_comment_{}", "a".repeat(200));
    let second = format!("push_dedupe_comment_{}", "b".repeat(200));

    store.set(&first, "1").await.expect("set first");
    store.set(&second, "line one\nline two").await.expect("set second");

    assert_eq!(store.get(&first).await.expect("get").as_deref(), Some("1"));
    assert_eq!(
        store.get(&second).await.expect("get").as_deref(),
        Some("line one\nline two")
    );

    store.remove(&first).await.expect("remove");
    assert!(store.get(&first).await.expect("get").is_none());
    assert!(store.get(&second).await.expect("get").is_some());
}
