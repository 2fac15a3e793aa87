mod common;

use std::time::Duration;

use common::{FakePage, disabled, enabled, missing, ok, wait_for};
use pretty_assertions::assert_eq;
use tsoft_devtools::dataset::{DatasetKind, Status, Tone};
use tsoft_devtools::evaluator::Evaluation;
use tsoft_devtools::gate::GateVerdict;
use tsoft_devtools::inspector::{Command, Inspector, InspectorHandle, InspectorOptions, PanelSnapshot};
use tsoft_devtools::scripts;
use tsoft_devtools::state::{ActivePage, PagePhase};

const PAGE_URL: &str = "https://shop.example/sepet";

fn storefront() -> FakePage {
    let page = FakePage::new();
    page.answer(scripts::TSOFT_META_CHECK, Evaluation::value("true"));
    page.answer(scripts::ACTIVE_PAGE, Evaluation::value(PAGE_URL));
    page.answer(scripts::DEBUG_MODE, enabled());
    page.answer(scripts::TRANSLATIONS, ok(r#"{"tr":{"greeting":"Merhaba"}}"#));
    page.answer(scripts::GLOBAL_VARS, ok("[1,2,3]"));
    page.answer(
        scripts::BLOCK_VARS,
        ok(r#"[{"name":"Header","vars":{"title":"Ana Sayfa"}}]"#),
    );
    page
}

fn start(page: &FakePage, require_meta_tag: bool) -> InspectorHandle {
    let options = InspectorOptions {
        require_meta_tag,
        ..InspectorOptions::default()
    };
    let (inspector, handle) = Inspector::new(page.clone(), options);
    tokio::spawn(inspector.run());
    assert!(handle.send(Command::Start));
    handle
}

fn status(snapshot: &PanelSnapshot, kind: DatasetKind) -> Status {
    snapshot.dataset(kind).unwrap().status.clone()
}

fn dataset_calls(page: &FakePage) -> usize {
    DatasetKind::ALL.iter().map(|k| page.calls(k.script())).sum()
}

fn all_listed(s: &PanelSnapshot) -> bool {
    s.datasets.iter().all(|d| d.status.tone == Tone::Success)
}

#[tokio::test(start_paused = true)]
async fn missing_flag_shows_warning_and_fetches_nothing() {
    let page = storefront();
    page.answer(scripts::DEBUG_MODE, missing());
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();

    let snapshot = wait_for(&mut snapshots, |s| s.verdict.is_some()).await;
    assert_eq!(snapshot.verdict, Some(GateVerdict::Missing));
    assert!(!snapshot.gate_enabled);
    assert!(snapshot.show_debug_warning());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(dataset_calls(&page), 0);
    let snapshot = handle.snapshot();
    for kind in DatasetKind::ALL {
        assert_eq!(status(&snapshot, kind), Status::waiting());
    }
}

#[tokio::test(start_paused = true)]
async fn enabled_gate_loads_all_three_datasets() {
    let page = storefront();
    let handle = start(&page, true);
    let mut snapshots = handle.subscribe();

    let snapshot = wait_for(&mut snapshots, |s| {
        all_listed(s) && matches!(s.active_page, ActivePage::Url(_))
    })
    .await;

    assert_eq!(snapshot.phase, PagePhase::Supported);
    assert_eq!(snapshot.active_page, ActivePage::Url(PAGE_URL.to_string()));
    assert_eq!(
        status(&snapshot, DatasetKind::Translations).message,
        "1 translation groups listed."
    );
    assert_eq!(
        status(&snapshot, DatasetKind::GlobalVars).message,
        "3 global values listed."
    );
    assert_eq!(status(&snapshot, DatasetKind::BlockVars).message, "1 blocks listed.");
    assert_eq!(page.calls(scripts::DEBUG_MODE), 1);
}

#[tokio::test(start_paused = true)]
async fn search_commands_update_counter() {
    let page = storefront();
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();
    wait_for(&mut snapshots, all_listed).await;

    handle.send(Command::SetQuery(DatasetKind::Translations, "mer".into()));
    let snapshot = wait_for(&mut snapshots, |s| {
        s.dataset(DatasetKind::Translations).unwrap().counter.is_some()
    })
    .await;
    let tr = snapshot.dataset(DatasetKind::Translations).unwrap();
    assert_eq!(tr.counter.as_deref(), Some("1 / 1"));
    assert!(tr.controls_enabled);
    assert_eq!(tr.view.as_ref().unwrap().matches.len(), 1);

    handle.send(Command::SetQuery(DatasetKind::BlockVars, "xyz".into()));
    let snapshot = wait_for(&mut snapshots, |s| {
        s.dataset(DatasetKind::BlockVars).unwrap().query == "xyz"
    })
    .await;
    let blocks = snapshot.dataset(DatasetKind::BlockVars).unwrap();
    assert_eq!(blocks.status, Status::info("No blocks match your search."));
    assert!(!blocks.controls_enabled);
    assert!(blocks.view.as_ref().unwrap().groups.is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabling_gate_discards_late_results() {
    let page = storefront();
    page.queue(scripts::DEBUG_MODE, enabled());
    page.answer(scripts::DEBUG_MODE, disabled());
    page.answer_after(
        scripts::TRANSLATIONS,
        Duration::from_secs(3),
        ok(r#"{"tr":{"greeting":"Merhaba"}}"#),
    );
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();

    wait_for(&mut snapshots, |s| s.gate_enabled).await;
    handle.send(Command::Navigated);

    let snapshot = wait_for(&mut snapshots, |s| s.verdict == Some(GateVerdict::Disabled)).await;
    assert!(!snapshot.gate_enabled);

    // The translations reply lands well after the gate closed.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(page.calls(scripts::TRANSLATIONS), 1);
    let snapshot = handle.snapshot();
    for kind in DatasetKind::ALL {
        let ds = snapshot.dataset(kind).unwrap();
        assert!(ds.view.is_none(), "{kind:?} still shows data");
        assert_eq!(ds.status, Status::waiting());
    }
}

#[tokio::test(start_paused = true)]
async fn navigation_bursts_collapse_into_one_check() {
    let page = storefront();
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();
    wait_for(&mut snapshots, all_listed).await;
    assert_eq!(page.calls(scripts::DEBUG_MODE), 1);

    for _ in 0..5 {
        handle.send(Command::Navigated);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(page.calls(scripts::DEBUG_MODE), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(page.calls(scripts::DEBUG_MODE), 2);
    // The re-check re-enabled the gate and reloaded every dataset once.
    assert_eq!(dataset_calls(&page), 6);
}

#[tokio::test(start_paused = true)]
async fn refresh_during_load_runs_one_follow_up() {
    let page = storefront();
    page.answer_after(scripts::GLOBAL_VARS, Duration::from_secs(1), ok("[1,2,3]"));
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();

    wait_for(&mut snapshots, |s| s.dataset(DatasetKind::GlobalVars).unwrap().loading).await;
    handle.send(Command::Refresh(DatasetKind::GlobalVars));
    handle.send(Command::Refresh(DatasetKind::GlobalVars));
    handle.send(Command::Refresh(DatasetKind::GlobalVars));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(page.calls(scripts::GLOBAL_VARS), 2);
    let snapshot = handle.snapshot();
    assert!(!snapshot.dataset(DatasetKind::GlobalVars).unwrap().loading);
    assert_eq!(
        status(&snapshot, DatasetKind::GlobalVars),
        Status::success("3 global values listed.")
    );
}

#[tokio::test(start_paused = true)]
async fn unreadable_dataset_reports_after_retry_bound() {
    let page = storefront();
    page.answer(scripts::BLOCK_VARS, Evaluation::exception());
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();

    let snapshot = wait_for(&mut snapshots, |s| {
        s.dataset(DatasetKind::BlockVars).unwrap().status.tone == Tone::Error
    })
    .await;
    assert_eq!(
        status(&snapshot, DatasetKind::BlockVars).message,
        "An error occurred while reading block data."
    );
    assert_eq!(page.calls(scripts::BLOCK_VARS), 6);
    // The other datasets are unaffected.
    assert_eq!(status(&snapshot, DatasetKind::GlobalVars).tone, Tone::Success);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_page_skips_gate() {
    let page = storefront();
    page.answer(scripts::TSOFT_META_CHECK, Evaluation::value("false"));
    let handle = start(&page, true);
    let mut snapshots = handle.subscribe();

    wait_for(&mut snapshots, |s| s.phase == PagePhase::Unsupported).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(page.calls(scripts::DEBUG_MODE), 0);
    assert_eq!(dataset_calls(&page), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_inspector() {
    let page = storefront();
    let handle = start(&page, false);
    handle.send(Command::Shutdown);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.send(Command::Refresh(DatasetKind::Translations)));
}

#[tokio::test(start_paused = true)]
async fn garbage_from_data_scripts_reports_decode_error() {
    let page = storefront();
    page.answer(scripts::TRANSLATIONS, Evaluation::value("<html>oops</html>"));
    page.answer(scripts::GLOBAL_VARS, enabled());
    let handle = start(&page, false);
    let mut snapshots = handle.subscribe();

    let snapshot = wait_for(&mut snapshots, |s| {
        [DatasetKind::Translations, DatasetKind::GlobalVars]
            .iter()
            .all(|k| s.dataset(*k).unwrap().status.tone == Tone::Error)
    })
    .await;

    assert_eq!(
        status(&snapshot, DatasetKind::Translations),
        Status::error("Translation data could not be decoded.")
    );
    assert_eq!(
        status(&snapshot, DatasetKind::GlobalVars),
        Status::error("Global data could not be decoded.")
    );
    assert!(snapshot.dataset(DatasetKind::Translations).unwrap().view.is_none());
    assert!(snapshot.dataset(DatasetKind::GlobalVars).unwrap().view.is_none());
    // Decoding failures are final, so each script ran once.
    assert_eq!(page.calls(scripts::TRANSLATIONS), 1);
    assert_eq!(page.calls(scripts::GLOBAL_VARS), 1);
    assert_eq!(status(&snapshot, DatasetKind::BlockVars).tone, Tone::Success);
}
