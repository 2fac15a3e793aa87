use pretty_assertions::assert_eq;
use tsoft_devtools::JsonValue;
use tsoft_devtools::dataset::{Dataset, DatasetKind};
use tsoft_devtools::fetcher::EvaluationOutcome;
use tsoft_devtools::navigator::NavigatorState;

fn loaded(kind: DatasetKind, payload: &str) -> Dataset {
    let mut ds = Dataset::new(kind);
    ds.apply_outcome(EvaluationOutcome::Ok(JsonValue::parse(payload).unwrap()));
    ds
}

const TRANSLATIONS: &str = r#"{
    "tr": {"cart.title": "Sepetim", "cart.empty": "Sepetiniz boş", "home": "Ana Sayfa"},
    "en": {"cart.title": "My Cart", "cart.empty": "Your cart is empty"}
}"#;

#[test]
fn next_cycles_back_to_start_after_count_steps() {
    let mut ds = loaded(DatasetKind::Translations, TRANSLATIONS);
    ds.set_query("cart".into());

    let total = ds.navigator().total();
    assert_eq!(total, 4);
    let start = ds.navigator().state();
    assert_eq!(start, NavigatorState::Positioned { index: 0, total });

    let mut seen = Vec::new();
    for _ in 0..total {
        ds.next_match();
        seen.push(ds.tree().current().unwrap());
    }
    assert_eq!(ds.navigator().state(), start);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
}

#[test]
fn prev_from_first_match_wraps_to_last() {
    let mut ds = loaded(DatasetKind::Translations, TRANSLATIONS);
    ds.set_query("sepet".into());
    assert_eq!(ds.navigator().counter().as_deref(), Some("1 / 2"));

    assert_eq!(
        ds.prev_match(),
        NavigatorState::Positioned { index: 1, total: 2 }
    );
    assert_eq!(ds.navigator().counter().as_deref(), Some("2 / 2"));
    assert_eq!(
        ds.next_match(),
        NavigatorState::Positioned { index: 0, total: 2 }
    );
}

#[test]
fn moving_to_a_match_reopens_collapsed_ancestors() {
    let mut ds = loaded(
        DatasetKind::GlobalVars,
        r#"{"cart":{"items":[{"name":"Shirt"},{"name":"Hat"}]},"user":{"name":"Ayşe"}}"#,
    );
    ds.set_query("hat".into());
    ds.set_all_open(false);

    let view = ds.view().unwrap().clone();
    let unit = ds.navigator().current().unwrap().clone();
    for ancestor in &unit.ancestors {
        assert!(!ds.tree().is_open(*ancestor, true));
    }

    ds.next_match();
    for ancestor in &unit.ancestors {
        let default = view.default_open(*ancestor).unwrap();
        assert!(ds.tree().is_open(*ancestor, default), "ancestor {ancestor:?} still closed");
    }
    assert_eq!(ds.tree().current(), Some(unit.row));
}

#[test]
fn clearing_the_query_goes_idle() {
    let mut ds = loaded(DatasetKind::Translations, TRANSLATIONS);
    ds.set_query("cart".into());
    assert!(ds.navigator().controls_enabled());

    ds.set_query(String::new());
    assert_eq!(ds.navigator().state(), NavigatorState::Idle);
    assert_eq!(ds.navigator().counter(), None);
    assert_eq!(ds.tree().current(), None);
    // Groups fold back to their unfiltered state.
    assert!(ds.view().unwrap().groups.iter().all(|g| !g.open));
}

#[test]
fn refetch_reindexes_against_new_data() {
    let mut ds = loaded(DatasetKind::Translations, TRANSLATIONS);
    ds.set_query("cart".into());
    ds.next_match();
    ds.next_match();

    ds.apply_outcome(EvaluationOutcome::Ok(
        JsonValue::parse(r#"{"tr":{"cart.title":"Sepetim"}}"#).unwrap(),
    ));
    assert_eq!(
        ds.navigator().state(),
        NavigatorState::Positioned { index: 0, total: 1 }
    );
}
