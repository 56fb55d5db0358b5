use chrono::Utc;
use starmap_core::{AlertLedger, HighlightSelector, LocationId, EMPTY_SLOT, SUMMARY_SLOTS};

#[test]
fn empty_summary_is_all_sentinels() {
    let mut selector = HighlightSelector::new();
    let ledger = AlertLedger::default();

    let summary = selector.rebuild_if_stale(&ledger);
    assert!(summary.is_empty());
    assert_eq!(summary.ids, [EMPTY_SLOT; SUMMARY_SLOTS]);
}

#[test]
fn alerts_come_first_then_highlights() {
    let mut selector = HighlightSelector::new();
    let mut ledger = AlertLedger::default();
    let now = Utc::now();

    assert!(selector.add_highlight(LocationId(50), false, false));
    ledger.add_alert(LocationId(1), now);
    ledger.add_alert(LocationId(2), now);
    assert!(selector.add_highlight(LocationId(51), false, false));

    let summary = selector.build_summary(&ledger);
    let order: Vec<u32> = summary.entries().map(|(id, _, _)| id.0).collect();
    assert_eq!(order, vec![1, 2, 50, 51]);
}

#[test]
fn summary_keeps_most_recent_alerts_when_over_capacity() {
    let selector = HighlightSelector::new();
    let mut ledger = AlertLedger::new(50, 15);
    let now = Utc::now();
    for id in 0..14 {
        ledger.add_alert(LocationId(id), now);
    }

    let summary = selector.build_summary(&ledger);
    assert_eq!(summary.len(), SUMMARY_SLOTS);
    let order: Vec<u32> = summary.entries().map(|(id, _, _)| id.0).collect();
    assert_eq!(order, (4..14).collect::<Vec<_>>());
}

#[test]
fn highlights_fill_only_free_slots() {
    let mut selector = HighlightSelector::new();
    let mut ledger = AlertLedger::default();
    let now = Utc::now();
    for id in 0..8 {
        ledger.add_alert(LocationId(id), now);
    }
    for id in 100..105 {
        selector.add_highlight(LocationId(id), false, false);
    }

    let summary = selector.build_summary(&ledger);
    assert_eq!(summary.len(), SUMMARY_SLOTS);
    assert_eq!(summary.ids[8], 100);
    assert_eq!(summary.ids[9], 101);
}

#[test]
fn alerting_location_refuses_highlight() {
    let mut selector = HighlightSelector::new();
    assert!(!selector.add_highlight(LocationId(3), true, true));
    assert!(!selector.is_highlighted(LocationId(3)));

    assert!(selector.add_highlight(LocationId(4), false, false));
    assert!(!selector.add_highlight(LocationId(4), false, false), "already highlighted");
}

#[test]
fn rebuild_only_when_stale() {
    let mut selector = HighlightSelector::new();
    let ledger = AlertLedger::default();

    selector.rebuild_if_stale(&ledger);
    assert!(!selector.is_stale());

    selector.add_highlight(LocationId(9), false, false);
    assert!(selector.is_stale());
    let summary = selector.rebuild_if_stale(&ledger);
    assert_eq!(summary.ids[0], 9);
    assert!(summary.sizes[0] >= 0.0);
}

#[test]
fn released_highlight_fades_out() {
    let mut selector = HighlightSelector::new();
    selector.add_highlight(LocationId(2), false, false);
    assert!(selector.remove_highlight(LocationId(2)));
    assert!(!selector.remove_highlight(LocationId(99)));

    let mut finished = Vec::new();
    for _ in 0..100 {
        finished = selector.advance_tick();
        if !finished.is_empty() {
            break;
        }
    }
    assert_eq!(finished, vec![LocationId(2)]);
    assert!(selector.highlighted().is_empty());
}

#[test]
fn clearing_keeps_pinned_highlights() {
    let mut selector = HighlightSelector::new();
    let ledger = AlertLedger::default();
    selector.set_hover(Some(LocationId(1)), false);
    assert!(selector.pin(LocationId(2), false));
    selector.add_highlight(LocationId(3), false, false);

    selector.clear();
    assert_eq!(selector.highlighted(), &[LocationId(2)]);
    assert!(selector.is_pinned(LocationId(2)));

    let summary = selector.rebuild_if_stale(&ledger);
    assert_eq!(summary.ids[0], 2);
    assert_eq!(summary.ids[1], EMPTY_SLOT);
}

#[test]
fn hovering_an_alerting_location_adds_no_highlight() {
    let mut selector = HighlightSelector::new();
    selector.set_hover(Some(LocationId(4)), true);

    assert_eq!(selector.hover(), Some(LocationId(4)));
    assert!(!selector.is_highlighted(LocationId(4)));
}
