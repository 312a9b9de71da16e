//! End-to-end tracker behavior against the in-memory page.

use std::rc::Rc;
use std::time::Duration;

use optiondeck_lib::analytics::RecordingSink;
use optiondeck_lib::event_log::load_persisted;
use optiondeck_lib::host::memory::{MemoryCard, MemoryPage, MemoryStorage};
use optiondeck_lib::host::timing::{ManualClock, ManualScheduler};
use optiondeck_lib::host::{CardId, DomEventKind, PageHost};
use optiondeck_lib::layout::list::SPLIT_MARKER;
use optiondeck_lib::models::{EventType, FieldValue, LayoutVariant};
use optiondeck_lib::navigation::{NavigationOutcome, LOADING_CLASS};
use optiondeck_lib::perf::{LoadTiming, PerformanceReport, PerformanceTiming};
use optiondeck_lib::settings::TrackerSettings;
use optiondeck_lib::tracker::{commands, InteractionTracker};
use optiondeck_lib::{start, PageContext};
use pretty_assertions::assert_eq;

const START_MS: i64 = 1_700_000_000_000;

struct Harness {
    page: Rc<MemoryPage>,
    storage: Rc<MemoryStorage>,
    clock: ManualClock,
    scheduler: ManualScheduler,
    analytics: Rc<RecordingSink>,
    tracker: Rc<InteractionTracker>,
}

fn cards() -> Vec<MemoryCard> {
    vec![
        MemoryCard::new("scratch", "Start from Scratch"),
        MemoryCard::new("learn-first", "Learn First"),
        MemoryCard::new("template", "Use a Template"),
        MemoryCard::new("mystery", "Mystery Box"),
    ]
}

fn boot_with(href: &str, storage: MemoryStorage) -> Harness {
    boot_with_cards(href, storage, cards())
}

fn boot_with_cards(href: &str, storage: MemoryStorage, cards: Vec<MemoryCard>) -> Harness {
    optiondeck_lib::utils::logging::init();
    let page = Rc::new(MemoryPage::new(href, cards));
    let storage = Rc::new(storage);
    let clock = ManualClock::new(START_MS);
    let scheduler = ManualScheduler::new(clock.clone());
    let analytics = Rc::new(RecordingSink::new());

    let ctx = PageContext {
        page: page.clone(),
        storage: storage.clone(),
        clock: Rc::new(clock.clone()),
        scheduler: Rc::new(scheduler.clone()),
        analytics: analytics.clone(),
    };
    let tracker = start(&ctx, TrackerSettings::default());

    Harness {
        page,
        storage,
        clock,
        scheduler,
        analytics,
        tracker,
    }
}

fn boot(href: &str) -> Harness {
    boot_with(href, MemoryStorage::new())
}

fn event_types(h: &Harness) -> Vec<EventType> {
    h.tracker.events().iter().map(|e| e.event_type).collect()
}

#[test]
fn page_load_is_recorded_once_and_first() {
    let h = boot("https://landing.test/");
    h.clock.advance(Duration::from_millis(40));
    h.page.hover_card(CardId(1));
    h.page.click_card(CardId(0));

    assert_eq!(h.tracker.track_page_load(), None);
    assert_eq!(
        event_types(&h),
        vec![
            EventType::PageLoad,
            EventType::OptionHover,
            EventType::OptionClick
        ]
    );

    let events = h.tracker.events();
    let load = &events[0];
    assert_eq!(load.text("layout_version"), Some("grid"));
    assert_eq!(load.text("screen_size"), Some("1920x1080"));
    assert_eq!(load.text("viewport_size"), Some("1280x720"));
    assert_eq!(load.text("user_agent"), Some("optiondeck-memory/1.0"));
}

#[test]
fn mapped_click_is_logged_before_delayed_navigation() {
    let h = boot("https://landing.test/?layout=grid");
    h.clock.advance(Duration::from_millis(2_500));
    h.page.click_card(CardId(0));

    let events = h.tracker.events();
    assert_eq!(events.len(), 2);
    let click = &events[1];
    assert_eq!(click.event_type, EventType::OptionClick);
    assert_eq!(click.session_id, h.tracker.session().session_id);
    assert_eq!(click.timestamp, START_MS + 2_500);
    assert_eq!(click.text("option"), Some("scratch"));
    assert_eq!(click.text("title"), Some("Start from Scratch"));
    assert_eq!(
        click.text("destination"),
        Some("https://platform-beta.aiml.asu.edu/")
    );
    assert_eq!(click.text("layout_version"), Some("grid"));
    assert_eq!(click.field("time_on_page"), Some(&FieldValue::Int(2_500)));

    assert!(h.page.has_body_class(LOADING_CLASS));
    assert!(h.page.opened().is_empty());
    assert_eq!(h.page.card(CardId(0)).unwrap().transform, "scale(0.95)");

    h.scheduler.advance(Duration::from_millis(300));
    assert_eq!(
        h.page.opened(),
        vec!["https://platform-beta.aiml.asu.edu/".to_string()]
    );
    assert!(!h.page.has_body_class(LOADING_CLASS));
    assert_eq!(h.page.card(CardId(0)).unwrap().transform, "");
}

#[test]
fn unmapped_click_warns_and_clears_loading() {
    let h = boot("https://landing.test/");
    h.page.click_card(CardId(3));

    let click = h.tracker.events().pop().unwrap();
    assert_eq!(click.text("option"), Some("mystery"));
    assert!(click.field("destination").is_none());

    h.scheduler.advance(Duration::from_millis(300));
    assert!(h.page.opened().is_empty());
    assert!(!h.page.has_body_class(LOADING_CLASS));
    assert_eq!(
        h.tracker.last_navigation_outcome(),
        Some(NavigationOutcome::Unmapped {
            option: "mystery".into()
        })
    );
}

#[test]
fn overlapping_clicks_navigate_independently() {
    let h = boot("https://landing.test/");
    h.page.click_card(CardId(0));
    h.clock.advance(Duration::from_millis(100));
    h.page.click_card(CardId(2));

    h.scheduler.advance(Duration::from_millis(200));
    assert_eq!(h.page.opened().len(), 1);
    h.scheduler.advance(Duration::from_millis(100));
    assert_eq!(
        h.page.opened(),
        vec![
            "https://platform-beta.aiml.asu.edu/".to_string(),
            "https://danielennis11111.github.io/gpt-marketplace/#/marketplace".to_string(),
        ]
    );
}

#[test]
fn list_layout_splits_every_card_once() {
    let h = boot("https://landing.test/?layout=list");
    assert_eq!(h.page.container_class(), "options-list");
    assert_eq!(h.tracker.session().layout, LayoutVariant::List);

    for card in 0..4 {
        let card = h.page.card(CardId(card)).unwrap();
        assert!(card.markup.starts_with("<div class=\"icon\">*</div><div class=\"content\">"));
        assert_eq!(card.markup.matches("class=\"icon\"").count(), 1);
        assert_eq!(card.markup.matches("class=\"content\"").count(), 1);
        assert_eq!(card.attributes.get(SPLIT_MARKER).map(String::as_str), Some("true"));
    }

    h.page.click_card(CardId(1));
    let click = h.tracker.events().pop().unwrap();
    assert_eq!(click.text("title"), Some("Learn First"));
    assert_eq!(click.text("layout_version"), Some("list"));
}

#[test]
fn bare_card_is_tracked_without_option_or_split() {
    let bare = MemoryCard {
        title: Some("Bare".into()),
        markup: "<h3>Bare</h3>".into(),
        ..MemoryCard::default()
    };
    let mut deck = cards();
    deck.push(bare);
    let h = boot_with_cards("https://landing.test/?layout=list", MemoryStorage::new(), deck);

    let card = h.page.card(CardId(4)).unwrap();
    assert_eq!(card.markup, "<h3>Bare</h3>");
    assert!(card.attributes.get(SPLIT_MARKER).is_none());
    let split = h.page.card(CardId(0)).unwrap();
    assert_eq!(split.attributes.get(SPLIT_MARKER).map(String::as_str), Some("true"));

    h.page.click_card(CardId(4));
    let click = h.tracker.events().pop().unwrap();
    assert_eq!(click.event_type, EventType::OptionClick);
    assert!(click.field("option").is_none());
    assert!(click.field("destination").is_none());
    assert_eq!(click.text("title"), Some("Bare"));

    h.scheduler.advance(Duration::from_millis(300));
    assert!(h.page.opened().is_empty());
    assert_eq!(
        h.tracker.last_navigation_outcome(),
        Some(NavigationOutcome::Unmapped {
            option: "unknown".into()
        })
    );
}

#[test]
fn carousel_drag_scrolls_by_twice_the_pointer_delta() {
    let h = boot("https://landing.test/?layout=carousel");
    assert_eq!(h.page.container_class(), "options-carousel");

    h.page.pointer(DomEventKind::MouseDown, 100.0);
    let moved = h.page.pointer(DomEventKind::MouseMove, 140.0);
    assert!(moved.default_prevented());
    assert_eq!(h.page.container_scroll_left(), -80.0);

    h.page.pointer(DomEventKind::MouseUp, 140.0);
    let idle = h.page.pointer(DomEventKind::MouseMove, 400.0);
    assert!(!idle.default_prevented());
    assert_eq!(h.page.container_scroll_left(), -80.0);
}

#[test]
fn carousel_drag_accounts_for_container_offset_and_leave() {
    let h = boot("https://landing.test/?layout=carousel");
    h.page.set_container_offset_left(20.0);
    h.page.set_container_scroll_left(50.0);

    h.page.pointer(DomEventKind::MouseDown, 120.0);
    h.page.pointer(DomEventKind::MouseMove, 110.0);
    assert_eq!(h.page.container_scroll_left(), 70.0);

    h.page.pointer(DomEventKind::MouseLeave, 110.0);
    h.page.pointer(DomEventKind::MouseMove, 0.0);
    assert_eq!(h.page.container_scroll_left(), 70.0);
}

#[test]
fn carousel_click_scrolls_card_into_view() {
    let h = boot("https://landing.test/?layout=carousel");
    h.page.click_card(CardId(2));
    assert_eq!(h.page.card(CardId(2)).unwrap().scrolled_into_view, 1);
    assert_eq!(h.page.card(CardId(0)).unwrap().scrolled_into_view, 0);
    assert_eq!(
        h.tracker.events().pop().unwrap().text("layout_version"),
        Some("carousel")
    );
}

#[test]
fn unknown_layout_falls_back_to_grid() {
    let h = boot("https://landing.test/?layout=masonry");
    assert_eq!(h.page.container_class(), "options-grid");
    assert_eq!(h.tracker.events()[0].text("layout_version"), Some("grid"));
}

#[test]
fn tab_records_focused_option_or_unknown() {
    let h = boot("https://landing.test/");
    h.page.press_key("Tab", Some(CardId(2)));
    h.page.press_key("Tab", None);
    h.page.press_key("ArrowDown", Some(CardId(2)));

    let keyboard: Vec<_> = h
        .tracker
        .events()
        .into_iter()
        .filter(|e| e.event_type == EventType::KeyboardNavigation)
        .collect();
    assert_eq!(keyboard.len(), 2);
    assert_eq!(keyboard[0].text("key"), Some("Tab"));
    assert_eq!(keyboard[0].text("target"), Some("template"));
    assert_eq!(keyboard[1].text("target"), Some("unknown"));
}

#[test]
fn enter_on_card_synthesizes_a_click() {
    let h = boot("https://landing.test/");
    h.page.press_key("Enter", Some(CardId(1)));
    h.page.press_key("Enter", None);

    assert_eq!(event_types(&h), vec![EventType::PageLoad, EventType::OptionClick]);
    assert_eq!(
        h.tracker.events()[1].text("option"),
        Some("learn-first")
    );

    h.scheduler.advance(Duration::from_millis(300));
    assert_eq!(h.page.opened().len(), 1);
}

#[test]
fn snapshot_counts_interactions_in_order() {
    let h = boot("https://landing.test/?layout=list");
    h.page.hover_card(CardId(0));
    h.page.hover_card(CardId(1));
    h.page.press_key("Tab", Some(CardId(1)));
    h.page.click_card(CardId(1));
    h.clock.advance(Duration::from_millis(1_234));

    let snapshot = h.tracker.export_snapshot();
    assert_eq!(snapshot.total_interactions, 5);
    assert_eq!(snapshot.interactions, h.tracker.events());
    assert_eq!(snapshot.session_duration_ms, 1_234);
    assert_eq!(snapshot.layout_variant, LayoutVariant::List);
    assert_eq!(
        snapshot
            .interactions
            .iter()
            .map(|e| e.event_type)
            .collect::<Vec<_>>(),
        vec![
            EventType::PageLoad,
            EventType::OptionHover,
            EventType::OptionHover,
            EventType::KeyboardNavigation,
            EventType::OptionClick,
        ]
    );

    let json: serde_json::Value =
        serde_json::from_str(&commands::export_user_data(&h.tracker).unwrap()).unwrap();
    assert_eq!(json["totalInteractions"], 5);
    assert_eq!(json["layoutVariant"], "list");
    assert_eq!(json["sessionId"], h.tracker.session().session_id.as_str());
}

#[test]
fn persisted_document_matches_memory_after_each_append() {
    let h = boot("https://landing.test/");
    h.page.hover_card(CardId(0));
    h.page.click_card(CardId(0));

    assert_eq!(h.storage.writes(), 3);
    let stored = load_persisted(h.storage.as_ref(), "userTestingData").unwrap();
    assert_eq!(stored.session_id, h.tracker.session().session_id);
    assert_eq!(stored.interactions, h.tracker.events());
}

#[test]
fn storage_quota_does_not_stop_tracking() {
    let h = boot_with("https://landing.test/", MemoryStorage::with_quota(64));
    h.page.hover_card(CardId(0));
    h.page.click_card(CardId(0));

    assert_eq!(h.tracker.events().len(), 3);
    assert_eq!(h.storage.writes(), 0);

    h.scheduler.advance(Duration::from_millis(300));
    assert_eq!(h.page.opened().len(), 1);
}

#[test]
fn every_event_is_forwarded_to_analytics() {
    let h = boot("https://landing.test/?layout=carousel");
    h.page.click_card(CardId(2));

    let sent = h.analytics.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "page_load");
    assert_eq!(sent[0].1.custom_parameter_1, None);
    assert_eq!(sent[0].1.custom_parameter_2.as_deref(), Some("carousel"));
    assert_eq!(sent[1].0, "option_click");
    assert_eq!(sent[1].1.custom_parameter_1.as_deref(), Some("template"));
}

#[test]
fn body_fades_in_after_reveal_delay() {
    let h = boot("https://landing.test/");
    assert_eq!(h.page.body_style("opacity").as_deref(), Some("0"));
    assert_eq!(
        h.page.body_style("transition").as_deref(),
        Some("opacity 0.3s ease")
    );

    h.scheduler.advance(Duration::from_millis(100));
    assert_eq!(h.page.body_style("opacity").as_deref(), Some("1"));
}

#[test]
fn load_event_reports_navigation_timing() {
    let h = boot("https://landing.test/");
    assert_eq!(h.tracker.load_timing(), LoadTiming::Pending);

    h.page.set_performance_timing(PerformanceTiming {
        navigation_start: 0.0,
        dom_content_loaded_event_end: 300.0,
        load_event_end: 800.0,
        first_paint: None,
    });
    h.page.fire_load();

    assert_eq!(
        h.tracker.load_timing(),
        LoadTiming::Measured(PerformanceReport {
            page_load_ms: 800.0,
            dom_content_loaded_ms: 300.0,
            first_paint_ms: None,
        })
    );
    assert_eq!(h.tracker.events().len(), 1);
}

#[test]
fn load_without_navigation_timing_is_unavailable() {
    let h = boot("https://landing.test/");
    h.page.fire_load();
    assert_eq!(h.tracker.load_timing(), LoadTiming::Unavailable);
}

#[test]
fn ab_helpers_follow_the_page_url() {
    let h = boot("https://landing.test/index.html?variant=B&layout=list");
    let href = h.page.href();
    assert_eq!(commands::current_variant(&href), "B");

    let urls = commands::layout_test_urls(&href).unwrap();
    assert_eq!(urls.carousel, "https://landing.test/index.html?layout=carousel");

    let url = commands::switch_layout(&href, "grid", |url| h.page.assign_location(url)).unwrap();
    assert_eq!(url, "https://landing.test/index.html?variant=B&layout=grid");
    assert_eq!(h.page.href(), url);
}

#[test]
fn ab_helpers_need_only_a_url() {
    let href = "https://landing.test/?layout=carousel";
    assert_eq!(commands::current_variant(href), "A");
    assert_eq!(
        commands::layout_test_urls(href).unwrap().list,
        "https://landing.test/?layout=list"
    );

    let mut visited = Vec::new();
    commands::switch_layout(href, "list", |url| {
        visited.push(url.to_string());
        Ok(())
    })
    .unwrap();
    assert_eq!(visited, vec!["https://landing.test/?layout=list".to_string()]);
}

#[test]
fn failed_layout_switch_reports_the_target_url() {
    let err = commands::switch_layout("https://landing.test/", "list", |_| {
        anyhow::bail!("navigation blocked")
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("https://landing.test/?layout=list"));
}
