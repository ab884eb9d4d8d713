//! End-to-end pointer sequences against the engine with a recording backend.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use phase_timeline::timeline::{
    GestureState, PreviewHandle, PreviewRect, RenderBackend, ScrollBehavior,
};
use phase_timeline::{CalendarRange, EngineConfig, Phase, TimelineAction, TimelineEngine};
use proptest::prelude::*;

const PX_PER_DAY: f32 = 10.0;
const CONTENT_LEFT: f32 = 40.0;

#[derive(Debug, Default)]
struct RecordingSurface {
    rects: Vec<PreviewRect>,
    visible: bool,
}

impl PreviewHandle for RecordingSurface {
    fn set_rect(&mut self, rect: PreviewRect) {
        self.rects.push(rect);
    }
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[derive(Debug)]
struct RecordingBackend {
    container_ready: bool,
    frame_requests: usize,
    scrolls: Vec<(f32, ScrollBehavior)>,
}

impl RenderBackend for RecordingBackend {
    type Surface = RecordingSurface;

    fn mount_preview(&mut self) -> Option<RecordingSurface> {
        self.container_ready.then(RecordingSurface::default)
    }
    fn content_left(&self) -> f32 {
        CONTENT_LEFT
    }
    fn viewport_width(&self) -> f32 {
        800.0
    }
    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }
    fn request_scroll(&mut self, offset_x: f32, behavior: ScrollBehavior) {
        self.scrolls.push((offset_x, behavior));
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Outside the test window, so auto-centering never scrolls.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
}

fn day(i: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i)
}

/// Client x at the middle of day `i`.
fn x_of(i: usize) -> f32 {
    CONTENT_LEFT + i as f32 * PX_PER_DAY + PX_PER_DAY / 2.0
}

fn engine_with(phases: Vec<Phase>, container_ready: bool, now: Instant) -> TimelineEngine<RecordingBackend> {
    let config = EngineConfig {
        px_per_day: PX_PER_DAY as u32,
        ..Default::default()
    };
    let backend = RecordingBackend {
        container_ready,
        frame_requests: 0,
        scrolls: Vec::new(),
    };
    let range = CalendarRange::new("2024-02-01", "2024-11-30");
    TimelineEngine::new(config, backend, &range, phases, today(), now).unwrap()
}

/// A phase spanning day indices `[5, 8)`.
fn phase_5_to_8() -> Phase {
    Phase::new("Build").with_dates(day(5), day(7))
}

fn set_rect_count(engine: &TimelineEngine<RecordingBackend>) -> usize {
    engine.preview().handle().map_or(0, |h| h.rects.len())
}

#[test]
fn scenario_a_drag_select_on_empty_lane() {
    let t0 = Instant::now();
    let phase = Phase::new("Discovery");
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    assert_eq!(engine.pointer_down(x_of(0), 0, t0), None);
    assert_eq!(engine.gesture_state(), GestureState::Selecting);
    engine.pointer_move(x_of(4), t0 + ms(16));
    engine.pointer_move(x_of(10), t0 + ms(32));
    engine.on_frame(t0 + ms(33));

    assert_eq!(
        engine.pointer_up(t0 + ms(40)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(0),
            end: day(10),
        })
    );
    assert_eq!(engine.gesture_state(), GestureState::Idle);
    assert_eq!(engine.pointer_up(t0 + ms(50)), None);
}

#[test]
fn scenario_b_move_keeps_duration() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    engine.pointer_down(x_of(6), 0, t0);
    engine.tick(t0 + ms(100));
    assert_eq!(engine.gesture_state(), GestureState::Moving);
    engine.pointer_move(x_of(9), t0 + ms(200));

    assert_eq!(
        engine.pointer_up(t0 + ms(400)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(8),
            end: day(10),
        })
    );
}

#[test]
fn scenario_c_resize_right_collapses_to_start() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    // Last 8px of the bar.
    engine.pointer_down(CONTENT_LEFT + 78.0, 0, t0);
    engine.tick(t0 + ms(100));
    assert_eq!(engine.gesture_state(), GestureState::ResizingRight);
    engine.pointer_move(x_of(2), t0 + ms(250));

    assert_eq!(
        engine.pointer_up(t0 + ms(350)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(5),
            end: day(5),
        })
    );
}

#[test]
fn resize_left_extends_and_never_inverts() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    engine.pointer_down(CONTENT_LEFT + 51.0, 0, t0);
    engine.tick(t0 + ms(100));
    assert_eq!(engine.gesture_state(), GestureState::ResizingLeft);
    engine.pointer_move(x_of(30), t0 + ms(110));
    assert_eq!(engine.candidate().map(|r| (r.start, r.length)), Some((7, 1)));
    engine.pointer_move(x_of(1), t0 + ms(220));

    assert_eq!(
        engine.pointer_up(t0 + ms(330)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(1),
            end: day(7),
        })
    );
}

#[test]
fn scenario_d_double_click_opens_editor_only() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    assert_eq!(engine.pointer_down(x_of(6), 0, t0), None);
    assert_eq!(engine.pointer_up(t0 + ms(60)), None);
    assert_eq!(
        engine.pointer_down(x_of(6), 0, t0 + ms(200)),
        Some(TimelineAction::EditPhase(id))
    );

    engine.tick(t0 + ms(400));
    assert_eq!(engine.gesture_state(), GestureState::Idle);
    let before = set_rect_count(&engine);
    engine.pointer_move(x_of(20), t0 + ms(410));
    assert!(!engine.on_frame(t0 + ms(420)));
    assert_eq!(set_rect_count(&engine), before);
    assert_eq!(engine.pointer_up(t0 + ms(430)), None);
}

#[test]
fn quick_drag_then_second_click_never_commits() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);
    let mut actions = Vec::new();

    // First click is held past the drag delay and nudged by two days.
    actions.extend(engine.pointer_down(x_of(6), 0, t0));
    engine.pointer_move(x_of(8), t0 + ms(60));
    actions.extend(engine.pointer_up(t0 + ms(120)));
    engine.on_frame(t0 + ms(130));
    assert!(engine.has_held_commit());
    assert!(engine.preview().is_visible());

    actions.extend(engine.pointer_down(x_of(6), 0, t0 + ms(200)));
    actions.extend(engine.pointer_up(t0 + ms(280)));
    actions.extend(engine.tick(t0 + ms(400)));
    actions.extend(engine.tick(t0 + ms(1_000)));

    assert_eq!(actions, vec![TimelineAction::EditPhase(id)]);
    assert!(!engine.has_held_commit());
    assert!(!engine.preview().is_visible());
    assert_eq!(engine.gesture_state(), GestureState::Idle);
}

#[test]
fn held_commit_is_released_by_the_next_press_elsewhere() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase, Phase::new("Empty")], true, t0);

    engine.pointer_down(x_of(6), 0, t0);
    engine.pointer_move(x_of(8), t0 + ms(60));
    assert_eq!(engine.pointer_up(t0 + ms(120)), None);

    assert_eq!(
        engine.pointer_down(x_of(1), 1, t0 + ms(200)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(7),
            end: day(9),
        })
    );
    assert_eq!(engine.gesture_state(), GestureState::Selecting);
    assert!(!engine.has_held_commit());
}

#[test]
fn slow_second_click_is_a_new_drag() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![phase_5_to_8()], true, t0);

    engine.pointer_down(x_of(6), 0, t0);
    engine.pointer_up(t0 + ms(50));
    assert_eq!(engine.pointer_down(x_of(6), 0, t0 + ms(400)), None);
    engine.tick(t0 + ms(500));
    assert_eq!(engine.gesture_state(), GestureState::Moving);
}

#[test]
fn press_release_without_drag_commits_nothing() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![phase_5_to_8()], true, t0);

    engine.pointer_down(x_of(6), 0, t0);
    engine.tick(t0 + ms(150));
    assert_eq!(engine.gesture_state(), GestureState::Moving);
    assert_eq!(engine.pointer_up(t0 + ms(200)), None);
}

#[test]
fn fast_drag_commits_once_the_double_click_window_closes() {
    let t0 = Instant::now();
    let phase = phase_5_to_8();
    let id = phase.id;
    let mut engine = engine_with(vec![phase], true, t0);

    engine.pointer_down(x_of(6), 0, t0);
    engine.pointer_move(x_of(8), t0 + ms(40));
    // Released before any tick: promoted on release, then held.
    assert_eq!(engine.pointer_up(t0 + ms(120)), None);
    assert_eq!(engine.gesture_state(), GestureState::Idle);
    assert_eq!(engine.tick(t0 + ms(300)), None);

    assert_eq!(
        engine.tick(t0 + ms(301)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(7),
            end: day(9),
        })
    );
    assert!(!engine.preview().is_visible());
    assert_eq!(engine.tick(t0 + ms(400)), None);
}

#[test]
fn moves_within_a_frame_coalesce() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![Phase::new("Empty")], true, t0);

    engine.pointer_down(x_of(3), 0, t0);
    for (i, x) in [4, 5, 6, 7].into_iter().enumerate() {
        engine.pointer_move(x_of(x), t0 + ms(i as u64));
    }
    assert_eq!(engine.backend().frame_requests, 1);
    assert!(engine.on_frame(t0 + ms(16)));
    assert!(!engine.on_frame(t0 + ms(32)));

    let handle = engine.preview().handle().unwrap();
    assert_eq!(handle.rects.len(), 1);
    let rect = handle.rects[0];
    assert_eq!(rect.left, 3.0 * PX_PER_DAY);
    assert_eq!(rect.width, 5.0 * PX_PER_DAY);
    assert_eq!(rect.top, engine.mapper().lane_top(0));
    assert!(handle.visible);

    engine.pointer_move(x_of(9), t0 + ms(40));
    assert_eq!(engine.backend().frame_requests, 2);
    engine.pointer_up(t0 + ms(41));
    assert!(!engine.preview().is_visible());
    assert!(!engine.on_frame(t0 + ms(48)));
}

#[test]
fn gestures_commit_without_a_preview_container() {
    let t0 = Instant::now();
    let phase = Phase::new("Headless");
    let id = phase.id;
    let mut engine = engine_with(vec![phase], false, t0);

    for step in 1..20 {
        engine.tick(t0 + ms(step * 100));
    }
    assert!(engine.preview().is_abandoned());

    let t1 = t0 + ms(5_000);
    engine.pointer_down(x_of(2), 0, t1);
    engine.pointer_move(x_of(4), t1 + ms(5));
    engine.on_frame(t1 + ms(16));
    assert_eq!(
        engine.pointer_up(t1 + ms(20)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: id,
            start: day(2),
            end: day(4),
        })
    );
}

#[test]
fn second_press_during_a_gesture_is_ignored() {
    let t0 = Instant::now();
    let first = Phase::new("First");
    let first_id = first.id;
    let mut engine = engine_with(vec![first, Phase::new("Second")], true, t0);

    engine.pointer_down(x_of(1), 0, t0);
    assert_eq!(engine.pointer_down(x_of(9), 1, t0 + ms(5)), None);
    engine.pointer_move(x_of(3), t0 + ms(10));
    assert_eq!(
        engine.pointer_up(t0 + ms(20)),
        Some(TimelineAction::PhaseRangeChanged {
            phase_id: first_id,
            start: day(1),
            end: day(3),
        })
    );
}

#[test]
fn pointer_far_outside_clamps_to_window() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![Phase::new("Edge")], true, t0);
    let last = engine.window().total_days() as u64 - 1;

    engine.pointer_down(-500.0, 0, t0);
    engine.pointer_move(1.0e9, t0 + ms(16));
    match engine.pointer_up(t0 + ms(20)) {
        Some(TimelineAction::PhaseRangeChanged { start, end, .. }) => {
            assert_eq!(start, day(0));
            assert_eq!(end, day(last));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn teardown_drops_the_running_gesture() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![Phase::new("Gone")], true, t0);
    engine.pointer_down(x_of(1), 0, t0);
    engine.pointer_move(x_of(5), t0 + ms(5));
    engine.teardown();
    assert_eq!(engine.gesture_state(), GestureState::Idle);
    assert!(!engine.on_frame(t0 + ms(16)));
    assert_eq!(engine.pointer_up(t0 + ms(20)), None);
}

#[test]
fn scroll_to_date_centers_in_viewport() {
    let t0 = Instant::now();
    let mut engine = engine_with(vec![], true, t0);
    engine.scroll_to_date(day(100), ScrollBehavior::Smooth);
    assert_eq!(
        engine.backend().scrolls,
        vec![(100.0 * PX_PER_DAY - 400.0, ScrollBehavior::Smooth)]
    );
}

#[derive(Debug, Clone)]
enum Step {
    Move(f32),
    Frame,
    Wait(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-2000.0f32..6000.0).prop_map(Step::Move),
        Just(Step::Frame),
        (0u64..200).prop_map(Step::Wait),
    ]
}

proptest! {
    #[test]
    fn committed_ranges_are_ordered_and_inside_the_window(
        bar_start in 0u64..300,
        bar_len in 1u64..40,
        lane in 0usize..2,
        down_x in -1000.0f32..5000.0,
        steps in prop::collection::vec(step(), 0..30),
    ) {
        let t0 = Instant::now();
        let phases = vec![
            Phase::new("Bar").with_dates(day(bar_start), day(bar_start + bar_len - 1)),
            Phase::new("Empty"),
        ];
        let mut engine = engine_with(phases, true, t0);
        let window = *engine.window();
        let mut now = t0;

        engine.pointer_down(down_x, lane, now);
        for step in steps {
            now += ms(1);
            match step {
                Step::Move(x) => engine.pointer_move(x, now),
                Step::Frame => {
                    engine.on_frame(now);
                }
                Step::Wait(n) => {
                    now += ms(n);
                    engine.tick(now);
                }
            }
            if let Some(range) = engine.candidate() {
                prop_assert!(range.length >= 1);
                prop_assert!(range.end() <= window.total_days());
            }
        }
        let committed = engine.pointer_up(now).or_else(|| engine.tick(now + ms(1_000)));
        if let Some(TimelineAction::PhaseRangeChanged { start, end, .. }) = committed {
            prop_assert!(start <= end);
            prop_assert!(window.contains(start));
            prop_assert!(window.contains(end));
        }
        prop_assert_eq!(engine.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn move_preserves_duration(
        bar_start in 0u64..300,
        bar_len in 1u64..40,
        grab in 0.4f32..0.6,
        target_x in -1000.0f32..5000.0,
    ) {
        let t0 = Instant::now();
        let phase = Phase::new("Bar").with_dates(day(bar_start), day(bar_start + bar_len - 1));
        let mut engine = engine_with(vec![phase], true, t0);

        let bar_left = CONTENT_LEFT + bar_start as f32 * PX_PER_DAY;
        let grab_x = bar_left + grab * bar_len as f32 * PX_PER_DAY;
        engine.pointer_down(grab_x, 0, t0);
        engine.tick(t0 + ms(100));
        prop_assert_eq!(engine.gesture_state(), GestureState::Moving);
        engine.pointer_move(target_x, t0 + ms(110));
        match engine.pointer_up(t0 + ms(120)).or_else(|| engine.tick(t0 + ms(1_000))) {
            Some(TimelineAction::PhaseRangeChanged { start, end, .. }) => {
                prop_assert_eq!((end - start).num_days(), bar_len as i64 - 1);
            }
            Some(other) => prop_assert!(false, "unexpected action {:?}", other),
            None => {}
        }
    }

    #[test]
    fn index_date_round_trip(first_year in 1990i32..2090, span in 0i32..4, seed in any::<u32>()) {
        let t0 = Instant::now();
        let start = format!("{first_year}-06-01");
        let end = format!("{}-06-01", first_year + span);
        let range = CalendarRange::new(start, end);
        let backend = RecordingBackend { container_ready: true, frame_requests: 0, scrolls: Vec::new() };
        let engine = TimelineEngine::new(EngineConfig::default(), backend, &range, vec![], today(), t0)
            .unwrap();
        let mapper = engine.mapper();
        let i = seed as usize % mapper.day_count();
        prop_assert_eq!(mapper.date_to_index(mapper.index_to_date(i)), i as i64);
    }
}
