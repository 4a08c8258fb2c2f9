// End-to-end session runs against the public engine surface.
//
// Everything is driven through virtual time, so no test sleeps and every
// run is reproducible from its seed.

use aim_warmup::persistence::{MemoryStore, RecordStore};
use aim_warmup::sim::{
    Difficulty, EndCause, Engine, GameEvent, ModeKind, RemovalReason, SessionStatus, TargetKind,
};
use aim_warmup::streak::FixedCalendar;
use aim_warmup::tuning::PhaseKey;
use aim_warmup::ScoreKey;
use glam::Vec2;
use proptest::prelude::*;

const FRAME_MS: f64 = 16.0;

fn january(day: u32) -> FixedCalendar {
    FixedCalendar::ymd(2024, 1, day).expect("valid date")
}

fn engine() -> Engine<MemoryStore> {
    Engine::new(MemoryStore::in_memory(), 7).with_calendar(january(1))
}

/// Click the center of the oldest live target; false if the field is empty
fn shoot_first(e: &mut Engine<MemoryStore>) -> bool {
    let Some(center) = e.session().targets.as_slice().first().map(|t| t.circle().center) else {
        return false;
    };
    e.on_pointer_down(center);
    true
}

/// Point guaranteed to miss every target
fn empty_point() -> Vec2 {
    Vec2::new(-500.0, -500.0)
}

fn run_frames_until_end(e: &mut Engine<MemoryStore>, max_ms: f64) {
    while e.status() == SessionStatus::Running && e.now_ms() < max_ms {
        e.advance(FRAME_MS);
    }
}

#[test]
fn reaction_target_expires_once() {
    let mut e = engine();
    e.start_session(ModeKind::Warmup, None);
    e.advance(1299.0);
    assert_eq!(e.session().misses, 0);
    e.advance(1.0);
    assert_eq!(e.session().misses, 1);
    assert_eq!(e.session().lives, 2);
    assert_eq!(e.status(), SessionStatus::Running);
    // Respawn is delayed, nothing visible yet
    assert!(e.session().targets.is_empty());
}

#[test]
fn three_expiries_run_out_of_lives() {
    let mut e = engine();
    e.start_session(ModeKind::Warmup, None);
    while e.status() == SessionStatus::Running && e.now_ms() < 10_000.0 {
        e.advance(10.0);
        if e.session().misses < 3 {
            assert_eq!(e.status(), SessionStatus::Running);
        }
    }
    assert_eq!(e.status(), SessionStatus::Ended);
    assert_eq!(e.session().end_cause, Some(EndCause::OutOfLives));
    assert_eq!(e.session().misses, 3);
    assert_eq!(e.session().lives, 0);
    assert_eq!(e.pending_timers(), 0);
}

#[test]
fn endless_targets_start_moving_after_eighteen_hits() {
    let mut e = engine();
    e.start_session(ModeKind::Endless, None);
    for _ in 0..17 {
        assert!(shoot_first(&mut e));
    }
    assert_eq!(e.session().targets.as_slice()[0].kind, TargetKind::Stationary);
    assert!(shoot_first(&mut e));
    assert_eq!(e.session().score, 18);
    let target = &e.session().targets.as_slice()[0];
    assert_eq!(target.kind, TargetKind::Bouncing);
    assert_eq!(target.size, 29.0);
    assert!(e.drain_events().contains(&GameEvent::Pace(Some(1076.0))));
}

#[test]
fn endless_expiry_times_out() {
    let mut e = engine();
    e.start_session(ModeKind::Endless, None);
    e.advance(1400.0);
    assert_eq!(e.session().end_cause, Some(EndCause::TimedOut));
    assert_eq!(e.session().misses, 1);
}

#[test]
fn shrink_easy_untouched_target_ends_in_defeat() {
    let mut e = engine();
    e.start_session(ModeKind::Shrink, Some(Difficulty::Easy));
    e.advance(300.0);
    assert_eq!(e.session().targets.len(), 1);
    for _ in 0..199 {
        e.advance(FRAME_MS);
    }
    assert_eq!(e.status(), SessionStatus::Running);
    e.advance(FRAME_MS);
    assert_eq!(e.status(), SessionStatus::Ended);
    assert_eq!(e.session().end_cause, Some(EndCause::Defeat));
    // Losing a target is not a click miss
    assert_eq!(e.session().misses, 0);
    assert!(e.session().targets.is_empty());
}

#[test]
fn falling_target_leaving_the_field_is_defeat() {
    let mut e = engine();
    e.start_session(ModeKind::Falling, Some(Difficulty::Easy));
    run_frames_until_end(&mut e, 20_000.0);
    assert_eq!(e.session().end_cause, Some(EndCause::Defeat));
    let events = e.drain_events();
    assert!(events.iter().any(|ev| matches!(
        ev,
        GameEvent::TargetRemoved {
            reason: RemovalReason::FallOut,
            ..
        }
    )));
}

#[test]
fn falling_shrink_shrinks_out_before_it_lands() {
    let mut e = engine();
    e.start_session(ModeKind::FallingShrink, Some(Difficulty::Easy));
    run_frames_until_end(&mut e, 20_000.0);
    assert_eq!(e.session().end_cause, Some(EndCause::Defeat));
    let events = e.drain_events();
    assert!(events.iter().any(|ev| matches!(
        ev,
        GameEvent::TargetRemoved {
            reason: RemovalReason::ShrinkOut,
            ..
        }
    )));
}

#[test]
fn arcade_empty_click_is_defeat() {
    let mut e = engine();
    e.start_session(ModeKind::Falling, Some(Difficulty::Hard));
    e.advance(300.0);
    e.on_pointer_down(empty_point());
    assert_eq!(e.session().end_cause, Some(EndCause::Defeat));
    assert_eq!(e.session().misses, 1);
}

#[test]
fn shrink_field_never_exceeds_max_active() {
    let mut e = engine();
    e.start_session(ModeKind::Shrink, Some(Difficulty::Hard));
    let mut peak = 0;
    while e.status() == SessionStatus::Running && e.now_ms() < 30_000.0 {
        e.advance(FRAME_MS);
        peak = peak.max(e.session().targets.len());
        // Keep the oldest alive so the field fills up
        if e.now_ms() as u64 % 400 < FRAME_MS as u64 {
            shoot_first(&mut e);
        }
    }
    assert!(peak <= 5, "peak {peak}");
}

#[test]
fn quit_clears_field_and_timers() {
    let mut e = engine();
    e.start_session(ModeKind::Shrink, Some(Difficulty::Medium));
    e.advance(2000.0);
    let live = e.session().targets.len();
    assert!(live > 0);
    e.drain_events();

    e.quit_session();
    assert!(e.session().targets.is_empty());
    assert_eq!(e.pending_timers(), 0);
    assert_eq!(e.session().end_cause, Some(EndCause::Stopped));
    let cleared = e
        .drain_events()
        .iter()
        .filter(|ev| {
            matches!(
                ev,
                GameEvent::TargetRemoved {
                    reason: RemovalReason::Cleared,
                    ..
                }
            )
        })
        .count();
    assert_eq!(cleared, live);

    // Nothing fires after the session is gone
    e.advance(10_000.0);
    assert!(e.drain_events().is_empty());
}

#[test]
fn warmup_runs_phases_in_order_to_time_up() {
    let mut e = engine();
    e.start_session(ModeKind::Warmup, None);
    while e.status() == SessionStatus::Running && e.now_ms() < 200_000.0 {
        e.advance(10.0);
        shoot_first(&mut e);
    }
    assert_eq!(e.session().end_cause, Some(EndCause::TimeUp));
    assert_eq!(
        e.session().phases_seen,
        vec![PhaseKey::Reaction, PhaseKey::Flick, PhaseKey::Control]
    );
    assert_eq!(e.session().misses, 0);
    assert_eq!(e.session().lives, 3);

    let summary = e.last_summary().expect("summary after end");
    assert_eq!(summary.accuracy_pct, 100);
    assert!(summary.avg_reaction_ms.is_some());
    assert!(summary.avg_flick_ms.is_some());
    assert!(summary.control_hits > 0);
}

#[test]
fn best_score_is_kept_per_mode() {
    let mut e = engine();
    e.start_session(ModeKind::Endless, None);
    for _ in 0..3 {
        shoot_first(&mut e);
    }
    e.on_pointer_down(empty_point());
    let summary = e.last_summary().expect("ended");
    assert_eq!((summary.previous_best, summary.best), (0, 3));
    assert!(summary.is_new_best());

    e.start_session(ModeKind::Endless, None);
    shoot_first(&mut e);
    e.on_pointer_down(empty_point());
    let summary = e.last_summary().expect("ended");
    assert_eq!((summary.score, summary.best), (1, 3));
    assert!(!summary.is_new_best());

    let endless = ScoreKey::new(ModeKind::Endless, None);
    let shrink = ScoreKey::new(ModeKind::Shrink, Some(Difficulty::Easy));
    assert_eq!(e.store().best(endless), 3);
    assert_eq!(e.store().best(shrink), 0);
}

#[test]
fn streak_follows_calendar_days() {
    fn play_one(e: &mut Engine<MemoryStore>) -> Option<u32> {
        e.start_session(ModeKind::Endless, None);
        e.on_pointer_down(empty_point());
        e.last_summary().map(|s| s.streak)
    }

    let mut e = engine();

    assert_eq!(play_one(&mut e), Some(1));
    assert_eq!(play_one(&mut e), Some(1));
    e.set_calendar(january(2));
    assert_eq!(play_one(&mut e), Some(2));
    e.set_calendar(january(5));
    assert_eq!(play_one(&mut e), Some(1));
    assert_eq!(e.home_stats(ModeKind::Endless, None).streak, 1);
}

#[derive(Debug, Clone)]
enum Input {
    Wait(u16),
    HitOldest,
    ClickAt(f32, f32),
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        (1u16..400).prop_map(Input::Wait),
        Just(Input::HitOldest),
        (-20.0f32..400.0, -20.0f32..560.0).prop_map(|(x, y)| Input::ClickAt(x, y)),
    ]
}

fn mode() -> impl Strategy<Value = ModeKind> {
    prop::sample::select(ModeKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counters_only_grow(mode in mode(), seed in any::<u64>(), inputs in prop::collection::vec(input(), 1..80)) {
        let mut e = Engine::new(MemoryStore::in_memory(), seed)
            .with_calendar(january(1));
        e.start_session(mode, Some(Difficulty::Hard));
        let (mut score, mut misses, mut lives) = (0, 0, e.session().lives);
        let mut ended = false;

        for step in inputs {
            match step {
                Input::Wait(ms) => e.advance(f64::from(ms)),
                Input::HitOldest => {
                    shoot_first(&mut e);
                }
                Input::ClickAt(x, y) => e.on_pointer_down(Vec2::new(x, y)),
            }
            let s = e.session();
            prop_assert!(s.score >= score);
            prop_assert!(s.misses >= misses);
            prop_assert!(s.lives <= lives);
            // Ended is terminal
            prop_assert!(!ended || s.status == SessionStatus::Ended);
            if s.status == SessionStatus::Ended {
                ended = true;
                prop_assert!(s.targets.is_empty());
                prop_assert_eq!(e.pending_timers(), 0);
            }
            score = s.score;
            misses = s.misses;
            lives = s.lives;
        }
    }
}
