use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{
    animation::{Animation, Step},
    sink::{NoFeedback, SeenSink, TactileFeedback},
    stack::CardTransform,
    SwipeConfig,
};
use crate::models::{FilmographyEntry, MarkSeen, MediaKind, SeenSet, TmdbId};
use crate::services::providers::tmdb::{poster_url, PosterSize};

/// Cards rendered at once: the active card and two behind it
const VISIBLE_CARDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Seen
    Right,
    /// Skip
    Left,
}

/// Where the active card is in its gesture lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Idle,
    Dragging,
    /// Exit animation running; input is ignored until the decision lands
    Committing(SwipeDirection),
    /// Spring back to rest after a release below the threshold
    Returning,
    /// Decision applied; the removed card is still on screen holding the
    /// exit displacement until the next frame or `card_removed`
    Settling,
}

/// How a released gesture was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Release {
    Commit(SwipeDirection),
    Return,
}

/// A decision applied to the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub title_id: TmdbId,
    pub direction: SwipeDirection,
    /// Deck index the decision was made for
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub id: TmdbId,
    pub title: String,
    pub character: String,
    pub year: Option<i32>,
    pub media_kind: MediaKind,
    pub poster_url: Option<String>,
    /// 0 for the active card
    pub depth: usize,
    pub transform: CardTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Titles seen before the session plus titles swiped right
    pub seen: usize,
    /// Length of the full filmography
    pub total: usize,
    pub percent: u32,
}

/// Read-only projection of a session for the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: GesturePhase,
    /// 1-based position of the active card
    pub position: usize,
    pub total: usize,
    pub already_seen: usize,
    pub seen_this_session: usize,
    pub displacement: f64,
    /// Active card first, then up to two upcoming cards
    pub cards: Vec<CardView>,
    /// The card that was just decided, while it leaves the screen
    pub exiting: Option<CardView>,
    pub completion: Option<CompletionSummary>,
    pub accepting_input: bool,
}

/// Gesture-driven walk through a frozen deck of unseen titles
pub struct SwipeSession {
    deck: Vec<FilmographyEntry>,
    filmography_len: usize,
    cursor: usize,
    seen_commits: usize,
    phase: GesturePhase,
    displacement: f64,
    animation: Option<Animation>,
    config: SwipeConfig,
    sink: Arc<dyn SeenSink>,
    feedback: Arc<dyn TactileFeedback>,
    unmounted: bool,
}

impl std::fmt::Debug for SwipeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeSession")
            .field("deck_len", &self.deck.len())
            .field("cursor", &self.cursor)
            .field("phase", &self.phase)
            .field("displacement", &self.displacement)
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

impl SwipeSession {
    /// Freezes `filmography` minus `seen` into the deck
    ///
    /// Both inputs must be fully loaded; later changes to the user's seen
    /// titles do not reach the deck.
    pub fn new(
        filmography: Vec<FilmographyEntry>,
        seen: &SeenSet,
        config: SwipeConfig,
        sink: Arc<dyn SeenSink>,
    ) -> Self {
        let filmography_len = filmography.len();
        let deck: Vec<FilmographyEntry> = filmography
            .into_iter()
            .filter(|entry| !seen.contains(entry.id))
            .collect();

        tracing::debug!(
            filmography = filmography_len,
            deck = deck.len(),
            "Swipe deck frozen"
        );

        Self {
            deck,
            filmography_len,
            cursor: 0,
            seen_commits: 0,
            phase: GesturePhase::Idle,
            displacement: 0.0,
            animation: None,
            config,
            sink,
            feedback: Arc::new(NoFeedback),
            unmounted: false,
        }
    }

    pub fn with_feedback(mut self, feedback: Arc<dyn TactileFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn deck(&self) -> &[FilmographyEntry] {
        &self.deck
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn displacement(&self) -> f64 {
        self.displacement
    }

    pub fn already_seen_count(&self) -> usize {
        self.filmography_len - self.deck.len()
    }

    pub fn seen_this_session(&self) -> usize {
        self.seen_commits
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.deck.len()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Rounded percentage of the filmography seen; 0 for an empty filmography
    pub fn completion_percent(&self) -> u32 {
        if self.filmography_len == 0 {
            return 0;
        }
        let seen = (self.already_seen_count() + self.seen_commits) as u64;
        let total = self.filmography_len as u64;
        ((200 * seen + total) / (2 * total)) as u32
    }

    fn accepting_input(&self) -> bool {
        !self.unmounted && !self.is_complete()
    }

    /// Pointer down on the active card
    pub fn begin_gesture(&mut self) -> bool {
        if !self.accepting_input() || self.phase != GesturePhase::Idle {
            return false;
        }
        self.phase = GesturePhase::Dragging;
        self.displacement = 0.0;
        true
    }

    /// Pointer moved; `translation_x` is measured from where the gesture began
    pub fn move_gesture(&mut self, translation_x: f64) -> bool {
        if self.unmounted || self.phase != GesturePhase::Dragging {
            return false;
        }
        self.displacement = translation_x;
        true
    }

    /// Pointer released
    ///
    /// Returns `None` when no drag is in progress, which covers stale or
    /// duplicate releases for a card that is already committing.
    pub fn end_gesture(&mut self, translation_x: f64, velocity_x: f64) -> Option<Release> {
        if self.unmounted || self.phase != GesturePhase::Dragging {
            tracing::trace!(phase = ?self.phase, "Ignoring gesture end");
            return None;
        }

        self.displacement = translation_x;

        let commits = translation_x.abs() > self.config.commit_distance()
            || velocity_x.abs() > self.config.velocity_threshold;

        if commits {
            let direction = if translation_x > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            let exit = match direction {
                SwipeDirection::Right => self.config.exit_distance(),
                SwipeDirection::Left => -self.config.exit_distance(),
            };
            self.animation = Some(Animation::timing(
                self.displacement,
                exit,
                self.config.exit_duration,
            ));
            self.phase = GesturePhase::Committing(direction);
            Some(Release::Commit(direction))
        } else {
            self.animation = Some(Animation::spring(0.0, self.config.return_spring));
            self.phase = GesturePhase::Returning;
            Some(Release::Return)
        }
    }

    /// Steps running animations by one frame
    ///
    /// Returns the decision applied on this frame, if the exit animation
    /// finished.
    pub fn advance(&mut self, elapsed: Duration) -> Option<Decision> {
        if self.unmounted {
            return None;
        }

        match self.phase {
            GesturePhase::Settling => {
                self.finish_removal();
                None
            }
            GesturePhase::Committing(direction) => match self.step_animation(elapsed) {
                Step::Running(_) => None,
                Step::Finished(_) => {
                    let decision = self.apply_decision(direction);
                    self.phase = GesturePhase::Settling;
                    decision
                }
            },
            GesturePhase::Returning => {
                if let Step::Finished(_) = self.step_animation(elapsed) {
                    self.displacement = 0.0;
                    self.phase = GesturePhase::Idle;
                }
                None
            }
            GesturePhase::Idle | GesturePhase::Dragging => None,
        }
    }

    /// The host reports the decided card is no longer rendered
    pub fn card_removed(&mut self) {
        if !self.unmounted && self.phase == GesturePhase::Settling {
            self.finish_removal();
        }
    }

    /// Stops the session for good
    ///
    /// A commit whose exit animation is running is applied first, so its
    /// report is dispatched; nothing changes after this returns.
    pub fn unmount(&mut self) -> Option<Decision> {
        if self.unmounted {
            return None;
        }

        let decision = match self.phase {
            GesturePhase::Committing(direction) => {
                if let Some(animation) = self.animation.take() {
                    self.displacement = animation.target();
                }
                let decision = self.apply_decision(direction);
                self.phase = GesturePhase::Settling;
                decision
            }
            _ => None,
        };

        self.animation = None;
        self.unmounted = true;

        tracing::debug!(
            cursor = self.cursor,
            deck = self.deck.len(),
            "Swipe session unmounted"
        );

        decision
    }

    fn step_animation(&mut self, elapsed: Duration) -> Step {
        let Some(animation) = self.animation.as_mut() else {
            return Step::Finished(self.displacement);
        };

        let step = animation.step(self.displacement, elapsed);
        match step {
            Step::Running(x) => self.displacement = x,
            Step::Finished(x) => {
                self.displacement = x;
                self.animation = None;
            }
        }
        step
    }

    fn apply_decision(&mut self, direction: SwipeDirection) -> Option<Decision> {
        let index = self.cursor;
        let entry = self.deck.get(index)?;
        let title_id = entry.id;

        if direction == SwipeDirection::Right {
            self.sink.mark_seen(MarkSeen::from(entry));
            self.seen_commits += 1;
        }

        self.feedback.impact();
        self.cursor += 1;

        tracing::debug!(
            title_id,
            direction = ?direction,
            cursor = self.cursor,
            deck = self.deck.len(),
            "Swipe decision applied"
        );

        Some(Decision {
            title_id,
            direction,
            index,
        })
    }

    fn finish_removal(&mut self) {
        self.displacement = 0.0;
        self.phase = GesturePhase::Idle;
    }

    fn card_view(&self, entry: &FilmographyEntry, depth: usize, transform: CardTransform) -> CardView {
        CardView {
            id: entry.id,
            title: entry.title.clone(),
            character: entry.character.clone(),
            year: entry.release_year(),
            media_kind: entry.media_kind,
            poster_url: poster_url(entry.poster_path.as_deref(), PosterSize::Large),
            depth,
            transform,
        }
    }

    pub fn view(&self) -> SessionView {
        let width = self.config.screen_width;

        // While settling, the displacement belongs to the card that just left.
        let (live_displacement, exiting) = if self.phase == GesturePhase::Settling {
            let exiting = self
                .cursor
                .checked_sub(1)
                .and_then(|i| self.deck.get(i))
                .map(|entry| {
                    self.card_view(entry, 0, CardTransform::top(self.displacement, width))
                });
            (0.0, exiting)
        } else {
            (self.displacement, None)
        };

        let end = (self.cursor + VISIBLE_CARDS).min(self.deck.len());
        let cards = self
            .deck
            .get(self.cursor..end)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(depth, entry)| {
                let transform = if depth == 0 {
                    CardTransform::top(live_displacement, width)
                } else {
                    CardTransform::behind(depth, live_displacement, width)
                };
                self.card_view(entry, depth, transform)
            })
            .collect();

        let completion = self.is_complete().then(|| CompletionSummary {
            seen: self.already_seen_count() + self.seen_commits,
            total: self.filmography_len,
            percent: self.completion_percent(),
        });

        SessionView {
            phase: self.phase,
            position: (self.cursor + 1).min(self.deck.len()),
            total: self.deck.len(),
            already_seen: self.already_seen_count(),
            seen_this_session: self.seen_commits,
            displacement: self.displacement,
            cards,
            exiting,
            completion,
            accepting_input: self.accepting_input(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const WIDTH: f64 = 400.0;
    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<MarkSeen>>,
    }

    impl RecordingSink {
        fn ids(&self) -> Vec<TmdbId> {
            self.reports.lock().unwrap().iter().map(|r| r.title_id).collect()
        }
    }

    impl SeenSink for RecordingSink {
        fn mark_seen(&self, command: MarkSeen) {
            self.reports.lock().unwrap().push(command);
        }
    }

    #[derive(Default)]
    struct CountingFeedback(AtomicUsize);

    impl TactileFeedback for CountingFeedback {
        fn impact(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn filmography(n: usize) -> Vec<FilmographyEntry> {
        (0..n)
            .map(|i| FilmographyEntry {
                id: 100 + i as TmdbId,
                media_kind: if i % 2 == 0 {
                    MediaKind::Film
                } else {
                    MediaKind::Series
                },
                title: format!("Title {}", i),
                poster_path: Some(format!("/poster{}.jpg", i)),
                release_date: chrono::NaiveDate::from_ymd_opt(2000 + i as i32, 1, 1),
                character: format!("Role {}", i),
            })
            .collect()
    }

    fn deck_session(n: usize, seen: &[TmdbId]) -> (SwipeSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let seen: SeenSet = seen.iter().copied().collect();
        let session = SwipeSession::new(
            filmography(n),
            &seen,
            SwipeConfig::with_screen_width(WIDTH),
            sink.clone(),
        );
        (session, sink)
    }

    /// Drag, release and run the exit animation through removal
    fn swipe(session: &mut SwipeSession, direction: SwipeDirection) -> Option<Decision> {
        let distance = match direction {
            SwipeDirection::Right => WIDTH * 0.6,
            SwipeDirection::Left => -WIDTH * 0.6,
        };
        assert!(session.begin_gesture());
        assert!(session.move_gesture(distance / 2.0));
        assert_eq!(
            session.end_gesture(distance, 0.0),
            Some(Release::Commit(direction))
        );
        let decision = session.advance(Duration::from_millis(300));
        session.advance(FRAME);
        decision
    }

    #[test]
    fn test_deck_is_filmography_minus_seen_in_order() {
        let (session, _) = deck_session(5, &[100, 101, 999]);

        let ids: Vec<TmdbId> = session.deck().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![102, 103, 104]);
        assert_eq!(session.already_seen_count(), 2);
        assert_eq!(session.deck().len() + session.already_seen_count(), 5);
    }

    #[test]
    fn test_swipe_right_on_all_reports_every_entry() {
        let (mut session, sink) = deck_session(10, &[]);

        for _ in 0..10 {
            swipe(&mut session, SwipeDirection::Right);
        }

        assert!(session.is_complete());
        assert_eq!(sink.ids(), (100..110).collect::<Vec<_>>());
        assert_eq!(session.completion_percent(), 100);
    }

    #[test]
    fn test_mixed_swipes_with_prior_seen() {
        let (mut session, sink) = deck_session(5, &[100, 101]);

        swipe(&mut session, SwipeDirection::Right);
        swipe(&mut session, SwipeDirection::Left);
        swipe(&mut session, SwipeDirection::Right);

        assert_eq!(sink.ids(), vec![102, 104]);
        let view = session.view();
        let summary = view.completion.unwrap();
        assert_eq!(summary.seen, 4);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.percent, 80);
    }

    #[test]
    fn test_skip_reports_nothing_and_does_not_count() {
        let (mut session, sink) = deck_session(4, &[]);

        for _ in 0..4 {
            swipe(&mut session, SwipeDirection::Left);
        }

        assert!(session.is_complete());
        assert!(sink.ids().is_empty());
        assert_eq!(session.completion_percent(), 0);
    }

    #[test]
    fn test_report_carries_entry_details() {
        let (mut session, sink) = deck_session(2, &[]);
        swipe(&mut session, SwipeDirection::Right);

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports[0].title, "Title 0");
        assert_eq!(reports[0].media_kind, MediaKind::Film);
        assert_eq!(reports[0].poster_path.as_deref(), Some("/poster0.jpg"));
        assert_eq!(reports[0].release_year, Some(2000));
    }

    #[test]
    fn test_distance_commit_in_drag_direction() {
        let (mut session, _) = deck_session(3, &[]);
        session.begin_gesture();
        assert_eq!(
            session.end_gesture(-WIDTH * 0.45, 10.0),
            Some(Release::Commit(SwipeDirection::Left))
        );
    }

    #[test]
    fn test_velocity_commit_with_short_drag() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.move_gesture(WIDTH * 0.1);
        assert_eq!(
            session.end_gesture(WIDTH * 0.1, 800.0),
            Some(Release::Commit(SwipeDirection::Right))
        );
        session.advance(Duration::from_millis(300));
        assert_eq!(sink.ids(), vec![100]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let (mut session, _) = deck_session(3, &[]);
        session.begin_gesture();
        assert_eq!(
            session.end_gesture(WIDTH * 0.4, 500.0),
            Some(Release::Return)
        );
    }

    #[test]
    fn test_release_below_threshold_returns_to_zero() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.move_gesture(WIDTH * 0.2);
        assert_eq!(session.end_gesture(WIDTH * 0.2, 100.0), Some(Release::Return));
        assert_eq!(session.phase(), GesturePhase::Returning);

        for _ in 0..300 {
            session.advance(FRAME);
            if session.phase() == GesturePhase::Idle {
                break;
            }
        }

        assert_eq!(session.phase(), GesturePhase::Idle);
        assert_eq!(session.displacement(), 0.0);
        assert_eq!(session.cursor(), 0);
        assert!(sink.ids().is_empty());
    }

    #[test]
    fn test_oversized_frame_settles_return() {
        let (mut session, _) = deck_session(3, &[]);
        session.begin_gesture();
        assert_eq!(session.end_gesture(50.0, 0.0), Some(Release::Return));

        assert_eq!(session.advance(Duration::from_millis(u64::MAX)), None);
        assert_eq!(session.phase(), GesturePhase::Idle);
        assert_eq!(session.displacement(), 0.0);
    }

    #[test]
    fn test_velocity_only_commit_at_zero_distance_goes_left() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        assert_eq!(
            session.end_gesture(0.0, 800.0),
            Some(Release::Commit(SwipeDirection::Left))
        );
        session.advance(Duration::from_millis(300));
        assert!(sink.ids().is_empty());
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_duplicate_release_while_committing_is_ignored() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.end_gesture(WIDTH * 0.6, 0.0);

        assert_eq!(session.end_gesture(WIDTH * 0.6, 0.0), None);
        assert!(!session.begin_gesture());
        assert!(!session.move_gesture(10.0));

        session.advance(Duration::from_millis(300));
        assert_eq!(session.end_gesture(WIDTH * 0.6, 0.0), None);
        assert_eq!(sink.ids(), vec![100]);
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_commit_waits_for_exit_animation() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.end_gesture(WIDTH * 0.5, 0.0);

        assert_eq!(session.advance(Duration::from_millis(150)), None);
        assert_eq!(session.cursor(), 0);
        assert!(session.displacement() > WIDTH * 0.5);
        assert!(sink.ids().is_empty());

        let decision = session.advance(Duration::from_millis(150)).unwrap();
        assert_eq!(decision.title_id, 100);
        assert_eq!(decision.index, 0);
        assert_eq!(session.displacement(), WIDTH * 1.5);
    }

    #[test]
    fn test_displacement_reset_after_removal_not_on_commit_frame() {
        let (mut session, _) = deck_session(3, &[]);
        session.begin_gesture();
        session.end_gesture(-WIDTH * 0.5, 0.0);
        session.advance(Duration::from_millis(300));

        assert_eq!(session.cursor(), 1);
        assert_eq!(session.phase(), GesturePhase::Settling);
        assert_eq!(session.displacement(), -WIDTH * 1.5);

        let view = session.view();
        assert_eq!(view.cards[0].id, 101);
        assert_eq!(view.cards[0].transform, CardTransform::REST);
        let exiting = view.exiting.unwrap();
        assert_eq!(exiting.id, 100);
        assert_eq!(exiting.transform.translate_x, -WIDTH * 1.5);
        assert!(!session.begin_gesture());

        session.card_removed();
        assert_eq!(session.phase(), GesturePhase::Idle);
        assert_eq!(session.displacement(), 0.0);
        assert!(session.view().exiting.is_none());
        assert!(session.begin_gesture());
    }

    #[test]
    fn test_feedback_fires_once_per_commit() {
        let feedback = Arc::new(CountingFeedback::default());
        let (session, _) = deck_session(3, &[]);
        let mut session = session.with_feedback(feedback.clone());

        swipe(&mut session, SwipeDirection::Right);
        swipe(&mut session, SwipeDirection::Left);

        assert_eq!(feedback.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_deck_starts_complete() {
        let (mut session, sink) = deck_session(0, &[]);

        assert!(session.is_complete());
        assert!(!session.begin_gesture());

        let view = session.view();
        assert_eq!(view.position, 0);
        assert_eq!(view.total, 0);
        assert!(view.cards.is_empty());
        assert_eq!(
            view.completion,
            Some(CompletionSummary {
                seen: 0,
                total: 0,
                percent: 0
            })
        );
        assert!(sink.ids().is_empty());
    }

    #[test]
    fn test_all_previously_seen_starts_complete_at_100() {
        let (session, _) = deck_session(3, &[100, 101, 102]);
        assert!(session.is_complete());
        assert_eq!(session.completion_percent(), 100);
    }

    #[test]
    fn test_complete_session_rejects_gestures() {
        let (mut session, _) = deck_session(1, &[]);
        swipe(&mut session, SwipeDirection::Right);

        assert!(session.is_complete());
        assert!(!session.begin_gesture());
        assert_eq!(session.end_gesture(WIDTH, 0.0), None);
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_completion_rounds_half_up() {
        // 1 of 8 seen = 12.5%
        let (session, _) = deck_session(8, &[100]);
        assert_eq!(session.completion_percent(), 13);

        // 2 of 3 seen = 66.67%
        let (session, _) = deck_session(3, &[100, 101]);
        assert_eq!(session.completion_percent(), 67);
    }

    #[test]
    fn test_unmount_completes_in_flight_commit() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.end_gesture(WIDTH * 0.6, 0.0);
        session.advance(Duration::from_millis(100));

        let decision = session.unmount().unwrap();
        assert_eq!(decision.direction, SwipeDirection::Right);
        assert_eq!(sink.ids(), vec![100]);
        assert_eq!(session.cursor(), 1);

        let frozen = session.view();
        assert!(session.is_unmounted());
        assert!(!session.begin_gesture());
        assert_eq!(session.advance(Duration::from_secs(1)), None);
        session.card_removed();
        assert_eq!(session.unmount(), None);
        assert_eq!(session.view(), frozen);
        assert_eq!(sink.ids(), vec![100]);
        assert!(!frozen.accepting_input);
    }

    #[test]
    fn test_unmount_mid_drag_reports_nothing() {
        let (mut session, sink) = deck_session(3, &[]);
        session.begin_gesture();
        session.move_gesture(WIDTH);

        assert_eq!(session.unmount(), None);
        assert_eq!(session.end_gesture(WIDTH, 0.0), None);
        assert!(sink.ids().is_empty());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_view_shows_three_cards_with_stack_transforms() {
        let (mut session, _) = deck_session(5, &[]);
        session.begin_gesture();
        session.move_gesture(WIDTH / 2.0);

        let view = session.view();
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 5);
        assert_eq!(view.cards.len(), 3);
        assert_eq!(
            view.cards.iter().map(|c| c.depth).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(view.cards[0].transform.translate_x, WIDTH / 2.0);
        assert_eq!(view.cards[1].transform.translate_x, 0.0);
        assert!((view.cards[1].transform.scale - 0.975).abs() < 1e-9);
        assert_eq!(
            view.cards[0].poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster0.jpg")
        );
        assert!(view.completion.is_none());
    }

    #[test]
    fn test_view_clips_to_deck_end() {
        let (mut session, _) = deck_session(4, &[]);
        swipe(&mut session, SwipeDirection::Left);
        swipe(&mut session, SwipeDirection::Left);

        let view = session.view();
        assert_eq!(view.position, 3);
        assert_eq!(view.cards.len(), 2);
    }

    #[test]
    fn test_cursor_never_exceeds_deck() {
        let (mut session, _) = deck_session(2, &[]);
        for _ in 0..2 {
            swipe(&mut session, SwipeDirection::Right);
        }
        for _ in 0..5 {
            session.begin_gesture();
            session.end_gesture(WIDTH, 0.0);
            session.advance(Duration::from_millis(300));
        }
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.view().position, 2);
    }

    #[test]
    fn test_view_serializes_phase() {
        let (mut session, _) = deck_session(2, &[]);
        assert_eq!(serde_json::to_value(session.view()).unwrap()["phase"], "idle");

        session.begin_gesture();
        session.end_gesture(WIDTH, 0.0);

        let json = serde_json::to_value(session.view()).unwrap();
        assert_eq!(json["phase"]["committing"], "right");
    }
}
