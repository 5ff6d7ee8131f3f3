use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use letter_jumble_core::{
    prompts, Action, Clock, ErrorKind, GameConfig, GameEngine, GameState, Level, Outcome,
    PortError, PortResult, Resolution, Session, WordLookup, WordSource,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

//=========================================================================================
// Test Doubles
//=========================================================================================

#[derive(Default)]
struct StubSource {
    candidates: Mutex<HashMap<u8, Vec<String>>>,
    dictionary: HashMap<String, Option<String>>,
    fetch_down: AtomicBool,
    verify_down: AtomicBool,
    /// When set, every dictionary lookup takes this many seconds of clock time.
    lookup_delay: Mutex<Option<(Arc<ManualClock>, i64)>>,
}

impl StubSource {
    fn new(dictionary: &[(&str, Option<&str>)]) -> Self {
        Self {
            dictionary: dictionary
                .iter()
                .map(|(w, d)| (w.to_string(), d.map(str::to_string)))
                .collect(),
            ..Self::default()
        }
    }

    fn with_candidates(self, level: u8, words: &[&str]) -> Self {
        self.set_candidates(level, words);
        self
    }

    fn slow_lookups(&self, clock: Arc<ManualClock>, secs: i64) {
        *self.lookup_delay.lock().unwrap() = Some((clock, secs));
    }

    fn set_candidates(&self, level: u8, words: &[&str]) {
        self.candidates
            .lock()
            .unwrap()
            .insert(level, words.iter().map(|w| w.to_string()).collect());
    }
}

#[async_trait]
impl WordSource for StubSource {
    async fn fetch_candidates(&self, level: Level) -> PortResult<Vec<String>> {
        if self.fetch_down.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("fetch down".to_string()));
        }
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .get(&level.value())
            .cloned()
            .unwrap_or_default())
    }

    async fn verify(&self, word: &str) -> PortResult<WordLookup> {
        if let Some((clock, secs)) = self.lookup_delay.lock().unwrap().as_ref() {
            clock.advance_secs(*secs);
        }
        if self.verify_down.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("verify down".to_string()));
        }
        Ok(match self.dictionary.get(&word.to_lowercase()) {
            Some(definition) => WordLookup::found(definition.clone()),
            None => WordLookup::missing(),
        })
    }
}

struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn new() -> Self {
        Self(Mutex::new(Utc::now()))
    }

    fn advance_secs(&self, secs: i64) {
        *self.0.lock().unwrap() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

struct Harness {
    source: Arc<StubSource>,
    clock: Arc<ManualClock>,
    engine: GameEngine,
    session: Session,
}

impl Harness {
    fn new(source: StubSource) -> Self {
        let source = Arc::new(source);
        let clock = Arc::new(ManualClock::new());
        let engine = GameEngine::with_parts(
            source.clone(),
            clock.clone(),
            StdRng::seed_from_u64(17),
            GameConfig::default(),
        );
        let session = engine.new_session();
        Self {
            source,
            clock,
            engine,
            session,
        }
    }

    async fn send(&mut self, action: Action) -> Vec<Outcome> {
        self.engine.transition(&mut self.session, action).await
    }

    async fn play_level(&mut self, level: &str) -> Vec<Outcome> {
        self.send(Action::Start).await;
        self.send(Action::SetLevel(level.to_string())).await
    }

    fn target(&self) -> String {
        self.session.rounds[0].target_word().to_string()
    }
}

fn fruit_source() -> StubSource {
    StubSource::new(&[
        ("lemon", Some("A yellow citrus fruit.")),
        ("melon", Some("A large round fruit.")),
        ("grape", None),
        ("peach", None),
    ])
    .with_candidates(5, &["lemon"])
}

fn guess_result(outcomes: &[Outcome]) -> (bool, u32, u32, Option<ErrorKind>) {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::GuessResult {
                correct,
                score,
                bonus,
                reason,
                ..
            } => Some((*correct, *score, *bonus, *reason)),
            _ => None,
        })
        .expect("no guess result in outcomes")
}

fn error_kind(outcomes: &[Outcome]) -> Option<ErrorKind> {
    outcomes.iter().find_map(|o| match o {
        Outcome::Error { kind, .. } => Some(*kind),
        _ => None,
    })
}

fn sorted(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters
}

//=========================================================================================
// Scenarios
//=========================================================================================

#[tokio::test]
async fn full_game_scenario() {
    let mut h = Harness::new(fruit_source());

    let outcomes = h.send(Action::Start).await;
    assert_eq!(h.session.state, GameState::LevelPending);
    assert_eq!(outcomes[0], Outcome::Prompt(prompts::GAME_OBJECTIVE.to_string()));

    let outcomes = h.send(Action::SetLevel("5".to_string())).await;
    assert_eq!(h.session.state, GameState::Playing);
    assert!(h.session.started);
    match &outcomes[1] {
        Outcome::RoundPresented { letters, ordinal } => {
            assert_eq!(letters.len(), 5);
            assert_eq!(*ordinal, 1);
            assert_eq!(sorted(&letters.iter().collect::<String>()), sorted("lemon"));
        }
        other => panic!("expected a presented round, got {other:?}"),
    }

    let outcomes = h.send(Action::Guess("wrong".to_string())).await;
    assert_eq!(guess_result(&outcomes), (false, 0, 0, None));
    assert_eq!(h.session.state, GameState::Playing);
    assert_eq!(h.session.rounds.len(), 1);
    assert!(!h.session.rounds[0].is_resolved());

    h.clock.advance_secs(9);
    let outcomes = h.send(Action::Guess("melon".to_string())).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 25, None));
    assert_eq!(h.session.state, GameState::RoundResolved);
    assert_eq!(
        h.session.rounds[0].guesses(),
        &["wrong".to_string(), "melon".to_string()]
    );

    let outcomes = h.send(Action::Score).await;
    assert_eq!(
        outcomes,
        vec![
            Outcome::ScoreReport { total: 75 },
            Outcome::Prompt(prompts::score_report(75)),
        ]
    );
}

#[tokio::test]
async fn accepted_anagram_carries_its_definition() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;

    let outcomes = h.send(Action::Guess("melon".to_string())).await;
    assert!(outcomes.iter().any(|o| matches!(
        o,
        Outcome::GuessResult { word: Some(w), definition: Some(d), .. }
            if w == "melon" && d == "A large round fruit."
    )));
}

#[tokio::test]
async fn exact_match_scores_even_when_dictionary_is_down() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;
    h.source.verify_down.store(true, Ordering::SeqCst);

    let outcomes = h.send(Action::Guess("LEMON".to_string())).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 25, None));
    assert_eq!(h.session.rounds[0].resolution(), Some(Resolution::Solved));
}

#[tokio::test]
async fn any_word_in_the_utterance_can_solve_the_round() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;

    let outcomes = h.send(Action::Guess("is it salad or melon".to_string())).await;
    assert!(guess_result(&outcomes).0);
}

#[tokio::test]
async fn letter_match_that_is_not_a_word_closes_the_round() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;

    let outcomes = h.send(Action::Guess("nolem".to_string())).await;
    assert_eq!(guess_result(&outcomes), (false, 0, 0, Some(ErrorKind::NotAWord)));
    assert!(outcomes.iter().any(|o| matches!(
        o,
        Outcome::GuessResult { word: Some(w), .. } if w == "lemon"
    )));
    assert_eq!(h.session.state, GameState::RoundResolved);
    assert_eq!(h.session.rounds[0].resolution(), Some(Resolution::Missed));
    assert_eq!(h.session.total_score(), 0);

    // A resolved round cannot be scored afterwards.
    let outcomes = h.send(Action::Guess("lemon".to_string())).await;
    assert_eq!(outcomes, vec![Outcome::Prompt(prompts::TRY_NEW.to_string())]);
    assert_eq!(h.session.total_score(), 0);
}

#[tokio::test]
async fn dictionary_outage_leaves_the_round_untouched() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;
    h.source.verify_down.store(true, Ordering::SeqCst);

    let outcomes = h.send(Action::Guess("melon".to_string())).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::WordSourceUnavailable));
    assert_eq!(h.session.state, GameState::Playing);
    assert!(h.session.rounds[0].guesses().is_empty());
    assert!(!h.session.rounds[0].is_resolved());

    h.source.verify_down.store(false, Ordering::SeqCst);
    let outcomes = h.send(Action::Guess("melon".to_string())).await;
    assert!(guess_result(&outcomes).0);
}

#[tokio::test]
async fn bonus_decays_with_time() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape", "peach"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;

    h.clock.advance_secs(20);
    let target = h.target();
    let outcomes = h.send(Action::Guess(target)).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 10, None));

    h.send(Action::Confirm).await;
    h.clock.advance_secs(40);
    let target = h.target();
    let outcomes = h.send(Action::Guess(target)).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 0, None));

    assert_eq!(h.session.total_score(), 110);
}

#[tokio::test]
async fn dictionary_latency_does_not_eat_the_bonus() {
    let mut h = Harness::new(fruit_source());
    h.source.slow_lookups(h.clock.clone(), 8);
    h.play_level("5").await;

    // Exact match: only the best-effort definition lookup is slow.
    h.clock.advance_secs(10);
    let outcomes = h.send(Action::Guess("lemon".to_string())).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 25, None));
    assert_eq!(
        h.session.rounds[0].first_correct_guess_at(),
        Some(h.session.rounds[0].presented_at + Duration::seconds(10))
    );

    // Anagram: the verification itself is slow.
    h.source.set_candidates(5, &["lemon", "melon"]);
    h.send(Action::SetLevel("5".to_string())).await;
    assert_eq!(h.target(), "melon");
    h.clock.advance_secs(12);
    let outcomes = h.send(Action::Guess("lemon".to_string())).await;
    assert_eq!(guess_result(&outcomes), (true, 50, 25, None));
}

#[tokio::test]
async fn total_is_sum_of_resolved_rounds() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape", "peach"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;

    h.clock.advance_secs(10);
    let target = h.target();
    h.send(Action::Guess(target)).await;
    h.send(Action::Confirm).await;

    h.clock.advance_secs(20);
    let target = h.target();
    h.send(Action::Guess(target)).await;
    h.send(Action::Confirm).await;

    // Third round left unresolved.
    h.send(Action::Guess("xxxxx".to_string())).await;

    let outcomes = h.send(Action::Score).await;
    assert_eq!(outcomes[0], Outcome::ScoreReport { total: 75 + 60 });
    assert_eq!(h.session.rounds.len(), 3);
}

//=========================================================================================
// Levels
//=========================================================================================

#[tokio::test]
async fn invalid_levels_are_rejected_without_consuming_a_round() {
    let mut h = Harness::new(fruit_source());
    h.send(Action::Start).await;

    let outcomes = h.send(Action::SetLevel("eleven".to_string())).await;
    assert_eq!(
        outcomes,
        vec![Outcome::Error {
            kind: ErrorKind::InvalidLevel,
            message: prompts::INVALID_NUMBER.to_string(),
        }]
    );

    let outcomes = h.send(Action::SetLevel("12".to_string())).await;
    assert_eq!(
        outcomes,
        vec![Outcome::Error {
            kind: ErrorKind::InvalidLevel,
            message: prompts::valid_number_warning(3, 10),
        }]
    );

    assert_eq!(h.session.state, GameState::LevelPending);
    assert!(h.session.rounds.is_empty());
    assert!(!h.session.started);
}

#[tokio::test]
async fn level_change_resets_the_pool() {
    let source = fruit_source()
        .with_candidates(5, &["lemon", "grape", "peach", "mango"])
        .with_candidates(6, &["banana", "cherry", "orange"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    let before = h.target();
    assert_eq!(h.session.remaining_words.len(), 3);

    h.send(Action::SetLevel("6".to_string())).await;
    assert_eq!(h.session.level.value(), 6);
    assert_ne!(h.target(), before);
    assert_eq!(h.target().chars().count(), 6);
    assert_eq!(h.session.remaining_words.len(), 2);

    // History survives the change; the abandoned round counts as skipped.
    assert_eq!(h.session.rounds.len(), 2);
    assert_eq!(h.session.rounds[1].resolution(), Some(Resolution::Skipped));
}

#[tokio::test]
async fn resetting_the_same_level_never_reuses_the_in_progress_word() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape", "peach", "mango"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    let first = h.target();

    h.send(Action::SetLevel("5".to_string())).await;
    let second = h.target();
    assert_ne!(first, second);
    // Four candidates, two presented.
    assert_eq!(h.session.remaining_words.len(), 2);
    assert!(!h.session.remaining_words.contains(&first));
    assert!(!h.session.remaining_words.contains(&second));
}

#[tokio::test]
async fn empty_level_falls_back_to_the_default() {
    let source = fruit_source().with_candidates(7, &["o'clock", "well-to"]);
    let mut h = Harness::new(source);
    h.send(Action::Start).await;

    let outcomes = h.send(Action::SetLevel("7".to_string())).await;
    assert_eq!(outcomes[0], Outcome::Prompt(prompts::difficulty_level(5)));
    assert_eq!(h.session.level.value(), 5);
    assert_eq!(h.session.state, GameState::Playing);
}

#[tokio::test]
async fn fallback_that_also_fails_is_fatal() {
    let mut h = Harness::new(StubSource::new(&[]));
    h.send(Action::Start).await;

    let outcomes = h.send(Action::SetLevel("7".to_string())).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::Fatal));
    assert_eq!(h.session.state, GameState::LevelPending);
    assert!(h.session.rounds.is_empty());
}

#[tokio::test]
async fn unreachable_source_keeps_level_pending() {
    let mut h = Harness::new(fruit_source());
    h.send(Action::Start).await;
    h.source.fetch_down.store(true, Ordering::SeqCst);

    let outcomes = h.send(Action::SetLevel("5".to_string())).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::WordSourceUnavailable));
    assert_eq!(h.session.state, GameState::LevelPending);
    assert!(!h.session.started);
}

//=========================================================================================
// Queue and Navigation
//=========================================================================================

#[tokio::test]
async fn skip_records_a_zero_round_and_moves_on() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape", "peach"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    let skipped = h.target();

    let outcomes = h.send(Action::Skip).await;
    assert_eq!(outcomes[0], Outcome::Prompt(prompts::skipped(&skipped)));
    assert!(matches!(outcomes[1], Outcome::RoundPresented { ordinal: 2, .. }));
    assert_eq!(h.session.state, GameState::Playing);
    assert_eq!(h.session.rounds[1].resolution(), Some(Resolution::Skipped));
    assert_eq!(h.session.total_score(), 0);
}

#[tokio::test]
async fn draining_a_level_presents_each_word_once() {
    let words = ["lemon", "grape", "peach", "mango", "guava"];
    let source = fruit_source().with_candidates(5, &words);
    let mut h = Harness::new(source);
    h.play_level("5").await;

    let mut seen = HashSet::from([h.target()]);
    for _ in 1..words.len() {
        h.send(Action::Skip).await;
        assert!(seen.insert(h.target()), "repeated {}", h.target());
    }
    assert!(h.session.remaining_words.is_empty());
    assert_eq!(seen.len(), words.len());
}

#[tokio::test]
async fn exhausted_queue_reloads_once() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    h.send(Action::Skip).await;
    assert!(h.session.remaining_words.is_empty());

    h.source.set_candidates(5, &["lemon", "grape", "peach"]);
    let outcomes = h.send(Action::Skip).await;
    assert!(error_kind(&outcomes).is_none());
    assert_eq!(h.target(), "peach");
    assert_eq!(h.session.rounds.len(), 3);
}

#[tokio::test]
async fn exhausted_queue_with_nothing_new_is_fatal() {
    let source = fruit_source().with_candidates(5, &["lemon", "grape"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    h.send(Action::Skip).await;

    let outcomes = h.send(Action::Skip).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::Fatal));
    assert_eq!(h.session.state, GameState::LevelPending);
    // History is kept; the round that was showing is closed without points.
    assert_eq!(h.session.rounds.len(), 2);
    assert_eq!(h.session.rounds[0].resolution(), Some(Resolution::Skipped));
    assert_eq!(h.session.total_score(), 0);

    h.source.set_candidates(5, &["peach"]);
    h.send(Action::SetLevel("5".to_string())).await;
    assert_eq!(h.session.state, GameState::Playing);
    assert_eq!(h.target(), "peach");
    assert!(h.session.rounds.iter().skip(1).all(|r| r.is_resolved()));
}

#[tokio::test]
async fn reload_outage_keeps_the_current_round() {
    let source = fruit_source().with_candidates(5, &["lemon"]);
    let mut h = Harness::new(source);
    h.play_level("5").await;
    h.source.fetch_down.store(true, Ordering::SeqCst);

    let outcomes = h.send(Action::Skip).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::WordSourceUnavailable));
    assert_eq!(h.session.state, GameState::Playing);
    assert_eq!(h.session.rounds.len(), 1);
    assert!(!h.session.rounds[0].is_resolved());
}

#[tokio::test]
async fn repeat_never_mutates_the_round() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;
    h.send(Action::Guess("wrong".to_string())).await;
    let before = h.session.rounds[0].clone();

    for _ in 0..5 {
        let outcomes = h.send(Action::Repeat).await;
        assert_eq!(
            outcomes[1],
            Outcome::RoundPresented {
                letters: before.scrambled_letters().to_vec(),
                ordinal: before.ordinal,
            }
        );
    }

    let after = &h.session.rounds[0];
    assert_eq!(after.score(), before.score());
    assert_eq!(after.bonus(), before.bonus());
    assert_eq!(after.guesses(), before.guesses());
    assert_eq!(after.ordinal, before.ordinal);
    assert_eq!(h.session.rounds.len(), 1);
    assert_eq!(h.session.state, GameState::Playing);
}

#[tokio::test]
async fn decline_keeps_guessing_or_ends_the_game() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;

    let outcomes = h.send(Action::Decline).await;
    assert_eq!(outcomes[0], Outcome::Prompt(prompts::KEEP_GUESSING.to_string()));
    assert_eq!(h.session.state, GameState::Playing);

    h.send(Action::Guess("lemon".to_string())).await;
    let outcomes = h.send(Action::Decline).await;
    assert_eq!(outcomes.last(), Some(&Outcome::Ended));
    assert_eq!(h.session.state, GameState::Ended);
}

#[tokio::test]
async fn actions_before_a_level_only_prompt() {
    let mut h = Harness::new(fruit_source());

    let outcomes = h.send(Action::Guess("lemon".to_string())).await;
    assert_eq!(outcomes, vec![Outcome::Prompt(prompts::GAME_OBJECTIVE.to_string())]);

    h.send(Action::Start).await;
    let outcomes = h.send(Action::Skip).await;
    assert_eq!(outcomes, vec![Outcome::Prompt(prompts::choose_level(3, 10))]);
    assert!(h.session.rounds.is_empty());
    assert_eq!(h.session.state, GameState::LevelPending);
}

#[tokio::test]
async fn stop_clears_the_session_for_good() {
    let mut h = Harness::new(fruit_source());
    h.play_level("5").await;
    h.send(Action::Guess("lemon".to_string())).await;

    let outcomes = h.send(Action::Stop).await;
    assert_eq!(outcomes[0], Outcome::ScoreReport { total: 75 });
    assert_eq!(outcomes.last(), Some(&Outcome::Ended));
    assert_eq!(h.session.state, GameState::Ended);
    assert!(h.session.rounds.is_empty());
    assert!(h.session.remaining_words.is_empty());

    let outcomes = h.send(Action::SetLevel("5".to_string())).await;
    assert_eq!(error_kind(&outcomes), Some(ErrorKind::SessionEnded));
    assert_eq!(h.session.state, GameState::Ended);
}

#[tokio::test]
async fn help_is_available_in_every_live_state() {
    let mut h = Harness::new(fruit_source());
    let help = Outcome::Prompt(prompts::help(3, 10));

    assert_eq!(h.send(Action::Help).await, vec![help.clone()]);
    h.play_level("5").await;
    assert_eq!(h.send(Action::Help).await, vec![help]);
    assert_eq!(h.session.state, GameState::Playing);
}
