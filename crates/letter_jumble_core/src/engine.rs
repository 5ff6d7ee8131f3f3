//! crates/letter_jumble_core/src/engine.rs
//!
//! The session state machine. Every conversational turn goes through
//! [`GameEngine::transition`], which consults the word queue, the validator,
//! the scoring rules and the word source, and returns outcomes to render.
//!
//! Word source calls always happen before the session is mutated, so a
//! transition future dropped mid-call leaves the session as it was.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::domain::{
    Action, GameConfig, GameState, Level, LevelError, Outcome, Resolution, Session,
};
use crate::error::{ErrorKind, GameError};
use crate::ports::{Clock, SystemClock, WordSource};
use crate::prompts;
use crate::queue;
use crate::scoring;
use crate::validator::{extract_guesses, is_exact_match, is_letter_compatible};

/// How a guess utterance was judged against the active round.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Accepted {
        word: String,
        definition: Option<String>,
    },
    NotAWord {
        guess: String,
    },
    Mismatch,
}

/// Shared across sessions; holds no per-session state.
pub struct GameEngine {
    word_source: Arc<dyn WordSource>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    config: GameConfig,
}

impl GameEngine {
    /// Creates an engine on the wall clock with an OS-seeded generator.
    pub fn new(word_source: Arc<dyn WordSource>, config: GameConfig) -> Self {
        Self::with_parts(word_source, Arc::new(SystemClock), StdRng::from_os_rng(), config)
    }

    pub fn with_parts(
        word_source: Arc<dyn WordSource>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
        config: GameConfig,
    ) -> Self {
        Self {
            word_source,
            clock,
            rng: Mutex::new(rng),
            config,
        }
    }

    pub fn new_session(&self) -> Session {
        Session::new(self.config.default_level(), self.clock.now())
    }

    /// Applies one action to the session and returns what to tell the player.
    pub async fn transition(&self, session: &mut Session, action: Action) -> Vec<Outcome> {
        debug!(session_id = %session.id, state = ?session.state, ?action, "Applying action");
        match self.dispatch(session, action).await {
            Ok(outcomes) => outcomes,
            Err(err) => self.recover(session, err),
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        action: Action,
    ) -> Result<Vec<Outcome>, GameError> {
        if session.state == GameState::Ended {
            return Err(GameError::SessionEnded);
        }

        match action {
            Action::Start => Ok(self.start(session)),
            Action::SetLevel(raw) => self.set_level(session, &raw).await,
            Action::Guess(text) => self.guess(session, &text).await,
            Action::Repeat => Ok(self.repeat(session)),
            Action::Skip => self.skip(session).await,
            Action::Confirm => self.confirm(session).await,
            Action::Decline => Ok(self.decline(session)),
            Action::Score => {
                let total = session.total_score();
                Ok(vec![
                    Outcome::ScoreReport { total },
                    Outcome::Prompt(prompts::score_report(total)),
                ])
            }
            Action::Help => Ok(vec![Outcome::Prompt(prompts::help(
                self.config.min_level(),
                self.config.max_level(),
            ))]),
            Action::Stop => Ok(self.stop(session)),
        }
    }

    /// Turns an error into outcomes. Only `Fatal` touches the session.
    fn recover(&self, session: &mut Session, err: GameError) -> Vec<Outcome> {
        let kind = err.kind();
        let message = match (&err, kind) {
            (GameError::InvalidLevel(LevelError::OutOfRange { min, max, .. }), _) => {
                prompts::valid_number_warning(*min, *max)
            }
            (_, ErrorKind::InvalidLevel) => prompts::INVALID_NUMBER.to_string(),
            (_, ErrorKind::WordSourceUnavailable) => {
                warn!(session_id = %session.id, "Word source call failed: {}", err);
                prompts::TRY_AGAIN.to_string()
            }
            (_, ErrorKind::SessionEnded) => prompts::SESSION_ENDED.to_string(),
            _ => {
                error!(session_id = %session.id, "Resetting session after error: {}", err);
                if let Some(round) = session.active_round_mut() {
                    if let Err(close_err) = round.close(Resolution::Skipped) {
                        warn!("Could not close round during reset: {}", close_err);
                    }
                }
                session.remaining_words.clear();
                session.state = GameState::LevelPending;
                return vec![
                    Outcome::Error {
                        kind: ErrorKind::Fatal,
                        message: prompts::ERROR.to_string(),
                    },
                    self.choose_level_prompt(),
                ];
            }
        };
        vec![Outcome::Error { kind, message }]
    }

    //=====================================================================================
    // Action Handlers
    //=====================================================================================

    fn start(&self, session: &mut Session) -> Vec<Outcome> {
        match session.state {
            GameState::Uninitialized | GameState::LevelPending => {
                session.state = GameState::LevelPending;
                vec![
                    Outcome::Prompt(prompts::GAME_OBJECTIVE.to_string()),
                    self.choose_level_prompt(),
                ]
            }
            _ => vec![Outcome::Prompt(prompts::GAME_OBJECTIVE.to_string())],
        }
    }

    async fn set_level(&self, session: &mut Session, raw: &str) -> Result<Vec<Outcome>, GameError> {
        let requested = self.config.parse_level(raw)?;
        let default = self.config.default_level();

        let (level, pool) = match self.load_pool(session, requested).await {
            Ok(pool) => (requested, pool),
            Err(GameError::EmptyCandidateSet(_)) if requested != default => {
                warn!(
                    "No usable words for level {}, falling back to level {}",
                    requested, default
                );
                (default, self.load_pool(session, default).await?)
            }
            Err(err) => return Err(err),
        };

        // Everything below is synchronous; the session is only touched from here on.
        if let Some(round) = session.active_round_mut() {
            round.close(Resolution::Skipped)?;
        }
        session.level = level;
        session.remaining_words = pool;
        session.started = true;
        let presented = self.present_next(session)?;
        session.state = GameState::Playing;

        info!(session_id = %session.id, "Level set to {}", level);
        Ok(vec![Outcome::Prompt(prompts::difficulty_level(level)), presented])
    }

    async fn guess(&self, session: &mut Session, text: &str) -> Result<Vec<Outcome>, GameError> {
        match session.state {
            GameState::Playing => {}
            GameState::RoundResolved => {
                return Ok(vec![Outcome::Prompt(prompts::TRY_NEW.to_string())])
            }
            _ => return Ok(self.not_started(session)),
        }

        let (target, presented_at) = {
            let round = session.active_round().ok_or(GameError::NoActiveRound)?;
            (round.target_word().to_string(), round.presented_at)
        };

        // The guess is timed when it arrives; dictionary latency is not the player's.
        let now = self.clock.now();
        let verdict = self.judge(text, &target).await?;

        let round = session.active_round_mut().ok_or(GameError::NoActiveRound)?;
        round.record_guess(text);

        let outcomes = match verdict {
            Verdict::Accepted { word, definition } => {
                let (score, bonus) = scoring::score_guess(&word, presented_at, now);
                round.award(now, score, bonus)?;
                info!(
                    session_id = %session.id,
                    "Round solved with '{}' for {} + {} points", word, score, bonus
                );
                let definition_prompt = prompts::word_definition(&word, definition.as_deref());
                session.state = GameState::RoundResolved;
                vec![
                    Outcome::GuessResult {
                        correct: true,
                        score,
                        bonus,
                        word: Some(word),
                        definition,
                        reason: None,
                    },
                    Outcome::Prompt(prompts::success(score + bonus)),
                    Outcome::Prompt(definition_prompt),
                    Outcome::Prompt(prompts::TRY_NEW.to_string()),
                ]
            }
            Verdict::NotAWord { guess } => {
                round.close(Resolution::Missed)?;
                info!(session_id = %session.id, "'{}' is not a word; round closed", guess);
                session.state = GameState::RoundResolved;
                vec![
                    Outcome::GuessResult {
                        correct: false,
                        score: 0,
                        bonus: 0,
                        word: Some(target.clone()),
                        definition: None,
                        reason: Some(ErrorKind::NotAWord),
                    },
                    Outcome::Prompt(prompts::not_a_word(&guess)),
                    Outcome::Prompt(prompts::failure(&target)),
                    Outcome::Prompt(prompts::TRY_NEW.to_string()),
                ]
            }
            Verdict::Mismatch => vec![
                Outcome::GuessResult {
                    correct: false,
                    score: 0,
                    bonus: 0,
                    word: None,
                    definition: None,
                    reason: None,
                },
                Outcome::Prompt(prompts::INCORRECT.to_string()),
                Outcome::Prompt(prompts::TRY_NEW.to_string()),
            ],
        };
        Ok(outcomes)
    }

    fn repeat(&self, session: &Session) -> Vec<Outcome> {
        match (session.state, session.current_round()) {
            (GameState::Playing | GameState::RoundResolved, Some(round)) => vec![
                Outcome::Prompt(prompts::PRE_LETTER_ANNOUNCE.to_string()),
                Outcome::RoundPresented {
                    letters: round.scrambled_letters().to_vec(),
                    ordinal: round.ordinal,
                },
            ],
            _ => self.not_started(session),
        }
    }

    async fn skip(&self, session: &mut Session) -> Result<Vec<Outcome>, GameError> {
        match session.state {
            GameState::Playing | GameState::RoundResolved => self.advance(session).await,
            _ => Ok(self.not_started(session)),
        }
    }

    async fn confirm(&self, session: &mut Session) -> Result<Vec<Outcome>, GameError> {
        // "Yes" to "try a new word?" moves on whether or not the round was solved.
        self.skip(session).await
    }

    fn decline(&self, session: &mut Session) -> Vec<Outcome> {
        match session.state {
            GameState::Playing => {
                let mut outcomes = vec![Outcome::Prompt(prompts::KEEP_GUESSING.to_string())];
                if let Some(round) = session.current_round() {
                    outcomes.push(Outcome::RoundPresented {
                        letters: round.scrambled_letters().to_vec(),
                        ordinal: round.ordinal,
                    });
                }
                outcomes
            }
            GameState::RoundResolved => self.stop(session),
            _ => self.not_started(session),
        }
    }

    fn stop(&self, session: &mut Session) -> Vec<Outcome> {
        let total = session.total_score();
        info!(session_id = %session.id, "Session ended with {} points", total);
        session.clear();
        session.state = GameState::Ended;
        vec![
            Outcome::ScoreReport { total },
            Outcome::Prompt(prompts::GOODBYE.to_string()),
            Outcome::Ended,
        ]
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    /// Closes the active round as skipped (if any) and presents the next word,
    /// reloading the current level's candidates once when the queue is exhausted.
    async fn advance(&self, session: &mut Session) -> Result<Vec<Outcome>, GameError> {
        let reloaded = if session.remaining_words.is_empty() {
            info!(session_id = %session.id, "Queue exhausted, reloading level {}", session.level);
            Some(self.load_pool(session, session.level).await?)
        } else {
            None
        };

        let mut outcomes = Vec::new();
        if let Some(round) = session.active_round_mut() {
            round.close(Resolution::Skipped)?;
            outcomes.push(Outcome::Prompt(prompts::skipped(round.target_word())));
        }
        if let Some(pool) = reloaded {
            session.remaining_words = pool;
        }
        outcomes.push(self.present_next(session)?);
        session.state = GameState::Playing;
        Ok(outcomes)
    }

    async fn judge(&self, text: &str, target: &str) -> Result<Verdict, GameError> {
        let candidates = extract_guesses(text);

        if candidates.iter().any(|c| is_exact_match(c, target)) {
            // The target was vetted when it was loaded; the definition is a nicety.
            let definition = match self.word_source.define(target).await {
                Ok(definition) => definition,
                Err(err) => {
                    warn!("Could not fetch a definition for '{}': {}", target, err);
                    None
                }
            };
            return Ok(Verdict::Accepted {
                word: target.to_string(),
                definition,
            });
        }

        let mut rejected = None;
        for candidate in candidates.iter().filter(|c| is_letter_compatible(c, target)) {
            let lookup = self.word_source.verify(candidate).await?;
            if lookup.exists {
                return Ok(Verdict::Accepted {
                    word: candidate.clone(),
                    definition: lookup.definition,
                });
            }
            rejected.get_or_insert_with(|| candidate.clone());
        }

        Ok(match rejected {
            Some(guess) => Verdict::NotAWord { guess },
            None => Verdict::Mismatch,
        })
    }

    async fn load_pool(&self, session: &Session, level: Level) -> Result<VecDeque<String>, GameError> {
        let candidates = queue::load_candidates(self.word_source.as_ref(), level).await?;
        let mut rng = self.rng();
        queue::prepare_pool(session, level, candidates, &mut *rng)
    }

    fn present_next(&self, session: &mut Session) -> Result<Outcome, GameError> {
        let now = self.clock.now();
        let mut rng = self.rng();
        let round = queue::next_round(session, &mut *rng, now)?;
        debug!("Presenting round {} ({} letters)", round.ordinal, round.scrambled_letters().len());
        Ok(Outcome::RoundPresented {
            letters: round.scrambled_letters().to_vec(),
            ordinal: round.ordinal,
        })
    }

    fn not_started(&self, session: &Session) -> Vec<Outcome> {
        match session.state {
            GameState::LevelPending => vec![self.choose_level_prompt()],
            _ => vec![Outcome::Prompt(prompts::GAME_OBJECTIVE.to_string())],
        }
    }

    fn choose_level_prompt(&self) -> Outcome {
        Outcome::Prompt(prompts::choose_level(
            self.config.min_level(),
            self.config.max_level(),
        ))
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
