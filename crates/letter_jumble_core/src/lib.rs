pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod prompts;
pub mod queue;
pub mod scoring;
pub mod validator;

pub use domain::{
    Action, GameConfig, GameState, Level, LevelError, Outcome, Resolution, Round, Session,
};
pub use engine::GameEngine;
pub use error::{ErrorKind, GameError};
pub use ports::{Clock, PortError, PortResult, SystemClock, WordLookup, WordSource};
