//! Error types for the economy simulation.
//!
//! Two families live here. [`Rejection`] is a gameplay outcome: the player
//! asked for something the current state does not allow, and nothing was
//! changed. [`GameError`] is an integration failure: bad data files, corrupt
//! snapshots, replays that no longer match.

use thiserror::Error;

use crate::resources::ResourceKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for integration failures around the simulation.
#[derive(Debug, Error)]
pub enum GameError {
    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// The catalog is internally inconsistent.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A command referenced an id the catalog or roster does not contain.
    #[error("Unknown {kind} id: {id}")]
    UnknownId {
        /// What kind of id was looked up ("region", "recipe", ...).
        kind: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Replay playback diverged from the recorded run.
    #[error("Desync detected at tick {tick}: local hash {local_hash}, recorded hash {remote_hash}")]
    DesyncDetected {
        /// World tick where the mismatch was found.
        tick: u64,
        /// Hash produced by playback.
        local_hash: u64,
        /// Hash stored in the replay.
        remote_hash: u64,
    },
}

/// Why a player command was refused.
///
/// A rejected command leaves the economy untouched: no partial deduction,
/// no log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A balance is below what the command costs.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource that fell short (the first one checked).
        resource: ResourceKind,
        /// Amount required.
        required: u64,
        /// Whole amount available.
        available: u64,
    },

    /// The target requires a higher stage.
    #[error("Stage gate not met: requires stage {required_stage}, currently {stage}")]
    GateNotMet {
        /// Stage the target requires.
        required_stage: u32,
        /// Current stage.
        stage: u32,
    },

    /// The fabrication queue has no free slot.
    #[error("Fabrication queue is full ({limit} entries)")]
    QueueFull {
        /// Configured queue limit.
        limit: usize,
    },

    /// A timed operation of the same kind is still running.
    #[error("Another operation is still pending")]
    OperationPending,

    /// Prestige floor not reached.
    #[error("Not eligible: requires stage {required_stage}, currently {stage}")]
    NotEligible {
        /// Minimum stage.
        required_stage: u32,
        /// Current stage.
        stage: u32,
    },

    /// The recipe has not been discovered yet.
    #[error("Recipe blueprint has not been discovered")]
    RecipeLocked,

    /// A required selection was missing (empty infusion slot, empty queue index).
    #[error("Nothing selected in the requested slot")]
    EmptySlot,

    /// Both infusion slots hold the same resource.
    #[error("Infusion requires two different resources")]
    IdenticalSelection,

    /// The bastion is already stationed in the target region.
    #[error("Already stationed in the target region")]
    AlreadyInRegion,
}

impl Rejection {
    /// Short machine-readable code, used by the headless protocol.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientResources { .. } => "insufficient_resources",
            Self::GateNotMet { .. } => "gate_not_met",
            Self::QueueFull { .. } => "queue_full",
            Self::OperationPending => "operation_pending",
            Self::NotEligible { .. } => "not_eligible",
            Self::RecipeLocked => "recipe_locked",
            Self::EmptySlot => "empty_slot",
            Self::IdenticalSelection => "identical_selection",
            Self::AlreadyInRegion => "already_in_region",
        }
    }
}
