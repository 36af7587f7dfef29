//! Common error infrastructure for effect-core.
//!
//! Two error families exist and neither ever escapes its boundary:
//!
//! - [`ConfigurationError`] is raised while descriptors and modules are built
//!   or registered. A module that fails to build is never registered.
//! - [`HookError`] is raised by callbacks and handler hooks during resolution.
//!   The scheduler catches it at the per-module boundary and records a
//!   [`ModuleFault`]; sibling modules keep resolving.
//!
//! Running out of resource is not an error: `consume_resource` and
//! `try_use_ability` simply return `false`.

use std::fmt;

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The failing unit is skipped for now and retried on a later step.
    ///
    /// Examples: a callback reporting a transient failure
    Recoverable,

    /// Invalid input, rejected without retry.
    ///
    /// Examples: stat modifier without a stat, duplicate module id
    Validation,

    /// Unexpected state inconsistency or a panic inside module code.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug in module code.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all effect-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait EngineError: fmt::Display + fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while building descriptors or registering modules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid module id '{id}': ids must be non-empty ASCII [A-Za-z0-9_]")]
    InvalidModuleId { id: String },

    #[error("module '{id}' is already registered")]
    DuplicateModule { id: String },

    #[error("stat modifier '{effect}' has no stat reference")]
    MissingStat { effect: String },

    #[error("status effect '{effect}' has no status reference")]
    MissingStatus { effect: String },

    #[error("effect '{effect}' has a non-finite value for '{field}'")]
    NonFinite { effect: String, field: &'static str },

    #[error("module '{module}' declares effect id '{effect}' more than once")]
    DuplicateEffect { module: String, effect: String },

    #[error("unknown callback '{name}'")]
    UnknownCallback { name: String },

    #[error("unknown handler '{name}'")]
    UnknownHandler { name: String },

    #[error("catalog is full ({max} modules)")]
    CatalogFull { max: usize },
}

impl EngineError for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidModuleId { .. } => "CONFIG_INVALID_MODULE_ID",
            Self::DuplicateModule { .. } => "CONFIG_DUPLICATE_MODULE",
            Self::MissingStat { .. } => "CONFIG_MISSING_STAT",
            Self::MissingStatus { .. } => "CONFIG_MISSING_STATUS",
            Self::NonFinite { .. } => "CONFIG_NON_FINITE",
            Self::DuplicateEffect { .. } => "CONFIG_DUPLICATE_EFFECT",
            Self::UnknownCallback { .. } => "CONFIG_UNKNOWN_CALLBACK",
            Self::UnknownHandler { .. } => "CONFIG_UNKNOWN_HANDLER",
            Self::CatalogFull { .. } => "CONFIG_CATALOG_FULL",
        }
    }
}

/// Error returned by module callbacks and handler hooks.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl HookError {
    /// Convenience constructor for callback code.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl EngineError for HookError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Failed(_) => ErrorSeverity::Recoverable,
            Self::Panicked(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "HOOK_FAILED",
            Self::Panicked(_) => "HOOK_PANICKED",
        }
    }
}

/// Result type returned by callbacks and handler hooks.
pub type HookResult<T = ()> = Result<T, HookError>;

/// Identifies where inside a module's resolution a fault occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FaultPhase {
    Activate,
    Deactivate,
    LevelChange,
    Tick,
    Attack,
    Hurt,
    Attacked,
    Kill,
    Death,
    Interact,
    Energy,
}

/// A hook failure caught at the per-module isolation boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("module '{module}' failed during {phase}: {error}")]
pub struct ModuleFault {
    pub module: String,
    pub phase: FaultPhase,
    pub error: HookError,
}

impl EngineError for ModuleFault {
    fn severity(&self) -> ErrorSeverity {
        self.error.severity()
    }

    fn error_code(&self) -> &'static str {
        self.error.error_code()
    }
}
