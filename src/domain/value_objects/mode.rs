use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide switch selecting whether remote calls are attempted at all.
///
/// The controller only stores this value; the CRUD facade and the reconciler
/// enforce the semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Remote-preferred; the local store is a cache and transport-error fallback.
    #[default]
    Online,
    /// No component may contact the remote backend, even with connectivity up.
    Offline,
    /// Local-first; writes go immediate-then-queue-on-failure, reads merge both.
    Hybrid,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Online => "online",
            Mode::Offline => "offline",
            Mode::Hybrid => "hybrid",
        }
    }

    /// Whether this mode permits any remote call at all.
    pub fn allows_remote(&self) -> bool {
        !matches!(self, Mode::Offline)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        match value {
            "offline" => Mode::Offline,
            "hybrid" => Mode::Hybrid,
            _ => Mode::Online,
        }
    }
}
