//! Core domain types for a scan session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which physical camera to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Back camera, pointing away from the user.
    #[default]
    Environment,
    /// Front camera, pointing at the user.
    User,
}

impl Facing {
    /// The other facing mode.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Environment => Facing::User,
            Facing::User => Facing::Environment,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Facing::Environment => "Back camera",
            Facing::User => "Front camera",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Environment => "environment",
            Facing::User => "user",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "environment" | "env" | "back" | "rear" => Ok(Facing::Environment),
            "user" | "front" | "selfie" => Ok(Facing::User),
            _ => Err(format!(
                "Unknown facing mode '{}'. Valid options: environment, user",
                s
            )),
        }
    }
}

/// Observable phase of a session, derived from [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No camera, no result.
    Idle,
    /// Camera open and the sampler ticking.
    Scanning,
    /// Decoded text available, camera closed.
    Result,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Scanning => "Scanning",
            SessionState::Result => "Result",
        }
    }
}

/// Snapshot of the scanner's user-visible state.
///
/// Every mutation happens through [`crate::Scanner`]; front ends read a
/// borrowed or cloned snapshot and render from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Camera open and sampling.
    pub active: bool,
    /// Camera requested on the next start.
    pub facing: Facing,
    /// Message shown in the error banner, if any.
    pub error_message: Option<String>,
    /// Payload of the last successful decode.
    pub decoded_text: Option<String>,
    /// Ticks since the last start that produced a decodable frame.
    pub frames_sampled: u64,
}

impl Session {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }

    /// Derive the state machine phase.
    pub fn state(&self) -> SessionState {
        if self.active {
            SessionState::Scanning
        } else if self.decoded_text.is_some() {
            SessionState::Result
        } else {
            SessionState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_default_is_environment() {
        assert_eq!(Facing::default(), Facing::Environment);
    }

    #[test]
    fn test_facing_flipped() {
        assert_eq!(Facing::Environment.flipped(), Facing::User);
        assert_eq!(Facing::User.flipped(), Facing::Environment);
        assert_eq!(Facing::User.flipped().flipped(), Facing::User);
    }

    #[test]
    fn test_facing_from_str() {
        assert_eq!("environment".parse::<Facing>(), Ok(Facing::Environment));
        assert_eq!("BACK".parse::<Facing>(), Ok(Facing::Environment));
        assert_eq!("user".parse::<Facing>(), Ok(Facing::User));
        assert_eq!("front".parse::<Facing>(), Ok(Facing::User));
        assert!("sideways".parse::<Facing>().is_err());
    }

    #[test]
    fn test_facing_display_round_trips() {
        for facing in [Facing::Environment, Facing::User] {
            assert_eq!(facing.to_string().parse::<Facing>(), Ok(facing));
        }
    }

    #[test]
    fn test_facing_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Facing::User).unwrap(), "\"user\"");
        let parsed: Facing = serde_json::from_str("\"environment\"").unwrap();
        assert_eq!(parsed, Facing::Environment);
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new(Facing::User);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.facing, Facing::User);
        assert!(session.error_message.is_none());
        assert!(session.decoded_text.is_none());
    }

    #[test]
    fn test_session_state_derivation() {
        let mut session = Session::default();
        session.active = true;
        assert_eq!(session.state(), SessionState::Scanning);

        session.active = false;
        session.decoded_text = Some("hello".to_string());
        assert_eq!(session.state(), SessionState::Result);

        // An active camera wins over a stale result.
        session.active = true;
        assert_eq!(session.state(), SessionState::Scanning);
    }

    #[test]
    fn test_error_does_not_change_state() {
        let mut session = Session::default();
        session.error_message = Some("denied".to_string());
        assert_eq!(session.state(), SessionState::Idle);
    }
}
