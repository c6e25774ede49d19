//! Lifecycle states for a store generation's controller.
//!
//! A generation moves forward only: it installs, optionally waits for the
//! previous generation to release its consumers, serves requests while
//! active, and is finally superseded by a newer generation. Transitions
//! never go backwards.

/// Controller state for the engine's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Precache in progress; the generation serves nothing yet.
    Installing,
    /// Installed but inert until the old generation has no consumers.
    Waiting,
    /// Current generation; serves every intercepted request.
    Active,
    /// A newer generation has taken over; observed by the replaced
    /// instance when its host swaps it out.
    Superseded,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Waiting => "waiting",
            LifecycleState::Active => "active",
            LifecycleState::Superseded => "superseded",
        }
    }

    /// Whether `next` is a legal forward transition from `self`.
    ///
    /// Installing may jump straight to Active when the skip-waiting
    /// override is set.
    pub fn may_advance_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Installing, Waiting) | (Installing, Active) | (Waiting, Active) | (Active, Superseded)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(LifecycleState::Installing.may_advance_to(LifecycleState::Waiting));
        assert!(LifecycleState::Installing.may_advance_to(LifecycleState::Active));
        assert!(LifecycleState::Waiting.may_advance_to(LifecycleState::Active));
        assert!(LifecycleState::Active.may_advance_to(LifecycleState::Superseded));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!LifecycleState::Active.may_advance_to(LifecycleState::Waiting));
        assert!(!LifecycleState::Active.may_advance_to(LifecycleState::Installing));
        assert!(!LifecycleState::Superseded.may_advance_to(LifecycleState::Active));
        assert!(!LifecycleState::Waiting.may_advance_to(LifecycleState::Installing));
    }

    #[test]
    fn test_as_str() {
        assert_eq!(LifecycleState::Waiting.as_str(), "waiting");
    }
}
