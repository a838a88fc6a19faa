//! All-or-Fold actions.

use crate::cfr::game::Action;
use std::fmt;

/// An action in All-or-Fold.
///
/// `Deal` is the single chance action; `Fold` and `AllIn` are the only
/// decisions a player ever makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AofAction {
    /// Give up the hand.
    Fold,
    /// Commit the whole remaining stack.
    AllIn,
    /// Deal the hole cards.
    Deal,
}

/// Legal set at an ordinary decision, in node index order.
pub const DECISION_ACTIONS: [AofAction; 2] = [AofAction::Fold, AofAction::AllIn];

/// Legal set at the chance node.
pub const CHANCE_ACTIONS: [AofAction; 1] = [AofAction::Deal];

impl AofAction {
    /// Upper-case name used in logs and strategy dumps.
    pub fn name(&self) -> &'static str {
        match self {
            AofAction::Fold => "FOLD",
            AofAction::AllIn => "ALL_IN",
            AofAction::Deal => "DEAL",
        }
    }

    /// Index of a decision action within a regret node.
    pub fn decision_index(&self) -> Option<usize> {
        DECISION_ACTIONS.iter().position(|a| a == self)
    }
}

impl Action for AofAction {
    fn label(&self) -> String {
        self.name().to_string()
    }
}

impl fmt::Display for AofAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(AofAction::Fold.label(), "FOLD");
        assert_eq!(AofAction::AllIn.to_string(), "ALL_IN");
        assert_eq!(AofAction::Deal.name(), "DEAL");
    }

    #[test]
    fn test_decision_index() {
        assert_eq!(AofAction::Fold.decision_index(), Some(0));
        assert_eq!(AofAction::AllIn.decision_index(), Some(1));
        assert_eq!(AofAction::Deal.decision_index(), None);
    }
}
