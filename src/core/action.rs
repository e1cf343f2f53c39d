//! Simulated action commit.
//!
//! Casting the vote or applying the VLAN change is a no-op; the only contract
//! is recording that an action was attempted.

use crate::domain::{Decision, DomainProfile, StateUpdate, WorkItem};

/// Records the simulated side effect of a decision
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    actor: String,
    profile: DomainProfile,
}

impl ActionExecutor {
    pub fn new(profile: &DomainProfile) -> Self {
        Self {
            actor: profile.roles.actor.clone(),
            profile: profile.clone(),
        }
    }

    /// Commit `decision`; never fails.
    ///
    /// `item` may be absent (an `Abstain` reached from an empty fetch), in
    /// which case no item field is read.
    pub fn execute(&self, decision: Option<Decision>, item: Option<&WorkItem>) -> StateUpdate {
        match decision {
            Some(decision) => {
                let detail = match item {
                    Some(item) => self.profile.render_action(&item.title),
                    None => format!("no {} to act on", self.profile.noun),
                };
                StateUpdate::log(format!(
                    "{}: action committed: {} ({})",
                    self.actor, decision, detail
                ))
                .with_action_taken(true)
            }
            None => StateUpdate::log(format!(
                "{}: no decision made, no action taken",
                self.actor
            ))
            .with_action_taken(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_decision_for_item() {
        let executor = ActionExecutor::new(&DomainProfile::governance());
        let item = WorkItem::new("Partner with XYZ", "desc");
        let update = executor.execute(Some(Decision::For), Some(&item));

        assert_eq!(update.action_taken, Some(true));
        assert_eq!(
            update.log,
            ["Voting Agent: action committed: For (simulated vote cast for proposal 'Partner with XYZ')"]
        );
    }

    #[test]
    fn test_abstain_without_item() {
        let executor = ActionExecutor::new(&DomainProfile::governance());
        let update = executor.execute(Some(Decision::Abstain), None);

        assert_eq!(update.action_taken, Some(true));
        assert!(update.log[0].contains("action committed: Abstain"));
        assert!(update.log[0].contains("no proposal to act on"));
    }

    #[test]
    fn test_missing_decision_takes_no_action() {
        let executor = ActionExecutor::new(&DomainProfile::network());
        let update = executor.execute(None, None);

        assert_eq!(update.action_taken, Some(false));
        assert_eq!(
            update.log,
            ["VLAN Configurator: no decision made, no action taken"]
        );
    }
}
