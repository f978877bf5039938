//! Interactive confirmation before instance actions.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::ui::icons::WARN;
use panel_common::{InstanceAction, confirm_message, confirm_title};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Approved,
    Rejected,
}

pub struct ActionGate {
    /// Skip prompts (`--yes`)
    pub assume_yes: bool,
}

impl ActionGate {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Show the action's confirmation text and ask. Destructive actions also
    /// require typing the instance name.
    pub fn check_action(&self, action: InstanceAction, instance_name: &str) -> Result<GateDecision> {
        println!();
        println!("{}", style(confirm_title(action.as_str())).bold());
        println!("{}", confirm_message(action.as_str(), instance_name));
        println!();

        if self.assume_yes {
            println!("  {} (--yes flag)", style("Auto-approved").dim());
            return Ok(GateDecision::Approved);
        }

        let theme = ColorfulTheme::default();
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt("Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(GateDecision::Rejected);
        }

        if action.is_destructive() {
            println!("{}{}", WARN, style("This cannot be undone.").red().bold());
            let typed: String = Input::with_theme(&theme)
                .with_prompt(format!("Type {} to confirm", style(instance_name).bold()))
                .allow_empty(true)
                .interact_text()?;
            return Ok(typed_name_decision(&typed, instance_name));
        }

        Ok(GateDecision::Approved)
    }

    /// Yes/no prompt for anything outside the action registry.
    pub fn confirm(&self, prompt: &str) -> Result<GateDecision> {
        if self.assume_yes {
            return Ok(GateDecision::Approved);
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(if confirmed {
            GateDecision::Approved
        } else {
            GateDecision::Rejected
        })
    }
}

fn typed_name_decision(typed: &str, instance_name: &str) -> GateDecision {
    if typed.trim() == instance_name {
        GateDecision::Approved
    } else {
        GateDecision::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_skips_prompt() {
        let gate = ActionGate::new(true);
        assert_eq!(
            gate.check_action(InstanceAction::Delete, "panel4").unwrap(),
            GateDecision::Approved
        );
        assert_eq!(gate.confirm("Create?").unwrap(), GateDecision::Approved);
    }

    #[test]
    fn test_typed_name_must_match_exactly() {
        assert_eq!(typed_name_decision("panel4", "panel4"), GateDecision::Approved);
        assert_eq!(typed_name_decision(" panel4 ", "panel4"), GateDecision::Approved);
        assert_eq!(typed_name_decision("Panel4", "panel4"), GateDecision::Rejected);
        assert_eq!(typed_name_decision("", "panel4"), GateDecision::Rejected);
    }
}
