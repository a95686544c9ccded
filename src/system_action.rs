//! System control panel actions.
//!
//! Each actionable menu entry maps to exactly one literal command line. The
//! command lines target Windows and its stock launchers; they are run as-is
//! by [`crate::process::spawn_detached`].

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Label of the placeholder entry at the top of the menu.
pub const PLACEHOLDER_LABEL: &str = "Select Action";

/// Home page opened by [`SystemAction::OpenBrowser`].
pub const BROWSER_HOME_URL: &str = "http://www.google.com";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum SystemAction {
    #[strum(to_string = "Shutdown")]
    Shutdown,
    #[strum(to_string = "Log Off")]
    LogOff,
    #[strum(to_string = "Sleep")]
    Sleep,
    #[strum(to_string = "Open Notepad")]
    OpenNotepad,
    #[strum(to_string = "Open Calculator")]
    OpenCalculator,
    #[strum(to_string = "Open Browser")]
    OpenBrowser,
    /// Nothing selected.
    #[strum(to_string = "Select Action")]
    None,
}

/// What to run for an action, and whether to ask first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCommand {
    pub command_line: String,
    pub requires_confirmation: bool,
}

impl SystemAction {
    /// The six actionable entries, in menu order.
    pub fn menu() -> impl Iterator<Item = SystemAction> {
        SystemAction::iter().filter(|a| *a != SystemAction::None)
    }

    /// Human-readable label, as shown in the menu.
    pub fn label(self) -> String {
        self.to_string()
    }

    /// Kebab-case name used on the command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::LogOff => "log-off",
            Self::Sleep => "sleep",
            Self::OpenNotepad => "open-notepad",
            Self::OpenCalculator => "open-calculator",
            Self::OpenBrowser => "open-browser",
            Self::None => "none",
        }
    }

    /// Map a menu label or CLI name to an action. Case and surrounding
    /// whitespace are ignored; the placeholder and unknown names give
    /// [`SystemAction::None`].
    pub fn from_label(label: &str) -> SystemAction {
        let wanted = label.trim();
        Self::menu()
            .find(|a| {
                a.label().eq_ignore_ascii_case(wanted) || a.cli_name().eq_ignore_ascii_case(wanted)
            })
            .unwrap_or(SystemAction::None)
    }

    /// Confirmation question for actions that need one.
    pub fn confirmation_prompt(self) -> String {
        format!("Are you sure you want to {}?", self.label())
    }

    /// Look up the command for this action. `None` gives `None`.
    pub fn command(self) -> Option<SystemCommand> {
        let (command_line, requires_confirmation) = match self {
            Self::Shutdown => ("shutdown -s -t 0".to_string(), true),
            Self::LogOff => ("shutdown -l".to_string(), true),
            Self::Sleep => (
                "Rundll32.exe powrprof.dll,SetSuspendState Sleep".to_string(),
                true,
            ),
            Self::OpenNotepad => ("notepad".to_string(), false),
            Self::OpenCalculator => ("calc".to_string(), false),
            Self::OpenBrowser => (
                format!("rundll32 url.dll,FileProtocolHandler {BROWSER_HOME_URL}"),
                false,
            ),
            Self::None => return None,
        };
        Some(SystemCommand {
            command_line,
            requires_confirmation,
        })
    }
}

/// Command for an action, rejecting [`SystemAction::None`].
pub fn command_for(action: SystemAction) -> Result<SystemCommand> {
    action.command().ok_or(DeskError::NoActionSelected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_only_for_power_actions() {
        for action in SystemAction::menu() {
            let cmd = command_for(action).unwrap();
            let expected = matches!(
                action,
                SystemAction::Shutdown | SystemAction::LogOff | SystemAction::Sleep
            );
            assert_eq!(cmd.requires_confirmation, expected, "{action}");
        }
    }

    #[test]
    fn literal_command_lines() {
        assert_eq!(
            command_for(SystemAction::Shutdown).unwrap().command_line,
            "shutdown -s -t 0"
        );
        assert_eq!(
            command_for(SystemAction::LogOff).unwrap().command_line,
            "shutdown -l"
        );
        assert_eq!(
            command_for(SystemAction::Sleep).unwrap().command_line,
            "Rundll32.exe powrprof.dll,SetSuspendState Sleep"
        );
        assert_eq!(
            command_for(SystemAction::OpenNotepad).unwrap().command_line,
            "notepad"
        );
        assert_eq!(
            command_for(SystemAction::OpenCalculator).unwrap().command_line,
            "calc"
        );
        assert_eq!(
            command_for(SystemAction::OpenBrowser).unwrap().command_line,
            "rundll32 url.dll,FileProtocolHandler http://www.google.com"
        );
    }

    #[test]
    fn none_is_rejected() {
        assert!(SystemAction::None.command().is_none());
        assert!(matches!(
            command_for(SystemAction::None),
            Err(DeskError::NoActionSelected)
        ));
    }

    #[test]
    fn menu_has_six_entries_in_order() {
        let labels: Vec<String> = SystemAction::menu().map(SystemAction::label).collect();
        assert_eq!(
            labels,
            [
                "Shutdown",
                "Log Off",
                "Sleep",
                "Open Notepad",
                "Open Calculator",
                "Open Browser"
            ]
        );
    }

    #[test]
    fn labels_and_cli_names_parse() {
        assert_eq!(SystemAction::from_label("Log Off"), SystemAction::LogOff);
        assert_eq!(SystemAction::from_label("log off"), SystemAction::LogOff);
        assert_eq!(SystemAction::from_label("log-off"), SystemAction::LogOff);
        assert_eq!(
            SystemAction::from_label("  OPEN-CALCULATOR "),
            SystemAction::OpenCalculator
        );
        for action in SystemAction::menu() {
            assert_eq!(SystemAction::from_label(&action.label()), action);
            assert_eq!(SystemAction::from_label(action.cli_name()), action);
        }
    }

    #[test]
    fn placeholder_and_unknown_are_none() {
        assert_eq!(SystemAction::from_label(PLACEHOLDER_LABEL), SystemAction::None);
        assert_eq!(SystemAction::from_label("reboot"), SystemAction::None);
        assert_eq!(SystemAction::from_label(""), SystemAction::None);
    }

    #[test]
    fn prompt_uses_label() {
        assert_eq!(
            SystemAction::LogOff.confirmation_prompt(),
            "Are you sure you want to Log Off?"
        );
    }

    #[test]
    fn command_is_idempotent() {
        assert_eq!(
            command_for(SystemAction::Sleep).unwrap(),
            command_for(SystemAction::Sleep).unwrap()
        );
    }
}
