//! Command-safety classification.
//!
//! [`classify`] recognises shell commands that only read state (listing,
//! searching, printing files, read-only git subcommands). It is a pure
//! function: no I/O, no configuration, and an unknown command simply yields
//! `None`.

pub mod command;

pub use command::Command;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Why a command was considered safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeCommand {
    /// Human-readable description, e.g. "List directory".
    pub label: String,
    /// Risk group tag, e.g. "Searching".
    pub group: String,
}

impl SafeCommand {
    fn new(label: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            group: group.into(),
        }
    }
}

/// Executables that are safe regardless of their arguments.
const SAFE_PROGRAMS: &[(&str, &str, &str)] = &[
    ("cd", "Change directory", "Navigating"),
    ("ls", "List directory", "Searching"),
    ("pwd", "Print working directory", "Navigating"),
    ("true", "No-op", "Utility"),
    ("echo", "Echo string", "Printing"),
    ("cat", "View file contents", "Reading files"),
    ("nl", "View file with line numbers", "Reading files"),
    ("rg", "Ripgrep search", "Searching"),
    ("grep", "Text search", "Searching"),
    ("head", "Show file head", "Reading files"),
    ("tail", "Show file tail", "Reading files"),
    ("wc", "Word count", "Reading files"),
    ("which", "Locate command", "Searching"),
];

const READ_ONLY_GIT_SUBCOMMANDS: &[&str] = &["status", "branch", "log", "diff", "show"];

/// `find` options that run commands or write files.
const UNSAFE_FIND_OPTIONS: &[&str] = &[
    "-exec", "-execdir", "-ok", "-okdir", "-delete", "-fls", "-fprint", "-fprint0", "-fprintf",
];

/// Classify a command. Rules are checked in order and the first match wins.
pub fn classify(command: &Command) -> Option<SafeCommand> {
    let program = command.program();

    if let Some((_, label, group)) = SAFE_PROGRAMS.iter().find(|(name, _, _)| *name == program) {
        return Some(SafeCommand::new(*label, *group));
    }

    match program {
        "git" => {
            let sub = command.arg(1)?;
            READ_ONLY_GIT_SUBCOMMANDS
                .contains(&sub)
                .then(|| SafeCommand::new(format!("Git {sub}"), "Using git"))
        }
        "cargo" if command.arg(1) == Some("check") => {
            Some(SafeCommand::new("Cargo check", "Running command"))
        }
        "find" => {
            let writes = command
                .tokens()
                .iter()
                .any(|token| UNSAFE_FIND_OPTIONS.contains(&token.as_str()));
            (!writes).then(|| SafeCommand::new("Find files", "Searching"))
        }
        "sed" if command.arg(1) == Some("-n") && command.arg(2).is_some_and(is_line_range_print) => {
            Some(SafeCommand::new("Sed print subset", "Reading files"))
        }
        _ => None,
    }
}

/// Matches `sed -n` scripts of the form `Np` or `N,Mp`.
fn is_line_range_print(script: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d+,)?\d+p$").expect("static regex"))
        .is_match(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(tokens: &[&str]) -> Command {
        Command::new(tokens.iter().copied()).unwrap()
    }

    fn label_of(tokens: &[&str]) -> Option<String> {
        classify(&cmd(tokens)).map(|safe| safe.label)
    }

    #[test]
    fn every_table_entry_is_safe_with_any_arguments() {
        for (program, label, group) in SAFE_PROGRAMS {
            let safe = classify(&cmd(&[*program, "--whatever", "x"])).unwrap();
            assert_eq!(safe.label, *label);
            assert_eq!(safe.group, *group);
        }
    }

    #[test]
    fn ls_is_a_search() {
        assert_eq!(
            classify(&cmd(&["ls", "-la"])),
            Some(SafeCommand::new("List directory", "Searching"))
        );
    }

    #[test]
    fn read_only_git_subcommands() {
        for sub in READ_ONLY_GIT_SUBCOMMANDS {
            let safe = classify(&cmd(&["git", *sub])).unwrap();
            assert_eq!(safe.label, format!("Git {sub}"));
            assert_eq!(safe.group, "Using git");
        }
        assert_eq!(label_of(&["git", "push"]), None);
        assert_eq!(label_of(&["git", "checkout", "main"]), None);
        assert_eq!(label_of(&["git"]), None);
    }

    #[test]
    fn only_cargo_check_is_safe() {
        assert_eq!(label_of(&["cargo", "check"]).as_deref(), Some("Cargo check"));
        assert_eq!(label_of(&["cargo", "build"]), None);
        assert_eq!(label_of(&["cargo"]), None);
    }

    #[test]
    fn find_without_actions_is_safe() {
        assert_eq!(
            label_of(&["find", ".", "-name", "*.rs"]).as_deref(),
            Some("Find files")
        );
    }

    #[test]
    fn find_with_any_action_is_not_safe() {
        for option in UNSAFE_FIND_OPTIONS {
            assert_eq!(label_of(&["find", ".", *option, "x"]), None, "{option}");
        }
        assert_eq!(label_of(&["find", ".", "-delete"]), None);
    }

    #[test]
    fn sed_line_range_print() {
        assert_eq!(
            label_of(&["sed", "-n", "5p", "file.txt"]).as_deref(),
            Some("Sed print subset")
        );
        assert_eq!(
            label_of(&["sed", "-n", "3,10p", "file.txt"]).as_deref(),
            Some("Sed print subset")
        );
    }

    #[test]
    fn sed_other_scripts_are_not_safe() {
        assert_eq!(label_of(&["sed", "-n", "abc", "file.txt"]), None);
        assert_eq!(label_of(&["sed", "-n", "1,p"]), None);
        assert_eq!(label_of(&["sed", "-n", "5p;w out"]), None);
        assert_eq!(label_of(&["sed", "-i", "5p", "file.txt"]), None);
        assert_eq!(label_of(&["sed", "-n"]), None);
    }

    #[test]
    fn unknown_programs_do_not_match() {
        assert_eq!(label_of(&["rm", "-rf", "/"]), None);
        assert_eq!(label_of(&["LS"]), None);
        assert_eq!(label_of(&["/bin/ls"]), None);
    }
}
