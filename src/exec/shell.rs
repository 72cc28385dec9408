// src/exec/shell.rs

//! Turning a command line into a `std::process::Command`.

use std::process::Command;

/// Characters that only mean something to a shell.
const SHELL_METACHARACTERS: &[char] = &[
    '*', '?', '{', '}', '[', ']', '<', '>', '(', ')', '~', '&', '|', '\\', '$', ';', '\'', '`',
    '"', '\n', '#',
];

/// Words that have to be interpreted by the shell when they start a command.
const SHELL_WORDS: &[&str] = &[
    "!", ".", ":", "break", "case", "continue", "do", "done", "elif", "else", "esac", "eval",
    "exec", "exit", "export", "fi", "for", "if", "in", "readonly", "return", "set", "shift",
    "then", "times", "trap", "unset", "until", "while",
];

/// How a command line will be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Plain `program arg arg`; executed without a shell.
    Direct { program: String, args: Vec<String> },
    /// Anything else; handed to `/bin/sh -c`.
    Shell(String),
}

impl Invocation {
    /// Decide how to launch `command_line`.
    ///
    /// Both forms behave the same for the child. The direct form exists so a
    /// missing executable fails at spawn time with the OS error instead of as
    /// exit code 127 from the shell.
    ///
    /// A shell is needed when:
    /// - the line contains a shell metacharacter anywhere
    /// - the first word contains `=`
    /// - the first word is a reserved word or special built-in (only checked
    ///   when it has no `/`)
    pub fn for_command_line(command_line: &str) -> Self {
        let mut words = command_line.split_whitespace();

        let needs_shell = match words.clone().next() {
            None => true,
            Some(first) => {
                // `NAME=value cmd` is an environment assignment.
                first.contains('=')
                    || (!first.contains('/') && SHELL_WORDS.contains(&first))
                    || command_line.contains(SHELL_METACHARACTERS)
            }
        };

        match words.next() {
            Some(program) if !needs_shell => Invocation::Direct {
                program: program.to_string(),
                args: words.map(str::to_string).collect(),
            },
            _ => Invocation::Shell(command_line.to_string()),
        }
    }

    /// Name reported when spawning fails.
    pub fn program(&self) -> &str {
        match self {
            Invocation::Direct { program, .. } => program,
            Invocation::Shell(_) => "/bin/sh",
        }
    }

    pub fn to_command(&self) -> Command {
        match self {
            Invocation::Direct { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            Invocation::Shell(line) => {
                let mut cmd = Command::new("/bin/sh");
                cmd.arg("-c").arg(line);
                cmd
            }
        }
    }
}
