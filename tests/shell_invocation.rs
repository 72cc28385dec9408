// tests/shell_invocation.rs

use monitored_cron::exec::Invocation;

#[test]
fn test_plain_command_line_is_executed_directly() {
    assert_eq!(
        Invocation::for_command_line("  /usr/bin/backup  --full /srv "),
        Invocation::Direct {
            program: "/usr/bin/backup".into(),
            args: vec!["--full".into(), "/srv".into()],
        }
    );
}

#[test]
fn test_metacharacters_need_a_shell() {
    for line in [
        "echo hi > /tmp/out",
        "ls | wc -l",
        "echo $HOME",
        r#"echo "OK""#,
        "true && false",
        "FOO=bar env",
        "FOO=bar",
        "ls ~",
        "echo a; echo b",
    ] {
        assert_eq!(
            Invocation::for_command_line(line),
            Invocation::Shell(line.to_string()),
            "{line}"
        );
    }
}

#[test]
fn test_leading_shell_word_needs_a_shell() {
    for line in ["exit 3", "exec true", ". ./env.sh", "if true"] {
        assert!(
            matches!(Invocation::for_command_line(line), Invocation::Shell(_)),
            "{line}"
        );
    }

    // Only the first word matters.
    assert!(matches!(
        Invocation::for_command_line("echo exit"),
        Invocation::Direct { .. }
    ));
}

#[test]
fn test_program_names_what_failed_to_spawn() {
    assert_eq!(Invocation::for_command_line("/bin/missing a").program(), "/bin/missing");
    assert_eq!(Invocation::for_command_line("a | b").program(), "/bin/sh");
}

#[test]
fn test_equals_sign_after_the_first_word_is_plain_text() {
    assert_eq!(
        Invocation::for_command_line("/usr/local/bin/lockrun --lockfile=/var/run/cron-x.lock -- /bin/true"),
        Invocation::Direct {
            program: "/usr/local/bin/lockrun".into(),
            args: vec![
                "--lockfile=/var/run/cron-x.lock".into(),
                "--".into(),
                "/bin/true".into(),
            ],
        }
    );
    assert!(matches!(
        Invocation::for_command_line("backup --level=9 --note=50%"),
        Invocation::Direct { .. }
    ));
}

#[test]
fn test_shell_word_with_a_path_is_a_program() {
    assert_eq!(
        Invocation::for_command_line("./exit 3"),
        Invocation::Direct {
            program: "./exit".into(),
            args: vec!["3".into()],
        }
    );
}
