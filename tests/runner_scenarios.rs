// tests/runner_scenarios.rs

use std::error::Error;
use std::path::Path;

use monitored_cron::errors::{ConfigErrorKind, RunError};
use monitored_cron::exec::SupervisorOptions;
use monitored_cron::outcome::Outcome;
use monitored_cron::notify::{Notifier, NotifyError};
use monitored_cron::runner::{RunReport, report_failure, run_job, run_job_guarded};
use monitored_cron::sink::Severity;
use monitored_cron_test_utils::{FakeNotifier, JobFileBuilder, RecordingSink, init_tracing};
use regex::Regex;
use serde_json::json;

type TestResult = Result<(), Box<dyn Error>>;

fn run(
    job_file: &Path,
    sink: &mut RecordingSink,
    notifier: &mut FakeNotifier,
) -> Result<RunReport, RunError> {
    init_tracing();
    run_job(job_file, sink, notifier, &SupervisorOptions::default())
}

fn last_event(sink: &RecordingSink) -> Result<(Severity, String), Box<dyn Error>> {
    Ok(sink.last().cloned().ok_or("nothing was logged")?)
}

#[test]
fn test_clean_success_logs_info_summary() -> TestResult {
    let file = JobFileBuilder::new("our-job").command("true").write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    assert_eq!(report.outcome, Outcome::SucceededClean);
    assert_eq!(report.command, "true");
    assert_eq!(report.pinged, None);

    let (severity, message) = last_event(&sink)?;
    assert_eq!(severity, Severity::Info);
    assert!(
        Regex::new(r"^Ran successfully in \d+\.\d{3}s$")?.is_match(&message),
        "got: {message}"
    );
    assert_eq!(sink.events().len(), 1);
    assert!(notifier.pinged().is_empty());
    Ok(())
}

#[test]
fn test_failure_logs_error_summary_and_does_not_notify() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("false")
        .notify_url("http://my.web.hook/ac")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    assert_eq!(report.outcome, Outcome::Failed { exit_code: 1 });
    let (severity, message) = last_event(&sink)?;
    assert_eq!(severity, Severity::Error);
    assert!(
        Regex::new(r"^Failed with exit code 1 after \d+\.\d{3}s$")?.is_match(&message),
        "got: {message}"
    );
    assert!(notifier.pinged().is_empty());
    Ok(())
}

#[test]
fn test_stderr_on_success_is_an_error_and_does_not_notify() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("echo 'Standard stuff'; sleep 0.2; echo 'this is bad' >&2")
        .notify_url("http://my.web.hook/ac")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    assert_eq!(report.outcome, Outcome::SucceededWithStderr);
    let lines = sink.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "[debug] Standard stuff");
    assert_eq!(lines[1], "[warning] this is bad");
    assert!(
        Regex::new(r"^\[error\] Displayed errors but exited 0 after \d+\.\d{3}s$")?
            .is_match(&lines[2]),
        "got: {}",
        lines[2]
    );
    assert!(notifier.pinged().is_empty());
    Ok(())
}

#[test]
fn test_clean_success_pings_notify_url_with_runtime() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("echo 'Standard stuff'")
        .notify_url("http://my.web.hook/ac?t=:runtime:&again=:runtime:")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    assert_eq!(notifier.pinged().len(), 1);
    let url = &notifier.pinged()[0];
    assert!(
        Regex::new(r"^http://my\.web\.hook/ac\?t=(\d+\.\d{3})&again=(\d+\.\d{3})$")?.is_match(url),
        "got: {url}"
    );
    assert_eq!(report.pinged.as_ref(), Some(url));

    let lines = sink.lines();
    assert_eq!(lines[0], "[debug] Standard stuff");
    assert!(lines[1].starts_with("[info] Ran successfully in "));
    assert_eq!(lines[2], format!("[info] Pinged {url}"));
    Ok(())
}

#[test]
fn test_summary_and_ping_share_the_same_runtime() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("sleep 0.1")
        .notify_url("https://hc.example.com/ping/abc?rt=:runtime:")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    let runtime = report.execution.runtime();
    assert_eq!(
        report.pinged.as_deref(),
        Some(format!("https://hc.example.com/ping/abc?rt={runtime}").as_str())
    );
    assert!(sink.messages_at(Severity::Info)[0].ends_with(&format!("in {runtime}s")));
    Ok(())
}

#[test]
fn test_failed_ping_is_an_unexpected_error_reported_as_emergency() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("true")
        .notify_url("http://my.web.hook/ac")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::failing(503);

    let err = match run(file.path(), &mut sink, &mut notifier) {
        Err(err @ RunError::Unexpected(_)) => err,
        Err(e) => panic!("Expected Unexpected error, got: {e:?}"),
        Ok(report) => panic!("Expected error, got Ok({report:?})"),
    };

    // The summary was already logged before the ping was attempted.
    assert_eq!(sink.events()[0].0, Severity::Info);

    report_failure(&mut sink, &err);
    let (severity, message) = last_event(&sink)?;
    assert_eq!(severity, Severity::Emergency);
    assert!(
        message.starts_with("Unexpected error [HttpStatusError] http://my.web.hook/ac responded with HTTP 503 in "),
        "got: {message}"
    );
    assert!(message.contains("src/runner.rs"), "got: {message}");
    Ok(())
}

#[test]
fn test_missing_job_file_is_an_alert_and_runs_nothing() -> TestResult {
    let mut sink = RecordingSink::new("cron-no-job");
    let mut notifier = FakeNotifier::new();

    let err = match run(Path::new("/etc/random_stuff/no-job.json"), &mut sink, &mut notifier) {
        Err(RunError::Config(e)) => {
            assert_eq!(e.kind(), ConfigErrorKind::Read);
            RunError::Config(e)
        }
        Err(e) => panic!("Expected Config error, got: {e:?}"),
        Ok(report) => panic!("Expected error, got Ok({report:?})"),
    };
    assert!(sink.events().is_empty());

    report_failure(&mut sink, &err);
    assert_eq!(sink.events().len(), 1);
    let (severity, message) = last_event(&sink)?;
    assert_eq!(severity, Severity::Alert);
    assert!(message.starts_with(
        "Invalid job config `/etc/random_stuff/no-job.json`: [NotFound] "
    ));
    Ok(())
}

#[test]
fn test_invalid_job_file_is_an_alert() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .set("notify", json!({ "url": "something" }))
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let err = run(file.path(), &mut sink, &mut notifier)
        .err()
        .ok_or("expected a config error")?;
    report_failure(&mut sink, &err);

    assert_eq!(
        sink.events(),
        &[(
            Severity::Alert,
            format!(
                "Invalid job config `{}`: [Validation] No command specified",
                file.path().display()
            )
        )]
    );
    Ok(())
}

#[test]
fn test_unstartable_command_is_an_alert() -> TestResult {
    let file = JobFileBuilder::new("our-job")
        .command("/run/some/random/process")
        .notify_url("http://my.web.hook/ac")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let err = match run(file.path(), &mut sink, &mut notifier) {
        Err(err @ RunError::Spawn(_)) => err,
        Err(e) => panic!("Expected Spawn error, got: {e:?}"),
        Ok(report) => panic!("Expected error, got Ok({report:?})"),
    };
    report_failure(&mut sink, &err);

    assert_eq!(
        sink.lines(),
        vec!["[alert] Failed to start: No such file or directory (os error 2) - /run/some/random/process"]
    );
    assert!(notifier.pinged().is_empty());
    Ok(())
}

#[test]
fn test_locking_runs_the_command_through_the_lock_runner() -> TestResult {
    // `/bin/echo` stands in for lockrun so the wrapped command line is visible.
    let file = JobFileBuilder::new("locked-job")
        .command("true")
        .locking("/bin/echo", "/var/run/")
        .lock_retries(1, 2)
        .write()?;
    let mut sink = RecordingSink::new("cron-locked-job");
    let mut notifier = FakeNotifier::new();

    let report = run(file.path(), &mut sink, &mut notifier)?;

    assert_eq!(
        report.command,
        "/bin/echo --lockfile=/var/run/cron-locked-job.lock --retries=1 --sleep=2 -- true"
    );
    assert_eq!(
        sink.messages_at(Severity::Debug),
        vec!["--lockfile=/var/run/cron-locked-job.lock --retries=1 --sleep=2 -- true"]
    );
    assert_eq!(report.outcome, Outcome::SucceededClean);
    Ok(())
}

#[test]
fn test_missing_lock_runner_fails_to_start() -> TestResult {
    let file = JobFileBuilder::new("locked-job")
        .command("true")
        .locking("/nonexistent/lockrun", "/tmp")
        .write()?;
    let mut sink = RecordingSink::new("cron-locked-job");
    let mut notifier = FakeNotifier::new();

    let err = match run(file.path(), &mut sink, &mut notifier) {
        Err(err @ RunError::Spawn(_)) => err,
        Err(e) => panic!("Expected Spawn error, got: {e:?}"),
        Ok(report) => panic!("Expected error, got Ok({report:?})"),
    };
    assert!(sink.events().is_empty());

    report_failure(&mut sink, &err);
    assert_eq!(
        sink.lines(),
        vec!["[alert] Failed to start: No such file or directory (os error 2) - /nonexistent/lockrun"]
    );
    Ok(())
}

struct PanickingNotifier;

impl Notifier for PanickingNotifier {
    fn ping(&mut self, _url: &str) -> Result<(), NotifyError> {
        panic!("notifier blew up")
    }
}

#[test]
fn test_panic_during_run_is_reported_as_emergency() -> TestResult {
    init_tracing();
    let file = JobFileBuilder::new("our-job")
        .command("true")
        .notify_url("http://my.web.hook/ac")
        .write()?;
    let mut sink = RecordingSink::new("cron-our-job");

    let err = match run_job_guarded(
        file.path(),
        &mut sink,
        &mut PanickingNotifier,
        &SupervisorOptions::default(),
    ) {
        Err(err @ RunError::Unexpected(_)) => err,
        Err(e) => panic!("Expected Unexpected error, got: {e:?}"),
        Ok(report) => panic!("Expected error, got Ok({report:?})"),
    };
    report_failure(&mut sink, &err);

    let emergencies = sink.messages_at(Severity::Emergency);
    assert_eq!(emergencies.len(), 1);
    assert!(
        emergencies[0].starts_with("Unexpected error [Panic] notifier blew up in "),
        "got: {}",
        emergencies[0]
    );
    assert!(emergencies[0].contains("runner_scenarios.rs"), "got: {}", emergencies[0]);
    Ok(())
}

#[test]
fn test_guarded_run_passes_ordinary_results_through() -> TestResult {
    init_tracing();
    let file = JobFileBuilder::new("our-job").command("false").write()?;
    let mut sink = RecordingSink::new("cron-our-job");
    let mut notifier = FakeNotifier::new();

    let report = run_job_guarded(file.path(), &mut sink, &mut notifier, &SupervisorOptions::default())?;

    assert_eq!(report.outcome, Outcome::Failed { exit_code: 1 });
    Ok(())
}
