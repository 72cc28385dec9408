// src/config/validate.rs

use serde_json::{Map, Value};

use crate::config::model::JobConfig;
use crate::errors::ValidationError;
use crate::notify::is_valid_notify_url;

type Result<T> = std::result::Result<T, ValidationError>;

impl TryFrom<Value> for JobConfig {
    type Error = ValidationError;

    fn try_from(raw: Value) -> Result<Self> {
        validate_raw_job(&raw)?;
        serde_json::from_value(raw).map_err(|e| ValidationError(e.to_string()))
    }
}

/// Check the untyped job document rule by rule.
///
/// Rules run in a fixed order and the first violation wins:
/// - `command` is present, non-empty and a string
/// - `notify.url`, when `notify` is present, is an http(s) URL
/// - `locking`, when present, has a runner path and lock dir, and
///   `retries`/`sleepSeconds` come as a pair of integers
///
/// A `null` section is treated as absent.
pub fn validate_raw_job(raw: &Value) -> Result<()> {
    let job = raw
        .as_object()
        .ok_or_else(|| ValidationError::from("Job config is not a JSON object"))?;

    validate_command(job)?;

    if let Some(notify) = present(job.get("notify")) {
        validate_notify(notify)?;
    }

    if let Some(locking) = present(job.get("locking")) {
        validate_locking(locking)?;
    }

    Ok(())
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// First non-null value under any of `names`.
fn field<'a>(section: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| present(section.get(*name)))
}

fn validate_command(job: &Map<String, Value>) -> Result<()> {
    match present(job.get("command")) {
        None => Err("No command specified".into()),
        Some(Value::String(cmd)) if cmd.trim().is_empty() => Err("No command specified".into()),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err("Command is not a string".into()),
    }
}

fn validate_notify(notify: &Value) -> Result<()> {
    let url = match notify.get("url") {
        Some(Value::String(url)) => url,
        _ => return Err("notify.url is not a string".into()),
    };

    if !is_valid_notify_url(url) {
        return Err(format!("`{url}` is not a valid notify URL").into());
    }

    Ok(())
}

fn validate_locking(locking: &Value) -> Result<()> {
    match field(locking, &["lockRunnerPath", "lockrun"]) {
        None => return Err("locking.lockRunnerPath required for locking".into()),
        Some(Value::String(_)) => {}
        Some(_) => return Err("locking.lockRunnerPath is not a string".into()),
    }

    match field(locking, &["lockDir", "lock_dir"]) {
        None => return Err("locking.lockDir required for locking".into()),
        Some(Value::String(_)) => {}
        Some(_) => return Err("locking.lockDir is not a string".into()),
    }

    if let Some(retries) = field(locking, &["retries"]) {
        let Some(sleep) = field(locking, &["sleepSeconds", "sleep"]) else {
            return Err("locking.sleepSeconds required if locking.retries used".into());
        };
        if !is_integer(retries) {
            return Err("locking.retries is not an integer".into());
        }
        if !is_integer(sleep) {
            return Err("locking.sleepSeconds is not an integer".into());
        }
    }

    Ok(())
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}
