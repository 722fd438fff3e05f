//! # Script Sandbox
//!
//! Evaluates user-authored expressions (`jsCode` blocks) against one row.
//!
//! Each evaluation gets a fresh [`rhai`] engine with:
//!
//! | Capability | Available |
//! |------------|-----------|
//! | `row` (field → value map) | yes, read-only |
//! | date/time functions below | yes |
//! | `eval`, `import`, printing | no |
//! | filesystem, network, processes | no |
//!
//! | Function | Example |
//! |----------|---------|
//! | `now()` | `Mon, Jan 27 09:30` |
//! | `today()` | `27/01/2026` |
//! | `date()` | `January 27, 2026` |
//! | `date_short()` | `Jan 27` |
//! | `day()` | `Monday` |
//! | `time()` | `09:30` |
//! | `time_12h()` | `9:30 AM` |
//! | `year()` | `2026` |
//! | `iso_date()` | `2026-01-27` |
//!
//! Wall-clock time is checked on every interpreter operation, so runaway
//! loops stop at the budget. Failures never expose interpreter messages:
//! callers see [`TIMEOUT_MARKER`] or [`FAULT_MARKER`].

use std::time::{Duration, Instant};

use chrono::Local;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine, EvalAltResult, Scope};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{GabaritError, Result};
use crate::template::Row;

/// Wall-clock budget of one evaluation.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Rendered in place of a script that ran out of time.
pub const TIMEOUT_MARKER: &str = "#TIMEOUT";

/// Rendered in place of a script that failed for any other reason.
pub const FAULT_MARKER: &str = "#ERROR";

/// Slack on top of the budget before the caller stops waiting.
const GRACE: Duration = Duration::from_millis(250);

const TERMINATED_TIMEOUT: &str = "timeout";
const TERMINATED_CANCELLED: &str = "cancelled";

/// Marker text for a failed evaluation.
pub fn marker(err: &GabaritError) -> &'static str {
    match err {
        GabaritError::ScriptTimeout => TIMEOUT_MARKER,
        _ => FAULT_MARKER,
    }
}

/// Stateless evaluator for user expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSandbox {
    timeout: Duration,
}

impl Default for ScriptSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptSandbox {
    pub fn new() -> Self {
        Self {
            timeout: SCRIPT_TIMEOUT,
        }
    }

    /// Sandbox with a custom budget (tests, previews).
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluate `code` against `row`, returning the text to render.
    ///
    /// Never fails: timeouts and faults become marker strings.
    pub async fn evaluate(&self, code: &str, row: &Row) -> String {
        match self.run(code, row, &CancellationToken::new()).await {
            Ok(text) => text,
            Err(err) => marker(&err).to_string(),
        }
    }

    /// Evaluate `code`, reporting failures as errors.
    ///
    /// Returns `ScriptTimeout`, `ScriptFault` or `Cancelled`. Dropping the
    /// returned future or cancelling `cancel` stops the interpreter.
    pub async fn run(&self, code: &str, row: &Row, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(GabaritError::Cancelled);
        }

        let token = cancel.child_token();
        let _stop_on_drop = token.clone().drop_guard();

        let code = code.to_string();
        let bindings = row_bindings(row);
        let budget = self.timeout;
        let task_token = token.clone();
        let task =
            tokio::task::spawn_blocking(move || execute(&code, bindings, budget, &task_token));

        match tokio::time::timeout(budget + GRACE, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                tracing::debug!(error = %join_err, "script task aborted");
                Err(GabaritError::ScriptFault)
            }
            Err(_) => {
                token.cancel();
                Err(GabaritError::ScriptTimeout)
            }
        }
    }
}

fn execute(
    code: &str,
    row: rhai::Map,
    budget: Duration,
    token: &CancellationToken,
) -> Result<String> {
    let engine = sandboxed_engine(budget, token.clone());
    let mut scope = Scope::new();
    scope.push_constant("row", row);

    match engine.eval_with_scope::<Dynamic>(&mut scope, code) {
        Ok(value) if value.is_unit() => Ok(String::new()),
        Ok(value) => Ok(value.to_string()),
        Err(err) => match *err {
            EvalAltResult::ErrorTerminated(reason, _) => {
                if reason.to_string() == TERMINATED_CANCELLED {
                    Err(GabaritError::Cancelled)
                } else {
                    Err(GabaritError::ScriptTimeout)
                }
            }
            other => {
                tracing::debug!(error = %other, "script fault");
                Err(GabaritError::ScriptFault)
            }
        },
    }
}

fn sandboxed_engine(budget: Duration, token: CancellationToken) -> Engine {
    let mut engine = Engine::new();

    engine
        .set_module_resolver(DummyModuleResolver::new())
        .set_max_expr_depths(64, 32)
        .set_max_call_levels(16)
        .set_max_string_size(64 * 1024)
        .set_max_array_size(10_000)
        .set_max_map_size(10_000);
    engine.disable_symbol("eval");
    engine.on_print(|_| {});
    engine.on_debug(|_, _, _| {});

    let started = Instant::now();
    engine.on_progress(move |_| {
        if token.is_cancelled() {
            Some(Dynamic::from(TERMINATED_CANCELLED.to_string()))
        } else if started.elapsed() >= budget {
            Some(Dynamic::from(TERMINATED_TIMEOUT.to_string()))
        } else {
            None
        }
    });

    register_date_functions(&mut engine);
    engine
}

fn register_date_functions(engine: &mut Engine) {
    engine.register_fn("now", || Local::now().format("%a, %b %-d %H:%M").to_string());
    engine.register_fn("today", || Local::now().format("%d/%m/%Y").to_string());
    engine.register_fn("date", || Local::now().format("%B %-d, %Y").to_string());
    engine.register_fn("date_short", || Local::now().format("%b %-d").to_string());
    engine.register_fn("day", || Local::now().format("%A").to_string());
    engine.register_fn("time", || Local::now().format("%H:%M").to_string());
    engine.register_fn("time_12h", || Local::now().format("%-I:%M %p").to_string());
    engine.register_fn("year", || Local::now().format("%Y").to_string());
    engine.register_fn("iso_date", || Local::now().format("%Y-%m-%d").to_string());
}

/// Row as a script map. Numbers and booleans keep their type.
fn row_bindings(row: &Row) -> rhai::Map {
    row.fields()
        .map(|(name, value)| (name.into(), to_dynamic(value)))
        .collect()
}

fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Dynamic::from(i),
            None => Dynamic::from(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Dynamic::from(s.clone()),
        other => Dynamic::from(other.to_string()),
    }
}
