//! Subcommand handlers
//!
//! Each handler returns the process exit code. The `describe_*` helpers turn
//! service results into console lines so the wording can be tested without
//! a terminal.

use ai_core::{ChatEngine, InferenceError, MediaAnswer};
use application::{
    ApplicationError, AssetServerStatus, EngineStopOutcome, RecordOutcome, StatusReport,
    StopReport,
};
use domain::ProcessId;
use tracing::error;

use crate::app::App;
use crate::console::{self, Line, Tone};

/// Exit code for setup failures and failed requests
pub const EXIT_FAILURE: i32 = 1;

fn join_pids(pids: &[ProcessId]) -> String {
    pids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// start
// =============================================================================

pub async fn start(app: &App) -> i32 {
    let launcher = app.launcher();

    console::step("🚀 Preparing services");
    let prepared = match launcher.prepare().await {
        Ok(prepared) => prepared,
        Err(e) => {
            error!(error = %e, "Launch aborted");
            console::emit_all(&describe_launch_error(&e));
            return EXIT_FAILURE;
        },
    };
    console::emit_all(&describe_asset_status(&prepared.asset_server));

    let engine = &launcher.settings().engine;
    console::step(&format!("🧠 Starting inference engine on {}", engine.base_url()));
    console::muted(&format!("   Log: {}", engine.log_file.display()));

    match launcher.run_engine(&prepared).await {
        Ok(code) => {
            if code == 0 {
                console::success("✅ Inference engine exited cleanly");
            } else {
                console::warning(&format!("⚠️  Inference engine exited with code {code}"));
            }
            code
        },
        Err(e) => {
            error!(error = %e, "Engine run failed");
            console::emit_all(&describe_launch_error(&e));
            EXIT_FAILURE
        },
    }
}

pub fn describe_launch_error(err: &ApplicationError) -> Vec<Line> {
    let mut lines = vec![(Tone::Error, format!("❌ {err}"))];
    if err.is_setup_failure() {
        lines.push((
            Tone::Muted,
            "   Check the engine runtime directory and program in the configuration".to_string(),
        ));
    }
    lines
}

pub fn describe_asset_status(status: &AssetServerStatus) -> Vec<Line> {
    match status {
        AssetServerStatus::Reused { url } => vec![(
            Tone::Success,
            format!("✅ Asset server already running at {url}"),
        )],
        AssetServerStatus::Started {
            url,
            record,
            confirmed: true,
        } => vec![(
            Tone::Success,
            format!("✅ Asset server started at {url} (PID {})", record.pid),
        )],
        AssetServerStatus::Started {
            url,
            record,
            confirmed: false,
        } => vec![
            (
                Tone::Warning,
                format!("⚠️  Asset server spawned (PID {}) but {url} is not answering yet", record.pid),
            ),
            (Tone::Muted, "   Continuing with the inference engine".to_string()),
        ],
    }
}

// =============================================================================
// stop
// =============================================================================

pub async fn stop(app: &App) -> i32 {
    console::step("🛑 Stopping services");
    match app.terminator().stop().await {
        Ok(report) => {
            console::emit_all(&describe_stop_report(&report));
            0
        },
        Err(e) => {
            error!(error = %e, "Stop failed");
            console::error(&format!("❌ {e}"));
            EXIT_FAILURE
        },
    }
}

pub fn describe_stop_report(report: &StopReport) -> Vec<Line> {
    let mut lines = Vec::new();

    match &report.asset_record {
        RecordOutcome::Absent => {},
        RecordOutcome::Signalled { pid } => {
            lines.push((Tone::Success, format!("✅ Asset server (PID {pid}) signalled")));
        },
        RecordOutcome::NotRunning { pid } => {
            lines.push((Tone::Muted, format!("   Recorded asset server (PID {pid}) was not running")));
        },
        RecordOutcome::Stale { pid } => lines.push((
            Tone::Warning,
            format!("⚠️  PID {pid} now belongs to another process, left alone"),
        )),
        RecordOutcome::Unreadable => {
            lines.push((Tone::Warning, "⚠️  Asset server record was unreadable, removed".to_string()));
        },
    }

    if !report.port_holders_killed.is_empty() {
        lines.push((
            Tone::Success,
            format!(
                "✅ Killed processes on the asset port: {}",
                join_pids(&report.port_holders_killed)
            ),
        ));
    }

    match &report.engine {
        EngineStopOutcome::NothingRunning => {
            lines.push((Tone::Plain, "No inference engine running".to_string()));
        },
        EngineStopOutcome::Stopped {
            signalled,
            forced,
            remaining,
        } => {
            lines.push((
                Tone::Success,
                format!("✅ Inference engine stopped ({})", join_pids(signalled)),
            ));
            if !forced.is_empty() {
                lines.push((
                    Tone::Warning,
                    format!("⚠️  Force-killed after grace period: {}", join_pids(forced)),
                ));
            }
            if !report.engine_fully_stopped() {
                lines.push((
                    Tone::Warning,
                    format!("⚠️  Still present: {}", join_pids(remaining)),
                ));
            }
        },
    }

    if !report.stopped_anything() {
        lines.push((Tone::Muted, "   Nothing was running".to_string()));
    }
    lines
}

// =============================================================================
// status
// =============================================================================

pub async fn status(app: &App, json: bool) -> anyhow::Result<i32> {
    let report = app.status().report().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        console::emit_all(&describe_status(&report));
    }
    Ok(0)
}

fn up_or_down(up: bool) -> (Tone, &'static str) {
    if up {
        (Tone::Success, "up")
    } else {
        (Tone::Warning, "down")
    }
}

pub fn describe_status(report: &StatusReport) -> Vec<Line> {
    let mut lines = vec![(Tone::Step, "📊 Service status".to_string())];

    let asset = &report.asset_server;
    let (tone, state) = up_or_down(asset.listening);
    lines.push((tone, format!("   Asset server:     {state} ({})", asset.url)));
    if let Some(record) = &asset.record {
        let detail = match (record.alive, record.identity_matches) {
            (false, _) => "not running",
            (true, false) => "stale, id reused by another process",
            (true, true) => "running",
        };
        lines.push((Tone::Muted, format!("   Record:           PID {} {detail}", record.pid)));
    }
    if let Some(err) = &asset.record_error {
        lines.push((Tone::Warning, format!("   Record:           unreadable ({err})")));
    }

    let engine = &report.engine;
    let (tone, state) = up_or_down(!engine.pids.is_empty());
    let pids = if engine.pids.is_empty() {
        String::new()
    } else {
        format!(" PID {}", join_pids(&engine.pids))
    };
    lines.push((tone, format!("   Inference engine: {state}{pids} ({})", engine.base_url)));
    match engine.healthy {
        Some(true) => lines.push((Tone::Success, "   Health:           ok".to_string())),
        Some(false) => lines.push((Tone::Warning, "   Health:           not answering".to_string())),
        None => {},
    }

    if report.all_running() {
        lines.push((Tone::Success, "✅ All services running".to_string()));
    } else {
        lines.push((Tone::Warning, "⚠️  Not all services are running".to_string()));
    }
    lines.push((
        Tone::Muted,
        format!("   Checked at {}", report.checked_at.to_rfc3339()),
    ));
    lines
}

// =============================================================================
// ask
// =============================================================================

pub async fn ask(app: &App, video_url: &str, prompt: &str, raw: bool, url: Option<&str>) -> i32 {
    let client = match app.client(url, raw) {
        Ok(client) => client,
        Err(e) => {
            console::emit_all(&describe_inference_error(&e));
            return EXIT_FAILURE;
        },
    };

    console::step(&format!(
        "🔄 Sending request to {}/v1/chat/completions",
        client.base_url()
    ));
    console::emit(Tone::Plain, &format!("📹 Video URL: {video_url}"));
    console::emit(Tone::Plain, &format!("💬 Prompt: {prompt}"));
    console::rule();

    match client.ask_about_video(video_url, prompt).await {
        Ok(answer) => {
            console::emit_all(&describe_answer(&answer, client.config().strip_reasoning));
            0
        },
        Err(e) => {
            error!(error = %e, "Request failed");
            console::emit_all(&describe_inference_error(&e));
            EXIT_FAILURE
        },
    }
}

pub fn describe_answer(answer: &MediaAnswer, stripped: bool) -> Vec<Line> {
    let heading = if stripped {
        "✅ Response received! (Thinking tags removed)"
    } else {
        "✅ Response received! (Raw output with thinking)"
    };
    let rule = "-".repeat(80);

    let mut lines = vec![
        (Tone::Success, heading.to_string()),
        (Tone::Muted, rule.clone()),
        (Tone::Step, "📝 Generated Caption:".to_string()),
        (Tone::Plain, answer.text.clone()),
        (Tone::Muted, rule),
    ];

    if let Some(usage) = &answer.usage {
        lines.push((Tone::Plain, "📊 Usage Stats:".to_string()));
        lines.push((Tone::Plain, format!("   Prompt tokens: {}", usage.prompt_tokens)));
        lines.push((Tone::Plain, format!("   Completion tokens: {}", usage.completion_tokens)));
        lines.push((Tone::Plain, format!("   Total tokens: {}", usage.total_tokens)));
        if stripped && answer.was_stripped() {
            lines.push((
                Tone::Muted,
                format!(
                    "   💡 Estimated words saved: ~{} (by removing thinking)",
                    answer.estimated_words_saved()
                ),
            ));
        }
    }
    lines
}

pub fn describe_inference_error(err: &InferenceError) -> Vec<Line> {
    vec![(Tone::Error, format!("❌ {err}"))]
}

// =============================================================================
// config
// =============================================================================

pub fn config(app: &App) -> anyhow::Result<i32> {
    print!("{}", app.config().to_toml()?);
    Ok(0)
}
