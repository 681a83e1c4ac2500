//! Scripted walkthrough of the monitoring system.
//!
//! Plays the staging failure scenarios end to end: a healthy round, a
//! network failure with automatic recovery, a validation service crash that
//! needs a manual restart, and a two-component outage in a single round.

use std::sync::Arc;
use std::time::Duration;

use pipeline_sentinel::config::MonitorConfig;
use pipeline_sentinel::monitor::PipelineMonitor;
use pipeline_sentinel::probe::sim::ScriptedProbe;
use pipeline_sentinel::recovery::sim::ScriptedRecovery;
use pipeline_sentinel::types::Component;

fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn demo_config() -> MonitorConfig {
    MonitorConfig {
        check_interval_secs: 1,
        ..MonitorConfig::default()
    }
}

/// Build a monitor where the listed components fail `failures` probes before
/// recovering, and recovery actions always succeed.
fn scripted_monitor(failing: &[(Component, usize, &str)]) -> PipelineMonitor {
    let mut builder = PipelineMonitor::builder(demo_config())
        .recovery_runner(Arc::new(ScriptedRecovery::succeeding()));
    for component in Component::ALL {
        let probe = match failing.iter().find(|(c, _, _)| *c == component) {
            Some(&(_, failures, error)) => ScriptedProbe::failing_times(failures, error),
            None => ScriptedProbe::healthy(),
        };
        builder = builder.probe(component, Arc::new(probe));
    }
    builder.build()
}

async fn print_round(monitor: &PipelineMonitor) {
    let status = monitor.force_check().await;
    for (component, health) in &status.components {
        println!("  {component}: {health}");
    }
    println!("\nOverall: {}", status.overall_status);
    println!("Uptime: {:.2}%", status.uptime_percentage);
    for action in &status.suggested_actions {
        println!("  -> {action}");
    }
}

async fn demo_healthy_system() {
    separator("DEMO 1: Healthy System");
    let monitor = scripted_monitor(&[]);
    print_round(&monitor).await;

    let editor = monitor.get_editor_message().await;
    println!("\n--- Editor Message ---\n{}", editor.message);
}

async fn demo_network_failure_recovery() {
    separator("DEMO 2: Network Failure -> Auto-Recovery Success");
    let monitor = scripted_monitor(&[(Component::Network, 1, "Network timeout")]);

    println!("Round 1 (network down, reconnect fires automatically):");
    print_round(&monitor).await;

    // Give the spawned recovery a moment to finish.
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\nRound 2 (probe confirms recovery):");
    print_round(&monitor).await;

    let metrics = monitor.get_metrics().await;
    println!(
        "\nRecoveries: {} ok / {} failed",
        metrics.recovery_stats.successful_recoveries, metrics.recovery_stats.failed_recoveries
    );
}

async fn demo_validation_service_failure() {
    separator("DEMO 3: Validation Service Crash -> Manual Intervention");
    let monitor = scripted_monitor(&[(
        Component::ValidationService,
        1,
        "Validation service unresponsive",
    )]);

    println!("Round 1 (validation service down, no automatic action):");
    print_round(&monitor).await;

    let editor = monitor.get_editor_message().await;
    println!("\n--- Editor Message ---\n{}", editor.message);
    println!("\ncan_publish: {}", editor.can_publish);

    println!("\nEngineering triggers a manual restart...");
    match monitor.attempt_recovery(Component::ValidationService).await {
        Ok(attempt) => println!(
            "  {} via {}: success={} ({:.0}ms)",
            attempt.attempt_id, attempt.action, attempt.success, attempt.duration_ms
        ),
        Err(e) => println!("  manual recovery rejected: {e}"),
    }

    println!("\nNext round confirms the restart:");
    print_round(&monitor).await;
}

async fn demo_multi_component_failure() {
    separator("DEMO 4: Database + Queue Fail in the Same Round");
    let monitor = scripted_monitor(&[
        (Component::Database, 1, "Database connection lost"),
        (Component::Queue, 1, "Queue broker connection failed"),
    ]);

    println!("Round 1 (two independent failures, two independent recoveries):");
    print_round(&monitor).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\nRound 2 (both confirmed back):");
    print_round(&monitor).await;

    let metrics = monitor.get_metrics().await;
    println!(
        "\nTotal checks: {}, failed: {}, recovery attempts: {}",
        metrics.total_checks, metrics.failed_checks, metrics.recovery_stats.total_attempts
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .init();

    demo_healthy_system().await;
    demo_network_failure_recovery().await;
    demo_validation_service_failure().await;
    demo_multi_component_failure().await;

    separator("Demo complete");
}
