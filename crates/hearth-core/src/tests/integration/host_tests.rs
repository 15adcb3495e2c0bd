#![cfg(test)]

use semver::VersionReq;

use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::kernel::{Host, HostPhase};
use crate::plugin_system::{LifecycleOperation, PluginState, PluginSystemError};

use super::common::{entries, new_journal, tracking, tracking_failing};

async fn started_host(names: &[&str], journal: &super::common::Journal) -> Host {
    let mut host = Host::new().expect("Host::new failed");
    host.load_all(names.iter().map(|n| tracking(n, journal)).collect())
        .expect("load_all failed");
    host.run_setup_phase().await.expect("setup phase failed");
    host.run_start_phase().await.expect("start phase failed");
    host
}

#[tokio::test]
async fn test_every_plugin_goes_through_setup_then_start_once() {
    let journal = new_journal();
    let host = started_host(&["a", "b", "c"], &journal).await;

    assert_eq!(
        entries(&journal),
        vec!["a:setup", "b:setup", "c:setup", "a:start", "b:start", "c:start"]
    );
    for id in ["a", "b", "c"] {
        assert_eq!(host.plugin_state(id), Some(PluginState::Started));
    }
    assert_eq!(host.phase(), HostPhase::Started);
}

#[tokio::test]
async fn test_duplicate_identifier_registers_nothing() {
    let journal = new_journal();
    let mut host = Host::new().unwrap();

    let err = host
        .load_all(vec![tracking("a", &journal), tracking("b", &journal), tracking("a", &journal)])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::DuplicateIdentifier { ref plugin_id }) if plugin_id == "a"
    ));
    assert!(host.plugin_ids().is_empty());
    assert_eq!(host.phase(), HostPhase::Idle);
}

#[tokio::test]
async fn test_incompatible_api_registers_nothing() {
    let journal = new_journal();
    let mut host = Host::new().unwrap();

    let err = host
        .load_all(vec![
            tracking("a", &journal),
            tracking("b", &journal).with_api_requirement(VersionReq::parse("^1").unwrap()),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::IncompatibleApi { .. })
    ));
    assert!(host.plugin_ids().is_empty());
}

#[tokio::test]
async fn test_one_failing_setup_leaves_the_rest_running() {
    let journal = new_journal();
    let mut host = Host::new().unwrap();
    host.load_all(vec![
        tracking("a", &journal),
        tracking_failing("b", &journal, Some(LifecycleOperation::Setup)),
        tracking("c", &journal),
        tracking("d", &journal),
    ])
    .unwrap();

    let setup = host.run_setup_phase().await.unwrap();
    assert_eq!(setup.failed_ids(), vec!["b"]);
    let start = host.run_start_phase().await.unwrap();
    assert_eq!(start.succeeded, vec!["a", "c", "d"]);

    assert_eq!(host.plugin_state("b"), Some(PluginState::Failed));
    assert_eq!(host.plugins().count_in(PluginState::Started), 3);
    assert!(host.events().subscriptions_of("b").is_empty());
}

#[tokio::test]
async fn test_shutdown_runs_in_reverse_order() {
    let journal = new_journal();
    let mut host = started_host(&["a", "b", "c"], &journal).await;
    journal.lock().unwrap().clear();

    let report = host.shutdown_all().await.unwrap();

    assert!(report.is_clean());
    assert_eq!(entries(&journal), vec!["c:shutdown", "b:shutdown", "a:shutdown"]);
    for id in ["a", "b", "c"] {
        assert_eq!(host.plugin_state(id), Some(PluginState::ShutDown));
    }
    assert_eq!(host.events().subscription_count(), 0);
    assert!(!host.events().is_live());
}

#[tokio::test]
async fn test_failing_shutdown_does_not_stop_the_others() {
    let journal = new_journal();
    let mut host = Host::new().unwrap();
    host.load_all(vec![
        tracking("a", &journal),
        tracking_failing("b", &journal, Some(LifecycleOperation::Shutdown)),
        tracking("c", &journal),
    ])
    .unwrap();
    host.run_setup_phase().await.unwrap();
    host.run_start_phase().await.unwrap();
    journal.lock().unwrap().clear();

    let report = host.shutdown_all().await.unwrap();
    assert_eq!(report.failed_ids(), vec!["b"]);
    assert_eq!(entries(&journal), vec!["c:shutdown", "b:shutdown", "a:shutdown"]);
    assert_eq!(host.plugin_state("b"), Some(PluginState::ShutDown));
}

#[tokio::test]
async fn test_shutdown_before_start_skips_hooks() {
    let journal = new_journal();
    let mut host = Host::new().unwrap();
    host.load_all(vec![tracking("a", &journal)]).unwrap();
    host.run_setup_phase().await.unwrap();
    journal.lock().unwrap().clear();

    host.shutdown_all().await.unwrap();
    assert!(entries(&journal).is_empty());
    assert_eq!(host.plugin_state("a"), Some(PluginState::SetUp));
    assert_eq!(host.phase(), HostPhase::Stopped);
}

#[tokio::test]
async fn test_out_of_order_phase_is_rejected() {
    let journal = new_journal();
    let mut host = started_host(&["a"], &journal).await;

    let err = host.run_setup_phase().await.unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycleError {
            phase: KernelLifecyclePhase::Setup,
            ..
        }
    ));
    // The rejected call ran no hooks
    assert_eq!(entries(&journal), vec!["a:setup", "a:start"]);
}
