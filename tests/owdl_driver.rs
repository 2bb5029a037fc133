//! Workflow driver transitions against the mock container service

use std::sync::Arc;
use std::time::Duration;

use owdl_model::OwdlWorkflow;
use pce_entities::ContainerInstanceStatus;
use pce_toolkit::mock::{ContainerOperation, FailureConfig, MockContainerService};
use pce_toolkit::owdl::{
    DriverError, InMemoryInstanceRepository, OwdlDriver, OwdlInstanceRepository, OwdlStatus,
};

const POLL: Duration = Duration::from_millis(1);

fn two_state_workflow() -> OwdlWorkflow {
    OwdlWorkflow::from_json(
        r#"{
            "StartsAt": "Shard",
            "States": {
                "Shard": {
                    "Type": "Task",
                    "ContainerDefinition": "pce-1-task:1#worker",
                    "PackageName": "private_lift/shard",
                    "CmdArgsList": ["--input=a", "--input=b"],
                    "Next": "Compute"
                },
                "Compute": {
                    "Type": "Task",
                    "ContainerDefinition": "pce-1-task:1#worker",
                    "PackageName": "private_lift/compute",
                    "CmdArgsList": ["--shards=2"],
                    "Version": "1.2",
                    "End": true
                }
            }
        }"#,
    )
    .unwrap()
}

fn single_state_workflow(retry_count: u32, next: Option<&str>) -> OwdlWorkflow {
    let next = next.map_or_else(String::new, |n| format!(r#""Next": "{}","#, n));
    OwdlWorkflow::from_json(&format!(
        r#"{{
            "StartsAt": "Only",
            "States": {{
                "Only": {{
                    "Type": "Task",
                    "ContainerDefinition": "def",
                    "PackageName": "pkg",
                    "CmdArgsList": ["--run"],
                    {}
                    "RetryCount": {},
                    "End": true
                }},
                "Unused": {{
                    "Type": "Task",
                    "ContainerDefinition": "def",
                    "PackageName": "pkg",
                    "CmdArgsList": ["--never"],
                    "End": true
                }}
            }}
        }}"#,
        next, retry_count
    ))
    .unwrap()
}

fn driver(workflow: OwdlWorkflow, mock: &MockContainerService) -> OwdlDriver {
    OwdlDriver::new(
        "wf-1",
        "pce-1",
        workflow,
        Arc::new(mock.clone()),
        Arc::new(InMemoryInstanceRepository::new()),
    )
    .unwrap()
}

#[test]
fn test_run_to_end_completes_every_state() {
    let mock = MockContainerService::new();
    let mut driver = driver(two_state_workflow(), &mock);

    let status = driver.run_to_end(POLL, &|| false).unwrap();

    assert_eq!(status, OwdlStatus::Completed);
    assert!(driver.is_completed());
    let states: Vec<_> = driver
        .get_status()
        .state_instances
        .iter()
        .map(|s| s.state_name.as_str())
        .collect();
    assert_eq!(states, vec!["Shard", "Compute"]);

    let created = mock.created_commands();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].len(), 2);
    assert_eq!(
        created[1][0],
        "onedocker-runner private_lift/compute --version=1.2 --exe_args=\"--shards=2\""
    );
}

#[test]
fn test_start_twice_is_an_error() {
    let mock = MockContainerService::new();
    let mut driver = driver(two_state_workflow(), &mock);

    driver.start().unwrap();
    assert_eq!(driver.status(), OwdlStatus::Started);
    assert!(matches!(
        driver.start(),
        Err(DriverError::InvalidTransition { operation, .. }) if operation.contains("start")
    ));
}

#[test]
fn test_next_while_state_running_is_an_error() {
    let mock = MockContainerService::new();
    mock.hold_all();
    let mut driver = driver(two_state_workflow(), &mock);

    driver.start().unwrap();
    let err = driver.next().unwrap_err();
    match err {
        DriverError::InvalidTransition {
            workflow_status,
            state_status,
            ..
        } => {
            assert_eq!(workflow_status, OwdlStatus::Started);
            assert_eq!(state_status, "STARTED");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(driver.get_status().state_instances.len(), 1);
}

#[test]
fn test_end_flag_wins_over_next() {
    let mock = MockContainerService::new();
    let mut driver = driver(single_state_workflow(0, Some("Unused")), &mock);

    driver.start().unwrap();
    assert_eq!(driver.wait_for_state(POLL).unwrap(), OwdlStatus::Completed);
    driver.next().unwrap();

    assert_eq!(driver.status(), OwdlStatus::Completed);
    assert_eq!(driver.get_status().state_instances.len(), 1);
    assert!(matches!(
        driver.next(),
        Err(DriverError::InvalidTransition { .. })
    ));
}

#[test]
fn test_retry_budget_fails_workflow() {
    let mock = MockContainerService::new();
    mock.set_default_status(ContainerInstanceStatus::Failed);
    let mut driver = driver(single_state_workflow(1, None), &mock);

    assert_eq!(driver.run_to_end(POLL, &|| false).unwrap(), OwdlStatus::Failed);
    assert_eq!(driver.get_current_state_instance().unwrap().retry_num, 1);
    assert_eq!(driver.get_status().state_instances.len(), 2);

    assert!(matches!(
        driver.retry(),
        Err(DriverError::WorkflowTerminal(OwdlStatus::Failed))
    ));
}

#[test]
fn test_failed_state_without_retry_count_can_be_retried() {
    let mock = MockContainerService::new();
    mock.set_default_status(ContainerInstanceStatus::Failed);
    let mut driver = driver(two_state_workflow(), &mock);

    driver.start().unwrap();
    assert_eq!(driver.wait_for_state(POLL).unwrap(), OwdlStatus::Failed);
    assert_eq!(driver.status(), OwdlStatus::Started);

    mock.set_default_status(ContainerInstanceStatus::Completed);
    driver.retry().unwrap();
    assert_eq!(driver.status(), OwdlStatus::Started);
    assert_eq!(driver.wait_for_state(POLL).unwrap(), OwdlStatus::Completed);

    let history = &driver.get_status().state_instances;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, OwdlStatus::Failed);
    assert_eq!(history[1].state_name, "Shard");
    assert_eq!(history[1].retry_num, 1);
}

#[test]
fn test_run_to_end_retries_failed_dispatch() {
    let mock = MockContainerService::new();
    mock.inject_failure(
        ContainerOperation::Create,
        FailureConfig::error("capacity").with_fail_count(1),
    );
    let mut driver = driver(single_state_workflow(1, None), &mock);

    assert_eq!(
        driver.run_to_end(POLL, &|| false).unwrap(),
        OwdlStatus::Completed
    );

    let history = &driver.get_status().state_instances;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, OwdlStatus::Failed);
    assert!(history[0].containers.is_empty());
    assert_eq!(history[1].status, OwdlStatus::Completed);
}

#[test]
fn test_run_to_end_without_budget_fails() {
    let mock = MockContainerService::new();
    mock.set_default_status(ContainerInstanceStatus::Failed);
    let mut driver = driver(single_state_workflow(0, None), &mock);

    assert_eq!(driver.run_to_end(POLL, &|| false).unwrap(), OwdlStatus::Failed);
    assert_eq!(driver.get_status().state_instances.len(), 1);
}

#[test]
fn test_cancel_stops_running_containers() {
    let mock = MockContainerService::new();
    mock.hold_all();
    let mut driver = driver(two_state_workflow(), &mock);

    assert_eq!(driver.run_to_end(POLL, &|| true).unwrap(), OwdlStatus::Cancelled);
    assert_eq!(
        driver.get_current_state_instance().unwrap().status,
        OwdlStatus::Cancelled
    );
    assert_eq!(mock.cancelled_ids().len(), 2);

    assert!(matches!(
        driver.cancel_workflow(),
        Err(DriverError::WorkflowTerminal(OwdlStatus::Cancelled))
    ));
}

#[test]
fn test_cancel_state_then_retry() {
    let mock = MockContainerService::new();
    mock.hold_all();
    let mut driver = driver(two_state_workflow(), &mock);

    driver.start().unwrap();
    driver.cancel_state().unwrap();
    assert_eq!(driver.status(), OwdlStatus::Started);

    mock.set_default_status(ContainerInstanceStatus::Completed);
    driver.retry().unwrap();
    assert_eq!(driver.wait_for_state(POLL).unwrap(), OwdlStatus::Completed);
    assert_eq!(driver.get_current_state_instance().unwrap().retry_num, 1);
}

#[test]
fn test_load_resumes_from_repository() {
    let mock = MockContainerService::new();
    mock.hold_all();
    let repository = Arc::new(InMemoryInstanceRepository::new());

    let mut first = OwdlDriver::new(
        "wf-resume",
        "pce-1",
        two_state_workflow(),
        Arc::new(mock.clone()),
        repository.clone(),
    )
    .unwrap();
    first.start().unwrap();
    drop(first);

    mock.set_all(ContainerInstanceStatus::Completed);
    let mut resumed =
        OwdlDriver::load("wf-resume", Arc::new(mock.clone()), repository.clone()).unwrap();
    assert_eq!(resumed.status(), OwdlStatus::Started);

    resumed.next().unwrap();
    assert_eq!(
        resumed.get_current_state_instance().unwrap().state_name,
        "Compute"
    );
    assert_eq!(
        repository.read("wf-resume").unwrap().state_instances.len(),
        2
    );
}
