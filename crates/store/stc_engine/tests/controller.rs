use std::sync::Arc;
use std::time::Duration;

use stc_density::{EngineConfig, TimeDomain};
use stc_engine::{
    AdaptiveController, ComputeEvent, FilterSignature, Orchestrator, OrchestratorOptions,
};

const WAIT: Duration = Duration::from_secs(10);

fn signature(types: &[&str]) -> FilterSignature {
    FilterSignature::new(types, &[], None, None)
}

fn controller(delay: Duration) -> AdaptiveController {
    let orchestrator = Arc::new(Orchestrator::new(OrchestratorOptions::default()).unwrap());
    AdaptiveController::new(orchestrator, delay).unwrap()
}

#[test]
fn bursts_of_changes_become_one_submission() {
    let controller = controller(Duration::from_secs(3600));
    let domain = TimeDomain::new(0.0, 100.0);
    let config = EngineConfig::new(64, 2);

    for types in [&["A"][..], &["A", "B"], &["B"], &["B", "C"]] {
        assert!(controller.trigger(signature(types), vec![1.0, 2.0, 3.0], domain, config));
    }
    assert_eq!(controller.orchestrator().last_submitted_id(), 0);

    let handle = controller.flush().unwrap();
    assert_eq!(handle.id(), 1);
    assert_eq!(controller.orchestrator().last_submitted_id(), 1);
}

#[test]
fn unchanged_inputs_are_not_recomputed() {
    let controller = controller(Duration::from_secs(3600));
    let domain = TimeDomain::new(0.0, 100.0);
    let config = EngineConfig::new(64, 2);

    assert!(controller.trigger(signature(&["A"]), vec![1.0, 2.0], domain, config));
    controller.flush();

    // Same filters, same data, same domain and resolution.
    assert!(!controller.trigger(signature(&["A"]), vec![1.0, 2.0], domain, config));

    // A resolution change is a change.
    let finer = EngineConfig::new(128, 2);
    assert!(controller.trigger(signature(&["A"]), vec![1.0, 2.0], domain, finer));

    // Going back to the submitted state drops the pending change.
    assert!(!controller.trigger(signature(&["A"]), vec![1.0, 2.0], domain, config));
    let handle = controller.flush().unwrap();
    assert_eq!(handle.id(), 1);
}

#[test]
fn new_data_of_the_same_length_is_recomputed() {
    let controller = controller(Duration::from_secs(3600));
    let domain = TimeDomain::new(0.0, 100.0);
    let config = EngineConfig::new(64, 2);

    assert!(controller.trigger(signature(&["A"]), vec![1.0, 2.0], domain, config));
    assert_eq!(controller.flush().map(|handle| handle.id()), Some(1));

    assert!(controller.trigger(signature(&["A"]), vec![80.0, 90.0], domain, config));
    assert_eq!(controller.flush().map(|handle| handle.id()), Some(2));
}

#[test]
fn quiet_period_triggers_the_computation() {
    let controller = controller(Duration::from_millis(20));
    let events = controller.subscribe();

    controller.trigger(
        signature(&["THEFT"]),
        vec![10.0, 10.0, 10.0, 90.0],
        TimeDomain::new(0.0, 100.0),
        EngineConfig::new(4, 0),
    );

    match events.recv_timeout(WAIT).unwrap() {
        ComputeEvent::Completed(result) => {
            assert_eq!(result.request_id, 1);
            assert_eq!(result.maps.density_map, vec![1.0, 0.0, 0.0, 1.0 / 3.0]);
        }
        ComputeEvent::Failed { error, .. } => panic!("{error}"),
    }
}
