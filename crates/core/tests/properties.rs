//! Property tests for the activation engine's ordering guarantees.

mod common;

use common::{method, Activity, Behavior};
use keepawake_core::{
    activate_first_successful, probe_all, ActivationFlags, ActivationResult, CandidatePlan,
    FailureStage, FailureTextStyle, MethodContext, MethodDescriptor, OutcomeView, Platform,
    PlatformTag, PriorityOrder,
};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Candidate {
    behavior: Behavior,
    tag: PlatformTag,
}

fn candidate() -> impl Strategy<Value = Candidate> {
    let behavior = prop_oneof![
        Just(Behavior::Succeed),
        Just(Behavior::FailEnter),
        Just(Behavior::FailRequirements),
    ];
    let tag = prop_oneof![
        Just(PlatformTag::Any),
        Just(PlatformTag::Linux),
        Just(PlatformTag::Windows),
        Just(PlatformTag::MacOs),
    ];
    (behavior, tag).prop_map(|(behavior, tag)| Candidate { behavior, tag })
}

fn descriptors(candidates: &[Candidate], activity: &Activity) -> Vec<MethodDescriptor> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| method(&format!("m{i}"), &[c.tag], c.behavior, activity))
        .collect()
}

fn plan(
    methods: Vec<MethodDescriptor>,
    priority: Option<&PriorityOrder>,
    flags: ActivationFlags,
) -> CandidatePlan {
    CandidatePlan::build("test.mode", methods, priority, flags, Platform::Linux)
}

proptest! {
    #[test]
    fn test_first_successful_is_total_and_stops_at_first_success(
        candidates in prop::collection::vec(candidate(), 0..8),
        reversed in any::<bool>(),
    ) {
        let activity = Activity::default();
        let methods = descriptors(&candidates, &activity);
        let priority = reversed.then(|| {
            PriorityOrder::from_names((0..candidates.len()).rev().map(|i| format!("m{i}")))
        });

        let activation = activate_first_successful(
            &plan(methods, priority.as_ref(), ActivationFlags::default()),
            &MethodContext::default(),
        );
        let outcomes = &activation.outcomes;

        prop_assert_eq!(outcomes.len(), candidates.len());
        let names: HashSet<&str> = outcomes.iter().map(|o| o.method_name()).collect();
        prop_assert_eq!(names.len(), candidates.len());

        let first_success = outcomes.iter().position(|o| o.is_success());
        let supported = outcomes
            .iter()
            .take_while(|o| o.failure_stage != Some(FailureStage::PlatformSupport))
            .count();

        match first_success {
            Some(index) => {
                prop_assert!(outcomes[index + 1..supported].iter().all(|o| o.is_unused()));
                prop_assert_eq!(
                    activation.active.as_ref().map(|m| m.info().name.clone()),
                    Some(outcomes[index].method_name().to_string())
                );
            }
            None => prop_assert!(activation.active.is_none()),
        }

        // Unsupported methods only after supported ones.
        prop_assert!(outcomes[supported..]
            .iter()
            .all(|o| o.failure_stage == Some(FailureStage::PlatformSupport)));

        let result = ActivationResult::new(outcomes.clone(), Some("test.mode".into())).unwrap();
        prop_assert_eq!(result.failure_text(FailureTextStyle::Block).is_empty(), result.success());
        prop_assert_eq!(result.failure_text(FailureTextStyle::Inline).is_empty(), result.success());

        if let Some(active) = activation.active {
            active.deactivate().unwrap();
        }
        prop_assert!(activity.active().is_empty());
    }

    #[test]
    fn test_probe_is_total_and_leaves_nothing_active(
        candidates in prop::collection::vec(candidate(), 0..8),
    ) {
        let activity = Activity::default();
        let methods = descriptors(&candidates, &activity);

        let outcomes = probe_all(
            &plan(methods, None, ActivationFlags::default()),
            &MethodContext::default(),
        );

        prop_assert_eq!(outcomes.len(), candidates.len());
        prop_assert!(outcomes.iter().all(|o| !o.is_unused()));
        prop_assert!(activity.active().is_empty());
    }

    #[test]
    fn test_forced_failure_fails_every_candidate(
        candidates in prop::collection::vec(candidate(), 0..8),
        fake_success in any::<bool>(),
    ) {
        let activity = Activity::default();
        let methods = descriptors(&candidates, &activity);
        let flags = ActivationFlags { fake_success, force_failure: true };

        let activation = activate_first_successful(
            &plan(methods, None, flags),
            &MethodContext::default(),
        );

        let expected = candidates.len() + usize::from(fake_success);
        prop_assert_eq!(activation.outcomes.len(), expected);
        prop_assert!(activation
            .outcomes
            .iter()
            .all(|o| o.failure_stage == Some(FailureStage::ForcedFailure)));
        prop_assert!(activity.entered().is_empty());
    }
}
