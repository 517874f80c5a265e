// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{GO_NAMESPACE, fixture_env, fixture_records};
use indoc::indoc;
use pretty_assertions::assert_eq;
use triage_core::{
    aggregate::{FailureAggregator, SuiteFallback},
    config::TriageConfig,
    extract::{FailureExtractor, PrefixMatcher},
    record::TestStatus,
    render::{TemplateRenderer, TruncationLimits},
};

fn renderer() -> TemplateRenderer {
    TemplateRenderer::with_default_templates(TruncationLimits::default())
        .expect("default templates are valid")
}

#[test]
fn fixture_records_in_ingestion_order() {
    let records = fixture_records();
    let summary: Vec<_> = records
        .iter()
        .map(|r| (r.name.as_str(), r.status))
        .collect();
    assert_eq!(
        summary,
        [
            ("TestAPIServer", TestStatus::Failed),
            ("TestAPIServer/unauthenticated", TestStatus::Failed),
            ("TestAPIServer/healthy", TestStatus::Passed),
            ("TestAPIServer/timeout", TestStatus::Failed),
            ("TestCompression", TestStatus::Passed),
            (
                "Verify policy Apache Struts: CVE-2017-5638 is triggered",
                TestStatus::Failed
            ),
            ("Verify risk is calculated", TestStatus::Passed),
            ("Verify policy on OpenShift", TestStatus::Skipped),
            ("should render the graph", TestStatus::Error),
            ("should filter by namespace", TestStatus::Passed),
        ]
    );
}

#[test]
fn go_subtests_are_folded() {
    let records = fixture_records();
    let env = fixture_env();
    let failures = FailureExtractor::new(&env, PrefixMatcher::new([GO_NAMESPACE])).extract(&records);

    let renderer = renderer();
    let summaries: Vec<_> = failures
        .iter()
        .map(|f| renderer.summary(f).expect("summary rendered"))
        .collect();
    assert_eq!(
        summaries,
        [
            "github.com/stackrox/rox/pkg/grpc / TestAPIServer FAILED",
            "DefaultPoliciesTest / Verify policy Apache Struts  CVE-2017-5638 is triggered FAILED",
            "Network Graph / should render the graph FAILED",
        ]
    );

    let api_server = &failures[0];
    assert_eq!(
        api_server.message,
        "Failed\
         \nSub test TestAPIServer/unauthenticated: Failed\
         \nSub test TestAPIServer/timeout: Failed"
    );
    assert_eq!(
        api_server.stdout,
        "\nSub test TestAPIServer/unauthenticated: dialing localhost:8443"
    );
    assert_eq!(
        api_server.error,
        "server_test.go:88: subtests failed\
         \nSub test TestAPIServer/unauthenticated: server_test.go:102: expected code Unauthenticated, got OK\
         \nSub test TestAPIServer/timeout: server_test.go:131: context deadline exceeded"
    );
}

#[test]
fn description_of_groovy_failure() {
    let records = fixture_records();
    let env = fixture_env();
    let failures = FailureExtractor::new(&env, PrefixMatcher::default()).extract(&records);
    let struts = failures
        .iter()
        .find(|f| f.suite == "DefaultPoliciesTest")
        .expect("groovy failure extracted");

    let description = renderer().description(struts).expect("description rendered");
    assert_eq!(
        description,
        indoc! {"

            {code:title=Message|borderStyle=solid}
            Condition not satisfied:

            waitForViolation(deploymentName, policyName, 60)
            {code}
            {code:title=ERROR|borderStyle=solid}
            Condition not satisfied:

            waitForViolation(deploymentName, policyName, 60)
            \tat DefaultPoliciesTest.Verify policy #policyName is triggered(DefaultPoliciesTest.groovy:181)
            {code}

            ||    ENV     ||      Value           ||
            | BUILD ID     | [1764913000|https://prow.ci.openshift.org/view/gs/origin-ci-test/logs/periodic-ci-nightly-e2e/1764913000]|
            | BUILD TAG    | [4.4.x-nightly-20240301|https://github.com/stackrox/stackrox/commit/abc123]|
            | JOB NAME     |periodic-ci-nightly-e2e|
            | ORCHESTRATOR |gke|
        "}
    );
}

#[test]
fn standalone_subtests_merge_past_threshold() {
    let records = fixture_records();
    let env = fixture_env();
    let failures = FailureExtractor::new(&env, PrefixMatcher::default()).extract(&records);
    assert_eq!(failures.len(), 5);

    let renderer = renderer();
    let merged = FailureAggregator::new(&renderer, &env, 2, SuiteFallback::JobName)
        .aggregate(failures)
        .expect("merged");
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].suite, "periodic-ci-nightly-e2e");
    assert_eq!(
        merged[0].message,
        indoc! {"
            github.com/stackrox/rox/pkg/grpc / TestAPIServer FAILED
            github.com/stackrox/rox/pkg/grpc / TestAPIServer/unauthenticated FAILED
            github.com/stackrox/rox/pkg/grpc / TestAPIServer/timeout FAILED
            DefaultPoliciesTest / Verify policy Apache Struts  CVE-2017-5638 is triggered FAILED
            Network Graph / should render the graph FAILED
        "}
    );
    assert_eq!(
        renderer.summary(&merged[0]).expect("summary rendered"),
        "periodic-ci-nightly-e2e /  FAILED"
    );
}

#[test]
fn default_config_pipeline() {
    let config = TriageConfig::from_sources(None).expect("default config is valid");
    let renderer = config.renderer().expect("default templates are valid");
    let env = fixture_env();
    let records = fixture_records();

    let failures = FailureExtractor::new(&env, config.namespace_matcher()).extract(&records);
    let failures = FailureAggregator::new(
        &renderer,
        &env,
        config.merge.threshold,
        config.merge.fallback_suite,
    )
    .aggregate(failures)
    .expect("aggregated");

    // The default threshold of 10 is not reached, and no namespaces fold sub-tests.
    assert_eq!(failures.len(), 5);
    assert!(failures.iter().all(|f| f.build_id == "1764913000"));
}
