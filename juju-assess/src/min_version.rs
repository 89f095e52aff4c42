//! Does the controller honour `min-juju-version` in charm metadata?
//!
//! Each case deploys a throwaway charm gated on one version and checks the
//! controller's answer. How versions compare is the controller's business;
//! nothing here orders versions itself.

use crate::AssessError;
use juju_client::{ClientError, Controller, DeployOutcome, strip_build_suffix, temp_charm};
use std::fmt;
use std::path::Path;

/// What a gate case expects from the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Deploy succeeds and the unit starts
    Pass,
    /// Deploy is rejected
    Fail,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Pass => f.write_str("assert_pass"),
            Expectation::Fail => f.write_str("assert_fail"),
        }
    }
}

/// (min-juju-version, service name, expectation)
pub const GATE_TABLE: &[(&str, &str, Expectation)] = &[
    ("1.25.0", "name1250", Expectation::Pass),
    ("99.9.9", "name9999", Expectation::Fail),
    ("99.9-alpha1", "name999alpha1", Expectation::Fail),
    ("1.2-beta1", "name12beta1", Expectation::Pass),
    ("1.25.5.1", "name12551", Expectation::Pass),
    ("2.0-alpha1", "name20alpha1", Expectation::Pass),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCase {
    pub version: String,
    pub name: String,
    pub expectation: Expectation,
}

/// The fixed table followed by the running version, which must always pass
pub fn gate_cases(current: &str) -> Vec<GateCase> {
    GATE_TABLE
        .iter()
        .map(|(version, name, expectation)| (version.to_string(), name.to_string(), *expectation))
        .chain(std::iter::once((
            current.to_string(),
            "current".to_string(),
            Expectation::Pass,
        )))
        .map(|(version, name, expectation)| GateCase {
            version,
            name,
            expectation,
        })
        .collect()
}

/// Running controller version without series and arch
pub async fn get_current_version<C: Controller>(client: &C) -> Result<String, AssessError> {
    let report = client.get_version().await?;
    Ok(strip_build_suffix(&report))
}

fn violation(assertion: Expectation, ver: &str, cur: &str, reason: String) -> AssessError {
    AssessError::PolicyViolation {
        assertion,
        version: ver.to_string(),
        current: cur.to_string(),
        reason,
    }
}

/// Deploy must be rejected
pub async fn assert_fail<C: Controller>(
    client: &C,
    charm: &Path,
    ver: &str,
    cur: &str,
    name: &str,
) -> Result<(), AssessError> {
    match client.deploy(charm, name).await? {
        DeployOutcome::Rejected(output) => {
            tracing::info!(version = ver, stderr = %output.stderr.trim(), "Deploy rejected as expected.");
            Ok(())
        }
        DeployOutcome::Deployed => Err(violation(
            Expectation::Fail,
            ver,
            cur,
            format!("{name} deployed but should have been rejected"),
        )),
    }
}

/// Deploy must succeed and the unit must start
pub async fn assert_pass<C: Controller>(
    client: &C,
    charm: &Path,
    ver: &str,
    cur: &str,
    name: &str,
) -> Result<(), AssessError> {
    if let DeployOutcome::Rejected(output) = client.deploy(charm, name).await? {
        return Err(violation(
            Expectation::Pass,
            ver,
            cur,
            format!("{name} was rejected: {}", output.stderr.trim()),
        ));
    }

    match client.wait_for_started().await {
        Ok(()) => Ok(()),
        Err(e) if is_tool_failure(&e) => Err(violation(
            Expectation::Pass,
            ver,
            cur,
            format!("{name} did not start: {e}"),
        )),
        Err(e) => Err(e.into()),
    }
}

// juju ran and said no, as opposed to juju not being runnable at all
fn is_tool_failure(e: &ClientError) -> bool {
    matches!(
        e,
        ClientError::CommandFailed { .. } | ClientError::ErrorState { .. } | ClientError::Timeout { .. }
    )
}

/// Run one gate case with its own charm directory
pub async fn assess_deploy<C: Controller>(
    client: &C,
    case: &GateCase,
    current: &str,
) -> Result<(), AssessError> {
    let charm_dir = temp_charm(Some(case.version.as_str()))?;
    tracing::info!("Testing min version {}", case.version);
    match case.expectation {
        Expectation::Pass => {
            assert_pass(client, charm_dir.path(), &case.version, current, &case.name).await
        }
        Expectation::Fail => {
            assert_fail(client, charm_dir.path(), &case.version, current, &case.name).await
        }
    }
}

/// Run every gate case in order, stopping at the first failure
pub async fn assess_min_version<C: Controller>(client: &C) -> Result<(), AssessError> {
    let current = get_current_version(client).await?;
    tracing::info!(current = %current, "Controller version.");
    for case in gate_cases(&current) {
        assess_deploy(client, &case, &current).await?;
    }
    Ok(())
}
