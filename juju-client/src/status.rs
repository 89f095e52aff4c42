//! Just enough of `juju status --format json` to tell when agents are up

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub machines: BTreeMap<String, AgentEntry>,
    // 1.x calls them services
    #[serde(default, alias = "services")]
    pub applications: BTreeMap<String, Application>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub units: BTreeMap<String, AgentEntry>,
}

/// A machine or unit entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentEntry {
    #[serde(rename = "juju-status")]
    pub juju_status: Option<StatusInfo>,
    #[serde(rename = "agent-state")]
    pub agent_state: Option<String>,
    #[serde(rename = "agent-state-info")]
    pub agent_state_info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusInfo {
    pub current: Option<String>,
    pub message: Option<String>,
}

/// What `wait_for_started` should do with one status snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Started,
    /// Agents still coming up, with their current states
    Pending(Vec<(String, String)>),
    /// An agent reported an error
    Failed { agent: String, message: String },
}

impl AgentEntry {
    fn state(&self) -> &str {
        self.juju_status
            .as_ref()
            .and_then(|s| s.current.as_deref())
            .or(self.agent_state.as_deref())
            .unwrap_or("pending")
    }

    fn message(&self) -> String {
        self.juju_status
            .as_ref()
            .and_then(|s| s.message.clone())
            .or_else(|| self.agent_state_info.clone())
            .unwrap_or_default()
    }
}

impl Status {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Machines must report `started`; units `idle` (2.x) or `started` (1.x)
    pub fn readiness(&self) -> Readiness {
        let mut pending = Vec::new();

        let machines = self.machines.iter().map(|(id, m)| (format!("machine-{id}"), m, false));
        let units = self
            .applications
            .values()
            .flat_map(|app| app.units.iter())
            .map(|(name, u)| (format!("unit-{}", name.replace('/', "-")), u, true));

        for (agent, entry, is_unit) in machines.chain(units) {
            match entry.state() {
                "error" => {
                    return Readiness::Failed {
                        agent,
                        message: entry.message(),
                    };
                }
                "started" => {}
                "idle" if is_unit => {}
                other => pending.push((agent, other.to_string())),
            }
        }

        if pending.is_empty() {
            Readiness::Started
        } else {
            Readiness::Pending(pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_when_all_agents_settled() {
        let status = Status::from_json(
            r#"{
                "model": {"name": "assess-env"},
                "machines": {"0": {"juju-status": {"current": "started"}}},
                "applications": {
                    "name1250": {"units": {"name1250/0": {"juju-status": {"current": "idle"}}}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(status.readiness(), Readiness::Started);
    }

    #[test]
    fn test_pending_lists_agents() {
        let status = Status::from_json(
            r#"{
                "machines": {
                    "0": {"juju-status": {"current": "started"}},
                    "1": {"juju-status": {"current": "pending"}}
                },
                "applications": {
                    "current": {"units": {"current/0": {"juju-status": {"current": "allocating"}}}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            status.readiness(),
            Readiness::Pending(vec![
                ("machine-1".to_string(), "pending".to_string()),
                ("unit-current-0".to_string(), "allocating".to_string()),
            ])
        );
    }

    #[test]
    fn test_legacy_agent_state() {
        let status = Status::from_json(
            r#"{
                "machines": {"0": {"agent-state": "started"}},
                "services": {
                    "dummy": {"units": {"dummy/0": {"agent-state": "error", "agent-state-info": "hook failed: install"}}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            status.readiness(),
            Readiness::Failed {
                agent: "unit-dummy-0".to_string(),
                message: "hook failed: install".to_string(),
            }
        );
    }

    #[test]
    fn test_idle_machine_is_not_started() {
        let status =
            Status::from_json(r#"{"machines": {"0": {"juju-status": {"current": "idle"}}}}"#)
                .unwrap();
        assert!(matches!(status.readiness(), Readiness::Pending(_)));
    }
}
