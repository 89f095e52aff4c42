//! In-memory juju controller for assessment tests
//!
//! `FakeController` implements `juju_client::Controller` without a juju
//! binary:
//! - the version gate is a closure the test supplies, so assessments are
//!   checked against observed accept/reject only
//! - `ssh-keys`, `add-ssh-key` and `remove-ssh-key` work on an in-memory key
//!   store rendered in juju's listing format
//! - every call is recorded for later inspection
//! - individual operations can be made to fail

use juju_client::{
    BootstrapOptions, CharmMetadata, ClientError, CommandOutput, Controller, DeployOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const SYSTEM_KEY_FINGERPRINT: &str = "b4:e9:ce:a4:a4:d0:71:5b:d1:da:ae:a6:53:97:80:c2";
pub const CLIENT_KEY_FINGERPRINT: &str = "7b:36:c7:2c:14:74:69:50:65:37:49:c3:af:f6:db:94";

type Gate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Everything the fake has seen, in call order
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub bootstrapped: bool,
    pub destroyed: bool,
    pub bootstrap_options: Option<BootstrapOptions>,
    /// Services that deployed
    pub deployed: Vec<String>,
    /// Services the gate turned away
    pub rejected: Vec<String>,
    /// `min-juju-version` of every charm offered, in order
    pub offered_versions: Vec<Option<String>>,
    /// Charm directories deploy was pointed at
    pub charm_dirs: Vec<PathBuf>,
    /// (fingerprint, comment) pairs as juju would list them
    pub keys: Vec<(String, String)>,
    /// Sub-commands run through `get_juju_output`
    pub commands: Vec<String>,
    pub wait_calls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Bootstrap,
    Wait,
    Destroy,
    DebugLog,
}

pub struct FakeController {
    model: String,
    version: String,
    gate: Gate,
    ssh_keys_output: Option<String>,
    drop_added_keys: bool,
    failures: Vec<FailOn>,
    state: Mutex<FakeState>,
}

impl FakeController {
    /// Fake with a `2.0-beta7` controller that accepts every charm and has the
    /// two keys juju provisions on bootstrap
    pub fn new(model: &str) -> Self {
        let state = FakeState {
            keys: vec![
                (SYSTEM_KEY_FINGERPRINT.to_string(), "juju-system-key".to_string()),
                (CLIENT_KEY_FINGERPRINT.to_string(), "juju-client-key".to_string()),
            ],
            ..FakeState::default()
        };
        Self {
            model: model.to_string(),
            version: "2.0-beta7-xenial-amd64".to_string(),
            gate: Box::new(|_| true),
            ssh_keys_output: None,
            drop_added_keys: false,
            failures: Vec::new(),
            state: Mutex::new(state),
        }
    }

    /// Full `juju --version` report to hand out
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Decide per `min-juju-version` whether a charm deploys
    pub fn with_gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.gate = Box::new(gate);
        self
    }

    /// Replace the registered keys
    pub fn with_keys<I, F, C>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = (F, C)>,
        F: AsRef<str>,
        C: AsRef<str>,
    {
        self.lock().keys = keys
            .into_iter()
            .map(|(f, c)| (f.as_ref().to_string(), c.as_ref().to_string()))
            .collect();
        self
    }

    /// Answer `ssh-keys` with this text instead of the key store
    pub fn with_ssh_keys_output(mut self, output: &str) -> Self {
        self.ssh_keys_output = Some(output.to_string());
        self
    }

    /// Accept `add-ssh-key` but never list the key
    pub fn dropping_added_keys(mut self) -> Self {
        self.drop_added_keys = true;
        self
    }

    pub fn failing(mut self, op: FailOn) -> Self {
        self.failures.push(op);
        self
    }

    pub fn state(&self) -> FakeState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake controller state poisoned")
    }

    fn fail(&self, op: FailOn, command: &str) -> Result<(), ClientError> {
        if self.failures.contains(&op) {
            return Err(ClientError::CommandFailed {
                command: format!("juju {command}"),
                exit_code: Some(1),
                stderr: format!("ERROR fake {command} failure"),
            });
        }
        Ok(())
    }

    fn render_keys(&self) -> String {
        if let Some(output) = &self.ssh_keys_output {
            return output.clone();
        }
        let mut out = format!("Keys used in model: admin@local/{}\n", self.model);
        for (fingerprint, comment) in &self.lock().keys {
            out.push_str(&format!("{fingerprint} ({comment})\n"));
        }
        out
    }

    fn add_key(&self, key: &str) -> Result<(), ClientError> {
        let comment = key.split_whitespace().nth(2).unwrap_or("").to_string();
        if self.drop_added_keys {
            return Ok(());
        }
        let mut state = self.lock();
        let fingerprint = fake_fingerprint(key);
        state.keys.push((fingerprint, comment));
        Ok(())
    }

    fn remove_key(&self, id: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        let before = state.keys.len();
        state.keys.retain(|(f, c)| f != id && c != id);
        if state.keys.len() == before {
            return Err(ClientError::CommandFailed {
                command: format!("juju remove-ssh-key -m {} {id}", self.model),
                exit_code: Some(1),
                stderr: format!("ERROR invalid ssh key: {id}"),
            });
        }
        Ok(())
    }
}

// Stable per key text, formatted like juju's md5 fingerprints.
fn fake_fingerprint(key: &str) -> String {
    let mut acc: u32 = 2166136261;
    let mut octets = Vec::with_capacity(16);
    for i in 0..16u32 {
        for b in key.bytes() {
            acc = (acc ^ u32::from(b)).wrapping_mul(16777619);
        }
        acc = acc.wrapping_add(i);
        octets.push(format!("{:02x}", acc & 0xff));
    }
    octets.join(":")
}

impl Controller for FakeController {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn bootstrap(&self, options: &BootstrapOptions) -> Result<(), ClientError> {
        self.fail(FailOn::Bootstrap, "bootstrap")?;
        let mut state = self.lock();
        state.bootstrapped = true;
        state.bootstrap_options = Some(options.clone());
        Ok(())
    }

    async fn deploy(&self, charm: &Path, service: &str) -> Result<DeployOutcome, ClientError> {
        let metadata = CharmMetadata::read_from(charm)?;
        let mut state = self.lock();
        state.offered_versions.push(metadata.min_juju_version.clone());
        state.charm_dirs.push(charm.to_path_buf());

        let refusal = if state.deployed.iter().any(|s| s == service) {
            Some(format!("ERROR application already exists: {service}"))
        } else {
            match &metadata.min_juju_version {
                Some(min) if !(self.gate)(min.as_str()) => Some(format!(
                    "ERROR charm's min version ({min}) is higher than this juju environment's version ({})",
                    juju_client::strip_build_suffix(&self.version)
                )),
                _ => None,
            }
        };

        match refusal {
            None => {
                tracing::debug!(service, "fake deploy accepted");
                state.deployed.push(service.to_string());
                Ok(DeployOutcome::Deployed)
            }
            Some(stderr) => {
                tracing::debug!(service, %stderr, "fake deploy rejected");
                state.rejected.push(service.to_string());
                Ok(DeployOutcome::Rejected(CommandOutput {
                    command: format!("juju deploy -m {} {} {service}", self.model, charm.display()),
                    stdout: String::new(),
                    stderr,
                    success: false,
                    exit_code: Some(1),
                }))
            }
        }
    }

    async fn wait_for_started(&self) -> Result<(), ClientError> {
        self.lock().wait_calls += 1;
        if self.failures.contains(&FailOn::Wait) {
            return Err(ClientError::ErrorState {
                agent: "unit-dummy-0".to_string(),
                message: "hook failed: \"install\"".to_string(),
            });
        }
        Ok(())
    }

    async fn get_version(&self) -> Result<String, ClientError> {
        Ok(self.version.clone())
    }

    async fn get_juju_output(&self, command: &str, args: &[&str]) -> Result<String, ClientError> {
        self.lock().commands.push(command.to_string());
        match (command, args) {
            ("ssh-keys", _) => Ok(self.render_keys()),
            ("add-ssh-key", [key]) => self.add_key(key).map(|_| String::new()),
            ("remove-ssh-key", [id]) => self.remove_key(id).map(|_| String::new()),
            _ => Err(ClientError::CommandFailed {
                command: format!("juju {command} {}", args.join(" ")),
                exit_code: Some(2),
                stderr: format!("ERROR unrecognized command: juju {command}"),
            }),
        }
    }

    async fn debug_log(&self) -> Result<String, ClientError> {
        self.fail(FailOn::DebugLog, "debug-log")?;
        Ok(format!("machine-0: {} fake debug log\n", self.model))
    }

    async fn destroy_environment(&self) -> Result<(), ClientError> {
        self.fail(FailOn::Destroy, "kill-controller")?;
        self.lock().destroyed = true;
        Ok(())
    }
}
