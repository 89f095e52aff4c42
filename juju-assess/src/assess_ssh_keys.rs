//! Are ssh keys provisioned and propagated for a model?

use crate::AssessError;
use crate::ssh_keys::{SshKey, parse_ssh_keys_output};
use juju_client::Controller;
use ssh_key::{Algorithm, PrivateKey};

/// List the keys registered to the client's model
pub async fn list_ssh_keys<C: Controller>(client: &C) -> Result<Vec<SshKey>, AssessError> {
    let output = client.get_juju_output("ssh-keys", &[]).await?;
    Ok(parse_ssh_keys_output(&output, client.model_name())?)
}

/// Bootstrap must have registered the system and client keys
pub fn check_provisioned_keys(keys: &[SshKey]) -> Result<(), AssessError> {
    if !keys.iter().any(SshKey::is_juju_system_key) {
        return Err(AssessError::Assertion(format!(
            "juju-system-key missing from {}",
            render(keys)
        )));
    }
    if !keys.iter().any(SshKey::is_juju_client_key) {
        return Err(AssessError::Assertion(format!(
            "juju-client-key missing from {}",
            render(keys)
        )));
    }
    Ok(())
}

/// Fresh ed25519 public key in authorized_keys format
pub fn generate_public_key(comment: &str) -> Result<String, AssessError> {
    let private = PrivateKey::random(&mut rand::rngs::OsRng, Algorithm::Ed25519)?;
    let public = private.public_key().to_openssh()?;
    Ok(format!("{public} {comment}"))
}

fn render(keys: &[SshKey]) -> String {
    let lines: Vec<String> = keys.iter().map(ToString::to_string).collect();
    format!("[{}]", lines.join(", "))
}

/// Check the provisioned keys, then add a key, see it listed, remove it and
/// see the listing return to what it was
pub async fn assess_ssh_keys<C: Controller>(client: &C) -> Result<(), AssessError> {
    let initial = list_ssh_keys(client).await?;
    tracing::info!(count = initial.len(), "Found ssh keys.");
    check_provisioned_keys(&initial)?;

    let comment = format!("juju-assess@{}", client.model_name());
    let public_key = generate_public_key(&comment)?;
    client.get_juju_output("add-ssh-key", &[public_key.as_str()]).await?;

    let added = list_ssh_keys(client).await?;
    let Some(new_key) = added.iter().find(|k| k.comment() == comment) else {
        return Err(AssessError::Assertion(format!(
            "added key {comment} not listed in {}",
            render(&added)
        )));
    };
    tracing::info!(key = %new_key, "Added ssh key is listed.");

    client
        .get_juju_output("remove-ssh-key", &[new_key.fingerprint()])
        .await?;

    let remaining = list_ssh_keys(client).await?;
    if remaining != initial {
        return Err(AssessError::Assertion(format!(
            "after removing {comment} expected {} got {}",
            render(&initial),
            render(&remaining)
        )));
    }
    tracing::info!("Removed ssh key is gone.");
    Ok(())
}
