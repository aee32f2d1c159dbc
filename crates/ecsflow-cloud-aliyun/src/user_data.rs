//! Built-in user-data scripts
//!
//! Scripts run by cloud-init on first boot. ECS expects user data as
//! base64, so [`encode`] must be applied before passing one to
//! [`InstanceSpec::with_user_data`](ecsflow_cloud::InstanceSpec::with_user_data).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Docker installer script
/// Updates packages, installs docker.io and enables the service
pub const DOCKER_SETUP: &str = r#"#!/bin/bash
set -e

apt-get update -y
apt-get upgrade -y
apt-get install -y docker.io
systemctl start docker
systemctl enable docker
"#;

/// Name of the script used when none is configured
pub const DEFAULT_SCRIPT: &str = "docker-setup";

/// Get the script content for a built-in script name
pub fn get_builtin_script(name: &str) -> Option<&'static str> {
    match name {
        "docker-setup" => Some(DOCKER_SETUP),
        _ => None,
    }
}

/// Base64-encode a script for the UserData parameter
pub fn encode(script: &str) -> String {
    STANDARD.encode(script.as_bytes())
}
