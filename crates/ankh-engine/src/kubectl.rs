//! Applying assembled manifests with kubectl

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::error::{EngineError, Result};
use crate::process;

/// What kubectl does with the manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubectlAction {
    Apply,
    Delete,
}

impl fmt::Display for KubectlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KubectlAction::Apply => write!(f, "apply"),
            KubectlAction::Delete => write!(f, "delete"),
        }
    }
}

/// A kubectl binary
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: PathBuf,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

impl Kubectl {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line; manifests are read from stdin
    pub fn args(
        &self,
        action: KubectlAction,
        kube_context: &str,
        namespace: &str,
    ) -> Vec<OsString> {
        vec![
            action.to_string().into(),
            "--context".into(),
            kube_context.into(),
            "--namespace".into(),
            namespace.into(),
            "-f".into(),
            "-".into(),
        ]
    }

    /// Pipe `manifests` through kubectl, returning its stdout
    pub fn execute(
        &self,
        action: KubectlAction,
        manifests: &str,
        kube_context: &str,
        namespace: &str,
    ) -> Result<String> {
        tracing::info!(%action, context = kube_context, namespace, "running kubectl");

        let output = process::run(
            self.program.as_os_str(),
            self.args(action, kube_context, namespace),
            Some(manifests),
        )?;

        if !output.success() {
            return Err(EngineError::Apply {
                program: self.program.display().to_string(),
                action: action.to_string(),
                namespace: namespace.to_string(),
                status: output.describe_status(),
                output: output.stderr,
            });
        }

        Ok(output.stdout)
    }
}
