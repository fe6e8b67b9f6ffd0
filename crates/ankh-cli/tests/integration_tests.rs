//! Integration tests for CLI commands
//!
//! Every test builds its own home directory, global config and unit tree in
//! a temp dir and points the binary at stub `helm`/`kubectl` scripts.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Prints `# <namespace>/<chart>` and the highest precedence value file
const HELM_STUB: &str = r##"
ns=""; last=""; chart=""
while [ $# -gt 0 ]; do
  case "$1" in
    template) shift ;;
    --namespace) ns="$2"; shift 2 ;;
    --kube-context|--set) shift 2 ;;
    -f) last="$2"; shift 2 ;;
    *) chart="$1"; shift ;;
  esac
done
echo "---"
echo "# $ns/$(basename "$chart")"
if [ -n "$last" ]; then cat "$last"; fi
"##;

const FAILING_HELM_STUB: &str = r#"
echo "Error: parse error in templates/deployment.yaml" >&2
exit 1
"#;

const KUBECTL_STUB: &str = r#"
echo "kubectl $*"
cat >/dev/null
"#;

const CONFIG: &str = r#"
current_context: main
supported_environments: [prod, staging]
supported_resource_profiles: [natural, constrained]
contexts:
  main:
    kube_context: east
    environment: prod
    resource_profile: natural
    helm_registry_url: http://127.0.0.1:9
    cluster_admin: true
    global:
      region: us-east-1
  dev:
    kube_context: minikube
    environment: staging
    resource_profile: constrained
    helm_registry_url: http://127.0.0.1:9
"#;

struct Fixture {
    temp: TempDir,
    helm: PathBuf,
    kubectl: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("home")).unwrap();
        std::fs::create_dir_all(temp.path().join("bin")).unwrap();

        let helm = write_script(&temp.path().join("bin/helm"), HELM_STUB);
        let kubectl = write_script(&temp.path().join("bin/kubectl"), KUBECTL_STUB);
        let fixture = Self {
            temp,
            helm,
            kubectl,
        };
        fixture.write("config.yaml", CONFIG);
        fixture
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn local_chart(&self, unit_dir: &str, chart: &str) {
        std::fs::create_dir_all(self.path(&format!("{unit_dir}/charts/{chart}"))).unwrap();
    }

    /// root -> (admin) rbac, db; every chart available locally
    fn unit_tree(&self) {
        self.write(
            "app/ankh.yaml",
            r#"
namespace: web
admin_dependencies: [rbac]
dependencies: [db]
charts:
  - name: site
    version: 1.0.0
    default_values:
      replicas: 1
"#,
        );
        self.write(
            "app/rbac/ankh.yaml",
            "namespace: kube-system\ncharts:\n  - name: roles\n",
        );
        self.write(
            "app/db/ankh.yaml",
            r#"
namespace: data
charts:
  - name: postgres
    version: 12.1.0
    default_values:
      replicas: 1
    values:
      prod:
        replicas: 3
      staging:
        replicas: 2
"#,
        );
        self.local_chart("app", "site");
        self.local_chart("app/rbac", "roles");
        self.local_chart("app/db", "postgres");
    }

    /// Run `command -f <descriptor>`
    fn ankh_unit(&self, command: &str, descriptor: &str) -> Output {
        let descriptor = self.path(descriptor);
        self.ankh(&[command, "-f", descriptor.to_str().unwrap()])
    }

    fn ankh(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ankh"))
            .arg("--config")
            .arg(self.path("config.yaml"))
            .args(args)
            .env("HOME", self.path("home"))
            .env("ANKH_HELM", &self.helm)
            .env("ANKH_KUBECTL", &self.kubectl)
            .env_remove("ANKH_CONFIG")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute ankh")
    }
}

fn write_script(path: &Path, body: &str) -> PathBuf {
    std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod template_command {
    use super::*;

    #[test]
    fn test_template_orders_dependencies_first() {
        let fixture = Fixture::new();
        fixture.unit_tree();

        let output = fixture.ankh_unit("template", "app/ankh.yaml");

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        insta::assert_snapshot!(stdout(&output), @r"
        ---
        # kube-system/roles
        ---
        # data/postgres
        replicas: 3
        ---
        # web/site
        replicas: 1
        ");
    }

    #[test]
    fn test_template_creates_run_workspace() {
        let fixture = Fixture::new();
        fixture.unit_tree();

        let output = fixture.ankh_unit("template", "app/ankh.yaml");
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let runs: Vec<_> = std::fs::read_dir(fixture.path("home/.ankh/data"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].join("postgres/values-prod.yaml").is_file());
        assert!(runs[0].join("postgres/default-values.yaml").is_file());
    }

    #[test]
    fn test_template_debug_logs_effective_values() {
        let fixture = Fixture::new();
        fixture.unit_tree();
        let descriptor = fixture.path("app/ankh.yaml");

        let output = fixture.ankh(&["--debug", "template", "-f", descriptor.to_str().unwrap()]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stderr = stderr(&output);
        assert!(stderr.contains("effective values"), "stderr: {stderr}");
        assert!(stderr.contains("region: us-east-1"), "stderr: {stderr}");
        assert!(!stdout(&output).contains("effective values"));
    }

    #[test]
    fn test_template_helm_failure() {
        let fixture = Fixture::new();
        fixture.unit_tree();
        write_script(&fixture.helm, FAILING_HELM_STUB);

        let output = fixture.ankh_unit("template", "app/ankh.yaml");

        assert_eq!(output.status.code(), Some(3));
        assert!(stdout(&output).is_empty());
        let stderr = stderr(&output);
        assert!(stderr.contains("roles"), "stderr: {stderr}");
        assert!(
            stderr.contains("Error: parse error in templates/deployment.yaml"),
            "stderr: {stderr}"
        );
    }

    #[test]
    fn test_template_unsupported_environment() {
        let fixture = Fixture::new();
        fixture.write(
            "app/ankh.yaml",
            "namespace: web\ncharts:\n  - name: site\n    values:\n      qa: {replicas: 1}\n",
        );
        fixture.local_chart("app", "site");

        let output = fixture.ankh_unit("template", "app/ankh.yaml");

        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("unsupported environment 'qa'"));
    }

    #[test]
    fn test_template_dependency_cycle() {
        let fixture = Fixture::new();
        fixture.write("a/ankh.yaml", "namespace: a\ndependencies: [../b]\n");
        fixture.write("b/ankh.yaml", "namespace: b\ndependencies: [../a]\n");

        let output = fixture.ankh_unit("template", "a/ankh.yaml");

        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("dependency cycle detected"));
    }

    #[test]
    fn test_template_missing_descriptor() {
        let fixture = Fixture::new();

        let output = fixture.ankh_unit("template", "nope/ankh.yaml");

        assert_eq!(output.status.code(), Some(4));
    }
}

mod config_command {
    use super::*;

    #[test]
    fn test_config_shows_current_context() {
        let fixture = Fixture::new();

        let output = fixture.ankh(&["config"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stdout = stdout(&output);
        assert!(stdout.contains("main"));
        assert!(stdout.contains("kube_context:      east"));
        assert!(stdout.contains("environment:       prod"));
        assert!(stdout.contains("dev"));
    }

    #[test]
    fn test_config_lists_every_violation() {
        let fixture = Fixture::new();
        fixture.write(
            "config.yaml",
            r#"
current_context: missing
contexts:
  main:
    kube_context: east
"#,
        );

        let output = fixture.ankh(&["config"]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = stderr(&output);
        for expected in [
            "supported_environments",
            "supported_resource_profiles",
            "context 'missing' not found",
        ] {
            assert!(stderr.contains(expected), "missing {expected:?} in {stderr}");
        }
    }

    #[test]
    fn test_invalid_config_blocks_template() {
        let fixture = Fixture::new();
        fixture.unit_tree();
        fixture.write("config.yaml", "current_context: main\n");

        let output = fixture.ankh_unit("template", "app/ankh.yaml");

        assert_eq!(output.status.code(), Some(2));
        assert!(stdout(&output).is_empty());
    }
}

mod apply_command {
    use super::*;

    #[test]
    fn test_apply_uses_root_namespace() {
        let fixture = Fixture::new();
        fixture.unit_tree();

        let output = fixture.ankh_unit("apply", "app/ankh.yaml");

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(
            stdout(&output),
            "kubectl apply --context east --namespace web -f -\n"
        );
    }

    #[test]
    fn test_delete_failure() {
        let fixture = Fixture::new();
        fixture.unit_tree();
        write_script(
            &fixture.kubectl,
            "cat >/dev/null\necho 'Error from server (Forbidden)' >&2\nexit 1\n",
        );

        let output = fixture.ankh_unit("delete", "app/ankh.yaml");

        assert_eq!(output.status.code(), Some(6));
        assert!(stderr(&output).contains("Error from server (Forbidden)"));
    }
}
