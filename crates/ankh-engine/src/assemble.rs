//! Manifest assembly over a unit tree

use ankh_core::{UnitDescriptor, ValidatedConfig};

use crate::error::Result;
use crate::render::ChartRenderer;

/// Walks a unit tree depth first and concatenates rendered charts
///
/// For every unit: admin dependencies (cluster admins only), then ordinary
/// dependencies, then the unit's own charts in declaration order.
pub struct Assembler<'a, R> {
    config: &'a ValidatedConfig,
    renderer: R,
}

impl<'a, R: ChartRenderer> Assembler<'a, R> {
    pub fn new(config: &'a ValidatedConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    /// Render the whole tree, all or nothing
    pub fn assemble(&self, unit: &UnitDescriptor) -> Result<String> {
        let mut out = String::new();
        self.assemble_into(unit, &mut out)?;
        Ok(out)
    }

    /// Render the whole tree into `out`
    ///
    /// On error `out` keeps whatever was rendered before the failure.
    pub fn assemble_into(&self, unit: &UnitDescriptor, out: &mut String) -> Result<()> {
        let context = self.config.current_context();

        if context.cluster_admin {
            for dep in &unit.admin_dependencies {
                tracing::debug!(reference = %dep.reference, "assembling admin dependency");
                self.assemble_into(&dep.unit, out)?;
            }
        } else if !unit.admin_dependencies.is_empty() {
            tracing::debug!(
                path = %unit.path.display(),
                skipped = unit.admin_dependencies.len(),
                "context is not a cluster admin, skipping admin dependencies"
            );
        }

        for dep in &unit.dependencies {
            tracing::debug!(reference = %dep.reference, "assembling dependency");
            self.assemble_into(&dep.unit, out)?;
        }

        for chart in &unit.charts {
            chart.validate(self.config)?;
            out.push_str(&self.renderer.render_chart(chart, unit)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::process::ProcessOutput;
    use crate::render::{Renderer, TemplateEngine, TemplateRequest};
    use ankh_core::{ChartDescriptor, CoreError, GlobalConfig, Workspace};
    use ankh_repo::{ChartFetcher, FetchError};
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Emits `# <namespace>/<chart>` per chart and records the order
    #[derive(Default)]
    struct Recorder {
        fail_on: Option<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl ChartRenderer for Recorder {
        fn render_chart(&self, chart: &ChartDescriptor, unit: &UnitDescriptor) -> Result<String> {
            if self.fail_on == Some(chart.name.as_str()) {
                return Err(EngineError::Render {
                    chart: chart.name.clone(),
                    unit: unit.path.clone(),
                    program: "helm".to_string(),
                    status: "exit status 1".to_string(),
                    output: "boom\n".to_string(),
                });
            }
            self.seen.borrow_mut().push(chart.name.clone());
            Ok(format!("# {}/{}\n", unit.namespace, chart.name))
        }
    }

    fn config(admin: bool) -> ValidatedConfig {
        GlobalConfig::from_yaml(&format!(
            r#"
current_context: main
supported_environments: [prod, staging]
supported_resource_profiles: [natural]
contexts:
  main:
    kube_context: east
    environment: prod
    resource_profile: natural
    helm_registry_url: https://charts.example.com
    cluster_admin: {admin}
"#
        ))
        .unwrap()
        .validate()
        .unwrap()
    }

    fn write_unit(root: &Path, dir: &str, body: &str) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ankh.yaml"), body).unwrap();
    }

    fn tree(root: &Path) -> UnitDescriptor {
        write_unit(
            root,
            "app",
            "namespace: web\nadmin_dependencies: [rbac]\ndependencies: [db]\ncharts:\n  - name: frontend\n  - name: api\n",
        );
        write_unit(root, "app/rbac", "namespace: kube-system\ncharts:\n  - name: roles\n");
        write_unit(root, "app/db", "namespace: data\ncharts:\n  - name: postgres\n");
        UnitDescriptor::load(root.join("app/ankh.yaml")).unwrap()
    }

    #[test]
    fn test_order_for_cluster_admin() {
        let temp = TempDir::new().unwrap();
        let config = config(true);
        let assembler = Assembler::new(&config, Recorder::default());

        let out = assembler.assemble(&tree(temp.path())).unwrap();

        insta::assert_snapshot!(out, @r"
        # kube-system/roles
        # data/postgres
        # web/frontend
        # web/api
        ");
    }

    #[test]
    fn test_admin_dependencies_skipped() {
        let temp = TempDir::new().unwrap();
        let config = config(false);
        let recorder = Recorder::default();
        let assembler = Assembler::new(&config, &recorder);

        let out = assembler.assemble(&tree(temp.path())).unwrap();

        assert_eq!(out, "# data/postgres\n# web/frontend\n# web/api\n");
        assert_eq!(
            recorder.seen.borrow().as_slice(),
            ["postgres", "frontend", "api"]
        );
    }

    #[test]
    fn test_empty_unit() {
        let temp = TempDir::new().unwrap();
        write_unit(temp.path(), "empty", "namespace: web\n");
        let unit = UnitDescriptor::load(temp.path().join("empty/ankh.yaml")).unwrap();
        let config = config(true);

        let out = Assembler::new(&config, Recorder::default())
            .assemble(&unit)
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_unsupported_environment_aborts() {
        let temp = TempDir::new().unwrap();
        write_unit(
            temp.path(),
            "app",
            "namespace: web\ncharts:\n  - name: ok\n  - name: bad\n    values:\n      qa: {replicas: 1}\n  - name: never\n",
        );
        let unit = UnitDescriptor::load(temp.path().join("app/ankh.yaml")).unwrap();
        let config = config(false);
        let recorder = Recorder::default();

        let mut out = String::new();
        let err = Assembler::new(&config, &recorder)
            .assemble_into(&unit, &mut out)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Core(CoreError::UnsupportedEnvironment { ref chart, ref environment })
                if chart == "bad" && environment == "qa"
        ));
        assert_eq!(out, "# web/ok\n");
        assert_eq!(recorder.seen.borrow().as_slice(), ["ok"]);
    }

    #[test]
    fn test_render_failure_keeps_partial_output() {
        let temp = TempDir::new().unwrap();
        let config = config(true);
        let recorder = Recorder {
            fail_on: Some("frontend"),
            ..Recorder::default()
        };
        let assembler = Assembler::new(&config, &recorder);
        let unit = tree(temp.path());

        let mut out = String::new();
        let err = assembler.assemble_into(&unit, &mut out).unwrap_err();
        assert!(matches!(err, EngineError::Render { ref chart, .. } if chart == "frontend"));
        assert_eq!(out, "# kube-system/roles\n# data/postgres\n");

        assert!(assembler.assemble(&unit).is_err());
    }

    /// Prints the highest precedence value file it was handed
    struct TopLayer;

    impl TemplateEngine for TopLayer {
        fn name(&self) -> &str {
            "top-layer"
        }

        fn template(&self, request: &TemplateRequest<'_>) -> Result<ProcessOutput> {
            let chart = request.chart.file_name().unwrap().to_string_lossy();
            let top = request
                .value_files
                .last()
                .map(|path| std::fs::read_to_string(path).unwrap())
                .unwrap_or_default();
            Ok(ProcessOutput::new(
                Some(0),
                format!("---\n# {}/{}\n{}", request.namespace, chart, top),
                "",
            ))
        }
    }

    struct NoRegistry;

    impl ChartFetcher for NoRegistry {
        fn fetch(&self, _: &str, name: &str, _: &str) -> ankh_repo::Result<Vec<u8>> {
            Err(FetchError::NotFound {
                url: name.to_string(),
            })
        }
    }

    #[test]
    fn test_end_to_end_with_local_charts() {
        let temp = TempDir::new().unwrap();
        write_unit(
            temp.path(),
            "root",
            "namespace: web\ndependencies: [child]\ncharts:\n  - name: site\n    default_values: {replicas: 1}\n",
        );
        write_unit(
            temp.path(),
            "root/child",
            "namespace: cache\ncharts:\n  - name: redis\n    default_values: {replicas: 1}\n    values:\n      prod: {replicas: 3}\n      staging: {replicas: 2}\n",
        );
        std::fs::create_dir_all(temp.path().join("root/charts/site")).unwrap();
        std::fs::create_dir_all(temp.path().join("root/child/charts/redis")).unwrap();

        let unit = UnitDescriptor::load(temp.path().join("root/ankh.yaml")).unwrap();
        let config = config(false);
        let workspace = Workspace::new(temp.path().join("run"));
        let renderer = Renderer::new(&config, &workspace, TopLayer, NoRegistry);

        let out = Assembler::new(&config, renderer).assemble(&unit).unwrap();

        insta::assert_snapshot!(out, @r"
        ---
        # cache/redis
        replicas: 3
        ---
        # web/site
        replicas: 1
        ");
    }
}
