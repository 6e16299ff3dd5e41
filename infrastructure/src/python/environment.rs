//! Virtual environment provisioner
//!
//! Prepares a generation root for validation:
//!
//! ```text
//! <root>/.venv/                  virtual environment with the package set
//! <root>/conftest.py             docstring collection hook
//! <root>/pyrightconfig.json      checker configuration pointing at the venv
//! <root>/<package>/__init__.py
//! <root>/tests/__init__.py
//! ```
//!
//! Every step is skipped when its result is already in place, so a root can
//! be provisioned again cheaply.

use super::process::ProcessSpec;
use crate::config::FileEnvironmentConfig;
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolguard_application::{EnvironmentProvisionerPort, ProvisionError};
use toolguard_domain::FileTwin;
use toolguard_domain::generation::layout::TESTS_DIR;
use tracing::{debug, info};

/// Records the installed package set inside the venv
const PACKAGES_MARKER: &str = ".toolguard-packages";

/// Timeout for `venv` creation and `pip install`
const INSTALL_TIMEOUT: Duration = Duration::from_secs(900);

/// Attaches each test function's docstring to its report entry
pub const CONFTEST: &str = r#""""Test collection hook installed by toolguard; do not edit."""
import inspect


def pytest_collection_modifyitems(session, config, items):
    for item in items:
        func = getattr(item, "function", None)
        doc = inspect.getdoc(func) if func is not None else None
        if doc:
            item.user_properties.append(("docstring", doc.strip()))
"#;

/// Location of executables inside a virtual environment
pub fn venv_executable(venv: &Path, name: &str) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join(format!("{name}.exe"))
    } else {
        venv.join("bin").join(name)
    }
}

/// Provisions `<root>/<venv_dir>` with `python -m venv` and `pip`
pub struct VenvProvisioner {
    python: String,
    venv_dir: String,
    packages: Vec<String>,
}

impl VenvProvisioner {
    pub fn new(config: &FileEnvironmentConfig) -> Self {
        Self {
            python: config.python.clone(),
            venv_dir: config.venv_dir.clone(),
            packages: config.packages.clone(),
        }
    }

    pub fn venv_path(&self, root: &Path) -> PathBuf {
        root.join(&self.venv_dir)
    }

    async fn ensure_venv(&self, root: &Path) -> Result<PathBuf, ProvisionError> {
        let venv = self.venv_path(root);
        let python = venv_executable(&venv, "python");
        if python.exists() {
            debug!("Reusing virtual environment at {}", venv.display());
            return Ok(python);
        }

        let interpreter = which::which(&self.python)
            .map_err(|e| ProvisionError::InterpreterNotFound(format!("{}: {e}", self.python)))?;
        info!("Creating virtual environment at {}", venv.display());

        let output = ProcessSpec::new(&interpreter, root, INSTALL_TIMEOUT)
            .arg("-m")
            .arg("venv")
            .arg(&venv)
            .run()
            .await
            .map_err(|e| ProvisionError::VenvCreation(e.to_string()))?;
        if !output.success() || !python.exists() {
            return Err(ProvisionError::VenvCreation(output.combined()));
        }
        Ok(python)
    }

    async fn ensure_packages(&self, root: &Path, python: &Path) -> Result<(), ProvisionError> {
        let marker = self.venv_path(root).join(PACKAGES_MARKER);
        let wanted = self.marker_content();
        if tokio::fs::read_to_string(&marker)
            .await
            .is_ok_and(|installed| installed == wanted)
        {
            debug!("Packages already installed: {}", self.packages.join(", "));
            return Ok(());
        }

        info!("Installing {}", self.packages.join(", "));
        let mut spec = ProcessSpec::new(python, root, INSTALL_TIMEOUT)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("--disable-pip-version-check")
            .arg("--quiet");
        for package in &self.packages {
            spec = spec.arg(package);
        }
        let output = spec
            .run()
            .await
            .map_err(|e| ProvisionError::Install(e.to_string()))?;
        if !output.success() {
            return Err(ProvisionError::Install(output.combined()));
        }

        tokio::fs::write(&marker, wanted).await?;
        Ok(())
    }

    fn marker_content(&self) -> String {
        let mut packages = self.packages.clone();
        packages.sort();
        packages.join("\n")
    }

    /// Write the hook, checker configuration and package markers.
    pub async fn write_support_files(&self, root: &Path, package: &str) -> Result<(), ProvisionError> {
        let pyright_config = json!({
            "venvPath": ".",
            "venv": self.venv_dir,
            "include": [package, TESTS_DIR],
            "typeCheckingMode": "basic",
            "reportMissingModuleSource": "none",
        });
        let pyright_config = serde_json::to_string_pretty(&pyright_config)
            .map_err(|e| ProvisionError::Io(std::io::Error::other(e)))?;

        write_twin(&FileTwin::new("conftest.py", CONFTEST), root).await?;
        write_twin(&FileTwin::new("pyrightconfig.json", pyright_config), root).await?;

        for init in [format!("{package}/__init__.py"), format!("{TESTS_DIR}/__init__.py")] {
            let twin = FileTwin::new(init, "");
            if !tokio::fs::try_exists(twin.path_in(root)).await? {
                write_twin(&twin, root).await?;
            }
        }
        Ok(())
    }
}

async fn write_twin(twin: &FileTwin, root: &Path) -> std::io::Result<()> {
    let path = twin.path_in(root);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &twin.content).await
}

#[async_trait]
impl EnvironmentProvisionerPort for VenvProvisioner {
    async fn provision(&self, root: &Path, package: &str) -> Result<(), ProvisionError> {
        tokio::fs::create_dir_all(root).await?;
        let python = self.ensure_venv(root).await?;
        self.ensure_packages(root, &python).await?;
        self.write_support_files(root, package).await?;
        info!("Environment ready at {}", root.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioner() -> VenvProvisioner {
        VenvProvisioner::new(&FileEnvironmentConfig::default())
    }

    #[tokio::test]
    async fn test_write_support_files() {
        let dir = tempfile::tempdir().unwrap();
        provisioner().write_support_files(dir.path(), "bank").await.unwrap();

        let conftest = std::fs::read_to_string(dir.path().join("conftest.py")).unwrap();
        assert!(conftest.contains("item.user_properties.append((\"docstring\""));
        assert!(dir.path().join("bank/__init__.py").exists());
        assert!(dir.path().join("tests/__init__.py").exists());

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("pyrightconfig.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["venv"], ".venv");
        assert_eq!(config["include"], json!(["bank", "tests"]));
    }

    #[tokio::test]
    async fn test_write_support_files_keeps_existing_package_init() {
        let dir = tempfile::tempdir().unwrap();
        FileTwin::new("bank/__init__.py", "VERSION = 1\n").save(dir.path()).unwrap();

        provisioner().write_support_files(dir.path(), "bank").await.unwrap();
        provisioner().write_support_files(dir.path(), "bank").await.unwrap();

        let init = std::fs::read_to_string(dir.path().join("bank/__init__.py")).unwrap();
        assert_eq!(init, "VERSION = 1\n");
    }

    #[test]
    fn test_marker_is_order_independent() {
        let a = VenvProvisioner::new(&FileEnvironmentConfig {
            packages: vec!["pytest".to_string(), "pyright".to_string()],
            ..Default::default()
        });
        let b = VenvProvisioner::new(&FileEnvironmentConfig {
            packages: vec!["pyright".to_string(), "pytest".to_string()],
            ..Default::default()
        });
        assert_eq!(a.marker_content(), b.marker_content());
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = VenvProvisioner::new(&FileEnvironmentConfig {
            python: "python-that-does-not-exist-3.99".to_string(),
            ..Default::default()
        });

        let err = provisioner.provision(dir.path(), "bank").await.unwrap_err();
        assert!(matches!(err, ProvisionError::InterpreterNotFound(_)));
    }

    #[test]
    fn test_venv_executable() {
        let path = venv_executable(Path::new("/gen/.venv"), "pyright");
        if cfg!(windows) {
            assert!(path.ends_with("Scripts/pyright.exe"));
        } else {
            assert_eq!(path, PathBuf::from("/gen/.venv/bin/pyright"));
        }
    }
}
