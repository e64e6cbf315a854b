//! Engine runtime activation and executable lookup
//!
//! Mirrors what activating a virtualenv or conda environment does for a
//! single child process: its `bin` directory goes first on `PATH`, its `lib`
//! directory first on `LD_LIBRARY_PATH`, and `VIRTUAL_ENV` points at it. The
//! caller's own environment is left untouched.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::EngineRuntimePort;
use domain::CommandSpec;
use tracing::{debug, info};

const PATH_VAR: &str = "PATH";
const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";
const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// Resolver for an optional runtime prefix
#[derive(Debug, Clone, Default)]
pub struct PathRuntimeResolver {
    runtime_dir: Option<PathBuf>,
    /// Search path used instead of the inherited `PATH`
    base_path: Option<OsString>,
    base_library_path: Option<OsString>,
}

impl PathRuntimeResolver {
    pub fn new(runtime_dir: Option<PathBuf>) -> Self {
        Self {
            runtime_dir,
            base_path: None,
            base_library_path: None,
        }
    }

    /// Replace the inherited search paths
    #[must_use]
    pub fn with_base_paths(mut self, path: Option<OsString>, library_path: Option<OsString>) -> Self {
        self.base_path = path;
        self.base_library_path = library_path;
        self
    }

    fn inherited(&self, var: &str) -> Option<OsString> {
        match var {
            PATH_VAR if self.base_path.is_some() => self.base_path.clone(),
            LIBRARY_PATH_VAR if self.base_library_path.is_some() => self.base_library_path.clone(),
            _ => env::var_os(var),
        }
    }

    /// `front` followed by the existing entries of `var`
    fn prepend(&self, var: &str, front: &Path) -> Result<String, ApplicationError> {
        let mut entries = vec![front.to_path_buf()];
        if let Some(existing) = self.inherited(var) {
            entries.extend(env::split_paths(&existing));
        }
        let joined = env::join_paths(entries).map_err(|e| {
            ApplicationError::SetupFailed(format!("cannot build {var} from {}: {e}", front.display()))
        })?;
        Ok(joined.to_string_lossy().into_owned())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Locate `program` on `search_path`; paths with a directory part are
/// checked as given
pub fn find_executable(program: &Path, search_path: Option<&str>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

impl EngineRuntimePort for PathRuntimeResolver {
    fn resolve(&self, command: CommandSpec) -> Result<CommandSpec, ApplicationError> {
        let mut command = command;

        let search_path = match &self.runtime_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ApplicationError::SetupFailed(format!(
                        "runtime directory not found: {}",
                        dir.display()
                    )));
                }
                let path = self.prepend(PATH_VAR, &dir.join("bin"))?;
                let library_path = self.prepend(LIBRARY_PATH_VAR, &dir.join("lib"))?;
                command = command
                    .with_env(PATH_VAR, path.clone())
                    .with_env(LIBRARY_PATH_VAR, library_path)
                    .with_env(VIRTUAL_ENV_VAR, dir.to_string_lossy());
                info!(runtime = %dir.display(), "Runtime environment activated");
                Some(path)
            },
            None => command
                .env_value(PATH_VAR)
                .map(str::to_string)
                .or_else(|| self.inherited(PATH_VAR).map(|p| p.to_string_lossy().into_owned())),
        };

        let resolved = find_executable(&command.program, search_path.as_deref()).ok_or_else(|| {
            ApplicationError::SetupFailed(format!(
                "executable '{}' not found{}",
                command.program.display(),
                self.runtime_dir
                    .as_ref()
                    .map(|d| format!(" in runtime {}", d.display()))
                    .unwrap_or_default()
            ))
        })?;

        debug!(program = %resolved.display(), "Engine executable resolved");
        command.program = resolved;
        Ok(command)
    }
}
