//! File checker dispatch.
//!
//! Decides, from a file path alone, which external compiler or interpreter
//! reports syntax errors for that file. Nothing here touches the filesystem;
//! whether the file exists is the process runner's problem.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Message shown when a file has no checker.
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported file type. Only .java and .py are supported.";

/// Message shown when a checker produced no output.
pub const CLEAN_MESSAGE: &str = "No syntax/compile errors found!";

/// Binaries used to build checker commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub java_compiler: String,
    pub python_interpreter: String,
    pub python_check_module: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            java_compiler: "javac".to_string(),
            python_interpreter: "python".to_string(),
            python_check_module: "py_compile".to_string(),
        }
    }
}

/// A request to check one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheckRequest {
    pub path: String,
}

impl FileCheckRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Lowercased extension of the final path component, if any. A leading
    /// dot counts, so `.py` has the extension `py`.
    pub fn extension(&self) -> Option<String> {
        let name = Path::new(&self.path).file_name()?.to_string_lossy().to_lowercase();
        name.rsplit_once('.').map(|(_, ext)| ext.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    CompileJava,
    CompilePython,
    Unsupported,
}

/// The command that checks a file. `argv` is empty iff `kind` is
/// [`CheckKind::Unsupported`]. Only the resolver builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckCommand {
    pub kind: CheckKind,
    argv: Vec<String>,
}

impl CheckCommand {
    fn unsupported() -> Self {
        Self {
            kind: CheckKind::Unsupported,
            argv: Vec::new(),
        }
    }

    /// Argument vector, or `None` for unsupported files.
    pub fn argv(&self) -> Option<&[String]> {
        if self.argv.is_empty() {
            None
        } else {
            Some(&self.argv)
        }
    }

    pub fn is_supported(&self) -> bool {
        self.kind != CheckKind::Unsupported
    }

    /// The program to spawn.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Space-joined argv for display.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Resolves file paths to checker commands.
#[derive(Debug, Clone, Default)]
pub struct FileActionResolver {
    config: CheckerConfig,
}

impl FileActionResolver {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn resolve(&self, path: &str) -> CheckCommand {
        let request = FileCheckRequest::new(path);
        match request.extension().as_deref() {
            Some("java") => CheckCommand {
                kind: CheckKind::CompileJava,
                argv: vec![self.config.java_compiler.clone(), request.path],
            },
            Some("py") => CheckCommand {
                kind: CheckKind::CompilePython,
                argv: vec![
                    self.config.python_interpreter.clone(),
                    "-m".to_string(),
                    self.config.python_check_module.clone(),
                    request.path,
                ],
            },
            _ => CheckCommand::unsupported(),
        }
    }
}

/// Resolve with the default binaries.
pub fn resolve(path: &str) -> CheckCommand {
    FileActionResolver::default().resolve(path)
}
