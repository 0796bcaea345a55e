//! Compiler capability.
//!
//! The batch compiler is an opaque collaborator: it takes one command
//! string and two text sinks and answers with a success flag. Keeping it
//! behind a trait lets the orchestration tests substitute a fake and
//! exercise staging, packaging, trimming and framing without a JDK.

use std::process::Command;

/// The Java compiler front end, as seen by the build cycle.
pub trait JavaCompiler {
    /// Run one compilation synchronously.
    ///
    /// Returns `true` on a clean compile. Diagnostics land in the sinks
    /// either way; a `false` return is a compile failure, not a builder
    /// error.
    fn compile(&self, command_line: &str, stdout: &mut String, stderr: &mut String) -> bool;
}

/// Production compiler: shells out to an ECJ batch-compiler launcher.
pub struct EcjCompiler {
    launcher: String,
}

impl EcjCompiler {
    pub fn new(launcher: impl Into<String>) -> Self {
        Self {
            launcher: launcher.into(),
        }
    }
}

impl Default for EcjCompiler {
    fn default() -> Self {
        Self::new("ecj")
    }
}

impl JavaCompiler for EcjCompiler {
    fn compile(&self, command_line: &str, stdout: &mut String, stderr: &mut String) -> bool {
        // The batch compiler tokenizes its own command string on
        // whitespace; mirror that here.
        let output = Command::new(&self.launcher)
            .args(command_line.split_whitespace())
            .output();

        match output {
            Ok(output) => {
                stdout.push_str(&String::from_utf8_lossy(&output.stdout));
                stderr.push_str(&String::from_utf8_lossy(&output.stderr));
                output.status.success()
            }
            Err(e) => {
                stderr.push_str(&format!(
                    "failed to launch compiler `{}`: {e}\n",
                    self.launcher
                ));
                false
            }
        }
    }
}
