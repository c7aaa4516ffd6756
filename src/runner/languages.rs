//! Launch commands for solution entry files

use std::path::Path;

use tokio::process::Command;

/// How to launch a solution entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    name: &'static str,
    program: Option<String>,
    args: Vec<String>,
}

impl Language {
    /// Pick the launcher from the entry file's extension
    pub fn for_path(path: &Path, python: &str) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py") => Self {
                name: "python",
                program: Some(python.to_string()),
                // Unbuffered, so teed output shows up while the case runs
                args: vec!["-u".to_string()],
            },
            Some("sh") => Self {
                name: "shell",
                program: Some("sh".to_string()),
                args: Vec::new(),
            },
            _ => Self {
                name: "native",
                program: None,
                args: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Program that will be spawned for `entry`
    pub fn program<'a>(&'a self, entry: &'a Path) -> &'a std::ffi::OsStr {
        match &self.program {
            Some(program) => program.as_ref(),
            None => entry.as_os_str(),
        }
    }

    /// Build the command running `entry`
    pub fn command(&self, entry: &Path) -> Command {
        match &self.program {
            Some(program) => {
                let mut command = Command::new(program);
                command.args(&self.args).arg(entry);
                command
            }
            None => Command::new(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path() {
        let py = Language::for_path(Path::new("kattis/hello/solution.py"), "python3");
        assert_eq!(py.name(), "python");
        assert_eq!(py.program(Path::new("solution.py")), "python3");

        let sh = Language::for_path(Path::new("solution.sh"), "python3");
        assert_eq!(sh.name(), "shell");

        let native = Language::for_path(Path::new("/tmp/a.out"), "python3");
        assert_eq!(native.name(), "native");
        assert_eq!(native.program(Path::new("/tmp/a.out")), "/tmp/a.out");
    }
}
