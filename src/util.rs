use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Substitute `{name}` placeholders in each token of an argv template.
pub fn render_template(tokens: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            vars.iter().fold(token.clone(), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            })
        })
        .collect()
}

/// Run a program to completion and capture its output.
pub fn run_tool<S: AsRef<OsStr>>(program: &str, args: &[S], cwd: Option<&Path>) -> io::Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!(program, ?cwd, "running external tool");
    cmd.output()
}

/// One-line description of a failed tool run for error messages.
pub fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    let status = match output.status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    };
    if last.is_empty() {
        status
    } else {
        format!("{status}: {last}")
    }
}

/// True when `dir` has no entries other than VCS metadata.
pub fn is_empty_tree(dir: &Path) -> io::Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        if name != ".git" {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Make a release identifier safe to use as a file name.
pub fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_every_placeholder() {
        let tokens: Vec<String> = ["tool", "--ref={release}", "{dest}", "{repo}/x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = render_template(
            &tokens,
            &[("release", "w.2017.1"), ("dest", "/tmp/a"), ("repo", "r")],
        );
        assert_eq!(out, vec!["tool", "--ref=w.2017.1", "/tmp/a", "r/x"]);
    }

    #[test]
    fn git_only_tree_counts_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_empty_tree(dir.path()).unwrap());
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(is_empty_tree(dir.path()).unwrap());
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        assert!(!is_empty_tree(dir.path()).unwrap());
    }

    #[test]
    fn file_stem_replaces_separators() {
        assert_eq!(file_stem("release/10.1"), "release_10.1");
    }
}
