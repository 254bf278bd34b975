//! Candidate line acquisition
//!
//! The analyzer operates on an already-collected batch of lines. They can
//! come from a log file, stdin, or the stdout of an external
//! line-filtering command (the classic form: `grep -P` over
//! /var/log/ltm). Any failure to acquire input is fatal to the run; it is
//! the only fatal condition in the pipeline.

use regex::Regex;
use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;
use thiserror::Error;

/// Pattern selecting rule-profiler lines out of a full LTM log.
pub const PROFILER_LINE_PATTERN: &str = r"info tmm\[\d+\]: \d+,RP_";

/// Input acquisition failure; aborts the run.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read trace input {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read from stdin: {0}")]
    StdinUnreadable(#[source] std::io::Error),

    #[error("cannot launch extraction command {command:?}: {source}")]
    CommandUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction command {command:?} failed with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },
}

/// Where the batch of candidate lines comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    File(PathBuf),
    Stdin,
    /// Shell command whose stdout is the line batch.
    Command(String),
}

impl LineSource {
    /// Acquire the complete batch. Blocks until the source is drained.
    pub fn read_lines(&self) -> Result<Vec<String>, InputError> {
        let text = match self {
            LineSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| InputError::Unreadable {
                    path: path.display().to_string(),
                    source,
                })?
            }
            LineSource::Stdin => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(InputError::StdinUnreadable)?;
                buffer
            }
            LineSource::Command(command) => run_extraction_command(command)?,
        };

        Ok(text.lines().map(str::to_string).collect())
    }
}

fn run_extraction_command(command: &str) -> Result<String, InputError> {
    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|source| InputError::CommandUnavailable {
            command: command.to_string(),
            source,
        })?;

    // grep-style filters exit 1 when nothing matched; an empty batch is a
    // valid (if uninteresting) run
    if !output.status.success() && !(output.status.code() == Some(1) && output.stdout.is_empty()) {
        return Err(InputError::CommandFailed {
            command: command.to_string(),
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Keep only lines matching the profiler pattern, replacing the external
/// grep when reading a file or stdin directly.
pub fn profiler_lines(lines: Vec<String>) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(PROFILER_LINE_PATTERN).expect("profiler line pattern is valid")
    });
    lines.into_iter().filter(|line| re.is_match(line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROFILER_LINE: &str = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
        1000,RP_EVENT_ENTRY,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";

    #[test]
    fn test_file_source_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", PROFILER_LINE).unwrap();
        writeln!(file, "second line").unwrap();

        let lines = LineSource::File(file.path().to_path_buf())
            .read_lines()
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], PROFILER_LINE);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = LineSource::File(PathBuf::from("/nonexistent/ltm"))
            .read_lines()
            .unwrap_err();
        assert!(matches!(err, InputError::Unreadable { .. }));
    }

    #[test]
    fn test_command_source_captures_stdout() {
        let lines = LineSource::Command("printf 'a\\nb\\n'".to_string())
            .read_lines()
            .unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_command_exit_one_with_no_output_is_empty_batch() {
        // grep convention: no matches
        let lines = LineSource::Command("exit 1".to_string()).read_lines().unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_command_failure_is_fatal() {
        let err = LineSource::Command("exit 2".to_string())
            .read_lines()
            .unwrap_err();
        assert!(matches!(err, InputError::CommandFailed { .. }));
    }

    #[test]
    fn test_profiler_lines_keeps_matching_lines_only() {
        let lines = vec![
            PROFILER_LINE.to_string(),
            "Jan  1 00:00:02 bigip1 notice mcpd[5678]: unrelated".to_string(),
            "Jan  1 00:00:03 bigip1 info tmm[2]: 99,RP_CMD_ENTRY,x,y,0,0x1,,,,,,".to_string(),
        ];
        let kept = profiler_lines(lines);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|l| l.contains(",RP_")));
    }

    #[test]
    fn test_profiler_lines_requires_tmm_process() {
        let lines = vec!["Jan  1 00:00:01 bigip1 info mcpd[1]: 1000,RP_EVENT_ENTRY".to_string()];
        assert!(profiler_lines(lines).is_empty());
    }
}
