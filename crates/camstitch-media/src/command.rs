//! FFmpeg command builder and runner.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// One `-i` input with the flags that precede it.
#[derive(Debug, Clone, PartialEq)]
struct Input {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    /// Inputs in index order
    inputs: Vec<Input>,
    /// Output file path
    output: PathBuf,
    /// Filter graph
    filter_complex: Option<String>,
    /// Selected output streams
    maps: Vec<String>,
    /// Output arguments (encoder settings)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: Option<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            filter_complex: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: None,
        }
    }

    /// Add an input file.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(path, Vec::<String>::new())
    }

    /// Add an input file preceded by its own flags (e.g. `-hwaccel cuda`).
    pub fn input_with_args<I, S>(mut self, path: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(Input {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set filter complex.
    pub fn filter_complex(mut self, filter: impl Into<String>) -> Self {
        self.filter_complex = Some(filter.into());
        self
    }

    /// Select a labelled filter output for the output file.
    pub fn map(mut self, label: &str) -> Self {
        self.maps.push(format!("[{}]", label));
        self
    }

    /// Set whether an existing output file is overwritten.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Number of inputs added so far.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Input paths in index order.
    pub fn input_paths(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(|i| i.path.as_path())
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter_complex.as_deref()
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        if let Some(level) = &self.log_level {
            args.push("-v".to_string());
            args.push(level.clone());
        }

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let Some(filter) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(filter.clone());
        }

        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Shell-like rendering of the full command line, for logs and reports.
    pub fn command_line(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(self.build_args())
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quote an argument if a shell would split or expand it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Result of a finished encoder process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderOutput {
    pub exit_code: Option<i32>,
    /// Captured stdout, `None` when inherited
    pub stdout: Option<String>,
    /// Captured stderr, `None` when inherited
    pub stderr: Option<String>,
}

/// Capability to run an FFmpeg command to completion.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run `cmd`, returning an error on a non-zero exit.
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EncoderOutput>;

    /// Shell-like command line of `cmd` as this encoder would run it.
    fn describe(&self, cmd: &FfmpegCommand) -> String {
        cmd.command_line("ffmpeg")
    }
}

/// Runs FFmpeg commands as child processes.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// FFmpeg binary name or path
    program: String,
    /// Pipe stdout/stderr instead of inheriting them
    capture_output: bool,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner for `ffmpeg` on PATH with inherited output.
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            capture_output: false,
        }
    }

    /// Use a different FFmpeg binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Capture stdout/stderr so they can be reported on failure.
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Encoder for FfmpegRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EncoderOutput> {
        let program = check_ffmpeg(&self.program)?;
        let args = cmd.build_args();
        debug!("Running FFmpeg: {}", cmd.command_line(&self.program));

        let mut command = Command::new(program);
        command.args(&args).stdin(Stdio::null());

        // output()/status() both wait for exit; output() also drains the pipes.
        let result = if self.capture_output {
            let output = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await?;
            EncoderOutput {
                exit_code: output.status.code(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
            }
            .check(output.status.success(), cmd, &self.program)?
        } else {
            let status = command
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await?;
            EncoderOutput {
                exit_code: status.code(),
                stdout: None,
                stderr: None,
            }
            .check(status.success(), cmd, &self.program)?
        };

        Ok(result)
    }

    fn describe(&self, cmd: &FfmpegCommand) -> String {
        cmd.command_line(&self.program)
    }
}

impl EncoderOutput {
    fn check(self, success: bool, cmd: &FfmpegCommand, program: &str) -> MediaResult<Self> {
        if success {
            Ok(self)
        } else {
            Err(MediaError::ffmpeg_failed(
                cmd.command_line(program),
                self.exit_code,
                self.stdout,
                self.stderr,
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfmpegNotFound(program.to_string()))
}

/// Check if FFprobe is available.
pub fn check_ffprobe(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfprobeNotFound(program.to_string()))
}
