//! ffmpeg/ffprobe process runner.
//!
//! One subprocess per unit of work. stderr is drained on its own task so
//! ffmpeg never blocks on a full pipe, and `-progress pipe:1` key/value
//! lines on stdout are folded into [`RenderProgress`] reports. Every run has
//! a time budget; a run that exceeds it is killed.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use storyreel_common::config::FfmpegConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Lines of stderr kept in subprocess errors.
const STDERR_TAIL_LINES: usize = 20;

/// Seconds without progress before a stall warning is logged.
const STALL_WARNING_SECS: u64 = 10;

pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send + Sync>;

/// Progress of a running ffmpeg operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: RenderStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Rendering,
    Finalizing,
    Complete,
}

/// What a caller wants to hear about while a run progresses.
pub struct ProgressWatch {
    pub expected_duration_secs: f64,
    pub total_frames: u64,
    pub callback: ProgressCallback,
}

impl ProgressWatch {
    pub fn new(expected_duration_secs: f64, total_frames: u64, callback: ProgressCallback) -> Self {
        Self {
            expected_duration_secs,
            total_frames,
            callback,
        }
    }
}

/// Accumulated `-progress` state.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct ProgressState {
    pub out_time_secs: f64,
    pub complete: bool,
}

impl ProgressState {
    pub fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both names
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

pub(crate) fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_rendered = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered,
        total_frames,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}

/// Parse ffprobe's `WIDTHxHEIGHT` stream output.
pub fn parse_dimensions(raw: &str) -> Option<(u32, u32)> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (width, height) = line.split_once('x')?;
    let width = width.trim().parse::<u32>().ok().filter(|w| *w > 0)?;
    let height = height.trim().trim_end_matches('x').parse::<u32>().ok().filter(|h| *h > 0)?;
    Some((width, height))
}

/// Last `STDERR_TAIL_LINES` non-empty lines of ffmpeg's stderr.
pub(crate) fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Handle on the configured ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    binary: PathBuf,
    ffprobe_binary: PathBuf,
    probe_timeout: Duration,
}

impl FfmpegTool {
    pub fn new(config: &FfmpegConfig, probe_timeout: Duration) -> Self {
        Self {
            binary: config.binary.clone(),
            ffprobe_binary: config.ffprobe_binary.clone(),
            probe_timeout,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run `ffmpeg -version` and return its first line.
    pub async fn version(&self) -> StoryreelResult<String> {
        let output = tokio::time::timeout(
            self.probe_timeout,
            Command::new(&self.binary)
                .arg("-version")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            StoryreelError::tool_unavailable("ffmpeg", "version probe timed out")
        })?
        .map_err(|e| {
            StoryreelError::tool_unavailable(
                "ffmpeg",
                format!("failed to start {}: {e}", self.binary.display()),
            )
        })?;

        if !output.status.success() {
            return Err(StoryreelError::tool_unavailable(
                "ffmpeg",
                format!("-version exited with {}", output.status),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Fail with `ToolUnavailable` unless ffmpeg answers a version probe.
    pub async fn ensure_available(&self) -> StoryreelResult<()> {
        let version = self.version().await?;
        tracing::debug!(binary = %self.binary.display(), version = %version, "ffmpeg available");
        Ok(())
    }

    pub async fn is_available(&self) -> bool {
        self.version().await.is_ok()
    }

    /// Container duration of `input` in seconds, via ffprobe.
    pub async fn probe_duration(&self, input: &Path) -> StoryreelResult<f64> {
        let output = tokio::time::timeout(
            self.probe_timeout,
            Command::new(&self.ffprobe_binary)
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ])
                .arg(input)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| StoryreelError::timeout("probe duration", self.probe_timeout.as_secs()))?
        .map_err(|e| {
            StoryreelError::tool_unavailable(
                "ffprobe",
                format!("failed to start {}: {e}", self.ffprobe_binary.display()),
            )
        })?;

        if !output.status.success() {
            return Err(StoryreelError::subprocess(
                format!("ffprobe failed on {}", input.display()),
                stderr_tail(&String::from_utf8_lossy(&output.stderr)),
            ));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| {
                StoryreelError::subprocess(
                    format!("ffprobe returned no duration for {}", input.display()),
                    raw.trim().to_string(),
                )
            })
    }

    /// Width and height of the first video stream of `input`, via ffprobe.
    pub async fn video_dimensions(&self, input: &Path) -> StoryreelResult<(u32, u32)> {
        let output = tokio::time::timeout(
            self.probe_timeout,
            Command::new(&self.ffprobe_binary)
                .args([
                    "-v",
                    "error",
                    "-select_streams",
                    "v:0",
                    "-show_entries",
                    "stream=width,height",
                    "-of",
                    "csv=s=x:p=0",
                ])
                .arg(input)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| StoryreelError::timeout("read video size", self.probe_timeout.as_secs()))?
        .map_err(|e| {
            StoryreelError::tool_unavailable(
                "ffprobe",
                format!("failed to start {}: {e}", self.ffprobe_binary.display()),
            )
        })?;

        if !output.status.success() {
            return Err(StoryreelError::subprocess(
                format!("ffprobe failed on {}", input.display()),
                stderr_tail(&String::from_utf8_lossy(&output.stderr)),
            ));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        parse_dimensions(&raw).ok_or_else(|| {
            StoryreelError::subprocess(
                format!("ffprobe returned no video size for {}", input.display()),
                raw.trim().to_string(),
            )
        })
    }

    /// Run ffmpeg with `args` under a `timeout` budget.
    ///
    /// `operation` names the run in logs and errors. With a `progress` watch
    /// the run is started with `-progress pipe:1` and the callback fires on
    /// every progress block.
    pub async fn run(
        &self,
        operation: &str,
        args: &[String],
        timeout: Duration,
        progress: Option<&ProgressWatch>,
    ) -> StoryreelResult<()> {
        tracing::debug!(operation, args = ?args, "Running ffmpeg");

        let mut cmd = Command::new(&self.binary);
        cmd.args(["-hide_banner", "-nostdin", "-y"]);
        if progress.is_some() {
            cmd.args(["-progress", "pipe:1", "-nostats"]);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            StoryreelError::tool_unavailable(
                "ffmpeg",
                format!("failed to start {}: {e}", self.binary.display()),
            )
        })?;

        tracing::info!(
            operation,
            pid = child.id(),
            args_len = args.len(),
            timeout_secs = timeout.as_secs(),
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StoryreelError::render("failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StoryreelError::render("failed to capture ffmpeg stderr"))?;

        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output).await {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let work = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut latest = ProgressState::default();
            let mut last_progress_secs = 0.0f64;
            let mut last_progress_wall = Instant::now();

            while let Some(line) = lines.next_line().await? {
                let Some((key, value)) = line.trim().split_once('=') else {
                    continue;
                };
                latest.update(key, value);
                if key != "progress" {
                    continue;
                }
                if latest.out_time_secs > last_progress_secs + 0.001 {
                    last_progress_secs = latest.out_time_secs;
                    last_progress_wall = Instant::now();
                }
                if let Some(watch) = progress {
                    (watch.callback)(progress_report(
                        &latest,
                        watch.total_frames,
                        watch.expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
                if last_progress_wall.elapsed().as_secs() >= STALL_WARNING_SECS {
                    tracing::warn!(
                        operation,
                        out_time_secs = latest.out_time_secs,
                        elapsed_secs = start.elapsed().as_secs_f64(),
                        "No ffmpeg progress advancement for 10s"
                    );
                    last_progress_wall = Instant::now();
                }
            }
            let status = child.wait().await?;
            Ok::<ExitStatus, std::io::Error>(status)
        };

        let status = match tokio::time::timeout(timeout, work).await {
            Ok(status) => status.map_err(|e| {
                StoryreelError::subprocess(format!("failed to wait on ffmpeg ({operation})"), e.to_string())
            })?,
            Err(_) => {
                if let Err(err) = child.kill().await {
                    tracing::debug!(operation, error = %err, "ffmpeg already exited");
                }
                stderr_task.abort();
                tracing::error!(operation, timeout_secs = timeout.as_secs(), "ffmpeg timed out and was killed");
                return Err(StoryreelError::timeout(operation, timeout.as_secs()));
            }
        };

        let stderr_output = stderr_task
            .await
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            tracing::error!(operation, status = %status, "ffmpeg failed");
            return Err(StoryreelError::subprocess(
                format!("{operation} failed ({status})"),
                stderr_tail(&stderr_output),
            ));
        }

        if let Some(watch) = progress {
            (watch.callback)(RenderProgress {
                progress: 1.0,
                frames_rendered: watch.total_frames,
                total_frames: watch.total_frames,
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }

        tracing::info!(
            operation,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }
}
