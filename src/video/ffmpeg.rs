use crate::video::capture::{CaptureSource, Frame, PixelLayout};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to run ffprobe: {0}")]
    ProbeExec(std::io::Error),
    #[error("ffprobe failed with status {0}")]
    ProbeStatus(std::process::ExitStatus),
    #[error("malformed ffprobe output: {0}")]
    Metadata(String),
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(std::io::Error),
}

/// Stream metadata extracted by ffprobe before playback starts.
#[derive(Debug, Clone)]
struct StreamInfo {
    width: u32,
    height: u32,
    layout: PixelLayout,
    frame_rate: f64,
}

/// Capture backend that decodes a descriptor (file path, URL, or device
/// string) by piping raw frames out of an ffmpeg subprocess.
///
/// Opening probes the stream first, then keeps one long-lived decoder
/// process whose stdout yields fixed-size frames. Opening or reading may
/// block indefinitely if the underlying source stalls; teardown kills the
/// process, which unblocks any in-flight read.
pub struct FfmpegCapture {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    /// Input container/device format forced with `-f` (e.g. "v4l2" for
    /// camera devices). None lets ffmpeg autodetect.
    input_format: Option<String>,
    process: Option<Child>,
    stdout: Option<ChildStdout>,
    info: Option<StreamInfo>,
}

impl FfmpegCapture {
    pub fn new(
        ffmpeg_path: Option<PathBuf>,
        ffprobe_path: Option<PathBuf>,
        input_format: Option<String>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.unwrap_or_else(|| PathBuf::from("ffmpeg")),
            ffprobe_path: ffprobe_path.unwrap_or_else(|| PathBuf::from("ffprobe")),
            input_format,
            process: None,
            stdout: None,
            info: None,
        }
    }

    fn probe(&self, descriptor: &str) -> Result<StreamInfo, CaptureError> {
        let mut command = Command::new(&self.ffprobe_path);
        command.args(["-v", "quiet"]);
        if let Some(ref format) = self.input_format {
            command.args(["-f", format]);
        }
        command.args([
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,pix_fmt,r_frame_rate",
            "-of",
            "json",
            descriptor,
        ]);

        let output = command.output().map_err(CaptureError::ProbeExec)?;
        if !output.status.success() {
            return Err(CaptureError::ProbeStatus(output.status));
        }
        parse_probe_output(&output.stdout)
    }

    fn spawn_decoder(&self, descriptor: &str, info: &StreamInfo) -> Result<Child, CaptureError> {
        let pix_fmt = match info.layout {
            PixelLayout::Rgb => "rgb24",
            PixelLayout::Gray => "gray",
        };

        let mut command = Command::new(&self.ffmpeg_path);
        if let Some(ref format) = self.input_format {
            command.args(["-f", format]);
        }
        command
            .args(["-i", descriptor, "-f", "rawvideo", "-pix_fmt", pix_fmt, "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        command.spawn().map_err(CaptureError::Spawn)
    }
}

impl CaptureSource for FfmpegCapture {
    fn open(&mut self, descriptor: &str) -> bool {
        self.release();

        let info = match self.probe(descriptor) {
            Ok(info) => info,
            Err(e) => {
                log::error!("failed to probe {}: {}", descriptor, e);
                return false;
            }
        };

        let mut process = match self.spawn_decoder(descriptor, &info) {
            Ok(process) => process,
            Err(e) => {
                log::error!("failed to start decoder for {}: {}", descriptor, e);
                return false;
            }
        };

        log::info!(
            "opened {} ({}x{}, {:?}, {:.2} fps)",
            descriptor,
            info.width,
            info.height,
            info.layout,
            info.frame_rate
        );

        self.stdout = process.stdout.take();
        self.process = Some(process);
        self.info = Some(info);
        true
    }

    fn is_opened(&self) -> bool {
        self.process.is_some()
    }

    fn release(&mut self) {
        self.stdout = None;
        self.info = None;

        let Some(mut process) = self.process.take() else {
            return;
        };
        let _ = process.kill();

        // Reap with a bounded wait so a wedged decoder can't hang teardown.
        let started = Instant::now();
        let timeout = Duration::from_millis(500);
        loop {
            match process.try_wait() {
                Ok(Some(_)) => {
                    log::debug!("decoder process terminated");
                    break;
                }
                Ok(None) => {
                    if started.elapsed() > timeout {
                        log::warn!("decoder process taking too long to terminate, abandoning");
                        let _ = process.kill();
                        let _ = process.wait();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    log::warn!("error waiting for decoder process: {}", e);
                    break;
                }
            }
        }
    }

    fn frame_rate(&self) -> f64 {
        self.info.as_ref().map(|info| info.frame_rate).unwrap_or(0.0)
    }

    fn read_frame(&mut self) -> Option<Frame> {
        let info = self.info.as_ref()?.clone();
        let stdout = self.stdout.as_mut()?;

        let len = info.width as usize * info.height as usize * info.layout.bytes_per_pixel();
        let mut data = vec![0u8; len];
        match stdout.read_exact(&mut data) {
            Ok(()) => Some(Frame {
                width: info.width,
                height: info.height,
                layout: info.layout,
                data,
            }),
            Err(e) => {
                log::debug!("frame read failed: {}", e);
                None
            }
        }
    }
}

impl Drop for FfmpegCapture {
    fn drop(&mut self) {
        self.release();
    }
}

fn parse_probe_output(stdout: &[u8]) -> Result<StreamInfo, CaptureError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| CaptureError::Metadata(format!("invalid json: {}", e)))?;

    let streams = json["streams"]
        .as_array()
        .ok_or_else(|| CaptureError::Metadata("no streams found".to_string()))?;
    let stream = streams
        .iter()
        .find(|s| s["width"].is_u64() && s["height"].is_u64())
        .ok_or_else(|| CaptureError::Metadata("no video stream with dimensions".to_string()))?;

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;
    if width == 0 || height == 0 {
        return Err(CaptureError::Metadata(format!(
            "unusable dimensions {}x{}",
            width, height
        )));
    }

    let pix_fmt = stream["pix_fmt"].as_str().unwrap_or("");
    let layout = if is_gray_format(pix_fmt) {
        PixelLayout::Gray
    } else {
        PixelLayout::Rgb
    };

    let frame_rate = stream["r_frame_rate"]
        .as_str()
        .and_then(parse_frame_rate)
        .unwrap_or(0.0);

    Ok(StreamInfo {
        width,
        height,
        layout,
        frame_rate,
    })
}

fn is_gray_format(pix_fmt: &str) -> bool {
    pix_fmt.starts_with("gray") || matches!(pix_fmt, "monob" | "monow")
}

/// Parses ffprobe rate strings such as "30/1", "30000/1001", or "29.97".
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let rate = if let Some((numerator, denominator)) = raw.split_once('/') {
        let numerator: f64 = numerator.trim().parse().ok()?;
        let denominator: f64 = denominator.trim().parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        numerator / denominator
    } else {
        raw.trim().parse().ok()?
    };

    if rate.is_finite() && rate > 0.0 {
        Some(rate)
    } else {
        None
    }
}
