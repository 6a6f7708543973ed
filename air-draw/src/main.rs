use air_draw::capture::{CaptureSource, WebcamCapture};
use air_draw::compose::View;
use air_draw::controls::{self, Command};
use air_draw::output::{OutputSink, V4L2Output, WindowOutput};
use air_draw::tracking::{self, DetectorConfig};
use air_draw::{ColorProfile, ProfileRegistry, StrokeStyle, Whiteboard};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossbeam_channel::Receiver;
use image::Rgb;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// Preview window with keyboard controls
    Window,
    /// v4l2loopback virtual camera (controlled through stdin)
    Loopback,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Where composited frames go
    #[arg(long, value_enum, default_value_t = OutputKind::Window)]
    output: OutputKind,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: String,

    /// Capture resolution width
    #[arg(long, default_value_t = 800)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 600)]
    capture_height: u32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// What to display: ink over video, the canvas alone, or the detection mask
    #[arg(long, value_enum, default_value_t = View::Overlay)]
    view: View,

    /// Color profile active at startup
    #[arg(long, default_value = "red")]
    profile: String,

    /// Extra color profile as name:h,s,v:h,s,v:r,g,b (lower HSV, upper HSV, ink RGB).
    /// Hue is 0-180. May be repeated.
    #[arg(long = "custom-profile", value_name = "SPEC")]
    custom_profiles: Vec<ColorProfile>,

    /// JSON file with extra color profiles
    #[arg(long)]
    profiles_file: Option<PathBuf>,

    /// Minimum contour area (px²) for a detection
    #[arg(long, default_value_t = 500.0)]
    min_area: f64,

    /// Erosion/dilation disk radius
    #[arg(long, default_value_t = 2)]
    kernel_radius: u8,

    /// Erosions and dilations per frame
    #[arg(long, default_value_t = 2)]
    morph_iterations: u32,

    /// Stroke width in pixels
    #[arg(long, default_value_t = 5)]
    stroke_width: u32,

    /// Radius of the dot that starts a stroke
    #[arg(long, default_value_t = 2)]
    dot_radius: i32,

    /// Do not mirror the camera image
    #[arg(long)]
    no_mirror: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("air-draw starting");
    tracing::info!("Capture: {}x{}", args.capture_width, args.capture_height);
    tracing::info!("Target FPS: {}", args.fps);

    let registry = build_registry(&args)?;

    // Camera failure ends the session before anything is tracked
    let mut capture = WebcamCapture::new(
        args.input_device,
        args.capture_width,
        args.capture_height,
        args.fps,
    )
    .context("Failed to initialize webcam capture. Is a camera connected?")?;
    let (width, height) = capture.resolution();

    let detector = tracking::create_default_detector(DetectorConfig {
        min_area: args.min_area,
        kernel_radius: args.kernel_radius,
        iterations: args.morph_iterations,
    });
    let style = StrokeStyle {
        width: args.stroke_width,
        dot_radius: args.dot_radius,
        background: Rgb([255, 255, 255]),
    };
    let mut whiteboard = Whiteboard::new(registry, &args.profile, detector, style, (width, height))
        .context("Failed to set up whiteboard")?;

    let commands = controls::spawn_stdin_reader();
    let options = LoopOptions {
        fps: args.fps,
        view: args.view,
        mirror: !args.no_mirror,
    };

    print_controls(whiteboard.registry(), args.output);

    match args.output {
        OutputKind::Window => {
            let mut output = WindowOutput::new("Air Draw", width, height, args.fps)
                .context("Failed to open preview window")?;
            run_pipeline(&mut capture, &mut output, &mut whiteboard, &commands, &options)
        }
        OutputKind::Loopback => {
            let mut output = V4L2Output::new(&args.output_device, width, height)
                .context("Failed to initialize v4l2loopback output")?;
            run_pipeline(&mut capture, &mut output, &mut whiteboard, &commands, &options)
        }
    }
}

fn build_registry(args: &Args) -> Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::builtin();

    for profile in &args.custom_profiles {
        registry
            .register(profile.clone())
            .context("Failed to add custom profile")?;
    }
    if let Some(path) = &args.profiles_file {
        registry
            .load_file(path)
            .context("Failed to load profiles file")?;
    }

    Ok(registry)
}

fn print_controls(registry: &ProfileRegistry, output: OutputKind) {
    for (i, profile) in registry.iter().enumerate() {
        tracing::info!("  [{}] {}", i + 1, profile.name);
    }
    match output {
        OutputKind::Window => tracing::info!("Keys: 1-9 select color, C clears, Esc quits"),
        OutputKind::Loopback => {
            tracing::info!("Type a color name or number, `clear`, or `quit` and press Enter")
        }
    }
}

struct LoopOptions {
    fps: u32,
    view: View,
    mirror: bool,
}

/// Apply one operator command between ticks. Returns false on quit.
fn apply_command(whiteboard: &mut Whiteboard, command: Command) -> bool {
    match command {
        Command::SelectProfile(name) => {
            if let Err(e) = whiteboard.set_profile(&name) {
                tracing::warn!("{}", e);
            }
        }
        Command::SelectIndex(index) => {
            if whiteboard.select_index(index).is_none() {
                tracing::warn!("No color profile number {}", index + 1);
            }
        }
        Command::Clear => whiteboard.clear(),
        Command::Quit => return false,
    }
    true
}

fn run_pipeline<C, O>(
    capture: &mut C,
    output: &mut O,
    whiteboard: &mut Whiteboard,
    commands: &Receiver<Command>,
    options: &LoopOptions,
) -> Result<()>
where
    C: CaptureSource,
    O: OutputSink,
{
    let frame_duration = Duration::from_secs_f32(1.0 / options.fps.max(1) as f32);
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_track_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;
    let mut last_status = String::new();

    tracing::info!("Starting main pipeline loop, view={:?}, mirror={}", options.view, options.mirror);

    loop {
        let loop_start = Instant::now();

        // Commands land between ticks, never inside one
        let mut pending: Vec<Command> = commands.try_iter().collect();
        pending.extend(output.poll_commands());
        for command in pending {
            if !apply_command(whiteboard, command) {
                tracing::info!("Quit requested");
                return Ok(());
            }
        }
        if !output.is_open() {
            tracing::info!("Output closed");
            return Ok(());
        }

        // Capture frame
        let capture_start = Instant::now();
        let frame = capture
            .capture_frame()
            .context("Failed to capture frame")?;
        total_capture_time += capture_start.elapsed();

        let Some(mut frame) = frame else {
            // Keep the frame rate even when the camera has nothing to give
            pace(loop_start, frame_duration);
            continue;
        };
        if options.mirror {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }

        // Detect + draw
        let track_start = Instant::now();
        let point = whiteboard.tick(&frame);
        total_track_time += track_start.elapsed();

        let status = whiteboard.status(point);
        if status != last_status {
            tracing::debug!("{}", status);
            output.show_status(&status);
            last_status = status;
        }

        // Output frame
        let output_start = Instant::now();
        let composed = whiteboard
            .compose(frame, options.view)
            .context("Failed to compose frame")?;
        output
            .write_frame(&composed)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_track_ms = total_track_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_track_ms + avg_output_ms;
            let actual_fps = 1000.0 / total_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, track={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_track_ms,
                avg_output_ms,
                total_ms,
                actual_fps
            );
        }

        pace(loop_start, frame_duration);
    }
}

/// Frame rate limiting: sleep out whatever is left of this tick
fn pace(loop_start: Instant, frame_duration: Duration) {
    let elapsed = loop_start.elapsed();
    if elapsed < frame_duration {
        std::thread::sleep(frame_duration - elapsed);
    }
}
