use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use portrait_scrub_core::capture::infrastructure::default_camera_opener;
use portrait_scrub_core::distance::domain::distance_estimate::DistanceSourceKind;
use portrait_scrub_core::distance::domain::camera_intrinsics::CameraIntrinsics;
use portrait_scrub_core::distance::domain::distance_estimator::{
    face_pixel_width_at, median_focal_length,
};
use portrait_scrub_core::playback::infrastructure::sequence_catalog;
use portrait_scrub_core::render::domain::display_surface::{
    DisplaySurface, LatestFrameSurface, NullSurface,
};
use portrait_scrub_core::render::domain::tick_report::TickReport;
use portrait_scrub_core::render::infrastructure::fixed_period_scheduler::FixedPeriodScheduler;
use portrait_scrub_core::render::infrastructure::render_loop_factory::{
    build_detector, build_render_loop, open_camera, RenderOutputs,
};
use portrait_scrub_core::render::tick_logger::SummaryTickLogger;
use portrait_scrub_core::shared::color::Background;
use portrait_scrub_core::shared::mailbox::Mailbox;
use portrait_scrub_core::shared::settings::Settings;

/// Runs the distance-driven portrait headless: camera in, frame index out.
#[derive(Parser)]
#[command(name = "portrait-scrub")]
struct Cli {
    /// Settings file (defaults to the user's config directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Sequence to play: a video file or a directory of images.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Directory scanned for sequences when --video is not given.
    #[arg(long)]
    video_dir: Option<PathBuf>,

    /// Camera index.
    #[arg(long)]
    camera: Option<u32>,

    /// Loop a video file as the camera instead of opening a device.
    #[arg(long)]
    camera_video: Option<PathBuf>,

    /// Distance source: face, manual or sensor.
    #[arg(long)]
    source: Option<DistanceSourceKind>,

    /// Distance used by the manual source, in cm.
    #[arg(long)]
    manual_distance: Option<f64>,

    /// External sensor: tcp://host:port or a device path.
    #[arg(long)]
    sensor: Option<String>,

    /// BlazeFace ONNX model file.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Background colour: black, gray or white.
    #[arg(long)]
    background: Option<Background>,

    /// Stop after this many ticks (runs until Ctrl-C otherwise).
    #[arg(long)]
    ticks: Option<u64>,

    /// Write the last composited frame to this PNG on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Log a status line every this many seconds (0 disables).
    #[arg(long, default_value = "1")]
    status_every: u64,

    /// Calibrate the focal length with a face at this distance (cm).
    #[arg(long)]
    calibrate: Option<f64>,

    /// Frames sampled by --calibrate.
    #[arg(long, default_value = "60")]
    calibrate_samples: usize,

    /// List sequences and cameras, then exit.
    #[arg(long)]
    list: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(&cli)?;

    if cli.list {
        return list(&settings);
    }
    if let Some(distance_cm) = cli.calibrate {
        return calibrate(&settings, distance_cm, cli.calibrate_samples);
    }
    run_experience(&settings, cli.ticks, cli.snapshot.as_deref(), cli.status_every)
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    if let Some(video) = &cli.video {
        settings.video = Some(video.clone());
        settings.require_video = true;
    }
    if let Some(dir) = &cli.video_dir {
        settings.video_dir = dir.clone();
    }
    if let Some(index) = cli.camera {
        settings.camera_index = index;
    }
    if let Some(path) = &cli.camera_video {
        settings.camera_video = Some(path.clone());
    }
    if let Some(source) = cli.source {
        settings.distance_source = source;
    }
    if let Some(distance) = cli.manual_distance {
        settings.manual_distance_cm = distance;
    }
    if let Some(sensor) = &cli.sensor {
        settings.sensor_address = Some(sensor.clone());
    }
    if let Some(model) = &cli.model {
        settings.model_path = Some(model.clone());
    }
    if let Some(background) = cli.background {
        settings.background = background;
    }
    settings.validate()?;
    Ok(settings)
}

fn run_experience(
    settings: &Settings,
    max_ticks: Option<u64>,
    snapshot: Option<&Path>,
    status_every: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = LatestFrameSurface::new();
    let output_surface: Box<dyn DisplaySurface> = if snapshot.is_some() {
        Box::new(output.clone())
    } else {
        Box::new(NullSurface)
    };
    let reports = Arc::new(Mailbox::<TickReport>::new());

    let mut render = build_render_loop(
        settings,
        default_camera_opener(),
        RenderOutputs {
            output: output_surface,
            preview: Box::new(NullSurface),
            logger: Box::new(SummaryTickLogger::default()),
        },
        Some(Box::new(download_progress)),
    )?
    .with_reports(reports.clone());
    log::info!("Camera: {}", render.camera_description());
    match render.sequence() {
        Some(info) => log::info!(
            "Sequence: {} ({} frames, {:.1}s)",
            info.name(),
            info.frame_count,
            info.duration_secs()
        ),
        None => log::warn!("No sequence loaded; output stays on the background"),
    }

    let scheduler =
        FixedPeriodScheduler::new(settings.tick_period()).with_max_ticks(max_ticks);
    let cancelled = scheduler.cancel_flag();
    {
        let cancelled = cancelled.clone();
        ctrlc::set_handler(move || cancelled.store(true, Ordering::Relaxed))?;
    }

    let status = (status_every > 0).then(|| {
        spawn_status_logger(
            reports.clone(),
            cancelled.clone(),
            Duration::from_secs(status_every),
        )
    });

    // Commands only come from the desktop app; the sender stays alive so the
    // channel never reports disconnection.
    let (_commands_tx, commands) = crossbeam_channel::unbounded();
    let ticks = scheduler.run(&mut render, &commands, None);
    cancelled.store(true, Ordering::Relaxed);
    if let Some(handle) = status {
        let _ = handle.join();
    }
    log::info!(
        "Stopped after {ticks} ticks on frame {}",
        render.state().current_frame_index
    );

    if let Some(path) = snapshot {
        write_snapshot(&output, path)?;
    }
    Ok(())
}

fn spawn_status_logger(
    reports: Arc<Mailbox<TickReport>>,
    stop: Arc<AtomicBool>,
    every: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let step = Duration::from_millis(100);
        let mut waited = Duration::ZERO;
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(step);
            waited += step;
            if waited < every {
                continue;
            }
            waited = Duration::ZERO;
            if let Some(report) = reports.take() {
                log::info!("{}", report.status_line());
            }
        }
    })
}

fn write_snapshot(output: &LatestFrameSurface, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let frame = output.peek().ok_or("no frame was composited")?;
    let image = frame
        .into_rgb_image()
        .ok_or("composited frame has inconsistent dimensions")?;
    image.save(path)?;
    log::info!("Snapshot written to {}", path.display());
    Ok(())
}

fn calibrate(
    settings: &Settings,
    distance_cm: f64,
    samples: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let opener = default_camera_opener();
    let mut camera = open_camera(settings, opener.as_ref());
    if !camera.is_open() {
        return Err(format!("calibration needs a camera: {}", camera.describe()).into());
    }
    let mut detector = build_detector(settings, Some(Box::new(download_progress)));

    log::info!(
        "Sampling {samples} frames with a face at {distance_cm} cm; hold still"
    );
    let mut widths = Vec::with_capacity(samples);
    for _ in 0..samples {
        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("{e}");
                continue;
            }
        };
        match detector.detect(&frame) {
            Ok(faces) => widths.extend(faces.first().map(|face| face.pixel_width())),
            Err(e) => return Err(format!("face detection failed: {e}").into()),
        }
        thread::sleep(settings.tick_period());
    }
    camera.close();

    let focal = median_focal_length(distance_cm, &widths, settings.reference_face_width_cm)
        .ok_or("no face was detected during calibration")?;
    println!(
        "focal_length_px = {focal:.1} (from {} of {samples} frames)",
        widths.len()
    );

    let intrinsics = CameraIntrinsics::new(settings.reference_face_width_cm, focal)?;
    for distance in [settings.dist_max_cm, settings.dist_min_cm] {
        println!(
            "  a face at {distance:.0} cm will be {:.0} px wide",
            face_pixel_width_at(distance, &intrinsics)
        );
    }
    Ok(())
}

fn list(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    println!("Sequences in {}:", settings.video_dir.display());
    match sequence_catalog::discover(&settings.video_dir) {
        Ok(found) if found.is_empty() => println!("  (none)"),
        Ok(found) => {
            for path in found {
                println!("  {}", path.display());
            }
        }
        Err(e) => println!("  cannot read directory: {e}"),
    }
    list_cameras()
}

#[cfg(feature = "camera")]
fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    println!("Cameras:");
    for (index, name) in portrait_scrub_core::capture::infrastructure::nokhwa_camera::list_cameras()? {
        println!("  {index}: {name}");
    }
    Ok(())
}

#[cfg(not(feature = "camera"))]
fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    println!("Cameras: built without camera support");
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = downloaded as f64 / total as f64 * 100.0;
        eprint!("\rDownloading model: {pct:.0}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading model: {} KB", downloaded / 1024);
    }
}
