//! pulse-line command line front end.
//!
//! Builds a pulse widget from a JSON config file and/or flags, then either
//! exports its animation as PNG frames, logs the canvas calls of its first
//! frame, or (with the `hardware` feature) animates it live on an LED panel.
//!
//! ## Usage
//! ```sh
//! pulse-line --preset signature --repeat 2 --animated --trailed --out-dir frames --frames 60
//! pulse-line --markup 0.2,-1,0.6 --trace
//! sudo ./target/release/pulse-line --config pulse.json --led --brightness 60
//! ```

use clap::Parser;
use pulse_line::canvas::{Canvas, RasterCanvas, RecordingCanvas};
use pulse_line::timer::ManualTimer;
use pulse_line::{Color, Preset, PulseConfig, PulseWidget};
use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Surface height used when neither the config nor the panel provides one.
const DEFAULT_SURFACE_HEIGHT: u32 = 100;

/// Render an animated pulse waveform
#[derive(Parser, Debug)]
#[command(name = "pulse-line")]
#[command(about = "Render an animated pulse waveform to PNG frames or an LED panel")]
#[command(version)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in markup to draw
    #[arg(long, value_enum, conflicts_with = "markup")]
    preset: Option<Preset>,

    /// Comma-separated samples, e.g. 0.2,-1,0.6
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    markup: Option<Vec<f64>>,

    /// Pixels between consecutive samples
    #[arg(long)]
    distribution: Option<f64>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Number of copies of the markup
    #[arg(long, allow_negative_numbers = true)]
    repeat: Option<i64>,

    /// Zero samples of padding around the markup
    #[arg(long, allow_negative_numbers = true)]
    interval: Option<i64>,

    /// Leave a fading trail behind the sweep
    #[arg(long)]
    trailed: bool,

    /// Sweep a lit edge across the waveform
    #[arg(long)]
    animated: bool,

    /// Milliseconds per animation step
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<i64>,

    /// Stroke width in pixels
    #[arg(long)]
    weight: Option<f64>,

    /// Stroke color (#rrggbb, rgba(r, g, b, a), black, white)
    #[arg(long)]
    color: Option<Color>,

    /// Trail color; defaults to the stroke color
    #[arg(long)]
    trailing_color: Option<Color>,

    /// Write frame_NNNN.png files into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Number of animation steps to export after the initial frame
    #[arg(long, default_value = "0")]
    frames: usize,

    /// Log the canvas calls of the initial frame
    #[arg(long)]
    trace: bool,

    /// Animate on the LED panel until Ctrl+C
    #[cfg(feature = "hardware")]
    #[arg(long)]
    led: bool,

    /// Number of rows on the LED panel
    #[cfg(feature = "hardware")]
    #[arg(long, default_value = "64")]
    rows: u32,

    /// Number of columns on the LED panel
    #[cfg(feature = "hardware")]
    #[arg(long, default_value = "64")]
    cols: u32,

    /// Panel brightness (0-100)
    #[cfg(feature = "hardware")]
    #[arg(long, default_value = "75")]
    brightness: u8,
}

impl Args {
    /// Load the config file (if any) and layer the flags on top.
    fn build_config(&self) -> Result<PulseConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => {
                let reader = BufReader::new(File::open(path)?);
                serde_json::from_reader(reader)
                    .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?
            }
            None => PulseConfig::default(),
        };

        if let Some(preset) = self.preset {
            config.markup = preset.samples().to_vec();
        }
        if let Some(markup) = &self.markup {
            config.markup = markup.clone();
        }
        if let Some(distribution) = self.distribution {
            config.distribution = distribution;
        }
        if let Some(height) = self.height {
            config.height = Some(height);
        }
        if let Some(repeat) = self.repeat {
            config.repeat = repeat;
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(weight) = self.weight {
            config.weight = weight;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(trailing_color) = self.trailing_color {
            config.trailing_color = trailing_color;
        }
        config.trailed |= self.trailed;
        config.animated |= self.animated;

        Ok(config)
    }
}

/// Save the initial frame plus up to `steps` animation steps as PNG files.
///
/// A static widget never arms its timer, so only its single frame is written.
fn export_frames(
    widget: &mut PulseWidget<RasterCanvas, ManualTimer>,
    dir: &Path,
    steps: usize,
) -> Result<usize, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    widget.canvas().save_png(&dir.join("frame_0000.png"))?;
    let mut written = 1;

    if !widget.is_running() {
        if steps > 0 {
            tracing::warn!("Widget is not animated, exporting a single frame");
        }
        return Ok(written);
    }

    for i in 1..=steps {
        widget.tick();
        widget
            .canvas()
            .save_png(&dir.join(format!("frame_{i:04}.png")))?;
        written += 1;
    }

    Ok(written)
}

fn trace_first_frame(config: PulseConfig) -> Result<(), Box<dyn Error>> {
    let canvas = RecordingCanvas::new(0.0, DEFAULT_SURFACE_HEIGHT as f64);
    let widget = PulseWidget::new(canvas, ManualTimer::new(), config)?;

    tracing::info!(
        "{} samples, {}x{} surface",
        widget.samples().len(),
        widget.canvas().width(),
        widget.canvas().height()
    );
    for command in widget.canvas().commands() {
        tracing::info!("{:?}", command);
    }
    Ok(())
}

#[cfg(feature = "hardware")]
async fn animate_on_panel(args: &Args, config: PulseConfig) -> Result<(), Box<dyn Error>> {
    use pulse_line::render::{LedPanel, run_on_panel};
    use pulse_line::timer::IntervalTimer;
    use pulse_line::{PanelConfig, setup_signal_handler};

    let panel_config = PanelConfig::new(args.rows, args.cols);
    tracing::info!("Panel: {}x{}", panel_config.cols, panel_config.rows);

    let running = setup_signal_handler()?;
    let mut panel = LedPanel::new(panel_config, args.brightness)?;

    let canvas = RasterCanvas::new(0, panel_config.rows);
    let mut widget = PulseWidget::new(canvas, IntervalTimer::new(), config)?;
    widget.resize(panel_config.cols as f64, panel_config.rows as f64);
    widget.draw();

    run_on_panel(&mut widget, &mut panel, &running).await;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .init();

    let args = Args::parse();
    let config = args.build_config()?;

    tracing::info!("pulse-line v{}", env!("CARGO_PKG_VERSION"));

    #[cfg(feature = "hardware")]
    if args.led {
        return animate_on_panel(&args, config).await;
    }

    if args.trace {
        trace_first_frame(config.clone())?;
    }

    if let Some(dir) = &args.out_dir {
        let height = config.height.map_or(DEFAULT_SURFACE_HEIGHT, |h| h as u32);
        let canvas = RasterCanvas::new(0, height);
        let mut widget = PulseWidget::new(canvas, ManualTimer::new(), config)?;
        let written = export_frames(&mut widget, dir, args.frames)?;
        tracing::info!("Wrote {} frame(s) to {}", written, dir.display());
    } else if !args.trace {
        return Err("nothing to do: pass --out-dir, --trace or --led".into());
    }

    Ok(())
}
