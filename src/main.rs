use clap::{ArgAction, Parser, Subcommand};
use sleep_screen::device::{self, DeviceConfig, KeyValueFile};
use sleep_screen::imaging::{
    self, Border, CropAnchor, OverlayPosition, OverlaySpec, ProcessOptions, TargetResolution,
};
use sleep_screen::push::{DevicePusher, SshPusher};
use sleep_screen::settings::{self, Settings};
use sleep_screen::{logging, output, relocate};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn version_string() -> &'static str {
    if env!("SLEEP_SCREEN_RELEASE") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SLEEP_SCREEN_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Image flags shared by `process` and `install`.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Path to the unprocessed source image
    #[arg(short, long)]
    source: PathBuf,

    /// Target width in pixels [default: settings target.width, 1620]
    #[arg(short, long)]
    width: Option<u32>,

    /// Target height in pixels [default: settings target.height, 2160]
    #[arg(long)]
    height: Option<u32>,

    /// Edge kept when cropping: center, left, right, top, bottom
    #[arg(short, long, default_value = "center")]
    position: CropAnchor,

    /// Add a white border of N pixels (bare flag: settings border.default_thickness, 30)
    #[arg(short, long, value_name = "N", num_args = 0..=1)]
    border: Option<Option<u32>>,

    /// Keep the final image at the target size by shrinking the photo inside the border
    #[arg(long, requires = "border")]
    inset_border: bool,

    /// Composite a text overlay from the overlay directory (bare flag: text_overlay.png)
    #[arg(short, long, value_name = "NAME", num_args = 0..=1)]
    textfile: Option<Option<String>>,

    /// Invert the overlay colors (black text becomes white)
    #[arg(short, long, requires = "textfile")]
    invert: bool,

    /// Overlay distance from the nearest edges in pixels [default: 0]
    #[arg(long, value_name = "PX")]
    buffer: Option<u32>,

    /// Overlay placement, e.g. upper_left, middle_middle, lower_right [default: lower_right]
    #[arg(long, value_name = "POSITION")]
    overlay_position: Option<OverlayPosition>,
}

#[derive(Parser)]
#[command(name = "sleep-screen")]
#[command(about = "Prepare and push a custom reMarkable sleep screen")]
#[command(long_about = "\
Prepare and push a custom reMarkable sleep screen

Pipeline:

  process   crop to the panel aspect, resize, optional border and text overlay
  move      stage the result as SOURCE_PATH/suspended.png
  push      ping the tablet, remount / read-write, prepare DESTINATION_DIR,
            copy the staged file with pscp
  install   all three in order

Device config (config/remarkable_config.txt by default), one KEY=VALUE per line:

  REMARKABLE_IP=10.11.99.1
  REMARKABLE_PASSWORD=...
  SOURCE_PATH=/home/me/remarkable/staging
  DESTINATION_DIR=/usr/share/remarkable
  PUTTY_PATH=/usr/bin
  DESTINATION_FILE=suspended.png

Run 'sleep-screen gen-config' to generate a documented sleep-screen.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Settings file (missing file = stock defaults)
    #[arg(long, default_value = settings::DEFAULT_SETTINGS_FILE, global = true)]
    settings: PathBuf,

    /// Device config file [default: settings device.config_file]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop, resize and decorate an image
    Process {
        #[command(flatten)]
        image: ImageArgs,

        /// Output path [default: <source stem>_processed.png]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing output file
        #[arg(long)]
        overwrite: bool,
    },
    /// Stage a processed image in SOURCE_PATH under the fixed file name
    Move {
        /// File to stage
        #[arg(short, long)]
        source: PathBuf,

        /// Replace an already staged file
        #[arg(short, long)]
        overwrite: bool,
    },
    /// Push the staged image to the tablet
    Push {
        /// File to push [default: SOURCE_PATH/<staged file name>]
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Process, stage and push in one go
    Install {
        #[command(flatten)]
        image: ImageArgs,

        /// Replace an existing `<stem>_processed.png` and staged file
        #[arg(short, long)]
        overwrite: bool,

        /// Stop after staging; do not contact the tablet
        #[arg(long)]
        no_push: bool,
    },
    /// Validate the device config and list its keys
    CheckConfig,
    /// Print a stock sleep-screen.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let settings = settings::load_settings(&cli.settings)?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| settings.device.config_file.clone());

    match cli.command {
        Command::Process {
            image,
            output,
            overwrite,
        } => {
            let options = process_options(&image, &settings);
            let output = output.unwrap_or_else(|| imaging::processed_output_path(&image.source));
            relocate::ensure_writable(&output, overwrite)?;
            run_process(&image.source, &output, &options)?;
        }
        Command::Move { source, overwrite } => {
            let values = KeyValueFile::load(&config_path)?;
            let staging_dir = PathBuf::from(values.require(device::SOURCE_PATH)?);
            let staged = relocate::move_file(
                &source,
                &staging_dir,
                &settings.device.staged_file_name,
                overwrite,
            )?;
            output::print_move_output(&source, &staged);
        }
        Command::Push { file } => {
            let device = DeviceConfig::load(&config_path)?;
            let file = file.unwrap_or_else(|| staged_path(&device, &settings));
            push(&file, &device, &settings)?;
        }
        Command::Install {
            image,
            overwrite,
            no_push,
        } => {
            let device = DeviceConfig::load(&config_path)?;
            let staged = staged_path(&device, &settings);
            let processed = imaging::processed_output_path(&image.source);
            // Refuse before spending time on pixels.
            relocate::ensure_writable(&processed, overwrite)?;
            relocate::ensure_writable(&staged, overwrite)?;

            let options = process_options(&image, &settings);
            run_process(&image.source, &processed, &options)?;

            let staged = relocate::move_file(
                &processed,
                &device.staging_dir,
                &settings.device.staged_file_name,
                overwrite,
            )?;
            output::print_move_output(&processed, &staged);

            if !no_push {
                push(&staged, &device, &settings)?;
            }
        }
        Command::CheckConfig => {
            let values = KeyValueFile::load(&config_path)?;
            DeviceConfig::from_file(&values)?;
            output::print_device_config(&values);
            println!("==> Device config is valid");
        }
        Command::GenConfig => {
            print!("{}", settings::stock_settings_toml());
        }
    }

    Ok(())
}

/// Merge image flags over settings defaults.
fn process_options(args: &ImageArgs, settings: &Settings) -> ProcessOptions {
    let target = TargetResolution::new(
        args.width.unwrap_or(settings.target.width),
        args.height.unwrap_or(settings.target.height),
    );

    let border = args.border.map(|thickness| {
        let thickness = thickness.unwrap_or(settings.border.default_thickness);
        if args.inset_border || settings.border.inset {
            Border::inset(thickness)
        } else {
            Border::outset(thickness)
        }
    });

    let overlay = args.textfile.as_ref().map(|name| {
        let name = name.as_deref().unwrap_or(&settings.overlay.default_file);
        OverlaySpec {
            path: settings.overlay.resolve(name),
            position: args.overlay_position.unwrap_or(settings.overlay.position),
            buffer_px: args.buffer.unwrap_or(settings.overlay.buffer),
            invert: args.invert,
        }
    });

    ProcessOptions {
        target,
        anchor: args.position,
        border,
        overlay,
    }
}

fn run_process(source: &Path, output: &Path, options: &ProcessOptions) -> CliResult {
    let processed = imaging::process_detailed(source, options)?;
    imaging::save_image(&processed.image, output)?;
    output::print_process_output(source, output, &processed, options);
    Ok(())
}

fn staged_path(device: &DeviceConfig, settings: &Settings) -> PathBuf {
    device.staging_dir.join(&settings.device.staged_file_name)
}

fn push(file: &Path, device: &DeviceConfig, settings: &Settings) -> CliResult {
    let pusher = SshPusher::new(Duration::from_secs(settings.device.ping_timeout_secs));
    pusher.push(file, device)?;
    output::print_push_output(file, device);
    Ok(())
}
