//! # xlbarcode CLI
//!
//! Command-line interface for inserting barcodes into spreadsheets.
//!
//! ## Usage
//!
//! ```bash
//! # Render a barcode for every code in column B into column A
//! xlbarcode process codes.xlsx codes-with-barcodes.xlsx
//!
//! # Same, as zero-padded EAN-13 with a header row
//! xlbarcode process --symbology ean13 --pad --skip-header in.xlsx out.xlsx
//!
//! # Save a single barcode as PNG
//! xlbarcode export 1234567 code.png
//!
//! # Inspect and change the saved settings
//! xlbarcode settings show
//! xlbarcode settings set dpi 300
//!
//! # Web interface
//! xlbarcode serve --listen 127.0.0.1:8080
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use xlbarcode::{
    XlBarcodeError,
    code::Symbology,
    config::{Settings, SettingsStore, default_settings_path},
    export, job,
    job::ProgressEvent,
    logging,
    render::BarcodeRenderer,
    server::{self, ServerConfig},
    workbook::{ImageLocation, PipelineSummary, Session},
};

/// Folder used by `--barcodes-in-working-dir`.
const WORKING_DIR_IMAGES: &str = "barcode images";

/// xlbarcode - Insert barcode images into a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "xlbarcode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Also append log output to logfile.log
    #[arg(short, long, global = true)]
    log: bool,

    /// Do not delete the rendered PNG files
    #[arg(long, global = true)]
    keep_barcode_files: bool,

    /// Write PNG files to "./barcode images" instead of the system temp dir
    #[arg(long, global = true, conflicts_with = "temp_dir")]
    barcodes_in_working_dir: bool,

    /// Write PNG files inside this directory
    #[arg(long, global = true, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Replace the settings file with defaults before running
    #[arg(long, global = true)]
    reset_config: bool,

    /// Settings file to use
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a barcode per row and save a copy of the workbook with the images
    Process {
        /// Workbook to read
        input: PathBuf,

        /// Workbook to write
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Render one barcode to a PNG file
    Export {
        /// Code to encode
        code: String,

        /// PNG file to write
        png: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show or change the saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name (e.g. dpi, symbology, input_column)
        key: String,
        value: String,
    },
    /// Restore the defaults
    Reset,
}

/// Settings overrides. `process` saves them, `export` uses them once.
#[derive(Args, Debug)]
struct Overrides {
    /// Barcode type (ean8, ean13, upca, code39)
    #[arg(long)]
    symbology: Option<Symbology>,

    /// Column holding the codes (e.g. B)
    #[arg(long, value_name = "COL")]
    input_column: Option<String>,

    /// Column receiving the images (e.g. A)
    #[arg(long, value_name = "COL")]
    output_column: Option<String>,

    /// Zero-pad short numeric codes
    #[arg(long, conflicts_with = "no_pad")]
    pad: bool,

    /// Reject short numeric codes
    #[arg(long)]
    no_pad: bool,

    /// Resolution (120-400)
    #[arg(long)]
    dpi: Option<u32>,

    /// Bar height in millimetres (5-50)
    #[arg(long, value_name = "MM")]
    height: Option<f32>,

    /// White border in pixels (0-25)
    #[arg(long, value_name = "PX")]
    border: Option<u32>,

    /// Text size in points (0-15, 0 hides the text)
    #[arg(long, value_name = "PT")]
    font_size: Option<u32>,

    /// Leave the first row alone
    #[arg(long, conflicts_with = "no_skip_header")]
    skip_header: bool,

    /// Process the first row too
    #[arg(long)]
    no_skip_header: bool,
}

impl Overrides {
    /// Apply to `settings`. Returns whether anything was given.
    fn apply(&self, settings: &mut Settings) -> Result<bool, XlBarcodeError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(symbology) = self.symbology {
            pairs.push(("symbology", symbology.id().to_string()));
        }
        if let Some(col) = &self.input_column {
            pairs.push(("input_column", col.clone()));
        }
        if let Some(col) = &self.output_column {
            pairs.push(("output_column", col.clone()));
        }
        if self.pad || self.no_pad {
            pairs.push(("padding", self.pad.to_string()));
        }
        if let Some(dpi) = self.dpi {
            pairs.push(("dpi", dpi.to_string()));
        }
        if let Some(height) = self.height {
            pairs.push(("module_height_mm", height.to_string()));
        }
        if let Some(border) = self.border {
            pairs.push(("border_px", border.to_string()));
        }
        if let Some(size) = self.font_size {
            pairs.push(("font_size_pt", size.to_string()));
        }
        if self.skip_header || self.no_skip_header {
            pairs.push(("skip_header", self.skip_header.to_string()));
        }

        let mut next = settings.clone();
        for (key, value) in &pairs {
            next.set(key, value)?;
        }
        *settings = next;
        Ok(!pairs.is_empty())
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), XlBarcodeError> {
    let cli = Cli::parse();

    let log_file = cli.log.then(|| Path::new(logging::LOG_FILE));
    logging::init(cli.debug, log_file)?;

    let settings_path = cli.config.clone().unwrap_or_else(default_settings_path);
    let store = SettingsStore::new(settings_path.clone());
    if cli.reset_config {
        store.reset()?;
        println!("Settings reset to defaults ({})", store.path().display());
    }

    let images = image_location(&cli);

    match cli.command {
        Commands::Process {
            input,
            output,
            overrides,
        } => {
            let mut settings = store.load()?;
            if overrides.apply(&mut settings)? {
                tracing::info!(path = %store.path().display(), "saving settings overrides");
            }
            settings.last_input_dir = input.parent().map(Path::to_path_buf);
            settings.last_output_dir = output.parent().map(Path::to_path_buf);
            store.save(&settings)?;

            let mut session = Session::new(input, output, settings);
            session.images = images;
            session.keep_images = cli.keep_barcode_files;

            let summary = process(session).await?;
            print_summary(&summary);
        }
        Commands::Export {
            code,
            png,
            overrides,
        } => {
            let mut settings = store.load()?;
            overrides.apply(&mut settings)?;
            let (width, height) = export::export_one(&code, &settings, &png)?;
            println!("Saved {}x{} barcode to {}", width, height, png.display());
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                let settings = store.load()?;
                println!("# {}", store.path().display());
                print_settings(&settings)?;
            }
            SettingsAction::Set { key, value } => {
                let mut settings = store.load()?;
                settings.set(&key, &value)?;
                store.save(&settings)?;
                println!("{} updated", key);
            }
            SettingsAction::Reset => {
                let settings = store.reset()?;
                println!("Settings reset to defaults ({})", store.path().display());
                print_settings(&settings)?;
            }
        },
        Commands::Serve { listen } => {
            // Fail early on an unreadable settings file
            store.load()?;
            server::serve(ServerConfig {
                listen_addr: listen,
                settings_path,
                images,
                keep_images: cli.keep_barcode_files,
            })
            .await?;
        }
    }

    Ok(())
}

fn image_location(cli: &Cli) -> ImageLocation {
    if cli.barcodes_in_working_dir {
        ImageLocation::Within(PathBuf::from(WORKING_DIR_IMAGES))
    } else if let Some(dir) = &cli.temp_dir {
        ImageLocation::Within(dir.clone())
    } else {
        ImageLocation::SystemTemp
    }
}

/// Run one job in the foreground. Ctrl-C requests cancellation; the rows
/// processed so far are still saved.
async fn process(session: Session) -> Result<PipelineSummary, XlBarcodeError> {
    println!(
        "Processing {} -> {}",
        session.input.display(),
        session.output.display()
    );

    let renderer = Arc::new(BarcodeRenderer::new(session.settings.render_options()));
    let mut job = job::spawn(session, renderer);

    let cancel = job.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current row...");
            cancel.cancel();
        }
    });

    while let Some(event) = job.next_event().await {
        match event {
            ProgressEvent::Row { done, total } if done == total || done % 100 == 0 => {
                println!("  row {}/{}", done, total);
            }
            _ => {}
        }
    }

    job.wait().await
}

fn print_summary(summary: &PipelineSummary) {
    if summary.cancelled {
        println!("Cancelled after {} rows", summary.rows_seen);
    }
    println!(
        "Inserted {} barcodes, skipped {} rows",
        summary.inserted.len(),
        summary.skipped.len()
    );
    if let Some(dir) = &summary.image_dir {
        println!("Barcode images kept in {}", dir.display());
    }
    println!("Saved to {}", summary.output.display());
}

fn print_settings(settings: &Settings) -> Result<(), XlBarcodeError> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| XlBarcodeError::Io(std::io::Error::other(e)))?;
    println!("{}", json);
    Ok(())
}
