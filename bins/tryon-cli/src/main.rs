//! tryon: CLI for preparing garment photos and driving the generation service.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tryon_api_client::{
    AspectRatio, GenerationClient, GenerationOutcome, GenerationRequest, ImageAttachment,
    Resolution,
};
use tryon_image::{
    assess_upload, compress_to_target, encode_jpeg, magnify, sample_pixel, sniff_format,
    CompressionTarget, IntakeDecision, PreviewClick, UploadPolicy,
};

/// Download re-encode quality for generated outputs.
const OUTPUT_QUALITY: u8 = 95;

/// Magnifier crop radius in original-image pixels.
const MAGNIFIER_RADIUS: u32 = 20;

/// Magnifier output edge length in pixels.
const MAGNIFIER_SIZE: u32 = 300;

#[derive(Parser)]
#[command(name = "tryon")]
#[command(about = "Garment photo preparation and try-on image generation")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sniff an upload's format and report what intake would do with it
    Inspect {
        /// Path to image file
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-encode an upload into the target byte window
    Compress {
        /// Path to image file
        path: PathBuf,
        /// Output path (defaults to `<input>.compressed.jpg`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Smallest acceptable size in bytes
        #[arg(long, default_value_t = 1_048_576)]
        min_bytes: usize,
        /// Largest acceptable size in bytes
        #[arg(long, default_value_t = 2_097_152)]
        max_bytes: usize,
        /// Quality the search starts at
        #[arg(long, default_value_t = 85)]
        start_quality: u8,
        /// Quality floor
        #[arg(long, default_value_t = 55)]
        min_quality: u8,
        /// Quality step between attempts
        #[arg(long, default_value_t = 2)]
        quality_step: u8,
        /// Longest-side cap in pixels
        #[arg(long, default_value_t = 2048)]
        max_dimension: u32,
    },
    /// Sample a color by mapping a preview click back to the original image
    Pick {
        /// Path to image file
        path: PathBuf,
        /// Click position as `x,y` in preview coordinates
        #[arg(long)]
        at: String,
        /// Preview size as `WIDTHxHEIGHT`
        #[arg(long, default_value = "300x300")]
        preview: String,
        /// Write a magnified crop around the sampled pixel to this path
        #[arg(long)]
        magnifier: Option<PathBuf>,
    },
    /// Submit images and an instruction block to the generation service
    Generate {
        /// Main garment image
        path: PathBuf,
        /// File containing the instruction block
        #[arg(long)]
        prompt_file: PathBuf,
        /// Additional reference images
        #[arg(long = "reference")]
        references: Vec<PathBuf>,
        /// Previous output to revise
        #[arg(long, requires = "revise")]
        previous: Option<PathBuf>,
        /// Correction note describing only what is wrong
        #[arg(long, requires = "previous")]
        revise: Option<String>,
        /// Output resolution tier (1K, 2K, 4K)
        #[arg(long, default_value = "2K")]
        resolution: Resolution,
        /// Aspect ratio
        #[arg(long, default_value = "3:4")]
        aspect_ratio: AspectRatio,
        /// Output path
        #[arg(short, long, default_value = "tryon-output.jpg")]
        output: PathBuf,
        /// Skip the intake gate and send uploads unmodified
        #[arg(long)]
        raw_upload: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("tryon_image=debug,tryon_api_client=debug")
            .init();
    }

    let result = match cli.command {
        Commands::Inspect { path, json } => inspect(&path, json),
        Commands::Compress {
            path,
            output,
            min_bytes,
            max_bytes,
            start_quality,
            min_quality,
            quality_step,
            max_dimension,
        } => {
            let target = CompressionTarget {
                min_bytes,
                max_bytes,
                start_quality,
                min_quality,
                quality_step,
                max_dimension,
            };
            compress(&path, output, &target)
        }
        Commands::Pick {
            path,
            at,
            preview,
            magnifier,
        } => pick(&path, &at, &preview, magnifier.as_deref()),
        Commands::Generate {
            path,
            prompt_file,
            references,
            previous,
            revise,
            resolution,
            aspect_ratio,
            output,
            raw_upload,
        } => {
            generate(
                &path,
                &prompt_file,
                &references,
                previous.as_deref(),
                revise.as_deref(),
                resolution,
                aspect_ratio,
                &output,
                raw_upload,
            )
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let format = sniff_format(&data).context("not an accepted upload format")?;
    let img = image::load_from_memory(&data).context("decoding image")?;
    let decision = assess_upload(data.len(), img.width(), img.height(), &UploadPolicy::default());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "format": format,
                "mime": format.mime_type(),
                "width": img.width(),
                "height": img.height(),
                "size_bytes": data.len(),
                "intake": decision,
            }))?
        );
        return Ok(());
    }

    println!("Format: {} ({})", format.mime_type(), path.display());
    println!("Dimensions: {}x{}", img.width(), img.height());
    println!("Size: {:.2} MB", megabytes(data.len()));
    match decision {
        IntakeDecision::Compress { reasons } => {
            let labels: Vec<_> = reasons.iter().map(|r| r.as_str()).collect();
            println!(
                "{} would re-encode ({})",
                "intake:".yellow(),
                labels.join(", ")
            );
        }
        IntakeDecision::KeepOriginal => {
            println!("{} keeps original quality", "intake:".green());
        }
    }
    Ok(())
}

fn compress(path: &Path, output: Option<PathBuf>, target: &CompressionTarget) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    sniff_format(&data).context("not an accepted upload format")?;

    let result = compress_to_target(&data, target)?;
    let output = output.unwrap_or_else(|| path.with_extension("compressed.jpg"));
    std::fs::write(&output, &result.data)
        .with_context(|| format!("writing {}", output.display()))?;

    let summary = format!(
        "{} ({}x{}) | Size: {:.2} MB | Quality: {}%",
        output.display(),
        result.width,
        result.height,
        megabytes(result.size_bytes()),
        result.quality
    );
    if result.within_target {
        println!("{} {summary}", "✓".green());
    } else {
        println!("{} {summary} (outside target range)", "⚠".yellow());
    }
    Ok(())
}

fn pick(path: &Path, at: &str, preview: &str, magnifier: Option<&Path>) -> Result<()> {
    let (x, y) = parse_point(at)?;
    let (preview_width, preview_height) = parse_size(preview)?;

    let img = image::open(path).with_context(|| format!("opening {}", path.display()))?;
    let click = PreviewClick {
        x,
        y,
        preview_width,
        preview_height,
    };
    let sample = sample_pixel(&img, &click)?;

    println!("Picked Color: {}", sample.hex().bold());
    println!(
        "RGB: ({}, {}, {})",
        sample.red, sample.green, sample.blue
    );
    println!("Position: ({}, {})", sample.x, sample.y);

    if let Some(magnifier_path) = magnifier {
        let view = magnify(&img, &sample, MAGNIFIER_RADIUS, MAGNIFIER_SIZE);
        view.save(magnifier_path)
            .with_context(|| format!("writing {}", magnifier_path.display()))?;
        println!("Magnified view: {}", magnifier_path.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    path: &Path,
    prompt_file: &Path,
    references: &[PathBuf],
    previous: Option<&Path>,
    revise: Option<&str>,
    resolution: Resolution,
    aspect_ratio: AspectRatio,
    output: &Path,
    raw_upload: bool,
) -> Result<()> {
    let prompt = std::fs::read_to_string(prompt_file)
        .with_context(|| format!("reading {}", prompt_file.display()))?;

    let policy = UploadPolicy::default();
    let target = CompressionTarget::default();

    let primary = load_attachment(path, raw_upload, &policy, &target, "main image")?;
    let mut request = GenerationRequest::new(prompt, primary)
        .with_resolution(resolution)
        .with_aspect_ratio(aspect_ratio);

    // A revision pass sends the previous output right after the main image.
    if let (Some(previous), Some(note)) = (previous, revise) {
        request = request
            .with_reference(load_attachment(previous, true, &policy, &target, "previous output")?)
            .with_revision_note(note);
    }

    for reference in references {
        request = request.with_reference(load_attachment(
            reference, raw_upload, &policy, &target, "reference",
        )?);
    }

    let client = GenerationClient::new()?;
    println!(
        "Generating at {} ({}), falling back down the ladder on failure…",
        resolution, aspect_ratio
    );

    match client.generate(&request).await {
        GenerationOutcome::Success(result) => {
            let jpeg = encode_jpeg(&result.image, OUTPUT_QUALITY)?;
            std::fs::write(output, &jpeg)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "{} wrote {} ({:.2} MB)",
                "✓".green(),
                output.display(),
                megabytes(jpeg.len())
            );
            if let Some(description) = result.description {
                println!("  {}", description.dimmed());
            }
            Ok(())
        }
        GenerationOutcome::NoImageReturned => {
            bail!("the service returned no image; try again or adjust the inputs")
        }
        GenerationOutcome::TransportFailure(cause) => {
            Err(cause).context("every resolution step failed")
        }
        GenerationOutcome::DecodeFailure(cause) => {
            bail!("the returned image could not be decoded: {cause}")
        }
    }
}

/// Read an upload, sniff its format, and run it through the intake gate
/// unless `raw` is set.
fn load_attachment(
    path: &Path,
    raw: bool,
    policy: &UploadPolicy,
    target: &CompressionTarget,
    label: &str,
) -> Result<ImageAttachment> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let format =
        sniff_format(&data).with_context(|| format!("{label} is not an accepted upload"))?;

    if raw {
        return Ok(ImageAttachment::new(format.mime_type(), data));
    }

    let img = image::load_from_memory(&data).with_context(|| format!("decoding {label}"))?;
    match assess_upload(data.len(), img.width(), img.height(), policy) {
        IntakeDecision::Compress { reasons } => {
            let labels: Vec<_> = reasons.iter().map(|r| r.as_str()).collect();
            println!(
                "{} re-encoding {label} ({})",
                "intake:".yellow(),
                labels.join(", ")
            );
            let result = compress_to_target(&data, target)?;
            println!(
                "  {:.2} MB at quality {}%",
                megabytes(result.size_bytes()),
                result.quality
            );
            Ok(ImageAttachment::jpeg(result.data))
        }
        IntakeDecision::KeepOriginal => {
            println!("{} {label} kept original quality", "intake:".green());
            Ok(ImageAttachment::new(format.mime_type(), data))
        }
    }
}

fn parse_point(s: &str) -> Result<(u32, u32)> {
    let (x, y) = s.split_once(',').context("expected `x,y`")?;
    Ok((
        x.trim().parse().context("invalid x coordinate")?,
        y.trim().parse().context("invalid y coordinate")?,
    ))
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s.split_once('x').context("expected `WIDTHxHEIGHT`")?;
    Ok((
        w.trim().parse().context("invalid width")?,
        h.trim().parse().context("invalid height")?,
    ))
}

fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_click_points() {
        assert_eq!(parse_point("120,45").unwrap(), (120, 45));
        assert_eq!(parse_point(" 3 , 7 ").unwrap(), (3, 7));
        assert!(parse_point("120").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn parses_preview_sizes() {
        assert_eq!(parse_size("300x300").unwrap(), (300, 300));
        assert_eq!(parse_size("1024x768").unwrap(), (1024, 768));
        assert!(parse_size("300").is_err());
        assert!(parse_size("x300").is_err());
    }

    #[test]
    fn megabyte_conversion() {
        assert!((megabytes(1_048_576) - 1.0).abs() < f64::EPSILON);
    }
}
