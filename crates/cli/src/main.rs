use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use ascii_video_core::pipeline::compose_video_use_case::ComposeVideoUseCase;
use ascii_video_core::pipeline::convert_video_use_case::{ConvertVideoUseCase, Outcome};
use ascii_video_core::pipeline::extract_frames_use_case::ExtractFramesUseCase;
use ascii_video_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use ascii_video_core::pipeline::rasterize_use_case::RasterizeUseCase;
use ascii_video_core::pipeline::render_text_use_case::RenderTextUseCase;
use ascii_video_core::shared::constants::{
    IMG2TXT_PROGRAM, RASTER_STAGE_EXTENSION, VIRTUAL_DISPLAY_PROGRAM, WKHTMLTOIMAGE_PROGRAM,
};
use ascii_video_core::text::domain::text_geometry::TextGeometry;
use ascii_video_core::text::infrastructure::img2txt_renderer::Img2TxtRenderer;
use ascii_video_core::text::infrastructure::wkhtml_rasterizer::{
    RasterizerConfig, WkhtmlRasterizer,
};
use ascii_video_core::video::infrastructure::ffmpeg_probe::FfmpegProbe;
use ascii_video_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use ascii_video_core::video::infrastructure::ffmpeg_writer::{EncoderSettings, FfmpegWriter};
use ascii_video_core::video::infrastructure::image_file_writer::ImageFileWriter;
use ascii_video_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Re-renders a video as ASCII art, keeping its soundtrack.
#[derive(Parser, Debug)]
#[command(name = "ascii-video")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Directory for the JPG/HTML/PNG staging folders and the output video.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Keep the staged JPG/HTML/PNG files after a successful run.
    #[arg(long)]
    keep_intermediates: bool,

    /// img2txt executable.
    #[arg(long, default_value = IMG2TXT_PROGRAM)]
    img2txt: OsString,

    /// wkhtmltoimage executable.
    #[arg(long, default_value = WKHTMLTOIMAGE_PROGRAM)]
    wkhtmltoimage: OsString,

    /// Do not wrap wkhtmltoimage in xvfb-run, even on Linux.
    #[arg(long)]
    no_virtual_display: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut use_case = build_use_case(&cli);
    match use_case.execute(&cli.input, &cli.work_dir)? {
        Outcome::NoVideoTrack => {
            log::warn!("{} has no video track", cli.input.display());
        }
        Outcome::Converted { output, frames } => {
            log::info!("Output written to {} ({frames} frames)", output.display());
        }
    }
    Ok(())
}

fn rasterizer_config(cli: &Cli) -> RasterizerConfig {
    let mut config = RasterizerConfig::for_host();
    if cli.no_virtual_display {
        config.virtual_display = false;
    }
    config
}

fn build_use_case(cli: &Cli) -> ConvertVideoUseCase {
    ConvertVideoUseCase::new(
        Box::new(FfmpegProbe::new()),
        ExtractFramesUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(ImageFileWriter::new()),
        ),
        RenderTextUseCase::new(Box::new(Img2TxtRenderer::new(
            cli.img2txt.clone(),
            TextGeometry::default(),
        ))),
        RasterizeUseCase::new(Box::new(WkhtmlRasterizer::new(
            cli.wkhtmltoimage.clone(),
            VIRTUAL_DISPLAY_PROGRAM,
            rasterizer_config(cli),
        ))),
        ComposeVideoUseCase::new(
            Box::new(ImageSequenceReader::new(RASTER_STAGE_EXTENSION)),
            Box::new(FfmpegWriter::new(EncoderSettings::default())),
        ),
        Box::new(StdoutPipelineLogger::default()),
    )
    .keep_intermediates(cli.keep_intermediates)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_file() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.work_dir.is_dir() {
        return Err(format!(
            "Working directory not found: {}",
            cli.work_dir.display()
        )
        .into());
    }
    Ok(())
}
