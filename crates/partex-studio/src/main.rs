use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use partex_engine::config::StudioConfig;
use partex_engine::device::{Gpu, GpuInit};
use partex_engine::export::export_with_refresh;
use partex_engine::generate::Generator;
use partex_engine::logging::{init_logging, LoggingConfig};
use partex_engine::material::{apply, ApplyOutcome, ParticleRenderer};
use partex_engine::raster::{CpuRasterizer, Rasterizer, TextureResolution};
use partex_engine::render::GpuRasterizer;
use partex_engine::shape::Shape;

/// Generates a gradient-mapped particle texture and applies it to a renderer.
#[derive(Parser, Debug)]
#[command(name = "partex-studio", version)]
struct Args {
    /// Studio TOML file; defaults are used when omitted
    config: Option<PathBuf>,

    /// Export the texture to <assets_root>/ParticleTextures
    #[arg(long)]
    save: bool,

    /// Rasterize with the software reference instead of the GPU
    #[arg(long)]
    cpu: bool,

    /// Override the configured shape (e.g. circle, soft_rect)
    #[arg(long, value_name = "NAME", value_parser = Shape::from_str)]
    shape: Option<Shape>,

    /// Override the output size (32, 64, 128, 256, 512 or 1024)
    #[arg(long, value_name = "N", value_parser = parse_resolution)]
    resolution: Option<TextureResolution>,

    /// Write the committed settings back as TOML
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn parse_resolution(raw: &str) -> Result<TextureResolution> {
    let px: u32 = raw
        .parse()
        .with_context(|| format!("resolution `{raw}` is not a number"))?;
    Ok(TextureResolution::try_from(px)?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StudioConfig::from_toml_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => StudioConfig::default(),
    };
    if let Some(shape) = args.shape {
        config.shape = shape;
    }
    if let Some(resolution) = args.resolution {
        config.resolution = resolution;
    }
    let settings = config.commit().context("invalid studio configuration")?;

    init_logging(LoggingConfig::with_filter(settings.log_filter.clone()));

    if let Some(path) = &args.write_config {
        config
            .pinned(&settings)
            .save_toml(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote settings to {}", path.display());
    }

    let rasterizer: Box<dyn Rasterizer> = if args.cpu {
        log::info!("using CPU reference rasterizer");
        Box::new(CpuRasterizer::new())
    } else {
        let gpu = Gpu::new_blocking(GpuInit::default())
            .context("no usable GPU; rerun with --cpu for the software path")?;
        log::info!("rasterizing on {}", gpu.adapter_info().name);
        Box::new(GpuRasterizer::new(gpu))
    };

    let mut generator = Generator::new(rasterizer);
    let texture = Arc::new(generator.generate(&settings.request)?);

    let blend = settings.request.blend_mode;
    let mut renderer = settings.target.as_deref().map(ParticleRenderer::new);
    let outcome = apply(texture.clone(), renderer.as_mut(), blend);
    if let (ApplyOutcome::Applied, Some(renderer)) = (outcome, &renderer) {
        println!("applied to `{}` ({blend})", renderer.name);
    }

    if args.save {
        let written = export_with_refresh(
            Some(&texture),
            &settings.texture_name,
            &settings.output_dir,
            |path| match path {
                Some(path) => log::debug!("asset refresh requested for {}", path.display()),
                None => log::debug!("asset refresh requested"),
            },
        )?;
        if let Some(path) = written {
            println!("saved {}", path.display());
        }
    }

    generator.release();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("partex-studio").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.save && !args.cpu);
        assert_eq!(args.shape, None);
        assert_eq!(args.resolution, None);
        assert_eq!(args.write_config, None);
    }

    #[test]
    fn flags_and_overrides() {
        let args = parse(&[
            "studio.toml",
            "--save",
            "--cpu",
            "--shape",
            "soft-rect",
            "--resolution",
            "256",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("studio.toml")));
        assert!(args.save);
        assert!(args.cpu);
        assert_eq!(args.shape, Some(Shape::SoftRect));
        assert_eq!(args.resolution, Some(TextureResolution::R256));
    }

    #[test]
    fn equals_form_and_double_dash() {
        let args = parse(&["--resolution=512", "--shape=star"]).unwrap();
        assert_eq!(args.resolution, Some(TextureResolution::R512));
        assert_eq!(args.shape, Some(Shape::Star));

        let args = parse(&["--save", "--", "-odd.toml"]).unwrap();
        assert!(args.save);
        assert_eq!(args.config, Some(PathBuf::from("-odd.toml")));
    }

    #[test]
    fn write_config_takes_a_path() {
        let args = parse(&["--write-config", "out.toml"]).unwrap();
        assert_eq!(args.write_config, Some(PathBuf::from("out.toml")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--resolution", "100"]).is_err());
        assert!(parse(&["--resolution", "big"]).is_err());
        assert!(parse(&["--shape"]).is_err());
        assert!(parse(&["--shape", "spiral"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a.toml", "b.toml"]).is_err());
    }
}
