use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use grotto::{timed, Cave, CaveConfig, CaveRenderer, RenderConfig, Seed};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// Generate tiered cave maps, or load a saved one, and export them.
#[derive(Debug, StructOpt)]
#[structopt(name = "grotto")]
struct Opt {
    /// Cave config to generate from (JSON or TOML). Mutually exclusive with
    /// --bin
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Previously saved .bin cave to load instead of generating one
    #[structopt(short, long)]
    bin: Option<PathBuf>,

    /// Replaces the seed in the config file. Integers are used as-is, any
    /// other text is hashed
    #[structopt(short, long)]
    seed: Option<Seed>,

    /// Directory to write exports into, as cave.<ext>. Requires at least
    /// one --output-formats
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Export format(s):
    ///
    /// bin - CBOR dump of the whole cave, loadable again with --bin
    ///
    /// cfg - the effective config as TOML, including the seed
    ///
    /// json - the whole cave as JSON
    ///
    /// svg - top-down tier map with region outlines
    ///
    /// stl - ground and wall triangles of every region mesh
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// Multiplier for mesh heights in STL output
    #[structopt(long, default_value = "1.0")]
    vertical_scale: f64,

    /// Omit the floor quad from STL output
    #[structopt(long)]
    hide_floor: bool,

    /// Omit region outlines from SVG output
    #[structopt(long)]
    hide_outlines: bool,

    /// Log filter: off, error, warn, info, debug or trace
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

// Keep in sync with the --output-formats help text
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    Bin,
    Cfg,
    Json,
    Svg,
    Stl,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Svg => "svg",
            Self::Stl => "stl",
        }
    }

    fn render(
        self,
        cave: &Cave,
        renderer: &CaveRenderer,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(match self {
            Self::Bin => cave.to_bin(),
            Self::Cfg => toml::to_string_pretty(cave.config())
                .context("error serializing config")?
                .into_bytes(),
            Self::Json => cave.to_json().into_bytes(),
            Self::Svg => renderer.render_as_svg(cave).into_bytes(),
            Self::Stl => renderer.render_as_stl(cave),
        })
    }
}

fn load_config(path: &Path) -> anyhow::Result<CaveConfig> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("invalid character in path {:?}", path))?;
    let mut settings = Config::new();
    settings
        .merge(File::with_name(path_str))
        .with_context(|| format!("error reading config file {:?}", path))?;
    settings.try_into().context("error parsing cave config")
}

/// Generate a fresh cave from `--config`, or load one from `--bin`
fn load_cave(opt: &Opt) -> anyhow::Result<Cave> {
    match (&opt.config, &opt.bin) {
        (Some(config_path), None) => {
            let mut config = load_config(config_path)?;
            if let Some(seed) = &opt.seed {
                info!("Overriding seed with {}", seed);
                config.seed = seed.clone();
            }
            Cave::generate(config)
        }
        (None, Some(bin_path)) => {
            if opt.seed.is_some() {
                bail!("--seed can't be used with --bin, loaded caves are fixed")
            }
            let file = fs::File::open(bin_path).with_context(|| {
                format!("error opening cave file {:?}", bin_path)
            })?;
            let cave = Cave::from_bin(file)?;
            info!("Loaded cave from {:?}", bin_path);
            Ok(cave)
        }
        _ => bail!("pass either --config or --bin, but not both"),
    }
}

fn write_output(
    output_dir: &Path,
    format: OutputFormat,
    cave: &Cave,
    renderer: &CaveRenderer,
) -> anyhow::Result<()> {
    let path = output_dir.join("cave").with_extension(format.file_ext());
    timed!(
        format!("Writing {} output to {:?}", format, &path),
        log::Level::Info,
        {
            let bytes = format.render(cave, renderer)?;
            fs::write(&path, bytes)
                .with_context(|| format!("error writing to {:?}", &path))?;
        }
    );
    Ok(())
}

fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let cave = load_cave(&opt)?;

    let output_dir = match &opt.output {
        Some(output_dir) => output_dir,
        None => return Ok(()),
    };
    if opt.output_formats.is_empty() {
        bail!("--output needs at least one --output-formats")
    }
    fs::create_dir_all(output_dir)?;

    let renderer = CaveRenderer::new(RenderConfig {
        vertical_scale: opt.vertical_scale,
        show_floor: !opt.hide_floor,
        show_outlines: !opt.hide_outlines,
    })
    .context("invalid render config")?;
    for format in &opt.output_formats {
        write_output(output_dir, *format, &cave, &renderer)?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = run(Opt::from_args()) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
