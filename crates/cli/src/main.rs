use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use girih::api::{
    CleanseFlags, Crop, CropRegion, DesignElement, FillSpec, Motif, ProtoCfg, Prototype, Tiling,
};
use girih::Vec2;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "girih")]
#[command(about = "Build periodic star patterns as planar maps")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleTiling {
    Square,
    Hexagonal,
    TruncatedSquare,
}

impl SampleTiling {
    fn tiling(self) -> Tiling {
        match self {
            SampleTiling::Square => Tiling::square(),
            SampleTiling::Hexagonal => Tiling::hexagonal(),
            SampleTiling::TruncatedSquare => Tiling::truncated_square(),
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Build a star pattern over a sample tiling and write the map as JSON
    Build {
        #[arg(long, value_enum, default_value_t = SampleTiling::Square)]
        tiling: SampleTiling,
        /// Star branch reach in sides (clamped to [1, n/2])
        #[arg(long, default_value_t = 2.0)]
        d: f64,
        /// Crossings per branch
        #[arg(long, default_value_t = 1.0)]
        s: f64,
        /// singleton, pack or N for the square [-N, N]²
        #[arg(long, value_parser = parse_fill)]
        fill: Option<FillSpec>,
        /// Rectangle crop: x0,y0,x1,y1
        #[arg(
            long,
            value_delimiter = ',',
            num_args = 4,
            allow_hyphen_values = true,
            conflicts_with = "crop_circle"
        )]
        crop_rect: Option<Vec<f64>>,
        /// Circle crop: cx,cy,r
        #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        crop_circle: Option<Vec<f64>>,
        /// Insert the crop boundary into the map
        #[arg(long)]
        embed: bool,
        /// Cleanse level as a flag mask (e.g. 0x7f)
        #[arg(long, value_parser = parse_flags)]
        cleanse: Option<CleanseFlags>,
        /// Squared-distance tolerance
        #[arg(long)]
        sensitivity: Option<f64>,
        /// ProtoCfg as JSON; flags above override its fields
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the fill placements of a sample tiling
    Fill {
        #[arg(long, value_enum, default_value_t = SampleTiling::Square)]
        tiling: SampleTiling,
        #[arg(long, value_parser = parse_fill)]
        fill: Option<FillSpec>,
    },
    /// Print the code revision and library version as JSON
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build {
            tiling,
            d,
            s,
            fill,
            crop_rect,
            crop_circle,
            embed,
            cleanse,
            sensitivity,
            config,
            out,
        } => {
            let mut cfg = match &config {
                Some(path) => load_config(path)?,
                None => ProtoCfg::default(),
            };
            if fill.is_some() {
                cfg.fill_override = fill;
            }
            if let Some(level) = cleanse {
                cfg.cleanse_level = level;
            }
            if let Some(tol) = sensitivity {
                cfg.sensitivity = tol;
            }
            let crop = crop_from_args(crop_rect, crop_circle, embed)?;
            build(tiling, d, s, cfg, crop, &out)
        }
        Action::Fill { tiling, fill } => print_fill(tiling, fill),
        Action::Report => report(),
    }
}

fn parse_fill(s: &str) -> Result<FillSpec, String> {
    match s {
        "singleton" => Ok(FillSpec::Singleton),
        "pack" => Ok(FillSpec::Pack),
        n => n
            .parse::<i32>()
            .map(FillSpec::square)
            .map_err(|_| format!("expected singleton, pack or an integer, got {n:?}")),
    }
}

fn parse_flags(s: &str) -> Result<CleanseFlags, String> {
    let bits = match s.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    }
    .map_err(|e| format!("bad cleanse mask {s:?}: {e}"))?;
    Ok(CleanseFlags(bits & CleanseFlags::ALL.0))
}

fn load_config(path: &Path) -> Result<ProtoCfg> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn crop_from_args(
    rect: Option<Vec<f64>>,
    circle: Option<Vec<f64>>,
    embed: bool,
) -> Result<Option<Crop>> {
    let region = match (rect.as_deref(), circle.as_deref()) {
        (Some(&[x0, y0, x1, y1]), _) => CropRegion::rect(Vec2::new(x0, y0), Vec2::new(x1, y1)),
        (_, Some(&[cx, cy, r])) => CropRegion::circle(Vec2::new(cx, cy), r),
        (None, None) => {
            if embed {
                bail!("--embed needs --crop-rect or --crop-circle");
            }
            return Ok(None);
        }
        _ => bail!("malformed crop arguments"),
    };
    Ok(Some(Crop::new(region).with_embed(embed)))
}

/// Star on the first tile; every other tile infers its motif from it.
fn elements_for(tiling: &Tiling, d: f64, s: f64) -> Vec<DesignElement> {
    tiling
        .unique_tiles()
        .enumerate()
        .map(|(i, tile)| {
            let motif = if i == 0 { Motif::star(d, s) } else { Motif::Inferred };
            DesignElement::new(tile.clone(), motif)
        })
        .collect()
}

fn build(
    which: SampleTiling,
    d: f64,
    s: f64,
    cfg: ProtoCfg,
    crop: Option<Crop>,
    out: &Path,
) -> Result<()> {
    let tiling = which.tiling();
    let name = tiling.name.clone();
    tracing::info!(tiling = %name, d, s, cleanse = %cfg.cleanse_level, "build");
    let elements = elements_for(&tiling, d, s);
    let mut proto = Prototype::new(tiling, cfg);
    proto.set_elements(elements);
    proto.set_crop(crop);
    let map = proto.proto_map();
    let report = proto.report();
    tracing::info!(summary = %map.summary(), warnings = report.warnings.len(), "built");

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(&*map)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let params = json!({
        "tiling": name,
        "d": d,
        "s": s,
        "config": cfg,
        "crop": crop,
    });
    let sidecar = provenance::write_sidecar(out, params, &report)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "wrote");
    Ok(())
}

fn print_fill(which: SampleTiling, fill: Option<FillSpec>) -> Result<()> {
    let tiling = which.tiling();
    let placements = tiling.fill_region(fill).placements();
    tracing::info!(tiling = %tiling.name, count = placements.len(), "fill");
    for p in &placements {
        println!("{:.6} {:.6}", p.t.x, p.t.y);
    }
    Ok(())
}

fn report() -> Result<()> {
    let header = provenance::Header::current();
    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}
