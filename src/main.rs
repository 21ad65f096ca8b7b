use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tdlb_output::naming::{DEFAULT_PREFIX, Placement};
use tdlb_output::tree::{cu_files_in, last_two_components, FsLister};
use tdlb_output::{
    longest_common_ancestor, CuFileKind, LayoutDescriptor, OutputGeometry, OutputTree, PathSegment,
    PlaneKind,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tdlb-output", about = "Inspect tdLB simulation output trees and sidecars")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sidecar and the record layout it describes
    Inspect {
        sidecar: PathBuf,
    },
    /// List step directories under a run root
    List {
        root: PathBuf,
        /// Plane kind: xy, xz, yz, volume, capture, angle, sector
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        cut: Option<i64>,
        #[arg(short, long)]
        step: Option<u64>,
    },
    /// List compute-unit files in one step directory
    Files {
        dir: PathBuf,
        /// Force (F3) files instead of QVec files
        #[arg(short, long)]
        force: bool,
        /// Sidecars instead of binaries
        #[arg(short, long)]
        sidecar: bool,
    },
    /// Longest common ancestor of the given paths
    CommonRoot {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },
    /// Format a step directory name
    Name {
        kind: String,
        #[arg(long)]
        step: u64,
        #[arg(long, allow_negative_numbers = true)]
        cut: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        angle: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        angle2: Option<i64>,
        #[arg(long)]
        blade: Option<i64>,
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },
    /// Directory names a run with this output geometry creates
    Plan {
        geometry: PathBuf,
        #[arg(long)]
        steps: u64,
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {

        // ── Inspect ──────────────────────────────────────────────────────────
        Commands::Inspect { sidecar } => {
            let d = LayoutDescriptor::read_json(&sidecar)?;
            let l = d.layout()?;
            println!("── Sidecar ──────────────────────────────────────────────");
            println!("  Path            {}", sidecar.display());
            println!("  Name            {}", d.name);
            println!("  Struct          {}", d.struct_name);
            println!("  Binary          {}", d.file_path);
            println!("  Origin (i,j,k)  {} {} {}", d.i0, d.j0, d.k0);
            println!("  Records         {}", d.bin_file_size_in_structs);
            println!("── Layout ───────────────────────────────────────────────");
            println!("  Coords          {} ({} B) col/row={} grid={}",
                     d.coords_type, l.coord_field_size(), l.has_col_row(), l.has_grid());
            println!("  Q               {} x {} ({} B each)",
                     l.quantity_count(), d.q_data_type, l.quantity_size());
            println!("  Offsets         col/row {}  grid {}  q {}",
                     l.col_row_byte_offset(), l.grid_byte_offset(), l.quantity_byte_offset());
            println!("  Record size     {} B", l.record_byte_size());
            println!("  Expected size   {} B", d.expected_bin_size()?);
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { root, kind, cut, step } => {
            let tree = OutputTree::open(&root);
            let dirs = match kind {
                Some(k) => tree.find_by_plane_kind(parse_kind(&k)?, cut, step),
                None    => tree.plot_dirs(),
            };
            for dir in dirs {
                let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                match PathSegment::parse(&name) {
                    Some(seg) => println!("{:<20} {:>10} {:>8}  {}",
                        seg.kind, seg.step,
                        cut_cell(&seg),
                        last_two_components(&dir)),
                    None => println!("{:<20} {:>10} {:>8}  {}", "?", "?", "?", last_two_components(&dir)),
                }
            }
        }

        // ── Files ────────────────────────────────────────────────────────────
        Commands::Files { dir, force, sidecar } => {
            let kind = if force { CuFileKind::Force } else { CuFileKind::QVec };
            for f in cu_files_in(&FsLister, &dir, kind, sidecar) {
                println!("{}", f.display());
            }
        }

        // ── CommonRoot ───────────────────────────────────────────────────────
        Commands::CommonRoot { paths } => {
            println!("{}", longest_common_ancestor(paths.as_slice()));
        }

        // ── Name ─────────────────────────────────────────────────────────────
        Commands::Name { kind, step, cut, angle, angle2, blade, prefix } => {
            let kind = parse_kind(&kind)?;
            let placement = match kind {
                PlaneKind::XyPlane | PlaneKind::XzPlane | PlaneKind::YzPlane => Placement::Cut(required(cut, "--cut")?),
                PlaneKind::Volume            => Placement::Whole,
                PlaneKind::RotationalCapture => Placement::Capture {
                    angle:    required(angle, "--angle")?,
                    blade_id: required(blade, "--blade")?,
                },
                PlaneKind::YzAnglePlane      => Placement::Angle(required(angle, "--angle")?),
                PlaneKind::Sector            => Placement::Sector {
                    angle1: required(angle, "--angle")?,
                    angle2: required(angle2, "--angle2")?,
                },
            };
            let seg = PathSegment {
                prefix,
                kind,
                version: tdlb_output::PLOT_FILES_VERSION,
                step,
                placement,
            };
            println!("{seg}");
        }

        // ── Plan ─────────────────────────────────────────────────────────────
        Commands::Plan { geometry, steps, prefix } => {
            let g = OutputGeometry::read_json(&geometry)?;
            for seg in g.plan(steps, &prefix) {
                println!("{seg}");
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_kind(s: &str) -> Result<PlaneKind, String> {
    PlaneKind::from_name(s).ok_or_else(|| format!("unknown plane kind '{s}'"))
}

fn required(v: Option<i64>, flag: &str) -> Result<i64, String> {
    v.ok_or_else(|| format!("{flag} is required for this plane kind"))
}

fn cut_cell(seg: &PathSegment) -> String {
    seg.cut().map(|c| c.to_string()).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_columns_are_ascii() {
        assert_eq!(cut_cell(&PathSegment::xz_plane(20, -3)), "-3");
        assert_eq!(cut_cell(&PathSegment::volume(50)), "-");
        assert!(cut_cell(&PathSegment::sector(1, 2, 3)).is_ascii());
    }
}
