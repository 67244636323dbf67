use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crystal_lattice_toolkit::config::ToolkitConfig;
use crystal_lattice_toolkit::{
    FermiSurface, Lattice, NeighborPair, ReciprocalLattice, SpaceGroup, SymmetryOperation,
};
use env_logger::Env;
use log::info;
use nalgebra::{DMatrix, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "cltk")]
#[command(about = "Crystal lattice toolkit: neighbors, supercells, reciprocal space, Fermi surfaces and symmetry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file overriding tolerances and defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a cell: metrics, parameters and reciprocal basis
    Info {
        /// Cell file (TOML: basis, species, positions)
        input: PathBuf,
    },
    /// List periodic neighbor contacts within a cutoff
    Neighbors {
        input: PathBuf,

        /// Cutoff distance in Cartesian units
        #[arg(long)]
        cutoff: f64,
    },
    /// Build a supercell
    Supercell {
        input: PathBuf,

        /// Multipliers along a1, a2, a3
        #[arg(long, num_args = 3, required = true, value_names = ["NA", "NB", "NC"])]
        dims: Vec<usize>,

        /// Write the supercell here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List reciprocal lattice points
    Reciprocal {
        input: PathBuf,

        /// Index range [-shell, shell] per axis (default from config)
        #[arg(long)]
        shell: Option<usize>,
    },
    /// Vertices and faces of the first Brillouin zone
    BrillouinZone { input: PathBuf },
    /// Detect the space group
    Symmetry {
        input: PathBuf,

        /// Position tolerance (default from config)
        #[arg(long)]
        symprec: Option<f64>,
    },
    /// Mesh the Fermi surface of sampled band energies
    Fermi {
        input: PathBuf,

        /// Band samples (TOML: kpoints as Cartesian triples, energies per k-point per band)
        #[arg(long)]
        bands: PathBuf,

        /// Energy of the isosurface
        #[arg(long)]
        level: f64,

        /// Grid points per axis (default from config)
        #[arg(long)]
        resolution: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Starting cltk v{}", crystal_lattice_toolkit::VERSION);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => {
            let lattice = read_lattice(&input)?;
            emit(&summarize(&lattice, &config)?)
        }
        Commands::Neighbors { input, cutoff } => {
            let lattice = read_lattice(&input)?;
            let pairs = lattice
                .find_neighbors(cutoff)
                .with_context(|| format!("neighbor search in {}", input.display()))?;
            info!("Found {} contacts within {}", pairs.len(), cutoff);
            emit(&NeighborReport { cutoff, pairs })
        }
        Commands::Supercell { input, dims, output } => {
            let lattice = read_lattice(&input)?;
            let supercell = lattice
                .make_supercell(dims[0], dims[1], dims[2])
                .context("building supercell")?;
            info!(
                "Supercell {}x{}x{} with {} atoms",
                dims[0],
                dims[1],
                dims[2],
                supercell.num_atoms()
            );
            match output {
                Some(path) => write_lattice(&path, &supercell),
                None => emit(&supercell),
            }
        }
        Commands::Reciprocal { input, shell } => {
            let lattice = read_lattice(&input)?;
            let reciprocal = reciprocal_of(&lattice, &config)?;
            let shell = shell.unwrap_or(config.reciprocal_shell);
            emit(&ReciprocalReport {
                basis: rows(reciprocal.basis()),
                shell,
                points: reciprocal
                    .enumerate_points(shell)
                    .iter()
                    .map(triple)
                    .collect(),
            })
        }
        Commands::BrillouinZone { input } => {
            let lattice = read_lattice(&input)?;
            let reciprocal = reciprocal_of(&lattice, &config)?;
            let zone = reciprocal
                .first_brillouin_zone()
                .context("constructing the Brillouin zone")?;
            emit(&ZoneReport {
                volume: zone.measure(),
                vertices: zone.vertices().iter().map(triple).collect(),
                faces: zone.faces().to_vec(),
            })
        }
        Commands::Symmetry { input, symprec } => {
            let lattice = read_lattice(&input)?;
            let symprec = symprec.unwrap_or(config.symprec);
            let group = SpaceGroup::new(&lattice, symprec)
                .with_context(|| format!("symmetry detection for {}", input.display()))?;
            emit(&SymmetryReport {
                number: group.number(),
                symbol: group.spacegroup_symbol().to_string(),
                symprec,
                operations: group
                    .symmetry_operations()
                    .iter()
                    .map(OperationRecord::from)
                    .collect(),
            })
        }
        Commands::Fermi {
            input,
            bands,
            level,
            resolution,
        } => {
            let lattice = read_lattice(&input)?;
            let reciprocal = reciprocal_of(&lattice, &config)?;
            let samples = read_bands(&bands)?;
            let resolution = resolution.unwrap_or(config.grid_resolution);

            let surface = FermiSurface::new(reciprocal, samples.kpoints(), samples.energies()?);
            let mesh = surface
                .mesh_isosurface(level, resolution)
                .with_context(|| format!("meshing the Fermi surface at {}", level))?;
            info!(
                "Fermi surface: {} vertices, {} faces, area {:.6}",
                mesh.num_vertices(),
                mesh.num_faces(),
                mesh.area()
            );
            emit(&FermiReport {
                level,
                resolution,
                area: mesh.area(),
                vertices: mesh.vertices.iter().map(triple).collect(),
                normals: mesh.normals.iter().map(triple).collect(),
                faces: mesh.faces.clone(),
                face_bands: mesh.face_bands.clone(),
            })
        }
    }
}

// ======================== INPUT / OUTPUT ========================

fn load_config(path: Option<&Path>) -> Result<ToolkitConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config = ToolkitConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(ToolkitConfig::default()),
    }
}

fn read_lattice(path: &Path) -> Result<Lattice> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading cell {}", path.display()))?;
    let lattice: Lattice =
        toml::from_str(&text).with_context(|| format!("parsing cell {}", path.display()))?;
    info!(
        "Loaded {} atoms from {}",
        lattice.num_atoms(),
        path.display()
    );
    Ok(lattice)
}

fn write_lattice(path: &Path, lattice: &Lattice) -> Result<()> {
    let text = toml::to_string(lattice).context("serializing cell")?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn read_bands(path: &Path) -> Result<BandSamples> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading bands {}", path.display()))?;
    let samples: BandSamples =
        toml::from_str(&text).with_context(|| format!("parsing bands {}", path.display()))?;
    info!(
        "Loaded {} k-points from {}",
        samples.kpoints.len(),
        path.display()
    );
    Ok(samples)
}

fn emit<T: Serialize>(report: &T) -> Result<()> {
    print!("{}", toml::to_string(report).context("serializing report")?);
    Ok(())
}

fn reciprocal_of(lattice: &Lattice, config: &ToolkitConfig) -> Result<ReciprocalLattice> {
    ReciprocalLattice::from_real_basis(lattice.basis(), config.basis_tolerance)
        .context("deriving the reciprocal lattice")
}

// ======================== REPORTS ========================

/// Scattered band energies as read from disk.
#[derive(Deserialize)]
struct BandSamples {
    kpoints: Vec<[f64; 3]>,
    /// One row per k-point, one column per band
    energies: Vec<Vec<f64>>,
}

impl BandSamples {
    fn kpoints(&self) -> Vec<Vector3<f64>> {
        self.kpoints.iter().map(|k| Vector3::from(*k)).collect()
    }

    fn energies(&self) -> Result<DMatrix<f64>> {
        let bands = self.energies.first().map_or(0, Vec::len);
        if let Some(row) = self.energies.iter().position(|r| r.len() != bands) {
            bail!(
                "energy row {} has {} bands, expected {}",
                row,
                self.energies[row].len(),
                bands
            );
        }
        Ok(DMatrix::from_fn(self.energies.len(), bands, |r, b| {
            self.energies[r][b]
        }))
    }
}

#[derive(Serialize)]
struct CellSummary {
    num_atoms: usize,
    volume: f64,
    lengths: [f64; 3],
    angles_deg: [f64; 3],
    basis: [[f64; 3]; 3],
    reciprocal_basis: [[f64; 3]; 3],
    reciprocal_volume: f64,
}

#[derive(Serialize)]
struct NeighborReport {
    cutoff: f64,
    pairs: Vec<NeighborPair>,
}

#[derive(Serialize)]
struct ReciprocalReport {
    basis: [[f64; 3]; 3],
    shell: usize,
    points: Vec<[f64; 3]>,
}

#[derive(Serialize)]
struct ZoneReport {
    volume: f64,
    vertices: Vec<[f64; 3]>,
    faces: Vec<Vec<usize>>,
}

#[derive(Serialize)]
struct SymmetryReport {
    number: i32,
    symbol: String,
    symprec: f64,
    operations: Vec<OperationRecord>,
}

#[derive(Serialize)]
struct FermiReport {
    level: f64,
    resolution: usize,
    area: f64,
    vertices: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
    face_bands: Vec<usize>,
}

#[derive(Serialize)]
struct OperationRecord {
    rotation: [[i32; 3]; 3],
    translation: [f64; 3],
}

impl From<&SymmetryOperation> for OperationRecord {
    fn from(op: &SymmetryOperation) -> Self {
        let r = &op.rotation;
        OperationRecord {
            rotation: [
                [r[(0, 0)], r[(0, 1)], r[(0, 2)]],
                [r[(1, 0)], r[(1, 1)], r[(1, 2)]],
                [r[(2, 0)], r[(2, 1)], r[(2, 2)]],
            ],
            translation: triple(&op.translation),
        }
    }
}

fn summarize(lattice: &Lattice, config: &ToolkitConfig) -> Result<CellSummary> {
    let reciprocal = reciprocal_of(lattice, config)?;
    let (a, b, c) = lattice.lattice_parameters();
    let (alpha, beta, gamma) = lattice.lattice_angles();
    Ok(CellSummary {
        num_atoms: lattice.num_atoms(),
        volume: lattice.volume(),
        lengths: [a, b, c],
        angles_deg: [alpha.to_degrees(), beta.to_degrees(), gamma.to_degrees()],
        basis: rows(lattice.basis()),
        reciprocal_basis: rows(reciprocal.basis()),
        reciprocal_volume: reciprocal.volume(),
    })
}

fn rows(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}

fn triple(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}
