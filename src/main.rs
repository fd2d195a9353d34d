use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use maqamat::error::EntityKind;
use maqamat::lattice::note_name::standardize;
use maqamat::lattice::Lattice;
use maqamat::route::{DEFAULT_ROUTE_LIMIT, MAX_HOPS};
use maqamat::transpose::DEFAULT_TOLERANCE_CENTS;
use maqamat::{
    analyze_modulations, build_lattice_for, classify_family, find_routes, jins_transpositions, maqam_transpositions,
    Catalogue, CoreError, Endpoint, MaqamTransposition, MatchOptions, RouteRequest, SearchStrategy,
};
use serde::Serialize;

fn parse_strategy(s: &str) -> Result<SearchStrategy, String> {
    match s {
        "greedy" => Ok(SearchStrategy::Greedy),
        "backtracking" => Ok(SearchStrategy::Backtracking),
        other => Err(format!("unknown strategy '{}' (expected greedy or backtracking)", other)),
    }
}

fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    match s.split_once('@') {
        Some((maqam, tonic)) if !maqam.is_empty() && !tonic.is_empty() => Ok(Endpoint::new(maqam, Some(tonic))),
        Some(_) => Err(format!("expected MAQAM or MAQAM@TONIC, got '{}'", s)),
        None => Ok(Endpoint::new(s, None)),
    }
}

/// Arabic maqam lattices, transpositions, modulations and modulation routes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Tuning system selection shared by every subcommand
#[derive(clap::Args, Debug)]
struct Tuning {
    /// Path to the JSON catalogue
    catalogue: PathBuf,

    /// Tuning system id
    tuning_system: String,

    /// Starting note of the note-name assignment
    starting_note: String,

    /// Cents tolerance for non-ratio lattices
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_CENTS)]
    tolerance: f64,

    /// Transposition search: greedy or backtracking
    #[arg(long, default_value = "greedy", value_parser = parse_strategy)]
    strategy: SearchStrategy,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the pitch lattice as a table
    Lattice {
        #[command(flatten)]
        tuning: Tuning,
    },
    /// List the transpositions of a jins or maqam
    Transpositions {
        #[command(flatten)]
        tuning: Tuning,

        /// Jins id or name
        #[arg(long, conflicts_with = "maqam", required_unless_present = "maqam")]
        jins: Option<String>,

        /// Maqam id or name
        #[arg(long)]
        maqam: Option<String>,
    },
    /// List the modulations from a maqam
    Modulations {
        #[command(flatten)]
        tuning: Tuning,

        /// Maqam id or name, optionally MAQAM@TONIC
        #[arg(value_parser = parse_endpoint)]
        maqam: Endpoint,
    },
    /// Classify the family of a maqam
    Family {
        #[command(flatten)]
        tuning: Tuning,

        /// Maqam id or name, optionally MAQAM@TONIC
        #[arg(value_parser = parse_endpoint)]
        maqam: Endpoint,
    },
    /// Find modulation routes between two maqamat
    Routes {
        #[command(flatten)]
        tuning: Tuning,

        /// Source maqam, optionally MAQAM@TONIC
        #[arg(value_parser = parse_endpoint)]
        source: Endpoint,

        /// Target maqam, optionally MAQAM@TONIC
        #[arg(value_parser = parse_endpoint)]
        target: Endpoint,

        /// Maqam to pass through (repeatable, in order)
        #[arg(long = "via", value_parser = parse_endpoint)]
        waypoints: Vec<Endpoint>,

        /// Maximum number of outbound hops
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=MAX_HOPS as i64))]
        max_hops: u8,

        /// Also find the way back to the source
        #[arg(long)]
        return_to_start: bool,

        /// Maximum number of journeys
        #[arg(long, default_value_t = DEFAULT_ROUTE_LIMIT)]
        limit: usize,
    },
}

struct Session {
    catalogue: Catalogue,
    lattice: Lattice,
    options: MatchOptions,
}

impl Session {
    fn open(tuning: &Tuning) -> Result<Self> {
        let catalogue = Catalogue::from_json_file(&tuning.catalogue)?;
        let options = MatchOptions::new(tuning.tolerance, tuning.strategy)?;
        let system = catalogue
            .tuning_system(&tuning.tuning_system)
            .ok_or_else(|| anyhow!("Tuning system '{}' not found", tuning.tuning_system))?;
        if system.note_names_for(&tuning.starting_note).is_none() {
            return Err(anyhow!(
                "Starting note '{}' is not documented for tuning system '{}' (try one of: {})",
                tuning.starting_note,
                system.id,
                system.starting_notes().collect::<Vec<_>>().join(", ")
            ));
        }
        let lattice = build_lattice_for(system, &tuning.starting_note);
        if lattice.is_empty() {
            return Err(anyhow!("Pitch values of '{}' are in an unsupported format", system.id));
        }
        Ok(Self {
            catalogue,
            lattice,
            options,
        })
    }

    fn maqam(&self, endpoint: &Endpoint) -> Result<MaqamTransposition> {
        let template = self
            .catalogue
            .maqam(&endpoint.maqam)
            .ok_or_else(|| CoreError::NotFound {
                kind: EntityKind::Template,
                id: endpoint.maqam.clone(),
            })?;
        let transpositions = maqam_transpositions(&self.lattice, template, &self.catalogue.ajnas, &self.options);
        let found = match &endpoint.tonic {
            Some(tonic) => {
                let wanted = standardize(tonic);
                transpositions
                    .into_iter()
                    .find(|t| standardize(t.tonic()) == wanted)
            }
            None => transpositions.into_iter().next(),
        };
        found.ok_or_else(|| {
            anyhow!(
                "Maqam '{}' has no transposition{} in this tuning system",
                endpoint.maqam,
                endpoint.tonic.as_deref().map(|t| format!(" on '{}'", t)).unwrap_or_default()
            )
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Error serializing output")?);
    Ok(())
}

fn print_lattice(lattice: &Lattice) {
    println!(
        "{:>4} {:>3}  {:<24} {:>12} {:>10} {:>10} {:>8}  {:<6} {:>8}",
        "#", "oct", "note", "value", "cents", "freq", "midi", "ref", "dev"
    );
    for (i, p) in lattice.points().iter().enumerate() {
        println!(
            "{:>4} {:>3}  {:<24} {:>12} {:>10.3} {:>10.3} {:>8.3}  {:<6} {:>+8.3}",
            i,
            p.octave,
            p.note_name,
            p.original_value.to_string(),
            p.cents,
            p.frequency,
            p.midi_note,
            p.reference_note.to_string(),
            p.cents_deviation
        );
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Lattice { tuning } => {
            let session = Session::open(&tuning)?;
            print_lattice(&session.lattice);
        }
        Commands::Transpositions { tuning, jins, maqam } => {
            let session = Session::open(&tuning)?;
            if let Some(id) = jins {
                let template = session
                    .catalogue
                    .jins(&id)
                    .ok_or_else(|| anyhow!("Jins '{}' not found", id))?;
                print_json(&jins_transpositions(&session.lattice, template, &session.options))?;
            } else if let Some(id) = maqam {
                let template = session
                    .catalogue
                    .maqam(&id)
                    .ok_or_else(|| anyhow!("Maqam '{}' not found", id))?;
                print_json(&maqam_transpositions(
                    &session.lattice,
                    template,
                    &session.catalogue.ajnas,
                    &session.options,
                ))?;
            }
        }
        Commands::Modulations { tuning, maqam } => {
            let session = Session::open(&tuning)?;
            let source = session.maqam(&maqam)?;
            let set = analyze_modulations(&source, &session.catalogue, &session.lattice, &session.options);
            print_json(&set)?;
        }
        Commands::Family { tuning, maqam } => {
            let session = Session::open(&tuning)?;
            print_json(&classify_family(&session.maqam(&maqam)?))?;
        }
        Commands::Routes {
            tuning,
            source,
            target,
            waypoints,
            max_hops,
            return_to_start,
            limit,
        } => {
            let catalogue = Catalogue::from_json_file(&tuning.catalogue)?;
            let mut request = RouteRequest::new(
                tuning.tuning_system,
                tuning.starting_note,
                source,
                target,
                max_hops as usize,
            );
            request.waypoints = waypoints;
            request.return_to_start = return_to_start;
            request.limit = limit;
            request.tolerance_cents = tuning.tolerance;
            request.strategy = tuning.strategy;

            let outcome = find_routes(&catalogue, &request)?;
            print_json(&outcome)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
