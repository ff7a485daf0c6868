use std::{error::Error, io::Write, path::PathBuf, time::Duration};

use clap::Parser;
use log::{info, LevelFilter};
use strum::IntoEnumIterator;

use optimalcube::prelude::*;

/// Optimal Rubik's Cube solver written in Rust
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Use a sequence to apply on the solved cube
	#[arg(short, long)]
	sequence: Option<String>,

	/// Set the cube from a 54 character facelet string in URFDLB order
	/// (the same format as when you output the cube via the "-c"-flag)
	#[arg(long, conflicts_with = "random")]
	state: Option<String>,

	/// Scramble the cube randomly
	#[arg(short, long, default_value_t = false)]
	random: bool,

	/// Solve the cube (the output is a sequence)
	#[arg(long, default_value_t = false)]
	solve: bool,

	/// Give up when no solution of at most this many turns exists
	#[arg(long)]
	max_depth: Option<u8>,

	/// Give up after expanding this many nodes
	#[arg(long)]
	node_limit: Option<u64>,

	/// Give up after this many seconds
	#[arg(long)]
	time_limit: Option<f64>,

	/// The pattern databases guiding the search
	#[arg(long, default_value_t = HeuristicKind::default())]
	heuristic: HeuristicKind,

	/// Print all heuristics and quit
	#[arg(long, default_value_t = false)]
	list_heuristics: bool,

	/// Directory where the pattern databases are stored between runs
	#[arg(long, default_value = "data")]
	tables: PathBuf,

	/// Only print the solution
	#[arg(short, long, default_value_t = false)]
	quiet: bool,

	/// Print the cube before and after solving
	#[arg(short, long, default_value_t = false)]
	print_state: bool,

	/// Output the cube as a string rather than colored
	#[arg(short, long, default_value_t = false)]
	char_print: bool,

	/// Output length of sequence (if --solve is used)
	#[arg(short, long, default_value_t = false)]
	length: bool,

	/// Print the output to a file rather to the stdout
	#[arg(short, long)]
	output: Option<PathBuf>,
}

impl Args {
	fn config(&self) -> Result<SolverConfig, Box<dyn Error>> {
		let mut config = SolverConfig::default();
		if let Some(depth) = self.max_depth {
			config = config.with_max_depth(depth);
		}
		if let Some(nodes) = self.node_limit {
			config = config.with_node_limit(nodes);
		}
		if let Some(secs) = self.time_limit {
			config = config.with_time_limit(Duration::try_from_secs_f64(secs)?);
		}
		Ok(config)
	}
}

fn print_cube(out: &mut dyn Write, cube: &CubieCube, char_print: bool) -> std::io::Result<()> {
	let facelets = FaceletCube::from(cube);
	if char_print {
		writeln!(out, "{}", facelets)
	} else {
		write!(out, "{}", facelets.to_ansi_string())
	}
}

/// Info by default and RUST_LOG if set, nothing at all when quiet
fn logger(quiet: bool) -> env_logger::Builder {
	let mut logger = env_logger::Builder::new();
	if quiet {
		logger.filter_level(LevelFilter::Off);
	} else {
		logger.filter_level(LevelFilter::Info).parse_env("RUST_LOG");
	}
	logger
}

fn main() -> Result<(), Box<dyn Error>> {
	let args = Args::parse();

	logger(args.quiet).init();

	// Whether to redirect it to the stdout or a file
	let mut out: Box<dyn Write> = match &args.output {
		Some(path) => Box::new(std::fs::File::create(path)?),
		None => Box::new(std::io::stdout()),
	};

	// List the heuristics and exit
	if args.list_heuristics {
		for kind in HeuristicKind::iter() {
			writeln!(out, "{}", kind)?;
		}
		return Ok(());
	}

	let mut cube = CubieCube::new();

	// Generate a random input cube
	if args.random {
		cube = CubieCube::random();
	}

	// Parses a cube out of the facelet string
	if let Some(state) = &args.state {
		cube = CubieCube::from_facelets(state.trim()).map_err(optimalcube::Error::from)?;
	}

	if let Some(sequence) = &args.sequence {
		let turns = parse_turns(sequence).map_err(optimalcube::Error::from)?;
		cube.apply_turns(turns);
	}

	if !args.solve {
		// Print the resulting cube (either as a string or with colors)
		return Ok(print_cube(out.as_mut(), &cube, args.char_print)?);
	}

	// Reject bad input before spending time on the tables
	cube.check_solvability().map_err(optimalcube::Error::from)?;

	if args.print_state && !args.quiet {
		print_cube(out.as_mut(), &cube, args.char_print)?;
	}

	let solver = Solver::from_kind(args.heuristic, Some(args.tables.as_path()))?.with_config(args.config()?);
	let solution = solver.solve(&cube)?;
	info!(
		"Searched {} nodes in {} iterations",
		solution.stats.nodes, solution.stats.iterations
	);

	if args.length {
		writeln!(out, "{} (len={})", solution, solution.len())?;
	} else {
		writeln!(out, "{}", solution)?;
	}

	if args.print_state && !args.quiet {
		cube.apply_turns(solution.turns.iter().copied());
		print_cube(out.as_mut(), &cube, args.char_print)?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn state_and_random_conflict() {
		let solved = FaceletCube::new().to_string();
		assert!(Args::try_parse_from(["optimal-solver", "--state", &solved]).is_ok());
		assert!(Args::try_parse_from(["optimal-solver", "-r"]).is_ok());

		let err = Args::try_parse_from(["optimal-solver", "-r", "--state", &solved]).unwrap_err();
		assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
	}

	#[test]
	/// RUST_LOG is ignored when quiet
	fn quiet_silences_logging() {
		std::env::set_var("RUST_LOG", "debug");
		assert_eq!(logger(true).build().filter(), LevelFilter::Off);
		assert_eq!(logger(false).build().filter(), LevelFilter::Debug);
		std::env::remove_var("RUST_LOG");
		assert_eq!(logger(false).build().filter(), LevelFilter::Info);
	}

	#[test]
	fn limits_become_config() {
		let args = Args::try_parse_from(["optimal-solver", "--solve", "--max-depth", "9", "--time-limit", "1.5"]).unwrap();
		let config = args.config().unwrap();
		assert_eq!(config.max_depth, Some(9));
		assert_eq!(config.time_limit, Some(Duration::from_millis(1500)));
		assert_eq!(config.node_limit, None);
	}
}
