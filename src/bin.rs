use clap::Parser;
use crossword_csp::backtracking_search::{FillFailure, FillOptions};
use crossword_csp::logging::init_logger;
use crossword_csp::puzzle::{render_grid, Puzzle};
use crossword_csp::solver::find_fill;
use crossword_csp::vocabulary::Vocabulary;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::time::Duration;

/// crossword_csp: Fill a crossword structure with words using constraint propagation and search
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, as ASCII with # representing blocks and _ or . representing
    /// empty squares
    structure: String,

    /// Path to a word list file, with one word per line. Words are lowercased, so the filled grid
    /// is printed in lowercase
    words: String,

    /// Also write the filled grid to this file (as text, in the same format that's printed)
    #[arg(long)]
    output: Option<String>,

    /// Give up after this many seconds [default: none]
    #[arg(long)]
    timeout: Option<f64>,

    /// Propagate each choice with arc consistency during the search
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Log fill progress and statistics
    #[arg(long)]
    debug: bool,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    init_logger(args.debug);

    let timeout = match args.timeout {
        Some(seconds) => Some(
            Duration::try_from_secs_f64(seconds)
                .map_err(|_| Error(format!("Invalid timeout '{seconds}'")))?,
        ),
        None => None,
    };

    let template = fs::read_to_string(&args.structure)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure)))?;

    let puzzle = Puzzle::from_template_string(&template).map_err(|e| Error(e.to_string()))?;
    let vocabulary = Vocabulary::from_file(&args.words).map_err(|e| Error(e.to_string()))?;

    let result = match find_fill(
        &puzzle,
        &vocabulary,
        &FillOptions {
            timeout,
            abort: None,
            maintain_arc_consistency: args.maintain_arc_consistency,
        },
    ) {
        Ok(result) => result,
        Err(FillFailure::HardFailure) => {
            println!("{}", FillFailure::HardFailure);
            return Ok(());
        }
        Err(failure) => return Err(Error(failure.to_string())),
    };

    let rendered = render_grid(&puzzle, &vocabulary, &result.assignment);
    println!("{rendered}");

    if let Some(output_path) = &args.output {
        fs::write(output_path, rendered + "\n")
            .map_err(|_| Error(format!("Couldn't write file '{output_path}'")))?;
    }

    Ok(())
}
