//! CLI zopt tool

extern crate die;
extern crate getopts;
extern crate zopt;

use die::{die, Die};
use std::env;
use std::path::Path;
use zopt::io::{AtomicFileSink, FileLineSource};
use zopt::Engine;

const DEFAULT_RULE_FILE: &str = "rules.opt";

/// CLI entrypoint
fn main() {
    let brief: String = format!(
        "Usage: {} <OPTIONS> [<rulefile>] <asmfile>",
        env!("CARGO_PKG_NAME")
    );

    let mut opts: getopts::Options = getopts::Options::new();
    opts.optflag("h", "help", "print usage info");
    opts.optflag("v", "version", "print version info");

    let usage: String = opts.usage(&brief);
    let arguments: Vec<String> = env::args().collect();
    let optmatches: getopts::Matches = opts.parse(&arguments[1..]).die(&usage);

    if optmatches.opt_present("h") {
        die!(0; usage);
    }

    if optmatches.opt_present("v") {
        die!(0; format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
    }

    let free = optmatches.free;

    let (rule_filename, input_filename) = match free.len() {
        1 => (DEFAULT_RULE_FILE.to_string(), free[0].clone()),
        2 => (free[0].clone(), free[1].clone()),
        _ => die!(1; usage),
    };

    let mut engine = Engine::new();

    let mut rule_source =
        FileLineSource::open(Path::new(&rule_filename)).die("unable to open rule file");
    let (rules, window_size) = match engine.load_rules(&mut rule_source) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{}: {}", rule_filename, err);
            die!(1);
        }
    };

    let input_path = Path::new(&input_filename);
    let mut source = FileLineSource::open(input_path).die("unable to open input file");
    let mut sink = AtomicFileSink::create(input_path).die("unable to open temporary output file");

    if let Err(err) = engine.optimize(&rules, window_size, &mut source, &mut sink) {
        eprintln!("{}: {}", input_filename, err);
        die!(1);
    }

    sink.commit().die("unable to replace input file");
}
