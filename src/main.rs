use std::env;
use std::io::{self, BufRead};
use std::process;

use anyhow::{bail, Context, Result};
use log::debug;

use chainre::{Regex, RegexBuilder};

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    pattern: String,
    case_insensitive: bool,
    dot_all: bool,
    multi_line: bool,
    whole_line: bool,
    unix_lines: bool,
    canon_eq: bool,
}

impl Options {
    fn build(&self) -> Result<Regex> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(self.case_insensitive)
            .dot_all(self.dot_all)
            .multi_line(self.multi_line)
            .unix_lines(self.unix_lines)
            .canon_eq(self.canon_eq)
            .build()
            .with_context(|| format!("invalid pattern {:?}", self.pattern))
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut opts = Options::default();
    let mut pattern = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-E" => pattern = Some(args.next().context("-E requires a pattern")?),
            "-i" => opts.case_insensitive = true,
            "-s" => opts.dot_all = true,
            "-m" => opts.multi_line = true,
            "-x" => opts.whole_line = true,
            "--unix-lines" => opts.unix_lines = true,
            "--canon-eq" => opts.canon_eq = true,
            other => bail!("unexpected argument {:?}", other),
        }
    }
    opts.pattern = pattern.context("expected first argument to be '-E <pattern>'")?;
    Ok(opts)
}

// Prints the lines that match and reports whether any did.
fn run(opts: &Options) -> Result<bool> {
    let re = opts.build()?;
    debug!("searching with {:?} ({} nodes)", re.as_str(), re.program().len());
    let stdin = io::stdin();
    let mut any = false;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        let found = if opts.whole_line {
            re.matches(&line)?
        } else {
            re.is_match(&line)?
        };
        if found {
            println!("{}", line);
            any = true;
        }
    }
    Ok(any)
}

// Usage: echo <input_text> | your_program.sh -E <pattern> [-i] [-s] [-m] [-x]
fn main() {
    env_logger::init();

    let result = parse_args(env::args().skip(1)).and_then(|opts| run(&opts));
    match result {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(2)
        }
    }
}
