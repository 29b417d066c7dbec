//! `--diagnose`: a doctor-style self-check that validates the environment
//! (glob syntax, parser availability, repository reachability) without
//! diffing anything, so CI and new contributors get one command to answer
//! "is this machine set up right" instead of decoding a mid-run failure.

use semdiff::filter::FilterEngine;
use semdiff::{Parser, SemdiffConfig};

use semdiff_parse::SemdiffParser;
use semdiff_vcs::GixRefResolver;

use crate::cli::Args;

/// Run every self-check, printing a line per check. Returns `true` if all
/// checks passed.
pub fn run(args: &Args, config: &SemdiffConfig) -> bool {
    println!("semdiff diagnose");
    let mut ok = true;

    match FilterEngine::compile(&config.driver.include_globs, &config.driver.exclude_globs) {
        Ok(_) => println!("  [ok]   include/exclude globs compile"),
        Err(err) => {
            println!("  [fail] include/exclude globs: {err}");
            ok = false;
        }
    }

    let parser = SemdiffParser::new();
    match parser.parse("class Probe {}\n", "cs") {
        Ok(_) => println!("  [ok]   C# parser responds"),
        Err(err) => {
            println!("  [fail] C# parser: {err}");
            ok = false;
        }
    }

    if let Some(repo) = &args.repo {
        let resolver = GixRefResolver::new();
        match semdiff::RefResolver::resolve(&resolver, repo, "HEAD..HEAD") {
            Ok(_) => println!("  [ok]   repository at {} is reachable", repo.display()),
            Err(err) => {
                println!("  [fail] repository at {}: {err}", repo.display());
                ok = false;
            }
        }
    }

    ok
}
