// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::error::Error;
use std::fs;

use clap::{arg, Arg, ArgMatches, Command};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
//
use lllc::util::ToHexString;
use lllc::{sexpr, Compiler};

fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments
    let matches = Command::new("lllc")
        .about("LLL Compiler")
        .version("0.1.0")
        .subcommand_required(true)
        .arg(arg!(--verbose "Show verbose output"))
        .subcommand(
            Command::new("compile")
                .about("Compile an LLL program to EVM bytecode")
                .arg(Arg::new("file").required(true))
                .visible_alias("c"),
        )
        .subcommand(
            Command::new("gas")
                .about("Print the static gas estimate for an LLL program")
                .arg(Arg::new("file").required(true))
                .visible_alias("g"),
        )
        .subcommand(
            Command::new("asm")
                .about("Print the flattened assembly listing for an LLL program")
                .arg(Arg::new("file").required(true))
                .visible_alias("a"),
        )
        .get_matches();
    // Extract top-level flags
    let verbose = matches.is_present("verbose");
    // Initialise logging
    if verbose {
        init_logging(LevelFilter::Info);
    }
    // Dispatch on outcome
    let ok = match matches.subcommand() {
        Some(("compile", args)) => compile(args),
        Some(("gas", args)) => gas(args),
        Some(("asm", args)) => asm(args),
        _ => unreachable!(),
    }?;
    // Determine appropriate exit code
    let exitcode = if ok { 0 } else { 1 };
    // Done
    std::process::exit(exitcode);
}

/// Read and parse an LLL program from `file`.
fn read_node(args: &ArgMatches) -> Result<lllc::Node, Box<dyn Error>> {
    let filename = args.get_one::<String>("file").unwrap();
    let input = fs::read_to_string(filename)?;
    let node = sexpr::parse(&input)?;
    Ok(node)
}

/// Compile a given file to bytecode.
fn compile(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let node = read_node(args)?;
    let compiler = Compiler::new();
    let bytes = compiler.compile(&node)?;
    println!("{}", bytes.to_hex_string());
    Ok(true)
}

/// Print the static gas estimate for a given file.
fn gas(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let node = read_node(args)?;
    let compiler = Compiler::new();
    let estimate = compiler.estimate_gas(&node)?;
    println!("{estimate}");
    Ok(true)
}

/// Print the flattened assembly listing for a given file.
fn asm(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let node = read_node(args)?;
    let compiler = Compiler::new();
    let items = compiler.to_assembly(&node)?;
    for item in &items {
        println!("{item:?}");
    }
    Ok(true)
}

/// Initialise logging using a suitable pattern.
pub fn init_logging(level: LevelFilter) {
    let encoder = PatternEncoder::new("[{l}] {m}{n}");
    //
    let stdout = ConsoleAppender::builder().encoder(Box::new(encoder)).build();
    //
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .unwrap();
    //
    let _handle = log4rs::init_config(config).unwrap();
}
