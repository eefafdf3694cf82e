//! Moose Compiler CLI

mod commands;

use commands::{check_file, lex_file, parse_file, run_file};

fn main() {
    moosec::tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: moosec run <file.moose>");
                std::process::exit(1);
            }
            run_file(&args[2]);
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: moosec check <file.moose>");
                std::process::exit(1);
            }
            check_file(&args[2]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: moosec parse <file.moose>");
                std::process::exit(1);
            }
            parse_file(&args[2]);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: moosec lex <file.moose>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "version" | "--version" | "-v" => {
            println!("Moose Compiler 0.1.0-alpha.1");
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Moose Compiler");
    println!();
    println!("Usage: moosec <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  run <file.moose>      Type-check and evaluate a program");
    println!("  check <file.moose>    Type-check without evaluating");
    println!("  parse <file.moose>    Dump the parsed AST");
    println!("  lex <file.moose>      Dump the token stream");
    println!("  version               Print the version");
    println!("  help                  Print this message");
    println!();
    println!("Environment:");
    println!("  MOOSE_LOG             Log filter (RUST_LOG syntax)");
    println!("  MOOSE_LOG_TREE        Hierarchical log output");
}
