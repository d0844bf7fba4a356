//! Structurizr DSL Language Server.
//!
//! Usage:
//!   rustruct-lsp             # Start LSP server (stdio)
//!   rustruct-lsp version     # Print version
//!   rustruct-lsp --help      # Print help

use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args
        .iter()
        .any(|a| a == "version" || a == "--version" || a == "-V")
    {
        println!("rustruct-lsp {}", rustruct_lsp::VERSION);
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Structurizr DSL Language Server");
        println!();
        println!("Usage: rustruct-lsp [version]");
        println!();
        println!("The server communicates via stdio using the Language Server Protocol.");
        println!();
        println!("Environment variables:");
        println!("  RUST_LOG       Set log level (e.g., RUST_LOG=rustruct_lsp=debug)");
        return ExitCode::SUCCESS;
    }

    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rustruct_lsp=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    match rustruct_lsp::start_stdio() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
