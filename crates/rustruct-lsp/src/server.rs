//! Stdio transport setup.

use anyhow::Result;
use lsp_server::Connection;

use crate::main_loop::run_main_loop;

/// Run the server over stdin/stdout until the client disconnects.
///
/// The connection spawns reader and writer threads around the
/// length-prefixed JSON-RPC framing; everything else happens on the main
/// loop's thread.
pub fn start_stdio() -> Result<()> {
    tracing::info!("Starting Structurizr DSL language server v{}", crate::VERSION);

    let (connection, io_threads) = Connection::stdio();
    run_main_loop(connection.receiver, connection.sender);
    io_threads.join()?;

    tracing::info!("Server stopped");
    Ok(())
}
