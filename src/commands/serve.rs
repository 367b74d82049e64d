use colored::Colorize;

use lpcheck::analyze::StatusPolicy;
use lpcheck::config::Config;
use lpcheck::error::Result;
use lpcheck::server::{self, ServerState};

/// Run the JSON API until interrupted
pub fn cmd_serve(addr: Option<String>, any_status: bool) -> Result<()> {
    let config = Config::load()?;
    let addr = addr.unwrap_or(config.server.addr);
    let policy = if any_status {
        StatusPolicy::ScoreAnyway
    } else {
        StatusPolicy::Reject
    };

    println!(
        "{} http://{} (policy {})",
        "Serving lpcheck API on".cyan().bold(),
        addr,
        config.scoring.version
    );
    println!("  GET  /api/analyze?url=...");
    println!("  POST /api/analyze {{\"url\": \"...\"}}");
    println!("  GET  /api/ping");
    println!("  GET  /api/weights");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::serve(
        &addr,
        ServerState {
            scoring: config.scoring,
            policy,
        },
    ))
}
