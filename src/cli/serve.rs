use crate::cli::ServeArgs;
use crate::config::Config;
use crate::server;
use anyhow::Result;

/// Handle serve command - run the HTTP server
pub fn handle(cmd: &ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = &cmd.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(public_url) = &cmd.public_url {
        config.server.public_url = public_url.clone();
    }

    server::run_server(&config)
}
