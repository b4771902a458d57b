use clap::{Parser, Subcommand};

/// hostrelay — host-rewriting reverse proxy for static-site origins
#[derive(Parser)]
#[command(name = "hostrelay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Serve {
        /// Port to bind (overrides HOSTRELAY_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
