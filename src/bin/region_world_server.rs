//! HTTP server answering `GET /?w=&h=&r=&s=` with a generated PNG world.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "region_world_server")]
#[command(about = "Serve generated region worlds as PNG images over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = region_world::server::serve(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
