use clap::{Parser, Subcommand};
use fire_projection::api::{ProjectArgs, run_http_server, run_project_command};
use fire_projection::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "fire-projection",
    about = "FIRE projection engine (deterministic trajectory, scenarios, Monte Carlo bands)"
)]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the projection report for one profile as JSON
    Project(ProjectArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => match run_project_command(&args) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
