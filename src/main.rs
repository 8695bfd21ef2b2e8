use clap::Parser;
use sigsweep::cli::{Cli, run};
use tracing_subscriber::FmtSubscriber;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {e}");
    }

    run(cli)
}
