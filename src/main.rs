use chopscreen::cli::{run, Cli};
use clap::Parser;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}

// INFO by default, `RUST_LOG` overrides. Logs go to stderr so stdout stays
// clean for results.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .init()
}
