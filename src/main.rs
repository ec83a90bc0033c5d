//! buildenv - builds the containerized build environment and runs the pipeline in it.
//!
//! Every relayed record is printed as one bare line on stdout; set `RUST_LOG`
//! to change verbosity (default `info`).

use std::io::Write;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    // Run CLI and get exit code
    let exit_code = match buildenv::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
