//! Session replay entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use std::path::PathBuf;

    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(session) = args.next() else {
        eprintln!("usage: pagesmith <session.json> [config.json]");
        return std::process::ExitCode::from(2);
    };
    let config = args.next();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match pagesmith_app::replay_file(&session, config.as_deref(), &mut out) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
