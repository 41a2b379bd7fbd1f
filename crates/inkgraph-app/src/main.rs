//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting InkGraph");

    let result = inkgraph_app::Args::parse(std::env::args().skip(1))
        .and_then(|args| pollster::block_on(inkgraph_app::run(args)));
    if let Err(err) = result {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
