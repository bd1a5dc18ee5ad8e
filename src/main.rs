#![warn(clippy::all)]

fn main() {
    if let Err(err) = tanaw::run() {
        log::error!("tanaw failed to start: {}", err);
        std::process::exit(1);
    }
}
