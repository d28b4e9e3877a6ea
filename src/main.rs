#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() {
    if let Err(e) = traffic_watch::run() {
        eprintln!("traffic-watch: {}", e);
        std::process::exit(1);
    }
}
