fn main() {
    if let Err(err) = match_stats::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
