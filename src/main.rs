fn main() {
    if let Err(err) = transit_linemap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
