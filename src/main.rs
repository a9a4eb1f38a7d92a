fn main() {
    if let Err(err) = substation_recon::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
