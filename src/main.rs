fn main() {
    if let Err(err) = chatkeep::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
