fn main() {
    if let Err(err) = papercheck_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
