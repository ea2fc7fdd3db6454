fn main() {
    if let Err(err) = tablediff_view::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
