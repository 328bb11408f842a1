fn main() {
    if let Err(err) = tree_visualizer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
