fn main() {
    fstparse::cli::run();
}
