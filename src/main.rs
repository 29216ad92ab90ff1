fn main() {
    paramset::cli::run();
}
