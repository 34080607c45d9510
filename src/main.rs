fn main() -> anyhow::Result<()> {
    calendario_unamad::cli::run()
}
