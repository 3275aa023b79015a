fn main() -> anyhow::Result<()> {
    treebench::run()
}
