pub fn run() -> anyhow::Result<()> {
    println!("waypost {}", env!("CARGO_PKG_VERSION"));
    println!("Background location tracking coordinator");
    Ok(())
}
