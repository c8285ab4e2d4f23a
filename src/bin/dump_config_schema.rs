use anyhow::Result;

fn main() -> Result<()> {
    let schema = overscribe::Config::schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
