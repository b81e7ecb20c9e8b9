use tt_dice::{DiceResolverKey, classify};

pub fn run(key: &str, reference: i64, value: i64) -> Result<(), String> {
    let key: DiceResolverKey = key.parse::<DiceResolverKey>().map_err(|e| e.to_string())?;
    let success = classify(Some(key), reference, value);

    println!(
        "  d{key} vs {reference}: rolled {value} => {}",
        super::colorize(success)
    );

    Ok(())
}
