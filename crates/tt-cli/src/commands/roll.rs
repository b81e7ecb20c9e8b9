use std::sync::Arc;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tt_dice::{Classifier, DiceEngine, DiceRequest, DiceResolverKey, DiceSpec, NoDelay};

pub fn run(
    num: i64,
    size: i64,
    reference: Option<i64>,
    key: Option<&str>,
    seed: Option<u64>,
) -> Result<(), String> {
    let key = key
        .map(str::parse::<DiceResolverKey>)
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut spec = DiceSpec::new(num, size);
    if let Some(reference) = reference {
        spec = spec.with_reference(reference);
    }
    let request = DiceRequest::from(spec);
    request
        .validate(tt_server::dice::DEFAULT_MAX_DICE)
        .map_err(|e| e.to_string())?;

    let engine = match seed {
        Some(seed) => DiceEngine::seeded(seed, Arc::new(NoDelay)),
        None => DiceEngine::new(Arc::new(NoDelay)),
    };
    let classifier = key.map(|k| Classifier::new(Some(k)));

    let results = super::runtime()?
        .block_on(engine.resolve(&request, classifier))
        .map_err(|e| e.to_string())?;

    println!(
        "  {} {}",
        "Roll".bold(),
        format!("({spec}, {} results)", results.len()).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Roll", "Result"]);
    for (i, result) in results.iter().enumerate() {
        let outcome = result
            .result_type
            .map(|s| super::colorize(s).to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![(i + 1).to_string(), result.roll.to_string(), outcome]);
    }
    println!("{table}");
    println!();

    let total: i64 = results.iter().map(|r| r.roll).sum();
    println!("  total {total}");

    Ok(())
}
