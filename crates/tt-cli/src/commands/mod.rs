pub mod classify;
pub mod roll;
pub mod serve;

use colored::{ColoredString, Colorize};
use tt_dice::SuccessType;

/// Build a runtime for commands that drive async code.
fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))
}

/// Color a success level for the terminal.
fn colorize(success: SuccessType) -> ColoredString {
    let label = success.to_string();
    let label = label.as_str();
    match success {
        SuccessType::Extreme => label.green().bold(),
        SuccessType::Good => label.green(),
        SuccessType::Success => label.cyan(),
        SuccessType::Failure => label.red(),
        SuccessType::Unknown => label.dimmed(),
    }
}
