use super::ui;
use crate::core::{QuoteResolver, SymbolInfo};
use anyhow::Result;
use comfy_table::Cell;

const MAX_RESULTS: usize = 20;

fn display_as_table(matches: &[SymbolInfo]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("Name")]);
    for info in matches.iter().take(MAX_RESULTS) {
        table.add_row(vec![Cell::new(&info.symbol), Cell::new(&info.name)]);
    }

    let mut output = table.to_string();
    if matches.len() > MAX_RESULTS {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("{} more matches not shown", matches.len() - MAX_RESULTS),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

pub async fn run(resolver: &QuoteResolver, query: &str) -> Result<()> {
    let matches = resolver.search(query).await;
    if matches.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No symbols match '{}'", query.trim()),
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    println!("{}", display_as_table(&matches));
    Ok(())
}
