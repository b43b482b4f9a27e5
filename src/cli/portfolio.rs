use super::ui;
use crate::core::portfolio::{AddOutcome, Portfolio, PortfolioTracker, RefreshReport};
use anyhow::Result;
use comfy_table::Cell;

impl Portfolio {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Company"),
            ui::header_cell("Price"),
            ui::header_cell("EPS"),
            ui::header_cell("P/E"),
            ui::header_cell("Market Cap"),
            ui::header_cell("52W Low"),
            ui::header_cell("52W High"),
            ui::header_cell("Source"),
        ]);

        for stock in &self.stocks {
            let mut source = stock.source.to_string();
            if stock.corrected {
                source.push('*');
            }
            table.add_row(vec![
                Cell::new(&stock.symbol),
                Cell::new(&stock.company_name),
                ui::number_cell(ui::format_currency(stock.current_price)),
                ui::number_cell(ui::format_currency(stock.eps)),
                ui::pe_cell(stock.pe_ratio),
                ui::number_cell(ui::format_large_number(stock.market_cap)),
                ui::number_cell(ui::format_currency(stock.low_52_week)),
                ui::number_cell(ui::format_currency(stock.high_52_week)),
                Cell::new(source),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Portfolio", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let stats = self.stats();
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Stocks:", ui::StyleType::TotalLabel),
            stats.total_stocks
        ));
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("Average P/E:", ui::StyleType::TotalLabel),
            ui::style_pe(stats.average_pe)
        ));
        if let Some(highest) = &stats.highest_pe {
            output.push_str(&format!(
                "\n{} {} ({})",
                ui::style_text("Highest P/E:", ui::StyleType::TotalLabel),
                highest.symbol,
                ui::style_pe(highest.value)
            ));
        }
        if let Some(lowest) = &stats.lowest_pe {
            output.push_str(&format!(
                "\n{} {} ({})",
                ui::style_text("Lowest P/E:", ui::StyleType::TotalLabel),
                lowest.symbol,
                ui::style_pe(lowest.value)
            ));
        }
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("P/E bands:", ui::StyleType::TotalLabel),
            self.pe_distribution()
        ));

        let synthesized = self.stocks.iter().filter(|s| s.is_synthesized()).count();
        if synthesized > 0 {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    &format!("{synthesized} offline estimate(s), providers were unavailable"),
                    ui::StyleType::Warning
                )
            ));
        }
        if self.stocks.iter().any(|s| s.corrected) {
            output.push_str(&format!(
                "\n{}",
                ui::style_text("* manual corrections applied", ui::StyleType::Subtle)
            ));
        }

        output
    }

    /// Share of stocks per P/E band, e.g. `low 50.00%, medium 25.00%, high 25.00%`.
    fn pe_distribution(&self) -> String {
        let total = self.stocks.len();
        if total == 0 {
            return "n/a".to_string();
        }
        [ui::PeClass::Low, ui::PeClass::Medium, ui::PeClass::High]
            .iter()
            .map(|class| {
                let count = self
                    .stocks
                    .iter()
                    .filter(|s| ui::classify_pe(s.pe_ratio) == *class)
                    .count();
                format!(
                    "{} {}",
                    class.label(),
                    ui::format_percentage(count as f64 * 100.0 / total as f64)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl RefreshReport {
    pub fn display(&self) -> String {
        let mut output = format!(
            "Refreshed {} stock(s)",
            self.refreshed.len() + self.synthesized.len()
        );
        if !self.synthesized.is_empty() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Offline estimates for: {}", self.synthesized.join(", ")),
                    ui::StyleType::Warning
                )
            ));
        }
        for (symbol, error) in &self.failed {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Kept previous quote for {symbol}: {error}"),
                    ui::StyleType::Error
                )
            ));
        }
        output
    }
}

async fn refresh_with_progress(tracker: &mut PortfolioTracker) -> Result<RefreshReport> {
    let pb = ui::new_progress_bar(tracker.portfolio().stocks.len() as u64, true);
    pb.set_message("Refreshing quotes...");
    let report = tracker.refresh(&|| pb.inc(1)).await;
    pb.finish_and_clear();
    report
}

pub async fn add(tracker: &mut PortfolioTracker, symbol: &str) -> Result<()> {
    match tracker.add(symbol).await? {
        AddOutcome::Added(quote) => {
            println!(
                "Added {} ({})",
                ui::style_text(&quote.symbol, ui::StyleType::TotalLabel),
                quote.company_name
            );
            if let Some(notice) = quote.notice() {
                println!("{notice}");
            }
        }
        AddOutcome::AlreadyTracked(symbol) => {
            println!(
                "{}",
                ui::style_text(
                    &format!("{symbol} is already in the portfolio"),
                    ui::StyleType::Subtle
                )
            );
        }
    }
    Ok(())
}

pub async fn remove(tracker: &mut PortfolioTracker, symbol: &str) -> Result<()> {
    if tracker.remove(symbol).await? {
        println!("Removed {}", symbol.trim().to_uppercase());
    } else {
        println!(
            "{}",
            ui::style_text(
                &format!("{} is not in the portfolio", symbol.trim().to_uppercase()),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

/// Shows the portfolio, refreshing it first when any quote is stale.
pub async fn list(tracker: &mut PortfolioTracker) -> Result<()> {
    if tracker.portfolio().stocks.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "Portfolio is empty. Add a stock with `valtrack add <SYMBOL>`.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    if tracker.is_stale() {
        let report = refresh_with_progress(tracker).await?;
        if !report.failed.is_empty() {
            println!("{}", report.display());
        }
    }

    println!("{}", tracker.portfolio().display_as_table());
    Ok(())
}

pub async fn refresh(tracker: &mut PortfolioTracker) -> Result<()> {
    let report = refresh_with_progress(tracker).await?;
    println!("{}", report.display());
    Ok(())
}
