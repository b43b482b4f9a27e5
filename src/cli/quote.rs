use super::ui;
use crate::core::{Quote, QuoteResolver};
use anyhow::Result;
use comfy_table::Cell;

impl Quote {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

        table.add_row(vec![
            Cell::new("Price"),
            ui::number_cell(ui::format_currency(self.current_price)),
        ]);
        table.add_row(vec![
            Cell::new("EPS"),
            ui::number_cell(ui::format_currency(self.eps)),
        ]);
        table.add_row(vec![Cell::new("P/E"), ui::pe_cell(self.pe_ratio)]);
        table.add_row(vec![
            Cell::new("Market Cap"),
            ui::number_cell(ui::format_large_number(self.market_cap)),
        ]);
        table.add_row(vec![
            Cell::new("52W Range"),
            ui::number_cell(format!(
                "{} - {}",
                ui::format_currency(self.low_52_week),
                ui::format_currency(self.high_52_week)
            )),
        ]);

        let mut output = format!(
            "{} ({})\n\n",
            ui::style_text(&self.company_name, ui::StyleType::Title),
            self.symbol
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Source: {}, updated {}",
                    self.source,
                    self.last_updated.format("%Y-%m-%d %H:%M UTC")
                ),
                ui::StyleType::Subtle
            )
        ));
        if let Some(notice) = self.notice() {
            output.push_str(&format!("\n{notice}"));
        }
        output
    }

    /// Visible warning for offline or corrected data, if any.
    pub fn notice(&self) -> Option<String> {
        let text = match (self.is_synthesized(), self.corrected) {
            (true, true) => "Offline estimate, providers unavailable. Manual corrections applied.",
            (true, false) => "Offline estimate, providers unavailable.",
            (false, true) => "Manual corrections applied to provider data.",
            (false, false) => return None,
        };
        Some(ui::style_text(text, ui::StyleType::Warning))
    }
}

pub async fn run(resolver: &QuoteResolver, symbol: &str) -> Result<()> {
    let quote = resolver.resolve(symbol).await?;
    println!("{}", quote.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QuoteSource;
    use chrono::Utc;

    fn quote(source: QuoteSource, corrected: bool) -> Quote {
        Quote {
            symbol: "HDFCBANK".to_string(),
            company_name: "HDFC Bank Ltd.".to_string(),
            current_price: 1650.0,
            eps: 84.62,
            pe_ratio: 19.5,
            high_52_week: 1800.0,
            low_52_week: 1400.0,
            market_cap: 1.25e13,
            last_updated: Utc::now(),
            source,
            corrected,
        }
    }

    #[test]
    fn test_display_as_table() {
        let output = quote(QuoteSource::Provider("NSETOOLS".to_string()), true).display_as_table();
        assert!(output.contains("HDFC Bank Ltd."));
        assert!(output.contains("₹1,650.00"));
        assert!(output.contains("19.50"));
        assert!(output.contains("₹12.50T"));
        assert!(output.contains("₹1,400.00 - ₹1,800.00"));
        assert!(output.contains("NSETOOLS"));
        assert!(output.contains("Manual corrections applied"));
    }

    #[test]
    fn test_notice() {
        assert!(
            quote(QuoteSource::Provider("NSETOOLS".to_string()), false)
                .notice()
                .is_none()
        );
        let notice = quote(QuoteSource::Synthesized, false).notice().unwrap();
        assert!(notice.contains("Offline estimate"));
    }
}
