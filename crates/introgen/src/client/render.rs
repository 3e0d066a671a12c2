use crate::prelude::{eprintln, println};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use introgen_core::form::{Field, GenerationRequest};
use introgen_core::session::ResultView;

pub const EMPTY_STATE: &str = "The result will appear here after you press Generate.";

/// Plain text for the result area, newlines preserved.
pub fn view_text(view: ResultView<'_>) -> &str {
    match view {
        ResultView::Loading => "Generating...",
        ResultView::Empty => EMPTY_STATE,
        ResultView::Introduction(text) => text,
        ResultView::Error(message) => message,
    }
}

pub fn print_view(view: ResultView<'_>) {
    let text = view_text(view);
    match view {
        ResultView::Introduction(_) => {
            println!();
            println!("{}", "Suggested introduction".bold().cyan());
            println!();
            println!("{}", text);
            println!();
        }
        ResultView::Error(_) => eprintln!("{}", text.bright_red()),
        ResultView::Empty | ResultView::Loading => println!("{}", text.dimmed()),
    }
}

pub fn print_field_prompt(field: Field, current: &GenerationRequest) {
    println!();
    println!("{}", field.label().bold());
    println!("{}", field.hint().dimmed());
    let value = current.get(field);
    if !value.is_empty() {
        println!("{} {}", "current:".dimmed(), value);
    }
}

/// Loading placeholder shown while a generation is outstanding.
pub fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Generating introduction...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
