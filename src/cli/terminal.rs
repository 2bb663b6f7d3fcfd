//! Terminal implementations of the presentation callbacks.

use super::ui::{self, StyleType};
use crate::controller::View;
use crate::core::{Catalog, Conversion};
use crate::store::Prompter;
use comfy_table::Cell;
use console::Term;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct TerminalView {
    show_catalog: bool,
    status: Option<String>,
    last_conversion: Option<Conversion>,
}

impl TerminalView {
    pub fn new(show_catalog: bool) -> Self {
        Self {
            show_catalog,
            ..Default::default()
        }
    }

    /// Most recent status message, if any was reported.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn last_conversion(&self) -> Option<&Conversion> {
        self.last_conversion.as_ref()
    }

    pub fn render_catalog(index: usize, catalog: &Catalog) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Name")]);
        for (i, (code, name)) in catalog.iter().enumerate() {
            let code_cell = if i == index {
                Cell::new(ui::style_text(&format!("{code} *"), StyleType::Highlight))
            } else {
                Cell::new(code)
            };
            table.add_row(vec![code_cell, Cell::new(name)]);
        }
        table.to_string()
    }

    pub fn render_conversion(conversion: &Conversion) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Amount"),
            ui::header_cell("Rate"),
        ]);
        for result in &conversion.results {
            table.add_row(vec![
                Cell::new(&result.code),
                ui::amount_cell(result.amount),
                ui::number_cell(result.rate, 6),
            ]);
        }
        format!(
            "{}\n{}",
            ui::style_text(&conversion.label, StyleType::Title),
            table
        )
    }
}

impl View for TerminalView {
    fn set_available_currencies(&mut self, index: usize, catalog: &Catalog) {
        if self.show_catalog && !catalog.is_empty() {
            println!("{}", Self::render_catalog(index, catalog));
        }
    }

    fn display_conversion(&mut self, conversion: &Conversion) {
        if conversion.results.is_empty() {
            println!(
                "{}",
                ui::style_text(
                    &format!("Nothing to display ({})", conversion.label),
                    StyleType::Subtle
                )
            );
        } else {
            println!("{}", Self::render_conversion(conversion));
        }
        self.last_conversion = Some(conversion.clone());
    }

    fn set_status(&mut self, message: &str) {
        eprintln!("{}", ui::style_text(message, StyleType::Error));
        self.status = Some(message.to_string());
    }
}

/// Reads answers line by line from the terminal, or from stdin when it is
/// not attended.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        self.term.write_line(prompt).ok()?;
        let answer = if self.term.is_term() {
            self.term.read_line().ok()?
        } else {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok()?;
            line
        };
        Some(answer.trim().to_string())
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn request_string(&mut self, title: &str, placeholder: &str, default: &str) -> Option<String> {
        let prompt = if default.is_empty() {
            format!("{title} [{placeholder}]:")
        } else {
            format!("{title} [{default}]:")
        };
        let answer = self.ask(&ui::style_text(&prompt, StyleType::Title))?;
        if !answer.is_empty() {
            Some(answer)
        } else if !default.is_empty() {
            Some(default.to_string())
        } else {
            None
        }
    }

    fn request_path(&mut self, title: &str, file_filter: &str, start_path: &Path) -> Option<PathBuf> {
        let prompt = format!("{title} ({file_filter}) [{}]:", start_path.display());
        let answer = self.ask(&ui::style_text(&prompt, StyleType::Title))?;
        if !answer.is_empty() {
            Some(PathBuf::from(answer))
        } else if start_path.is_file() {
            Some(start_path.to_path_buf())
        } else {
            None
        }
    }
}
