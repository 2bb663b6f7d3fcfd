use super::ui;
use crate::core::OptionKind;
use crate::providers::SourceKind;
use comfy_table::Cell;

/// Lists registered sources and the options each one asks for.
pub fn display_sources() -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Source"),
        ui::header_cell("Option"),
        ui::header_cell("Kind"),
        ui::header_cell("Description"),
    ]);

    for kind in SourceKind::ALL {
        if kind.options().is_empty() {
            table.add_row(vec![
                Cell::new(kind.name()),
                Cell::new("-"),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
        for option in kind.options() {
            let kind_label = match option.kind {
                OptionKind::Path => "path",
                OptionKind::String => "string",
            };
            table.add_row(vec![
                Cell::new(kind.name()),
                Cell::new(option.key),
                Cell::new(kind_label),
                Cell::new(option.label),
            ]);
        }
    }
    table.to_string()
}
