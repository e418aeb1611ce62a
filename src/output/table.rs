use tabled::Table;
use tabled::settings::object::Columns;
use tabled::settings::themes::Theme;
use tabled::settings::{Modify, Padding, Style};

/// kubectl-style table: no borders, two spaces between columns.
pub fn apply_table_style(table: &mut Table) {
    let mut theme = Theme::from_style(Style::empty());
    theme.remove_horizontal_lines();
    table.with(theme);
    table.with(Modify::new(Columns::new(..)).with(Padding::new(0, 2, 0, 0)));
}
