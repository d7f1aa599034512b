use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use ibxsync::CreationResult;

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Creation Results Table
--------------------------------------------------------------------------------------*/

pub fn results_table(results: &[CreationResult]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("CIDR").add_attribute(Attribute::Bold).fg(Color::Green),
        Cell::new("Source").add_attribute(Attribute::Bold).fg(Color::Green),
        Cell::new("Action").add_attribute(Attribute::Bold).fg(Color::Green),
        Cell::new("Parent Container")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
        Cell::new("Contained")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
        Cell::new("Error Category")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
    ]);

    for result in results {
        let action_cell = if result.action.is_error() {
            Cell::new(result.action).fg(Color::Red)
        } else {
            Cell::new(result.action)
        };

        table.add_row(vec![
            Cell::new(&result.cidr).add_attribute(Attribute::Bold),
            Cell::new(&result.source_key),
            action_cell,
            Cell::new(result.parent_container.as_deref().unwrap_or("")),
            Cell::new(if result.action.is_container() {
                result.contained_count.to_string()
            } else {
                String::new()
            }),
            Cell::new(
                result
                    .error_category
                    .map_or_else(String::new, |category| category.to_string()),
            ),
        ]);
    }

    // Right-align the CIDR column
    let column = table.column_mut(0).expect("The first column exists");
    column.set_cell_alignment(CellAlignment::Right);

    println!("{table}");

    // Print results summary
    let container_count = results
        .iter()
        .filter(|result| result.action.is_container())
        .count();
    let error_count = results
        .iter()
        .filter(|result| result.action.is_error())
        .count();

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    summary_table.add_row(vec![Cell::new(results.len()), Cell::new("Creation Steps")]);
    summary_table.add_row(vec![
        Cell::new(container_count),
        Cell::new("Container Operations"),
    ]);
    summary_table.add_row(vec![Cell::new(error_count), Cell::new("Errors")]);

    let summary_numbers_column = summary_table.column_mut(0).expect("The first column exists");
    summary_numbers_column.set_cell_alignment(CellAlignment::Right);

    println!("{summary_table}");
}
