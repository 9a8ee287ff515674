use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use di_cli::pipeline::ProcessResult;
use di_dashboard::RankEntry;

use crate::types::RankRequest;

pub fn print_summary(result: &ProcessResult) {
    println!("Workbook: {}", result.workbook.display());
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    if let Some(path) = &result.cleaned_output {
        println!("Cleaned workbook: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Period"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Center);
    for sheet in &result.clean.cleaned {
        table.add_row(vec![
            Cell::new(&sheet.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(sheet.period.format("%Y-%m-%d")),
            Cell::new("cleaned").fg(Color::Green),
            dim_cell("-"),
        ]);
    }
    for sheet in &result.clean.skipped {
        table.add_row(vec![
            Cell::new(&sheet.name).fg(Color::DarkGrey),
            dim_cell("-"),
            Cell::new("SKIPPED")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            Cell::new(sheet.reason.to_string()),
        ]);
    }
    println!("{table}");

    let report = &result.aggregate;
    let mut counts = Table::new();
    counts.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_table_style(&mut counts);
    align_column(&mut counts, 1, CellAlignment::Right);
    counts.add_row(vec![Cell::new("Stacked"), Cell::new(report.stacked_rows)]);
    counts.add_row(vec![
        Cell::new("Missing provider (dropped)"),
        count_cell(report.missing_provider, Color::Yellow),
    ]);
    for coercion in &report.coercions {
        if coercion.nulled > 0 {
            counts.add_row(vec![
                Cell::new(format!("{} non-numeric -> null", coercion.column)),
                count_cell(coercion.nulled, Color::Yellow),
            ]);
        }
    }
    if let Some(join) = &report.join {
        counts.add_row(vec![Cell::new("Joined to a region"), Cell::new(join.matched)]);
        counts.add_row(vec![
            Cell::new("No region match (dropped)"),
            count_cell(join.dropped, Color::Yellow),
        ]);
    }
    counts.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.final_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{counts}");

    if let Some(join) = &report.join
        && !join.unmatched_codes.is_empty()
    {
        let codes: Vec<&str> = join.unmatched_codes.iter().map(String::as_str).collect();
        println!("Unmatched org codes: {}", codes.join(", "));
    }
    println!("Finished in {} ms", result.elapsed_ms);
}

pub fn print_ranking(request: &RankRequest, entries: &[RankEntry]) {
    println!(
        "{} {} ranking, rolling window {}",
        request.modality, request.kind, request.window
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Region"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (idx, entry) in entries.iter().enumerate() {
        let selected = entry.region == request.region;
        let region = if selected {
            Cell::new(&entry.region)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&entry.region)
        };
        table.add_row(vec![
            Cell::new(idx + 1),
            region,
            Cell::new(format!("{:.1}", entry.value)),
        ]);
    }
    if !entries.is_empty() {
        let mean = entries.iter().map(|entry| entry.value).sum::<f64>() / entries.len() as f64;
        table.add_row(vec![
            dim_cell("-"),
            Cell::new("Average")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{mean:.1}")).add_attribute(Attribute::Bold),
        ]);
    }
    println!("{table}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
