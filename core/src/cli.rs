use crate::models::{DatasetRow, DatasetSummary, HistoryEntry};

pub fn print_summary_report(summary: &DatasetSummary) {
    println!("--- Summary Statistics ---");
    println!("Total equipment: {}", summary.total_count);
    println!("Avg flowrate: {:.2}", summary.avg_flowrate);
    println!("Avg pressure: {:.2}", summary.avg_pressure);
    println!("Avg temperature: {:.2}", summary.avg_temperature);
    println!("--- Equipment Type Distribution ---");
    for line in distribution_lines(summary) {
        println!("{line}");
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No history available");
        return;
    }
    println!("Upload History (Last 5):");
    for e in entries {
        println!("{}", format_history_entry(e));
    }
}

pub fn print_rows(rows: &[DatasetRow]) {
    println!("{}", format_row_header());
    for row in rows {
        println!("{}", format_row(row));
    }
    println!("({} records)", rows.len());
}

/// "Type: antall (andel %)", sortert etter antall, deretter navn.
pub fn distribution_lines(summary: &DatasetSummary) -> Vec<String> {
    let total: u64 = summary.equipment_type_distribution.values().sum();
    let mut items: Vec<(&String, &u64)> = summary.equipment_type_distribution.iter().collect();
    items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    items
        .into_iter()
        .map(|(kind, count)| {
            let pct = if total == 0 { 0.0 } else { *count as f64 * 100.0 / total as f64 };
            format!("{kind}: {count} ({pct:.1}%)")
        })
        .collect()
}

pub fn format_history_entry(e: &HistoryEntry) -> String {
    format!(
        "ID: {} - {} | Uploaded: {} | Count: {} | Avg Flowrate: {} | Avg Pressure: {} | Avg Temperature: {}",
        e.id,
        e.name,
        e.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
        e.total_count,
        fmt_opt(e.avg_flowrate),
        fmt_opt(e.avg_pressure),
        fmt_opt(e.avg_temperature),
    )
}

pub fn format_row_header() -> String {
    format!(
        "{:<24} {:<22} {:>10} {:>10} {:>12}",
        "Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"
    )
}

pub fn format_row(row: &DatasetRow) -> String {
    format!(
        "{:<24} {:<22} {:>10.2} {:>10.2} {:>12.2}",
        row.equipment_name, row.equipment_type, row.flowrate, row.pressure, row.temperature
    )
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "N/A".to_string())
}
