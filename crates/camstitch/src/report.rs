//! Scan summary table.

use chrono::Duration;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use camstitch_models::ClipGroup;

/// Average encoding speed relative to real time with the default settings.
pub const COMPILE_SPEED: f64 = 1.5;

const COLUMNS: [&str; 9] = [
    "Start Time",
    "End Time",
    "Total Clips",
    "Front Clips",
    "Back Clips",
    "Span Minutes",
    "Missing Pair",
    "Compile Time",
    "Final Video",
];

/// Estimated encoding time for `front_clips` one-minute clips.
pub fn estimated_compile_time(front_clips: usize) -> Duration {
    Duration::seconds((front_clips as f64 * 60.0 / COMPILE_SPEED).round() as i64)
}

/// Format a duration as `H:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Build the per-group summary table with a totals row.
pub fn summary_table(groups: &[ClipGroup]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(COLUMNS.iter().map(|c| Cell::new(c)));

    let mut total_front = 0;
    let mut total_back = 0;
    let mut total_minutes = 0;

    for group in groups {
        let front = group.front.len();
        let back = group.back.len();
        let minutes = group.span().num_minutes();

        total_front += front;
        total_back += back;
        total_minutes += minutes;

        table.add_row(vec![
            Cell::new(group.start),
            Cell::new(group.end),
            Cell::new(front + back),
            Cell::new(front),
            Cell::new(back),
            Cell::new(minutes),
            Cell::new(group.has_missing_pair()),
            Cell::new(format_duration(estimated_compile_time(front))),
            Cell::new(
                group
                    .final_output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
        ]);
    }

    table.add_row(vec![
        Cell::new(""),
        Cell::new("Totals"),
        Cell::new(total_front + total_back),
        Cell::new(total_front),
        Cell::new(total_back),
        Cell::new(total_minutes),
        Cell::new("Total Compile Time"),
        Cell::new(format_duration(estimated_compile_time(total_front))),
        Cell::new(""),
    ]);

    table
}
