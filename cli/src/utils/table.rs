use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::client::models::Analysis;

pub fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Two columns, no header. Used for `status` and `version`.
pub fn key_value_table<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> Table
where
    K: ToString,
    V: ToString,
{
    let mut table = new_table();
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value.to_string()]);
    }
    table
}

/// The greppable `ps` / `top` listing: uuid, status, submission time.
pub fn analyses_table(analyses: &[Analysis]) -> Table {
    let mut table = new_table();
    for analysis in analyses {
        let submitted_at = analysis
            .submitted_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        table.add_row(vec![analysis.uuid.clone(), analysis.status.clone(), submitted_at]);
    }
    table
}
