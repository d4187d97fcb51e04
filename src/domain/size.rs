//! Human readable file sizes

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Format a byte count, switching unit only past 5 of the next unit
pub fn bytes_to_human(bytes: u64) -> String {
    if bytes < 5 * KB {
        format!("{bytes}B")
    } else if bytes < 5 * MB {
        format!("{}KB", bytes / KB)
    } else if bytes < 5 * GB {
        format!("{}MB", bytes / MB)
    } else {
        format!("{}GB", bytes / GB)
    }
}

/// Describe a size change as `input ➡️  output (±x.y%)`
pub fn diff_string(output_size: u64, input_size: u64) -> String {
    if input_size == 0 {
        return "0B ➡️  0B (+0%)".to_string();
    }

    let diff = 100.0 * (output_size as f64 / input_size as f64 - 1.0);
    let sign = if diff < 0.0 { "-" } else { "+" };

    format!(
        "{} ➡️  {} ({}{:.1}%)",
        bytes_to_human(input_size),
        bytes_to_human(output_size),
        sign,
        diff.abs()
    )
}
