use std::time::Duration;

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words per minute for `words` typed over `elapsed`, rounded to the nearest
/// whole number. A zero-length interval yields 0.
pub fn words_per_minute(words: usize, elapsed: Duration) -> u32 {
    let elapsed_secs = elapsed.as_millis() as f64 / 1000.0;

    match elapsed_secs {
        secs if secs > 0.0 => ((words as f64 / secs) * 60.0).round() as u32,
        _ => 0,
    }
}
