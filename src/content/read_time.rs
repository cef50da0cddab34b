/// Reading speed used for the estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimate reading time in whole minutes, rounding up.
///
/// Words are whitespace-delimited tokens of the stored (sanitized) content;
/// empty or whitespace-only content reads in zero minutes.
pub fn estimate_read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}
