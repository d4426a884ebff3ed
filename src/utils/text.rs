/// Minimum number of characters accepted for detection and optimization.
pub const MIN_TEXT_CHARS: usize = 50;

/// Length in characters (Unicode scalar values), the unit every length gate uses.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn meets_min_length(text: &str) -> bool {
    char_len(text) >= MIN_TEXT_CHARS
}

/// Word count as the detection report computes it: one more than the number
/// of whitespace runs, so leading or trailing whitespace counts an empty word
/// and the empty string counts as one.
pub fn split_word_count(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs + 1
}

/// Non-empty whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
