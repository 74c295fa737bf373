const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

pub const MASK: &str = "****";

/// Replace profane words with `****`.
///
/// Words are split on single spaces and compared case-insensitively. A word
/// with punctuation attached (`fornax!`) is left alone.
pub fn clean(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
