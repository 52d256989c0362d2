//! Target name sanitising.

/// Characters rejected by common filesystems.
pub const ILLEGAL_CHARACTERS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replacement written in place of every illegal character.
pub const REPLACEMENT: char = '_';

/// Replace each filesystem-illegal character in `name` with `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ILLEGAL_CHARACTERS.contains(&ch) {
                REPLACEMENT
            } else {
                ch
            }
        })
        .collect()
}
