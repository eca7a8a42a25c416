/// Encoder chatter that never helps diagnose a conversion.
const NOISE_PATTERNS: &[&str] = &[
    "x265 [info]:",
    "Invalid Block Addition value",
    "Consider increasing the value for the 'analyzeduration'",
    "Last message repeated",
];

pub fn should_show_message(message: &str) -> bool {
    !NOISE_PATTERNS.iter().any(|pattern| message.contains(pattern))
}
