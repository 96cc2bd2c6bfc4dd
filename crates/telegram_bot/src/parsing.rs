use engine::Amount;

/// Labels recognized as "skip this category" at the optional steps.
const SKIP_WORDS: &[&str] = &["пропустить", "skip"];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("пустой текст")]
    Empty,
    #[error("некорректная сумма")]
    InvalidAmount,
}

pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased, whitespace-collapsed form used for trigger matching.
pub(crate) fn normalize(input: &str) -> String {
    collapse_whitespace(input).to_lowercase()
}

/// Parses a non-negative amount (`.` or `,` as decimal separator).
pub(crate) fn parse_amount(input: &str) -> Result<Amount, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    input
        .parse::<Amount>()
        .map_err(|_| ValidationError::InvalidAmount)
}

/// Any non-blank text is a valid category label.
pub(crate) fn parse_label(input: &str) -> Result<String, ValidationError> {
    let label = collapse_whitespace(input);
    if label.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(label)
}

pub(crate) fn is_skip(input: &str) -> bool {
    let normalized = normalize(input);
    let word = normalized.strip_prefix('/').unwrap_or(&normalized);
    SKIP_WORDS.contains(&word)
}
