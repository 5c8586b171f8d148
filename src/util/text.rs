use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile digit regex"));

/// Extracts the first run of decimal digits from the given text and parses it
/// as a quantity.
///
/// Quantity markers on the stock page come in decorated forms such as `x5` or
/// `5 in stock`; only the first digit run is significant.
///
/// # Arguments
///
/// * `text` - The raw text of a quantity element.
///
/// # Returns
///
/// * `Option<u32>`: The parsed quantity, or `None` when the text contains no
///   digits or the digit run does not fit in a `u32`.
pub fn extract_quantity(text: &str) -> Option<u32> {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}
