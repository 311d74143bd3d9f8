use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for destination language handling
///
/// Requests may name the destination language in plain English ("Spanish")
/// or with an ISO 639-1 (2-letter) or ISO 639-2 (3-letter) code. The prompt
/// always receives the English language name.
/// Map an ISO 639-2/B code to its ISO 639-2/T counterpart
fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    let part2t = match code {
        "fre" => "fra", // French
        "ger" => "deu", // German
        "dut" => "nld", // Dutch
        "gre" => "ell", // Greek
        "chi" => "zho", // Chinese
        "cze" => "ces", // Czech
        "ice" => "isl", // Icelandic
        "alb" => "sqi", // Albanian
        "arm" => "hye", // Armenian
        "baq" => "eus", // Basque
        "bur" => "mya", // Burmese
        "per" => "fas", // Persian
        "geo" => "kat", // Georgian
        "may" => "msa", // Malay
        "mac" => "mkd", // Macedonian
        "rum" => "ron", // Romanian
        "slo" => "slk", // Slovak
        "wel" => "cym", // Welsh
        _ => return None,
    };
    Some(part2t)
}

/// Look up a language by ISO 639-1 or ISO 639-2 (T or B) code
pub fn language_from_code(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code)
            .or_else(|| bibliographic_to_terminologic(&normalized_code).and_then(Language::from_639_3)),
        _ => None,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    language_from_code(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Resolve a destination language given as a code or a name
///
/// Codes are replaced by the English name; recognized names are returned in
/// their canonical spelling; anything else is passed through trimmed so that
/// descriptive targets ("Brazilian Portuguese") still reach the prompt.
pub fn resolve_language_name(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Destination language cannot be empty"));
    }

    if let Ok(name) = get_language_name(trimmed) {
        return Ok(name);
    }

    let mut chars = trimmed.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
        None => String::new(),
    };

    match Language::from_name(trimmed).or_else(|| Language::from_name(&capitalized)) {
        Some(lang) => Ok(lang.to_name().to_string()),
        None => Ok(trimmed.to_string()),
    }
}
