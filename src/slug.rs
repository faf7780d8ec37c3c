//! URL slug derivation for category and product names.
//!
//! Uniqueness is handled by the admin services, which retry with numeric
//! suffixes (`-2`, `-3`, ...) up to [`SLUG_MAX_ATTEMPTS`] before giving up.

/// Upper bound on unique-slug candidates tried per write.
pub const SLUG_MAX_ATTEMPTS: u32 = 50;

/// Lowercases, strips diacritics, collapses runs of anything
/// non-alphanumeric into single hyphens and trims the edges.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.trim().chars() {
        for folded in fold_char(c) {
            if folded.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(folded);
            } else {
                pending_hyphen = true;
            }
        }
    }

    out
}

/// Candidate slug for a given retry attempt: the base itself first, then
/// `base-2`, `base-3`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{}", attempt + 1)
    }
}

// Latin diacritics that show up in Spanish product names. Everything else
// non-ASCII is treated as a separator.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    let lower = c.to_lowercase();
    lower.map(|c| match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Bife de Chorizo"), "bife-de-chorizo");
    }

    #[test]
    fn strips_spanish_diacritics() {
        assert_eq!(slugify("Jamón Crudo"), "jamon-crudo");
        assert_eq!(slugify("Ñoquis Caseros"), "noquis-caseros");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Asado -- deTira!!"), "asado-detira");
        assert_eq!(slugify("  ..Vacío..  "), "vacio");
    }

    #[test]
    fn empty_input_gives_empty_slug() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn candidates_start_at_two() {
        assert_eq!(slug_candidate("asado", 0), "asado");
        assert_eq!(slug_candidate("asado", 1), "asado-2");
        assert_eq!(slug_candidate("asado", 49), "asado-50");
    }
}
