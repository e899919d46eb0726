//! Team name → abbreviation lookup.
//!
//! Cards print a mix of abbreviations, city names and mascots, and OCR adds
//! noise on top. Everything is folded onto the canonical 2–3 letter code.

/// Canonical abbreviations (plus FA for free agents).
pub const TEAM_CODES: [&str; 33] = [
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAX", "KC", "LAC", "LAR", "LV", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI",
    "PIT", "SEA", "SF", "TB", "TEN", "WAS", "FA",
];

/// City and mascot names. Order matters for substring matching: more
/// specific names come before names they contain.
const TEAM_NAMES: &[(&str, &str)] = &[
    ("BALTIMORE", "BAL"),
    ("RAVENS", "BAL"),
    ("BUFFALO", "BUF"),
    ("BILLS", "BUF"),
    ("CINCINNATI", "CIN"),
    ("BENGALS", "CIN"),
    ("CLEVELAND", "CLE"),
    ("BROWNS", "CLE"),
    ("DENVER", "DEN"),
    ("BRONCOS", "DEN"),
    ("HOUSTON", "HOU"),
    ("TEXANS", "HOU"),
    ("INDIANAPOLIS", "IND"),
    ("COLTS", "IND"),
    ("JACKSONVILLE", "JAX"),
    ("JAGUARS", "JAX"),
    ("KANSAS CITY", "KC"),
    ("CHIEFS", "KC"),
    ("LAS VEGAS", "LV"),
    ("RAIDERS", "LV"),
    ("LOS ANGELES RAMS", "LAR"),
    ("RAMS", "LAR"),
    ("LOS ANGELES", "LAC"),
    ("CHARGERS", "LAC"),
    ("MIAMI", "MIA"),
    ("DOLPHINS", "MIA"),
    ("NEW ENGLAND", "NE"),
    ("PATRIOTS", "NE"),
    ("NEW YORK GIANTS", "NYG"),
    ("GIANTS", "NYG"),
    ("NEW YORK", "NYJ"),
    ("JETS", "NYJ"),
    ("PITTSBURGH", "PIT"),
    ("STEELERS", "PIT"),
    ("TENNESSEE", "TEN"),
    ("TITANS", "TEN"),
    ("ARIZONA", "ARI"),
    ("CARDINALS", "ARI"),
    ("ATLANTA", "ATL"),
    ("FALCONS", "ATL"),
    ("CAROLINA", "CAR"),
    ("PANTHERS", "CAR"),
    ("CHICAGO", "CHI"),
    ("BEARS", "CHI"),
    ("DALLAS", "DAL"),
    ("COWBOYS", "DAL"),
    ("DETROIT", "DET"),
    ("LIONS", "DET"),
    ("GREEN BAY", "GB"),
    ("PACKERS", "GB"),
    ("MINNESOTA", "MIN"),
    ("VIKINGS", "MIN"),
    ("NEW ORLEANS", "NO"),
    ("SAINTS", "NO"),
    ("PHILADELPHIA", "PHI"),
    ("EAGLES", "PHI"),
    ("SAN FRANCISCO", "SF"),
    ("49ERS", "SF"),
    ("NINERS", "SF"),
    ("SEATTLE", "SEA"),
    ("SEAHAWKS", "SEA"),
    ("TAMPA BAY", "TB"),
    ("BUCCANEERS", "TB"),
    ("WASHINGTON", "WAS"),
    ("COMMANDERS", "WAS"),
    ("FREE AGENT", "FA"),
];

/// Inputs shorter than this only match exactly; "CHI" must not hit "CHIEFS".
const MIN_PARTIAL_LEN: usize = 4;

fn clean(text: &str) -> String {
    text.to_ascii_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves text to a known canonical code, or None.
pub fn team_code(text: &str) -> Option<&'static str> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return None;
    }
    if let Some(code) = TEAM_CODES.iter().copied().find(|&code| code == cleaned) {
        return Some(code);
    }
    if let Some(&(_, code)) = TEAM_NAMES.iter().find(|(name, _)| *name == cleaned) {
        return Some(code);
    }
    if cleaned.len() < MIN_PARTIAL_LEN {
        return None;
    }
    TEAM_NAMES
        .iter()
        .find(|(name, _)| cleaned.contains(name) || name.contains(cleaned.as_str()))
        .map(|(_, code)| *code)
}

/// Normalizes OCR team text. Unknown text of 1–3 characters is kept as-is
/// since it may already be an abbreviation; longer unknown text is dropped.
pub fn normalize_team(text: &str) -> Option<String> {
    if let Some(code) = team_code(text) {
        return Some(code.to_string());
    }
    let cleaned = clean(text);
    if !cleaned.is_empty() && cleaned.len() <= 3 {
        Some(cleaned)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviation_passthrough() {
        assert_eq!(team_code("KC"), Some("KC"));
        assert_eq!(team_code(" sf "), Some("SF"));
        assert_eq!(team_code("LAR"), Some("LAR"));
    }

    #[test]
    fn test_short_codes_do_not_partial_match() {
        // Exact codes must win over mascots that contain them
        assert_eq!(team_code("CHI"), Some("CHI"));
        assert_eq!(team_code("PHI"), Some("PHI"));
        assert_eq!(team_code("CAR"), Some("CAR"));
        assert_eq!(team_code("XQ"), None);
    }

    #[test]
    fn test_city_and_mascot() {
        assert_eq!(team_code("Kansas City"), Some("KC"));
        assert_eq!(team_code("BUCCANEERS"), Some("TB"));
        assert_eq!(team_code("New York Giants"), Some("NYG"));
        assert_eq!(team_code("NEW YORK JETS"), Some("NYJ"));
        assert_eq!(team_code("Los Angeles Rams"), Some("LAR"));
        assert_eq!(team_code("49ers"), Some("SF"));
    }

    #[test]
    fn test_partial_match_on_noisy_text() {
        assert_eq!(team_code("STEELERS."), Some("PIT"));
        assert_eq!(team_code("PACKER"), Some("GB"));
    }

    #[test]
    fn test_normalize_team_fallback() {
        assert_eq!(normalize_team("Dolphins"), Some("MIA".to_string()));
        assert_eq!(normalize_team("zz"), Some("ZZ".to_string()));
        assert_eq!(normalize_team("gibberish"), None);
        assert_eq!(normalize_team(""), None);
    }
}
