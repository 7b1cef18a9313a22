//! Formatage pour l'affichage (durées, compteurs)

/// Formate une durée en secondes au format `m:ss`
///
/// Les valeurs négatives ou non finies (durée pas encore connue) donnent `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Formate un entier avec un séparateur de milliers (`1234567` → `1,234,567`)
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Libellé du nombre de fans, `None` si l'API ne l'a pas fourni
pub fn format_fans(nb_fan: Option<u64>) -> Option<String> {
    nb_fan.map(|n| format!("{} fans", format_count(n)))
}
