use chrono::Utc;

/// Collision-resistant name stem: `<prefix>-<UTC millis timestamp>-<random>`.
///
/// The SVG and PNG of one composite share a stem so they sort next to each other.
pub fn artifact_stem(prefix: &str) -> String {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{stamp}-{}", sanitize(prefix), &id[..12])
}

pub fn artifact_name(prefix: &str, ext: &str) -> String {
    format!("{}.{ext}", artifact_stem(prefix))
}

fn sanitize(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/naming.rs"]
mod tests;
