use super::*;

#[test]
fn names_carry_prefix_and_extension() {
    let n = artifact_name("design", "svg");
    assert!(n.starts_with("design-"));
    assert!(n.ends_with(".svg"));
    crate::store::check_name(&n).unwrap();
}

#[test]
fn names_do_not_collide() {
    let names: std::collections::HashSet<String> =
        (0..256).map(|_| artifact_name("design", "png")).collect();
    assert_eq!(names.len(), 256);
}

#[test]
fn hostile_prefix_is_flattened() {
    let n = artifact_name("../etc/passwd", "png");
    assert!(n.starts_with("___etc_passwd-"));
    crate::store::check_name(&n).unwrap();
    assert!(artifact_name("", "png").starts_with("artifact-"));
}

#[test]
fn stem_has_timestamp_and_suffix() {
    let stem = artifact_stem("combined");
    let parts: Vec<&str> = stem.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "combined");
    assert!(parts[1].ends_with('Z'));
    assert_eq!(parts[2].len(), 12);
}
