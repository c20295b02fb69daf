use super::*;

#[test]
fn empty_password_meets_nothing() {
    assert_eq!(PasswordRequirements::check(""), PasswordRequirements::default());
}

#[test]
fn length_boundary_is_inclusive() {
    assert!(!PasswordRequirements::check("abcdefg").min_length);
    assert!(PasswordRequirements::check("abcdefgh").min_length);
}

#[test]
fn length_counts_characters_not_bytes() {
    assert!(!PasswordRequirements::check("ééééééé").min_length);
    assert!(PasswordRequirements::check("éééééééé").min_length);
}

#[test]
fn digit_requirement_is_ascii_only() {
    assert!(PasswordRequirements::check("abc1").has_number);
    assert!(!PasswordRequirements::check("abc٣").has_number);
}

#[test]
fn special_char_set_is_fixed() {
    for c in SPECIAL_CHARS.chars() {
        assert!(PasswordRequirements::check(&format!("pw{c}")).has_special_char, "{c} should count");
    }
    for c in ['-', '_', '?', '(', ' '] {
        assert!(!PasswordRequirements::check(&format!("pw{c}")).has_special_char, "{c} should not count");
    }
}

#[test]
fn all_met_requires_every_rule() {
    assert!(PasswordRequirements::check("school#2024").all_met());
    assert!(!PasswordRequirements::check("school2024").all_met());
    assert!(!PasswordRequirements::check("school#abc").all_met());
    assert!(!PasswordRequirements::check("s#2").all_met());
}

#[test]
fn checklist_order_and_labels() {
    let rows = PasswordRequirements::check("abc1").checklist();
    assert_eq!(rows[0], ("At least 8 characters", false));
    assert_eq!(rows[1], ("Contains a number", true));
    assert_eq!(rows[2], ("Contains a special character", false));
}
