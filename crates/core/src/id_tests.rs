// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

crate::define_id! {
    pub struct TestId;
}

#[test]
fn short_truncates_long_strings() {
    let id = TestId::new("0123456789abcdef");
    assert_eq!(id.short(8), "01234567");
}

#[test]
fn short_is_noop_on_short_strings() {
    let id = TestId::new("abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn display_matches_inner_string() {
    let id = TestId::new("job-1");
    assert_eq!(id.to_string(), "job-1");
}

#[test]
fn eq_against_str_works() {
    let id = TestId::new("job-1");
    assert_eq!(id, "job-1");
    assert_eq!(id, *&"job-1");
}

#[test]
fn generate_short_id_is_eight_chars() {
    let a = generate_short_id();
    let b = generate_short_id();
    assert_eq!(a.len(), 8);
    assert_ne!(a, b);
}
