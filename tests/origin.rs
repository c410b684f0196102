//! Origin gate tests

use std::net::IpAddr;

use unitgate::{evaluate, parse_ranges, AddrRange, Status};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn denial_message(addr: &str) -> String {
    format!("{} is not allowed to access this resource.", addr)
}

#[test]
fn test_unset_list_denies_everything() {
    for addr in ["127.0.0.1", "10.0.10.10", "2001:db8::1"] {
        let err = evaluate(ip(addr), None).unwrap_err();
        assert_eq!(err.status, Status::Unauthorized);
        assert_eq!(err.messages, vec![denial_message(addr)]);
    }
}

#[test]
fn test_empty_and_whitespace_lists_deny() {
    assert!(evaluate(ip("127.0.0.1"), Some("")).is_err());
    assert!(evaluate(ip("127.0.0.1"), Some("   ")).is_err());
    assert!(evaluate(ip("127.0.0.1"), Some("\t\n")).is_err());
}

#[test]
fn test_prefix_zero_matches_whole_family() {
    assert!(evaluate(ip("203.0.113.9"), Some("0.0.0.0/0")).is_ok());
    assert!(evaluate(ip("2001:db8::1"), Some("::/0")).is_ok());
}

#[test]
fn test_families_never_cross_match() {
    // Broadest possible ranges still never match the other family
    assert!(evaluate(ip("203.0.113.9"), Some("::/0")).is_err());
    assert!(evaluate(ip("2001:db8::1"), Some("0.0.0.0/0")).is_err());
}

#[test]
fn test_mixed_family_list() {
    let list = "127.0.0.1/8, 149.159.0.0/16, 2001:4860:4860::8888/32";

    assert!(evaluate(ip("149.159.10.10"), Some(list)).is_ok());
    assert!(evaluate(ip("127.42.0.1"), Some(list)).is_ok());
    assert!(evaluate(ip("2001:4860:1234::1"), Some(list)).is_ok());

    let err = evaluate(ip("10.0.10.10"), Some(list)).unwrap_err();
    assert_eq!(err.status, Status::Unauthorized);
    assert_eq!(err.messages, vec![denial_message("10.0.10.10")]);
}

#[test]
fn test_malformed_entry_does_not_cover() {
    // Second entry is malformed; the remaining valid entry does not cover
    // the address, so the request is denied.
    let err = evaluate(ip("149.159.10.10"), Some("127.0.0.1/8,149.1590.0/16")).unwrap_err();
    assert_eq!(err.status, Status::Unauthorized);
}

#[test]
fn test_malformed_entry_never_aborts_the_scan() {
    // A garbage entry before a valid matching one must not disable it
    assert!(evaluate(ip("10.1.2.3"), Some("not-a-range, 10.0.0.0/8")).is_ok());
    assert!(evaluate(ip("10.1.2.3"), Some("10.0.0.0/8, not-a-range")).is_ok());
}

#[test]
fn test_single_entry_boundaries() {
    let list = Some("149.159.0.0/16");
    assert!(evaluate(ip("149.159.0.0"), list).is_ok());
    assert!(evaluate(ip("149.159.255.255"), list).is_ok());
    assert!(evaluate(ip("149.160.0.0"), list).is_err());
    assert!(evaluate(ip("149.158.255.255"), list).is_err());
}

#[test]
fn test_partial_byte_prefix() {
    // /12 splits inside the second octet
    let list = Some("10.16.0.0/12");
    assert!(evaluate(ip("10.16.0.1"), list).is_ok());
    assert!(evaluate(ip("10.31.255.255"), list).is_ok());
    assert!(evaluate(ip("10.32.0.0"), list).is_err());
    assert!(evaluate(ip("10.15.255.255"), list).is_err());
}

#[test]
fn test_parse_ranges_drops_bad_entries_individually() {
    let ranges = parse_ranges("127.0.0.1/8, bogus, 10.0.0.0/33, ::1/129, 192.168.1.0/24");
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0].prefix(), 8);
    assert_eq!(ranges[1].prefix(), 24);
}

#[test]
fn test_parse_accepts_compact_and_expanded_v6() {
    let compact = AddrRange::parse("2001:4860:4860::8888/32").unwrap();
    let expanded = AddrRange::parse("2001:4860:4860:0000:0000:0000:0000:8888/32").unwrap();
    assert_eq!(compact, expanded);
}

#[test]
fn test_parse_rejects_bare_address_and_bad_prefix() {
    assert!(AddrRange::parse("127.0.0.1").is_none());
    assert!(AddrRange::parse("127.0.0.1/").is_none());
    assert!(AddrRange::parse("127.0.0.1/x").is_none());
    assert!(AddrRange::parse("127.0.0.1/33").is_none());
    assert!(AddrRange::parse("::1/129").is_none());
    assert!(AddrRange::parse("/8").is_none());
}

#[test]
fn test_range_contains() {
    let range = AddrRange::parse("192.168.0.0/24").unwrap();
    assert_eq!(range.network(), ip("192.168.0.0"));
    assert_eq!(range.prefix(), 24);
    assert!(range.contains(ip("192.168.0.200")));
    assert!(!range.contains(ip("192.168.1.1")));
    assert!(!range.contains(ip("::ffff:c0a8:1")));
}
