// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Clock divider and settle-delay math.

use serprog_common::transport::{pl022_rate, settle_ns, SETTLE_MIN_NS};

const PERI_HZ: u32 = 125_000_000;

// =============================================================================
// settle_ns
// =============================================================================

#[test]
fn test_settle_is_one_clock_period() {
    assert_eq!(settle_ns(1_000_000), 1000);
    assert_eq!(settle_ns(12_000_000), 84);
}

#[test]
fn test_settle_has_floor() {
    assert_eq!(settle_ns(62_500_000), SETTLE_MIN_NS);
    assert_eq!(settle_ns(u32::MAX), SETTLE_MIN_NS);
}

#[test]
fn test_settle_zero_frequency_uses_floor() {
    assert_eq!(settle_ns(0), SETTLE_MIN_NS);
}

// =============================================================================
// pl022_rate
// =============================================================================

#[test]
fn test_pl022_default_request() {
    // 125 MHz / (2 * 6)
    assert_eq!(pl022_rate(PERI_HZ, 12_000_000), 10_416_666);
}

#[test]
fn test_pl022_one_megahertz() {
    // 125 MHz / (2 * 63)
    assert_eq!(pl022_rate(PERI_HZ, 1_000_000), 992_063);
}

#[test]
fn test_pl022_exact_division() {
    assert_eq!(pl022_rate(PERI_HZ, 31_250_000), 31_250_000);
}

#[test]
fn test_pl022_caps_at_half_peripheral_clock() {
    assert_eq!(pl022_rate(PERI_HZ, 100_000_000), 62_500_000);
    assert_eq!(pl022_rate(PERI_HZ, u32::MAX), 62_500_000);
}

#[test]
fn test_pl022_floor_at_slowest_divider() {
    // 125 MHz / (254 * 256)
    assert_eq!(pl022_rate(PERI_HZ, 1_000), 1_922);
    assert_eq!(pl022_rate(PERI_HZ, 1), 1_922);
}

#[test]
fn test_pl022_low_rates_follow_prescale_search() {
    // Prescale 8 is the first whose range reaches 50 kHz; its slowest
    // post-divider still lands above the request.
    assert_eq!(pl022_rate(PERI_HZ, 50_000), 61_035);
}

#[test]
fn test_pl022_never_exceeds_reachable_request() {
    for want in [400_000, 1_500_000, 3_300_000, 8_000_000, 20_000_000, 40_000_000] {
        let got = pl022_rate(PERI_HZ, want);
        assert!(got <= want, "want {} got {}", want, got);
        assert!(got > 0);
    }
}
