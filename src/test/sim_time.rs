use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn from_secs_f64_rounds_to_nanos() {
    assert_eq!(SimTime::from_secs_f64(0.0015), SimTime(1_500_000));
    assert_eq!(SimTime::from_secs_f64(1.2e-9), SimTime(1));
    assert_eq!(SimTime::from_secs_f64(2.0), SimTime::from_secs(2));
}

#[test]
fn from_secs_f64_clamps_negative_nan_and_huge() {
    assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(1e30), SimTime(u64::MAX));
}

#[test]
fn display_uses_milliseconds() {
    assert_eq!(SimTime(1_234_567).to_string(), "1.235ms");
    assert_eq!(SimTime::ZERO.saturating_add(SimTime(5)), SimTime(5));
    assert_eq!(SimTime(u64::MAX).saturating_add(SimTime(5)), SimTime(u64::MAX));
}
