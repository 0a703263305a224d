use skypath::{
    format::{format_datetime, format_datetime_iso, format_timezone, DateStyle},
    time::{
        gregorian_to_julian, julian_to_gregorian, ut1_to_local_mean, ut1_to_standard,
        CalendarTuple, Instant, TimeFields,
    },
};

fn whole(t: &CalendarTuple) -> TimeFields {
    t.stabilized().to_calendar().whole()
}

fn whole_julian(t: &CalendarTuple) -> TimeFields {
    // stabilize in the Julian calendar by going through the Gregorian rename
    julian_to_gregorian(t).stabilized().to_julian_calendar().whole()
}

#[test]
fn test_historical_anchors() {
    let g = CalendarTuple::new(1582, 10, 15, 0, 0, 0.0);
    assert_eq!(whole_julian(&gregorian_to_julian(&g)), TimeFields(1582, 10, 5, 0, 0, 0));

    // 2100 is not a Gregorian leap year but is a Julian one
    let g = CalendarTuple::new(2100, 3, 14, 12, 0, 0.0);
    assert_eq!(whole_julian(&gregorian_to_julian(&g)), TimeFields(2100, 2, 29, 12, 0, 0));

    let j = CalendarTuple::new(-43, 3, 15, 6, 0, 0.0);
    assert_eq!(whole(&julian_to_gregorian(&j)), TimeFields(-43, 3, 13, 6, 0, 0));
}

#[test]
fn test_calendar_roundtrip() {
    for (y, m, d) in [(-2999, 2, 28), (-1, 12, 31), (0, 2, 29), (1000, 7, 4), (1582, 10, 4), (2024, 2, 29)] {
        let g = CalendarTuple::new(y, m, d, 18, 30, 15.0);
        let back = gregorian_to_julian(&julian_to_gregorian(&g));
        assert_eq!(whole_julian(&back), TimeFields(y, m, d, 18, 30, 15));
    }
}

#[test]
fn test_offsets_invert() {
    let ut1 = CalendarTuple::new(2024, 12, 31, 20, 15, 42.0);
    for offset in [-720.0, -330.0, 0.0, 345.0, 480.0, 840.0] {
        let back = ut1_to_standard(&ut1_to_standard(&ut1, offset), -offset);
        let dt = back.to_instant().days_since(&ut1.to_instant()) * 86_400.0;
        assert!(dt.abs() < 1.0, "offset {offset}: {dt} s");
    }

    let lmt = ut1_to_local_mean(&ut1, 116.4);
    assert_eq!(whole(&lmt), TimeFields(2025, 1, 1, 4, 1, 18));
}

#[test]
fn test_display_helpers() {
    let t = Instant::from_calendar(2000, 1, 1, 12, 0, 0.0).to_calendar();
    let (date, _) = format_datetime_iso(&t);
    assert_eq!(date, "+2000-01-01");

    let out = format_datetime(&CalendarTuple::new(-99, 7, 12, 0, 0, 0.0), DateStyle::default()).unwrap();
    assert_eq!(out.date, "12 Jul 100 BCE");
    assert_eq!(format_timezone(-9.5), "-09:30");
}
