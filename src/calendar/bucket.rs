use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::ScheduledAppointment;

/// Appointments falling on `day`, in their original order.
///
/// Records whose date did not parse at ingestion never match.
pub fn appointments_on(
    appointments: &[ScheduledAppointment],
    day: NaiveDate,
) -> Vec<&ScheduledAppointment> {
    appointments
        .iter()
        .filter(|a| a.calendar_date == Some(day))
        .collect()
}

/// Group a whole list by calendar day. Relative order inside a day is kept.
pub fn bucket_by_day(
    appointments: &[ScheduledAppointment],
) -> BTreeMap<NaiveDate, Vec<&ScheduledAppointment>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&ScheduledAppointment>> = BTreeMap::new();
    for appt in appointments {
        if let Some(day) = appt.calendar_date {
            buckets.entry(day).or_default().push(appt);
        }
    }
    buckets
}
