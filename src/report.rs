use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::analytics::TimeRange;
use crate::models::DashboardData;

pub fn build_report(
    range: TimeRange,
    cutoff: DateTime<Utc>,
    generated_at: DateTime<Utc>,
    data: &DashboardData,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Health Directory Dashboard Report");
    let _ = writeln!(
        output,
        "Covers the past {} (activity since {})",
        range.as_str(),
        cutoff.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");

    let metrics = &data.metrics;
    let _ = writeln!(
        output,
        "- Total Users: {} ({:+.1}% growth)",
        metrics.total_users, metrics.user_growth
    );
    let _ = writeln!(
        output,
        "- Total Doctors: {} ({:+.1}% growth)",
        metrics.total_doctors, metrics.doctor_growth
    );
    let _ = writeln!(
        output,
        "- Total Patients: {} ({:+.1}% growth)",
        metrics.total_patients, metrics.patient_growth
    );
    let _ = writeln!(
        output,
        "- Total Appointments: {} ({:+.1}% growth)",
        metrics.total_appointments, metrics.appointment_growth
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## User Activity (Last 7 Days)");

    if data.user_activity.is_empty() {
        let _ = writeln!(output, "No new users in this window.");
    } else {
        for bucket in data.user_activity.iter() {
            let _ = writeln!(
                output,
                "- {}: {} new users ({} patients, {} doctors)",
                bucket.date, bucket.total, bucket.patients, bucket.doctors
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Appointments by Weekday");

    for bucket in data.appointments_by_day.iter() {
        let _ = writeln!(output, "- {}: {}", bucket.day, bucket.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Performing Doctors");

    if data.doctor_performance.is_empty() {
        let _ = writeln!(output, "No doctors found in the directory.");
    } else {
        for doctor in data.doctor_performance.iter() {
            let _ = writeln!(
                output,
                "- {} ({}): {} appointments, rating {:.1}",
                doctor.name, doctor.email, doctor.appointments, doctor.rating
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Patient Age Distribution");

    for bucket in data.patient_distribution.iter() {
        let _ = writeln!(output, "- {}: {} patients", bucket.age_range, bucket.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Generated at {}.",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    output
}
