use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use clap::ValueEnum;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{
    ActivityBucket, AgeDistributionBucket, DashboardData, DoctorRanking, MetricSnapshot,
    ProfileEvent, WeekdayBucket,
};

pub const ACTIVITY_WINDOW_DAYS: usize = 7;
pub const TOP_DOCTOR_LIMIT: i64 = 5;

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const AGE_BANDS: [(&str, f64); 5] = [
    ("0-18", 0.15),
    ("19-35", 0.30),
    ("36-50", 0.25),
    ("51-65", 0.20),
    ("65+", 0.10),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
        }
    }
}

pub fn period_cutoff(now: DateTime<Utc>, range: TimeRange) -> DateTime<Utc> {
    match range {
        TimeRange::Week => now - Duration::days(7),
        TimeRange::Month => now - Months::new(1),
        TimeRange::Quarter => now - Months::new(3),
    }
}

pub async fn build_dashboard(pool: &PgPool, cutoff: DateTime<Utc>) -> DashboardData {
    let (metrics, user_activity, appointments_by_day, doctor_performance, patient_distribution) =
        tokio::join!(
            build_metrics(pool, cutoff),
            build_activity(pool),
            build_weekday_load(pool),
            build_doctor_ranking(pool),
            build_age_distribution(pool),
        );

    DashboardData {
        metrics,
        user_activity,
        appointments_by_day,
        doctor_performance,
        patient_distribution,
    }
}

async fn build_metrics(pool: &PgPool, cutoff: DateTime<Utc>) -> MetricSnapshot {
    let total_users = count_or_zero(db::count_profiles(pool, None, None).await, "total users");
    let total_doctors = count_or_zero(
        db::count_profiles(pool, Some("doctor"), None).await,
        "total doctors",
    );
    let total_patients = count_or_zero(
        db::count_profiles(pool, Some("patient"), None).await,
        "total patients",
    );
    let total_appointments = count_or_zero(
        db::count_appointments(pool, None, None).await,
        "total appointments",
    );

    let prior_users = count_or_zero(
        db::count_profiles(pool, None, Some(cutoff)).await,
        "prior-period users",
    );
    let prior_doctors = count_or_zero(
        db::count_profiles(pool, Some("doctor"), Some(cutoff)).await,
        "prior-period doctors",
    );
    let prior_patients = count_or_zero(
        db::count_profiles(pool, Some("patient"), Some(cutoff)).await,
        "prior-period patients",
    );
    let prior_appointments = count_or_zero(
        db::count_appointments(pool, None, Some(cutoff)).await,
        "prior-period appointments",
    );

    MetricSnapshot {
        total_users,
        total_doctors,
        total_patients,
        total_appointments,
        user_growth: growth_percent(total_users, prior_users),
        doctor_growth: growth_percent(total_doctors, prior_doctors),
        patient_growth: growth_percent(total_patients, prior_patients),
        appointment_growth: growth_percent(total_appointments, prior_appointments),
    }
}

async fn build_activity(pool: &PgPool) -> Vec<ActivityBucket> {
    match db::fetch_profile_events(pool).await {
        Ok(events) => activity_series(&events),
        Err(error) => {
            tracing::warn!("user activity query failed, using empty series: {}", error);
            Vec::new()
        }
    }
}

async fn build_weekday_load(pool: &PgPool) -> Vec<WeekdayBucket> {
    match db::fetch_appointment_times(pool).await {
        Ok(times) => weekday_load(&times),
        Err(error) => {
            tracing::warn!("appointment load query failed, using zero counts: {}", error);
            weekday_load(&[])
        }
    }
}

async fn build_doctor_ranking(pool: &PgPool) -> Vec<DoctorRanking> {
    let doctors = match db::fetch_doctor_profiles(pool, TOP_DOCTOR_LIMIT).await {
        Ok(doctors) => doctors,
        Err(error) => {
            tracing::warn!("doctor profile query failed, using empty ranking: {}", error);
            return Vec::new();
        }
    };

    let mut rankings = Vec::new();
    for doctor in doctors {
        // A failed per-doctor count keeps the doctor in the ranking at zero.
        let appointments = count_or_zero(
            db::count_appointments(pool, Some(doctor.id), None).await,
            "doctor appointment",
        );
        rankings.push(DoctorRanking {
            id: doctor.id,
            name: doctor.name.unwrap_or_else(|| "Unknown Doctor".to_string()),
            email: doctor.email,
            appointments,
            rating: placeholder_rating(doctor.id),
        });
    }

    rank_doctors(rankings)
}

async fn build_age_distribution(pool: &PgPool) -> Vec<AgeDistributionBucket> {
    let total_patients = count_or_zero(
        db::count_profiles(pool, Some("patient"), None).await,
        "patient count",
    );
    age_distribution(total_patients)
}

fn count_or_zero(result: anyhow::Result<i64>, label: &str) -> i64 {
    match result {
        Ok(count) => count,
        Err(error) => {
            tracing::warn!("{} query failed, using 0: {}", label, error);
            0
        }
    }
}

pub fn growth_percent(current: i64, prior: i64) -> f64 {
    if prior <= 0 {
        return 0.0;
    }
    ((current - prior) as f64 / prior as f64) * 100.0
}

pub fn activity_series(events: &[ProfileEvent]) -> Vec<ActivityBucket> {
    let mut by_date: std::collections::BTreeMap<NaiveDate, (i64, i64, i64)> =
        std::collections::BTreeMap::new();

    for event in events {
        let entry = by_date
            .entry(event.created_at.date_naive())
            .or_insert((0, 0, 0));
        entry.0 += 1;
        if event.role == "patient" {
            entry.1 += 1;
        }
        if event.role == "doctor" {
            entry.2 += 1;
        }
    }

    let mut buckets: Vec<ActivityBucket> = by_date
        .into_iter()
        .map(|(date, (total, patients, doctors))| ActivityBucket {
            date,
            total,
            patients,
            doctors,
        })
        .collect();

    let cut = buckets.len().saturating_sub(ACTIVITY_WINDOW_DAYS);
    buckets.split_off(cut)
}

pub fn weekday_load(times: &[DateTime<Utc>]) -> Vec<WeekdayBucket> {
    let mut counts = [0i64; 7];
    for time in times {
        counts[time.weekday().num_days_from_monday() as usize] += 1;
    }

    WEEKDAY_LABELS
        .into_iter()
        .zip(counts)
        .map(|(day, count)| WeekdayBucket { day, count })
        .collect()
}

pub fn rank_doctors(mut doctors: Vec<DoctorRanking>) -> Vec<DoctorRanking> {
    // Stable sort; tied counts keep the order the profiles were fetched in.
    doctors.sort_by(|a, b| b.appointments.cmp(&a.appointments));
    doctors.truncate(TOP_DOCTOR_LIMIT as usize);
    doctors
}

pub fn placeholder_rating(id: Uuid) -> f64 {
    4.0 + (id.as_u128() % 100) as f64 / 100.0
}

pub fn age_distribution(total_patients: i64) -> Vec<AgeDistributionBucket> {
    AGE_BANDS
        .into_iter()
        .map(|(age_range, share)| AgeDistributionBucket {
            age_range,
            count: (total_patients as f64 * share).floor() as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn event(year: i32, month: u32, day: u32, hour: u32, role: &str) -> ProfileEvent {
        ProfileEvent {
            created_at: at(year, month, day, hour),
            role: role.to_string(),
        }
    }

    fn ranked(id: &str, appointments: i64) -> DoctorRanking {
        DoctorRanking {
            id: Uuid::parse_str(id).unwrap(),
            name: "Test Doctor".to_string(),
            email: "doctor@example.com".to_string(),
            appointments,
            rating: 4.5,
        }
    }

    #[test]
    fn growth_matches_prior_period_ratio() {
        assert_eq!(growth_percent(25, 20), 25.0);
        assert_eq!(growth_percent(18, 24), -25.0);
        assert_eq!(growth_percent(20, 20), 0.0);
    }

    #[test]
    fn growth_is_zero_without_prior_data() {
        assert_eq!(growth_percent(3, 0), 0.0);
        assert_eq!(growth_percent(0, 0), 0.0);
    }

    #[test]
    fn cutoff_subtracts_seven_days_for_week() {
        let now = at(2026, 3, 15, 12);
        assert_eq!(period_cutoff(now, TimeRange::Week), at(2026, 3, 8, 12));
    }

    #[test]
    fn cutoff_subtracts_calendar_months() {
        let now = at(2026, 3, 15, 12);
        assert_eq!(period_cutoff(now, TimeRange::Month), at(2026, 2, 15, 12));
        assert_eq!(period_cutoff(now, TimeRange::Quarter), at(2025, 12, 15, 12));
    }

    #[test]
    fn cutoff_clamps_to_shorter_months() {
        let now = at(2026, 3, 31, 8);
        assert_eq!(period_cutoff(now, TimeRange::Month), at(2026, 2, 28, 8));
    }

    #[test]
    fn activity_series_groups_by_calendar_day() {
        let events = vec![
            event(2026, 2, 2, 8, "patient"),
            event(2026, 2, 2, 14, "doctor"),
            event(2026, 2, 2, 21, "admin"),
            event(2026, 2, 4, 9, "patient"),
        ];

        let series = activity_series(&events);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, at(2026, 2, 2, 0).date_naive());
        assert_eq!(series[0].total, 3);
        assert_eq!(series[0].patients, 1);
        assert_eq!(series[0].doctors, 1);
        assert_eq!(series[1].total, 1);
    }

    #[test]
    fn activity_series_keeps_most_recent_seven_days() {
        let mut events = Vec::new();
        for day in 1..=9 {
            events.push(event(2026, 2, day, 10, "patient"));
        }

        let series = activity_series(&events);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, at(2026, 2, 3, 0).date_naive());
        assert_eq!(series[6].date, at(2026, 2, 9, 0).date_naive());
        assert!(series.windows(2).all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn activity_series_total_covers_other_roles() {
        let events = vec![
            event(2026, 2, 2, 8, "patient"),
            event(2026, 2, 2, 9, "doctor"),
            event(2026, 2, 2, 10, "admin"),
        ];

        let series = activity_series(&events);
        let others = series[0].total - series[0].patients - series[0].doctors;
        assert_eq!(others, 1);
    }

    #[test]
    fn weekday_load_counts_by_day_of_week() {
        // 2026-02-02 is a Monday, 2026-02-06 a Friday.
        let times = vec![
            at(2026, 2, 2, 8),
            at(2026, 2, 2, 11),
            at(2026, 2, 2, 16),
            at(2026, 2, 6, 9),
        ];

        let buckets = weekday_load(&times);
        assert_eq!(buckets.len(), 7);
        assert_eq!((buckets[0].day, buckets[0].count), ("Mon", 3));
        assert_eq!((buckets[4].day, buckets[4].count), ("Fri", 1));
        assert_eq!(buckets.iter().map(|b| b.count).sum::<i64>(), 4);
    }

    #[test]
    fn weekday_load_always_emits_all_seven_days() {
        let buckets = weekday_load(&[]);
        let days: Vec<&str> = buckets.iter().map(|b| b.day).collect();
        assert_eq!(days, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn ranking_sorts_descending_and_keeps_tied_order() {
        let doctors = vec![
            ranked("ba35975d-cb4d-4168-81af-8cf016db9e95", 2),
            ranked("b8f936e9-d2c7-42ea-a2eb-972774bbee50", 5),
            ranked("5ca2ee7f-02fd-41b1-b0c7-a3c92399375f", 2),
            ranked("2d1c78c0-698e-46b9-82b1-0a07c8bee2a6", 9),
        ];
        let first_tied = doctors[0].id;
        let second_tied = doctors[2].id;

        let sorted = rank_doctors(doctors);
        assert!(sorted
            .windows(2)
            .all(|pair| pair[0].appointments >= pair[1].appointments));
        assert_eq!(sorted[0].appointments, 9);
        assert_eq!(sorted[2].id, first_tied);
        assert_eq!(sorted[3].id, second_tied);
    }

    #[test]
    fn ranking_caps_at_five_doctors() {
        let doctors: Vec<DoctorRanking> = (0..7u128)
            .map(|n| DoctorRanking {
                id: Uuid::from_u128(n),
                name: format!("Doctor {n}"),
                email: format!("doctor{n}@example.com"),
                appointments: n as i64,
                rating: 4.0,
            })
            .collect();

        let sorted = rank_doctors(doctors);
        assert_eq!(sorted.len(), 5);
        assert_eq!(sorted[0].appointments, 6);
        assert_eq!(sorted[4].appointments, 2);
    }

    #[test]
    fn placeholder_rating_is_deterministic_and_bounded() {
        let id = Uuid::parse_str("81860a88-3b64-4b55-a431-6508af4dd79f").unwrap();
        assert_eq!(placeholder_rating(id), placeholder_rating(id));
        assert_eq!(placeholder_rating(Uuid::nil()), 4.0);

        for id in [Uuid::nil(), id, Uuid::parse_str("38b96c3b-1a1d-4e1d-b64f-59b4d49bb806").unwrap()] {
            let rating = placeholder_rating(id);
            assert!((4.0..5.0).contains(&rating));
        }
    }

    #[test]
    fn age_distribution_applies_fixed_shares() {
        let buckets = age_distribution(100);
        let counts: Vec<i64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![15, 30, 25, 20, 10]);
    }

    #[test]
    fn age_distribution_floors_partial_counts() {
        let buckets = age_distribution(7);
        let counts: Vec<i64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 1, 0]);
    }

    #[test]
    fn age_distribution_keeps_all_bands_at_zero() {
        let buckets = age_distribution(0);
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.count == 0));
        let bands: Vec<&str> = buckets.iter().map(|b| b.age_range).collect();
        assert_eq!(bands, vec!["0-18", "19-35", "36-50", "51-65", "65+"]);
    }
}
