use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProfileEvent {
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub total_users: i64,
    pub total_doctors: i64,
    pub total_patients: i64,
    pub total_appointments: i64,
    pub user_growth: f64,
    pub doctor_growth: f64,
    pub patient_growth: f64,
    pub appointment_growth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityBucket {
    pub date: NaiveDate,
    pub total: i64,
    pub patients: i64,
    pub doctors: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayBucket {
    pub day: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorRanking {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub appointments: i64,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeDistributionBucket {
    pub age_range: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub metrics: MetricSnapshot,
    pub user_activity: Vec<ActivityBucket>,
    pub appointments_by_day: Vec<WeekdayBucket>,
    pub doctor_performance: Vec<DoctorRanking>,
    pub patient_distribution: Vec<AgeDistributionBucket>,
}
