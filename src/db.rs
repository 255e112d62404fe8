use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{DoctorProfile, ProfileEvent};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();

    let profiles = vec![
        (
            Uuid::parse_str("ba35975d-cb4d-4168-81af-8cf016db9e95")?,
            "Claire Mbarga",
            "claire.mbarga@healthdirectory.cm",
            "admin",
            200,
        ),
        (
            Uuid::parse_str("b8f936e9-d2c7-42ea-a2eb-972774bbee50")?,
            "Sarah Wilson",
            "sarah.wilson@healthdirectory.cm",
            "doctor",
            160,
        ),
        (
            Uuid::parse_str("5ca2ee7f-02fd-41b1-b0c7-a3c92399375f")?,
            "Emmanuel Ndongo",
            "emmanuel.ndongo@healthdirectory.cm",
            "doctor",
            140,
        ),
        (
            Uuid::parse_str("2d1c78c0-698e-46b9-82b1-0a07c8bee2a6")?,
            "Fatima Bello",
            "fatima.bello@healthdirectory.cm",
            "doctor",
            95,
        ),
        (
            Uuid::parse_str("81860a88-3b64-4b55-a431-6508af4dd79f")?,
            "Jean-Paul Kamga",
            "jean-paul.kamga@healthdirectory.cm",
            "doctor",
            60,
        ),
        (
            Uuid::parse_str("38b96c3b-1a1d-4e1d-b64f-59b4d49bb806")?,
            "Grace Fon",
            "grace.fon@healthdirectory.cm",
            "doctor",
            18,
        ),
        (
            Uuid::parse_str("da3b52cc-5ee5-4569-a5ce-bf2c312127cc")?,
            "Ngono Etoundi",
            "ngono.etoundi@healthdirectory.cm",
            "patient",
            120,
        ),
        (
            Uuid::parse_str("a2cc9df1-cc41-4718-841d-5d57b6aa6231")?,
            "Amina Sali",
            "amina.sali@healthdirectory.cm",
            "patient",
            75,
        ),
        (
            Uuid::parse_str("786bdd78-bfc5-473e-851d-c4a639a15f5c")?,
            "Pierre Tchoungui",
            "pierre.tchoungui@healthdirectory.cm",
            "patient",
            40,
        ),
        (
            Uuid::parse_str("d318f143-eec5-4691-aaf4-8e9a4f86beab")?,
            "Beatrice Ayuk",
            "beatrice.ayuk@healthdirectory.cm",
            "patient",
            12,
        ),
        (
            Uuid::parse_str("4a738752-ed48-4e4f-b364-7533f0bba083")?,
            "Samuel Njoya",
            "samuel.njoya@healthdirectory.cm",
            "patient",
            6,
        ),
        (
            Uuid::parse_str("e9a8ea99-744f-4d11-be57-0b5abaf55140")?,
            "Lydia Manga",
            "lydia.manga@healthdirectory.cm",
            "patient",
            3,
        ),
        (
            Uuid::parse_str("6e4d5a5a-2518-4514-9cd2-93203af7d50d")?,
            "Joseph Fomba",
            "joseph.fomba@healthdirectory.cm",
            "patient",
            1,
        ),
    ];

    for (id, name, email, role, days_ago) in profiles {
        sqlx::query(
            r#"
            INSERT INTO health_directory.profiles (id, name, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, role = EXCLUDED.role
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(now - Duration::days(days_ago))
        .fetch_one(pool)
        .await?;
    }

    let appointments = vec![
        (
            Uuid::parse_str("c4a38c12-12a5-40e5-bb11-b289d2c6a58e")?,
            "sarah.wilson@healthdirectory.cm",
            9,
        ),
        (
            Uuid::parse_str("c6e80278-ea6f-488f-b035-73d2208ed488")?,
            "sarah.wilson@healthdirectory.cm",
            7,
        ),
        (
            Uuid::parse_str("8a3f2857-817b-4ac4-9ace-c3f80dc2aaf0")?,
            "sarah.wilson@healthdirectory.cm",
            4,
        ),
        (
            Uuid::parse_str("b091574d-6f6e-46fc-9287-15f8a1ef7be1")?,
            "sarah.wilson@healthdirectory.cm",
            2,
        ),
        (
            Uuid::parse_str("fca33f48-fc7a-409d-97c7-bdcdf69ff2c0")?,
            "sarah.wilson@healthdirectory.cm",
            1,
        ),
        (
            Uuid::parse_str("dd24e215-b496-479d-86b2-df66f0cac528")?,
            "emmanuel.ndongo@healthdirectory.cm",
            8,
        ),
        (
            Uuid::parse_str("e5e0d806-ddf8-4e89-959f-d6d749e5b667")?,
            "emmanuel.ndongo@healthdirectory.cm",
            5,
        ),
        (
            Uuid::parse_str("5f2d231b-ff0f-4765-9e46-f34d456515e7")?,
            "emmanuel.ndongo@healthdirectory.cm",
            2,
        ),
        (
            Uuid::parse_str("a64105d0-acd8-4924-a437-dfccb59aa10d")?,
            "fatima.bello@healthdirectory.cm",
            6,
        ),
        (
            Uuid::parse_str("4b3fcbef-4976-466b-8960-d52655d11c28")?,
            "fatima.bello@healthdirectory.cm",
            3,
        ),
        (
            Uuid::parse_str("f0f8beae-8a2c-45a8-9ee9-45b77e5e4be8")?,
            "jean-paul.kamga@healthdirectory.cm",
            10,
        ),
        (
            Uuid::parse_str("aa02323c-fffb-4c7f-a2f8-192be15b7680")?,
            "jean-paul.kamga@healthdirectory.cm",
            4,
        ),
        (
            Uuid::parse_str("85f53278-98ea-447d-a12d-42e0bae932f8")?,
            "grace.fon@healthdirectory.cm",
            1,
        ),
    ];

    for (id, doctor_email, days_ago) in appointments {
        let doctor_id: Uuid = sqlx::query(
            "SELECT id FROM health_directory.profiles WHERE email = $1",
        )
        .bind(doctor_email)
        .fetch_one(pool)
        .await?
        .get("id");

        sqlx::query(
            r#"
            INSERT INTO health_directory.appointments (id, doctor_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(doctor_id)
        .bind(now - Duration::days(days_ago))
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn count_profiles(
    pool: &PgPool,
    role: Option<&str>,
    created_before: Option<DateTime<Utc>>,
) -> anyhow::Result<i64> {
    let mut query = String::from("SELECT COUNT(*) FROM health_directory.profiles");
    let mut predicates = Vec::new();

    if role.is_some() {
        predicates.push(format!("role = ${}", predicates.len() + 1));
    }
    if created_before.is_some() {
        predicates.push(format!("created_at < ${}", predicates.len() + 1));
    }
    if !predicates.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&predicates.join(" AND "));
    }

    let mut count = sqlx::query_scalar(&query);
    if let Some(value) = role {
        count = count.bind(value);
    }
    if let Some(value) = created_before {
        count = count.bind(value);
    }

    let total: i64 = count.fetch_one(pool).await?;
    Ok(total)
}

pub async fn count_appointments(
    pool: &PgPool,
    doctor_id: Option<Uuid>,
    created_before: Option<DateTime<Utc>>,
) -> anyhow::Result<i64> {
    let mut query = String::from("SELECT COUNT(*) FROM health_directory.appointments");
    let mut predicates = Vec::new();

    if doctor_id.is_some() {
        predicates.push(format!("doctor_id = ${}", predicates.len() + 1));
    }
    if created_before.is_some() {
        predicates.push(format!("created_at < ${}", predicates.len() + 1));
    }
    if !predicates.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&predicates.join(" AND "));
    }

    let mut count = sqlx::query_scalar(&query);
    if let Some(value) = doctor_id {
        count = count.bind(value);
    }
    if let Some(value) = created_before {
        count = count.bind(value);
    }

    let total: i64 = count.fetch_one(pool).await?;
    Ok(total)
}

pub async fn fetch_profile_events(pool: &PgPool) -> anyhow::Result<Vec<ProfileEvent>> {
    let rows = sqlx::query(
        "SELECT created_at, role FROM health_directory.profiles ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    let mut events = Vec::new();
    for row in rows {
        events.push(ProfileEvent {
            created_at: row.get("created_at"),
            role: row.get("role"),
        });
    }

    Ok(events)
}

pub async fn fetch_appointment_times(pool: &PgPool) -> anyhow::Result<Vec<DateTime<Utc>>> {
    let rows = sqlx::query(
        "SELECT created_at FROM health_directory.appointments ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    let mut times = Vec::new();
    for row in rows {
        times.push(row.get("created_at"));
    }

    Ok(times)
}

pub async fn fetch_doctor_profiles(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<DoctorProfile>> {
    let rows = sqlx::query(
        "SELECT id, name, email FROM health_directory.profiles WHERE role = 'doctor' LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(DoctorProfile {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
        });
    }

    Ok(doctors)
}
