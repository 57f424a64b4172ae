use sqlx::SqliteConnection;

use crate::db_types::ProvisioningEntry;

pub async fn fetch_provisioning_entries(conn: &mut SqliteConnection) -> Result<Vec<ProvisioningEntry>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT item_code, enrollment_key, course_link FROM course_provisioning")
        .fetch_all(&mut *conn)
        .await?;
    Ok(entries)
}

pub async fn upsert_provisioning_entry(
    entry: &ProvisioningEntry,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO course_provisioning (item_code, enrollment_key, course_link) VALUES ($1, $2, $3)
            ON CONFLICT (item_code) DO UPDATE
                SET enrollment_key = excluded.enrollment_key, course_link = excluded.course_link;
        "#,
    )
    .bind(&entry.item_code)
    .bind(&entry.enrollment_key)
    .bind(&entry.course_link)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
