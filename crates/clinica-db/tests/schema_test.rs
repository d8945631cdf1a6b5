//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    clinica_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "user",
        "patient",
        "clinical_history",
        "professional",
        "schedule_slot",
        "appointment",
        "slot_claim",
        "bed",
        "admission",
        "bed_claim",
        "prescription",
        "clinical_note",
        "telemedicine",
        "supply",
        "financial_entry",
        "audit_log",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    clinica_db::run_migrations(&db).await.unwrap();
    clinica_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn supply_quantity_cannot_be_negative() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    clinica_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE supply SET name = 'Luvas', category = 'EPI', \
             quantity = -1",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "negative quantity should be rejected");
}
