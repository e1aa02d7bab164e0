pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        // 23505 = unique_violation
        return db.code().as_deref() == Some("23505");
    }

    false
}
