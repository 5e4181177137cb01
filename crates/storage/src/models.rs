use chrono::NaiveDateTime;
use domain::Alias;
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlAlias {
    pub gamename: String,
    pub alias: String,
}

impl From<SqlAlias> for Alias {
    fn from(sql: SqlAlias) -> Self {
        Alias {
            canonical: sql.gamename,
            alias: sql.alias,
        }
    }
}

#[derive(FromRow)]
pub struct SqlCachedResponse {
    pub body: String,
    pub fetched_at: NaiveDateTime,
}
