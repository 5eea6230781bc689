//! List operations over the `restaurants` table.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_rusqlite::{params, rusqlite};

use super::connection::SqliteListStore;
use crate::Error;
use crate::price::normalize_price;
use crate::provider::ListStore;
use crate::restaurant::{Restaurant, SourceRanks};

const COLUMNS: &str = "name, booking_website, description, price_range, cuisine_type,
     eater_dc_rank, michelin_guide_rank, washington_post_rank, washingtonian_rank, infatuation_rank,
     priority_rank, priority_reasons, date_added";

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Restaurant> {
    let price: String = row.get(3)?;
    let date: String = row.get(12)?;

    Ok(Restaurant {
        name: row.get(0)?,
        booking_website: row.get(1)?,
        description: row.get(2)?,
        price_range: normalize_price(&price),
        cuisine_type: row.get(4)?,
        ranks: SourceRanks {
            eater_dc_rank: row.get(5)?,
            michelin_guide_rank: row.get(6)?,
            washington_post_rank: row.get(7)?,
            washingtonian_rank: row.get(8)?,
            infatuation_rank: row.get(9)?,
        },
        priority_rank: row.get(10)?,
        priority_reasons: row.get(11)?,
        date_added: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
    })
}

#[async_trait]
impl ListStore for SqliteListStore {
    async fn read_all(&self) -> Result<Vec<Restaurant>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Restaurant>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM restaurants ORDER BY id"))?;
                let rows = stmt.query_map([], from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    async fn append_batch(&self, restaurants: &[Restaurant]) -> Result<usize, Error> {
        let batch = restaurants.to_vec();
        let inserted = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(&format!(
                        "INSERT OR IGNORE INTO restaurants ({COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                    ))?;
                    for r in &batch {
                        inserted += stmt.execute(params![
                            r.name.trim(),
                            r.booking_website,
                            r.description,
                            r.price_range.as_str(),
                            r.cuisine_type,
                            r.ranks.eater_dc_rank,
                            r.ranks.michelin_guide_rank,
                            r.ranks.washington_post_rank,
                            r.ranks.washingtonian_rank,
                            r.ranks.infatuation_rank,
                            r.priority_rank,
                            r.priority_reasons,
                            r.date_added.format("%Y-%m-%d").to_string(),
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await
            .map_err(Error::from)?;

        tracing::info!(requested = restaurants.len(), inserted, "appended restaurants");
        Ok(inserted)
    }

    async fn remove_by_name(&self, name: &str) -> Result<bool, Error> {
        let name = name.trim().to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let removed = conn.execute("DELETE FROM restaurants WHERE name = ?1", params![name])?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }
}
