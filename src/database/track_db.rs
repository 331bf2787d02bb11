use mongodb::bson::Document;
use mongodb::Collection;

use crate::config::StoreSettings;
use crate::data_types::common::EntityKind;

use super::mongodb::MongoDatabase;

struct TrackCollections {
    gps_points: Collection<Document>,
    mobile_points: Collection<Document>,
}

/// The two point collections, resolved once at startup from
/// configuration. Request input never selects a collection by name.
pub struct TrackDB {
    db_conn: MongoDatabase,
    colls: TrackCollections,
}

impl TrackDB {
    pub async fn new(store: &StoreSettings) -> Result<Self, mongodb::error::Error> {
        let db_conn = MongoDatabase::connect(&store.url, &store.database).await?;

        let gps_points = db_conn.collection(&store.gps_collection);
        let mobile_points = db_conn.collection(&store.mobile_collection);

        Ok(Self {
            db_conn,
            colls: TrackCollections {
                gps_points,
                mobile_points,
            },
        })
    }

    fn points_collection(&self, kind: EntityKind) -> &Collection<Document> {
        match kind {
            EntityKind::Gps => &self.colls.gps_points,
            EntityKind::Mobile => &self.colls.mobile_points,
        }
    }

    pub async fn query_points(
        &self,
        kind: EntityKind,
        stages: Vec<Document>,
    ) -> Result<Vec<Document>, mongodb::error::Error> {
        self.db_conn
            .aggregate(self.points_collection(kind), stages)
            .await
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db_conn.ping().await
    }
}
