use mongodb::{
    bson::{doc, Document},
    Client, Collection, Database,
};

/// Thin handle over the analytical store connection. Cloning is cheap
/// (the driver client is internally pooled and thread-safe), so one
/// instance is shared by every request.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    database: Database,
}

impl MongoDatabase {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(url).await?;

        Ok(Self {
            database: client.database(db_name),
        })
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    /// Runs one aggregation pipeline and drains the cursor. All request
    /// parameters inside `stages` are BSON values, never interpolated
    /// strings.
    pub async fn aggregate(
        &self,
        collection: &Collection<Document>,
        stages: Vec<Document>,
    ) -> Result<Vec<Document>, mongodb::error::Error> {
        let mut cursor = collection.aggregate(stages, None).await?;
        let mut rows: Vec<Document> = Vec::new();

        while cursor.advance().await? {
            rows.push(cursor.deserialize_current()?);
        }

        Ok(rows)
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.database.run_command(doc! {"ping": 1}, None).await?;

        Ok(())
    }
}
