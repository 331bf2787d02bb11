pub mod mongodb;
pub mod track_db;
