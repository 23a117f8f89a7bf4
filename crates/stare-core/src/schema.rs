/// Arrow schema definitions for precedent corpora.
pub mod precedents {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const COURT: &str = "court";
    pub const YEAR: &str = "year";
    pub const TEXT: &str = "text";
    pub const IPC_SECTIONS: &str = "ipc_sections";
    pub const CRPC_SECTIONS: &str = "crpc_sections";
    pub const CONSTITUTIONAL_ARTICLES: &str = "constitutional_articles";
    pub const ACTS: &str = "acts";
    pub const OUTCOME: &str = "outcome";
    pub const SOURCE: &str = "source";
    pub const EMBEDDING: &str = "embedding";

    fn string_list(name: &str) -> Field {
        Field::new(
            name,
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        )
    }

    /// Data type of the embedding column for a given dimension.
    pub fn embedding_type(dim: usize) -> DataType {
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dim as i32,
        )
    }

    /// Schema for an embedded precedent corpus.
    pub fn precedent_schema(dim: usize) -> Schema {
        Schema::new(vec![
            Field::new(ID, DataType::Utf8, false),
            Field::new(TITLE, DataType::Utf8, true),
            Field::new(COURT, DataType::Utf8, true),
            Field::new(YEAR, DataType::Int32, true),
            Field::new(TEXT, DataType::Utf8, true),
            string_list(IPC_SECTIONS),
            string_list(CRPC_SECTIONS),
            string_list(CONSTITUTIONAL_ARTICLES),
            string_list(ACTS),
            Field::new(OUTCOME, DataType::Utf8, true),
            Field::new(SOURCE, DataType::Utf8, true),
            Field::new(EMBEDDING, embedding_type(dim), true),
        ])
    }
}
