mod reader;

pub use reader::SchemaReader;
